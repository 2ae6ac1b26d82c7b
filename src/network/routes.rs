use serde::Deserialize;

/// Роль соединения, определённая по пути WebSocket-рукопожатия.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Publisher,
    Subscriber,
}

/// Таблица путей сервера.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub publisher_path: String,
    pub subscriber_path: String,
}

impl Routes {
    pub const PUBLISHER_PATH: &'static str = "/ws/publisher";
    pub const SUBSCRIBER_PATH: &'static str = "/ws/subscriber";

    /// Сопоставляет путь запроса (без query-строки) с ролью.
    pub fn resolve(
        &self,
        path: &str,
    ) -> Option<Route> {
        if path == self.publisher_path {
            Some(Route::Publisher)
        } else if path == self.subscriber_path {
            Some(Route::Subscriber)
        } else {
            None
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            publisher_path: Self::PUBLISHER_PATH.to_string(),
            subscriber_path: Self::SUBSCRIBER_PATH.to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Route::Publisher => f.write_str("publisher"),
            Route::Subscriber => f.write_str("subscriber"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/ws/publisher", Some(Route::Publisher))]
    #[case("/ws/subscriber", Some(Route::Subscriber))]
    #[case("/ws/publisher/", None)]
    #[case("/ws", None)]
    #[case("/", None)]
    #[case("/WS/PUBLISHER", None)]
    fn test_default_routes(
        #[case] path: &str,
        #[case] expected: Option<Route>,
    ) {
        assert_eq!(Routes::default().resolve(path), expected);
    }

    /// Тест проверяет, что пути можно переопределить.
    #[test]
    fn test_custom_routes() {
        let routes = Routes {
            publisher_path: "/in".to_string(),
            subscriber_path: "/out".to_string(),
        };
        assert_eq!(routes.resolve("/in"), Some(Route::Publisher));
        assert_eq!(routes.resolve("/out"), Some(Route::Subscriber));
        assert_eq!(routes.resolve(Routes::PUBLISHER_PATH), None);
    }
}
