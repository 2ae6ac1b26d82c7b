use std::fmt;

/// Состояние жизненного цикла адаптера.
///
/// ```text
/// Created ─► Connecting ─► Active ─► Stopping ─► Closed
///    │            │                                 ▲
///    └────────────┴─────────────────────────────────┘
/// ```
///
/// Из `Closed` выхода нет: после закрытия нужен новый экземпляр адаптера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterState {
    /// Создан, `run()` ещё не вызывался
    Created,
    /// Идёт подключение к брокеру
    Connecting,
    /// Соединение установлено, цикл работает
    Active,
    /// Цикл завершается, соединение закрывается
    Stopping,
    /// Терминальное состояние
    Closed,
}

impl AdapterState {
    /// Допустим ли переход `self → next`.
    pub fn can_transition_to(
        self,
        next: AdapterState,
    ) -> bool {
        use AdapterState::*;
        matches!(
            (self, next),
            (Created, Connecting)
                | (Created, Closed)
                | (Connecting, Active)
                | (Connecting, Closed)
                | (Active, Stopping)
                | (Stopping, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == AdapterState::Closed
    }
}

impl fmt::Display for AdapterState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            AdapterState::Created => "created",
            AdapterState::Connecting => "connecting",
            AdapterState::Active => "active",
            AdapterState::Stopping => "stopping",
            AdapterState::Closed => "closed",
        };
        f.write_str(s)
    }
}
