//! Модель данных: сообщение, событие и его полезная нагрузка.
//!
//! - `codec`: JSON-представление сообщения на проводе.
//!
//! Брокер никогда не разбирает сообщения; типы этого модуля нужны только
//! адаптерам издателя и подписчика.

pub mod codec;

use serde::{Deserialize, Deserializer, Serialize};

pub use codec::{decode, encode};

/// Открытое упорядоченное отображение «имя атрибута → значение».
///
/// Порядок ключей сохраняется (serde_json собран с `preserve_order`).
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Стабильный числовой тег семантического действия
/// ("левая кнопка мыши нажата", "смена карты" и т.п.).
///
/// На проводе это любое целое JSON-число в диапазоне `i64`, включая
/// отрицательные.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub i64);

/// Одно семантическое событие: тег типа и произвольные атрибуты.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(rename = "dict")]
    pub payload: Payload,
}

/// Единица транспорта.
///
/// Оба поля необязательны, но на проводе всегда присутствуют: отсутствие
/// кодируется явным `null`, а при декодировании пропущенный ключ считается
/// ошибкой.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "required_nullable")]
    pub event: Option<Event>,
    #[serde(deserialize_with = "required_nullable")]
    pub extra: Option<Payload>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Event {
    pub fn new(
        kind: impl Into<EventType>,
        payload: Payload,
    ) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Событие без атрибутов.
    pub fn bare(kind: impl Into<EventType>) -> Self {
        Self::new(kind, Payload::new())
    }
}

impl Message {
    pub fn new(
        event: Option<Event>,
        extra: Option<Payload>,
    ) -> Self {
        Self { event, extra }
    }

    /// Пустое сообщение: легально, но не несёт информации.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Тег типа события, если оно есть.
    pub fn kind(&self) -> Option<EventType> {
        self.event.as_ref().map(|e| e.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.extra.is_none()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl From<i64> for EventType {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Self::new(Some(event), None)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Поле обязано присутствовать, но может быть `null`.
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
