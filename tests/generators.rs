//! Генераторы proptest для модели сообщений.

use eventcast::message::{Event, EventType, Message, Payload};
use proptest::{collection, prelude::*};
use serde_json::{Number, Value};

/// Ключ атрибута: короткий, с подчёркиваниями и юникодом.
pub fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_]{1,10}",
        "[а-я]{1,6}",
        Just("type".to_string()),
        Just("dict".to_string()),
    ]
}

/// Листовое JSON-значение.
///
/// Дробные числа берутся точно представимыми, чтобы сравнение после
/// разбора было точным.
pub fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-4000i32..4000).prop_map(|n| {
            Number::from_f64(f64::from(n) / 8.0)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }),
        ".{0,16}".prop_map(Value::String),
    ]
}

/// Произвольное JSON-значение ограниченной глубины.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

pub fn arb_payload() -> impl Strategy<Value = Payload> {
    collection::btree_map(arb_key(), arb_value(), 0..6).prop_map(|m| m.into_iter().collect())
}

pub fn arb_event() -> impl Strategy<Value = Event> {
    (any::<i64>(), arb_payload()).prop_map(|(kind, payload)| Event {
        kind: EventType(kind),
        payload,
    })
}

pub fn arb_message() -> impl Strategy<Value = Message> {
    (
        proptest::option::of(arb_event()),
        proptest::option::of(arb_payload()),
    )
        .prop_map(|(event, extra)| Message::new(event, extra))
}
