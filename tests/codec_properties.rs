//! Property-based тесты JSON-кодека сообщений.

use eventcast::message::{decode, encode, Message};
use proptest::prelude::*;
use serde_json::Value;

mod generators;
use generators::*;

const PROPTEST_CASES: u32 = 500;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    /// decode(encode(m)) == m для любого сообщения.
    #[test]
    fn prop_roundtrip(message in arb_message()) {
        let frame = encode(&message).unwrap();
        prop_assert_eq!(decode(&frame).unwrap(), message);
    }

    /// Оба ключа верхнего уровня присутствуют всегда, даже если пусты.
    #[test]
    fn prop_top_level_keys_always_present(message in arb_message()) {
        let value: Value = serde_json::from_str(&encode(&message).unwrap()).unwrap();
        let object = value.as_object().unwrap();
        prop_assert!(object.contains_key("event"));
        prop_assert!(object.contains_key("extra"));
        prop_assert_eq!(object["event"].is_null(), message.event.is_none());
        prop_assert_eq!(object["extra"].is_null(), message.extra.is_none());
    }

    /// Порядок атрибутов на проводе совпадает с порядком вставки.
    #[test]
    fn prop_payload_order_preserved(event in arb_event()) {
        let message = Message::from(event.clone());
        let decoded = decode(&encode(&message).unwrap()).unwrap();
        let original: Vec<&String> = event.payload.keys().collect();
        let restored: Vec<&String> = decoded.event.as_ref().unwrap().payload.keys().collect();
        prop_assert_eq!(original, restored);
    }

    /// Произвольный текст либо разбирается, либо отклоняется, но не роняет
    /// кодек.
    #[test]
    fn prop_decode_never_panics(text in ".{0,64}") {
        let _ = decode(&text);
    }
}
