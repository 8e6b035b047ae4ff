//! # Canonical Serialization
//!
//! Defines [`CanonicalBytes`], the only byte sequence the engine ever hashes.
//! Audit event hashes, chain links and signatures are all computed over
//! canonical bytes, so two processes that hold the same event always agree on
//! its digest.
//!
//! Serialization is JCS (RFC 8785) via `serde_jcs`: object keys sorted by
//! UTF-16 code units, compact separators, and ECMAScript number formatting,
//! which gives floats a single deterministic spelling. Values are hashed
//! exactly as they serialize. Strings are never rewritten, so a timestamp
//! that differs by a millisecond or an offset yields a different digest.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS serialization.
///
/// The inner `Vec<u8>` is private; downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::SerializationFailed`] if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let bytes = serialize_canonical(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn keys_are_sorted_and_compact() {
        let data = serde_json::json!({"regulators": [], "country": "CO", "industry": "healthcare"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            text(&cb),
            r#"{"country":"CO","industry":"healthcare","regulators":[]}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = serde_json::json!({"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn floats_use_shortest_round_trip_form() {
        let data = serde_json::json!({"old": 12.5, "new": 13.75, "ratio": 1e21, "whole": 2.0});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"new":13.75,"old":12.5,"ratio":1e+21,"whole":2}"#);
    }

    #[test]
    fn distinct_floats_hash_differently() {
        let a = CanonicalBytes::new(&serde_json::json!({"rate": 0.1})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"rate": 0.10000000000000002})).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn integers_pass_through() {
        let data = serde_json::json!({"retention": 7, "offset": -42, "big": 9_999_999_999i64});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"big":9999999999,"offset":-42,"retention":7}"#);
    }

    #[test]
    fn timestamps_are_kept_verbatim() {
        let data = serde_json::json!({"at": "2026-03-01T10:15:30.123456+02:00"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"at":"2026-03-01T10:15:30.123456+02:00"}"#);
    }

    #[test]
    fn sub_second_timestamp_change_alters_bytes() {
        let a = CanonicalBytes::new(&serde_json::json!({"at": "2026-05-01T09:00:00.100Z"})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"at": "2026-05-01T09:00:00.999Z"})).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn non_date_strings_are_untouched() {
        let data = serde_json::json!({"description": "Audit event: case_created"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"description":"Audit event: case_created"}"#);
    }

    #[test]
    fn unicode_passes_through() {
        let data = serde_json::json!({"name": "Superintendencia de Industria y Comercio — Bogotá"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(text(&cb).contains("Bogotá"));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(CanonicalBytes::new(&serde_json::json!({})).unwrap().as_bytes(), b"{}");
        assert_eq!(CanonicalBytes::new(&serde_json::json!([])).unwrap().as_bytes(), b"[]");
        assert!(!CanonicalBytes::new(&serde_json::json!({})).unwrap().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e12f64..1.0e12).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ ]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..8)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonicalization_is_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_output_is_valid_json(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok());
        }
    }
}
