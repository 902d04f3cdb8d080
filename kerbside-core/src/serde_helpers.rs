//! Serde helpers for the bin wire format.

/// Deserialize an identifier that the backend may send either as a JSON
/// string or as an integer. Always serializes as a string.
pub mod id_string {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IdVisitor)
    }

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer identifier")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(with = "super::id_string")]
        id: String,
    }

    #[test]
    fn id_from_string() {
        let w: Wrapper = serde_json::from_str(r#"{"id":"BIN-7"}"#).unwrap();
        assert_eq!(w.id, "BIN-7");
    }

    #[test]
    fn id_from_integer() {
        let w: Wrapper = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(w.id, "42");
    }

    #[test]
    fn id_rejects_float() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":1.5}"#).is_err());
    }
}
