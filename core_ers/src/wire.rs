//! # Canonical wire encoding
//! Every label the EMM hashes is produced here, so build-time and
//! query-time bytes for the same cover have to agree bit for bit. The
//! format is JSON with byte strings wrapped as `"^^^" + base64 + "$$$"`;
//! map keys serialize in lexicographic order (serde_json's default object
//! backing), and that ordering is part of the wire format.
//!
//! Caveat inherited from the envelope: a *string* that happens to carry
//! the tag markers decodes back as bytes. Labels built by this library
//! never produce such strings.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::errors::{CoreError, CoreResult};

const TAG_PREFIX: &str = "^^^";
const TAG_SUFFIX: &str = "$$$";

/// A value that can travel through the canonical encoder: integers,
/// strings, booleans, nulls, raw bytes, lists and string-keyed maps.
/// Anything outside this set is unconstructible, so the encode direction
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obj {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Obj>),
    Map(BTreeMap<String, Obj>),
}

impl From<bool> for Obj {
    fn from(v: bool) -> Obj {
        Obj::Bool(v)
    }
}

impl From<i64> for Obj {
    fn from(v: i64) -> Obj {
        Obj::Int(v)
    }
}

impl From<u32> for Obj {
    fn from(v: u32) -> Obj {
        Obj::Int(v as i64)
    }
}

impl From<&str> for Obj {
    fn from(v: &str) -> Obj {
        Obj::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Obj {
    fn from(v: Vec<u8>) -> Obj {
        Obj::Bytes(v)
    }
}

impl From<Vec<Obj>> for Obj {
    fn from(v: Vec<Obj>) -> Obj {
        Obj::List(v)
    }
}

/// Serializes a value graph to its canonical bytes. Deterministic for a
/// given value: stable key order, stable integer formatting.
pub fn object_to_bytes(o: &Obj) -> Vec<u8> {
    let value = prepare(o);
    // Obj maps are string-keyed by construction, so Value serialization
    // cannot fail.
    serde_json::to_vec(&value).expect("canonical values always serialize")
}

/// The exact inverse of [`object_to_bytes`].
pub fn bytes_to_object(b: &[u8]) -> CoreResult<Obj> {
    let value: Value = serde_json::from_slice(b)?;
    repair(&value)
}

fn prepare(o: &Obj) -> Value {
    match o {
        Obj::Null => Value::Null,
        Obj::Bool(b) => Value::Bool(*b),
        Obj::Int(i) => Value::Number((*i).into()),
        Obj::Str(s) => Value::String(s.clone()),
        Obj::Bytes(b) => Value::String(format!("{}{}{}", TAG_PREFIX, BASE64.encode(b), TAG_SUFFIX)),
        Obj::List(items) => Value::Array(items.iter().map(prepare).collect()),
        Obj::Map(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), prepare(value)))
                .collect(),
        ),
    }
}

fn repair(v: &Value) -> CoreResult<Obj> {
    match v {
        Value::Null => Ok(Obj::Null),
        Value::Bool(b) => Ok(Obj::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Obj::Int)
            .ok_or(CoreError::WireDecode("number outside the canonical integer range")),
        Value::String(s) => {
            if is_tagged(s) {
                let inner = &s[TAG_PREFIX.len()..s.len() - TAG_SUFFIX.len()];
                Ok(Obj::Bytes(BASE64.decode(inner)?))
            } else {
                Ok(Obj::Str(s.clone()))
            }
        }
        Value::Array(items) => items
            .iter()
            .map(repair)
            .collect::<CoreResult<Vec<Obj>>>()
            .map(Obj::List),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                if is_tagged(key) {
                    Err(CoreError::WireDecode("byte-valued map keys are not representable"))
                } else {
                    repair(value).map(|obj| (key.clone(), obj))
                }
            })
            .collect::<CoreResult<BTreeMap<String, Obj>>>()
            .map(Obj::Map),
    }
}

fn is_tagged(s: &str) -> bool {
    s.len() >= TAG_PREFIX.len() + TAG_SUFFIX.len()
        && s.starts_with(TAG_PREFIX)
        && s.ends_with(TAG_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trips() {
        for obj in [
            Obj::Null,
            Obj::Bool(true),
            Obj::Int(-42),
            Obj::Int(i64::MAX),
            Obj::Str("plain".to_string()),
            Obj::Bytes(vec![0u8, 255, 7]),
            Obj::Bytes(Vec::new()),
        ] {
            let bytes = object_to_bytes(&obj);
            assert_eq!(bytes_to_object(&bytes).unwrap(), obj);
        }
    }

    #[test]
    fn nested_round_trip() {
        let mut map = BTreeMap::new();
        map.insert("zeta".to_string(), Obj::Int(1));
        map.insert("alpha".to_string(), Obj::Bytes(b"payload".to_vec()));
        let obj = Obj::List(vec![
            Obj::List(vec![Obj::Int(0), Obj::Int(7)]),
            Obj::Map(map),
            Obj::Null,
        ]);
        let bytes = object_to_bytes(&obj);
        assert_eq!(bytes_to_object(&bytes).unwrap(), obj);
    }

    #[test]
    fn map_key_order_is_stable() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), Obj::Int(1));
        forward.insert("b".to_string(), Obj::Int(2));
        let mut backward = BTreeMap::new();
        backward.insert("b".to_string(), Obj::Int(2));
        backward.insert("a".to_string(), Obj::Int(1));
        assert_eq!(
            object_to_bytes(&Obj::Map(forward)),
            object_to_bytes(&Obj::Map(backward))
        );
    }

    #[test]
    fn interval_lists_hash_identically_to_their_bytes() {
        // The schemes rely on [a, b] always producing the same bytes.
        let cover = Obj::List(vec![Obj::Int(2), Obj::Int(5)]);
        assert_eq!(object_to_bytes(&cover), object_to_bytes(&cover.clone()));
        assert_eq!(object_to_bytes(&cover), b"[2,5]".to_vec());
    }

    #[test]
    fn tagged_strings_decode_to_bytes() {
        let bytes = object_to_bytes(&Obj::Bytes(b"iv".to_vec()));
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("^^^"));
        assert!(text.contains("$$$"));
        assert_eq!(bytes_to_object(&bytes).unwrap(), Obj::Bytes(b"iv".to_vec()));
    }

    #[test]
    fn floats_are_rejected() {
        assert!(bytes_to_object(b"[1.5]").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(bytes_to_object(b"{not json").is_err());
    }
}
