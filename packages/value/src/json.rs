//! Conversion between [`Value`] graphs and `serde_json` trees
//!
//! Import is total. Export fails on anything JSON cannot express: cycles,
//! opaque leaves and non-finite numbers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number};

use crate::error::{ValueError, ValueResult};
use crate::{Mapping, Sequence, Value};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect::<Sequence>())
            }
            serde_json::Value::Object(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = ValueError;

    fn try_from(value: &Value) -> ValueResult<Self> {
        value.to_json()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl Value {
    /// Export to JSON.
    ///
    /// `Undefined` fields are dropped from mappings and become `null` inside
    /// sequences. Shared (non-cyclic) nodes are written out once per use.
    pub fn to_json(&self) -> ValueResult<serde_json::Value> {
        Exporter::default().export(self, "$")
    }
}

/// Integral numbers are written as JSON integers so that imported
/// integers export unchanged.
fn number(n: f64, path: &str) -> ValueResult<Number> {
    if n.fract() == 0.0 && !(n == 0.0 && n.is_sign_negative()) {
        if n >= i64::MIN as f64 && n < i64::MAX as f64 {
            return Ok(Number::from(n as i64));
        }
        if n >= 0.0 && n < u64::MAX as f64 {
            return Ok(Number::from(n as u64));
        }
    }
    Number::from_f64(n).ok_or_else(|| ValueError::NonFiniteNumber {
        value: n,
        path: path.to_string(),
    })
}

#[derive(Default)]
struct Exporter {
    open: Vec<*const ()>,
}

impl Exporter {
    fn export(&mut self, value: &Value, path: &str) -> ValueResult<serde_json::Value> {
        let json = match value {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(number(*n, path)?),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Opaque(_) => {
                return Err(ValueError::Opaque {
                    path: path.to_string(),
                })
            }
            Value::Sequence(seq) => {
                self.enter(seq.as_ptr(), path)?;
                let items = seq
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.export(item, &format!("{}[{}]", path, i)))
                    .collect::<ValueResult<Vec<_>>>();
                self.open.pop();
                serde_json::Value::Array(items?)
            }
            Value::Mapping(map) => {
                self.enter(map.as_ptr(), path)?;
                let entries = map
                    .iter()
                    .filter(|(_, value)| !value.is_undefined())
                    .map(|(key, value)| {
                        self.export(value, &format!("{}.{}", path, key))
                            .map(|json| (key.clone(), json))
                    })
                    .collect::<ValueResult<Map<_, _>>>();
                self.open.pop();
                serde_json::Value::Object(entries?)
            }
        };
        Ok(json)
    }

    fn enter(&mut self, ptr: *const (), path: &str) -> ValueResult<()> {
        if self.open.contains(&ptr) {
            return Err(ValueError::Cycle {
                path: path.to_string(),
            });
        }
        self.open.push(ptr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import() {
        let value = Value::from(json!({
            "title": "Hello",
            "count": 3,
            "tags": ["a", null, true]
        }));

        assert_eq!(value.get("title").and_then(Value::as_str), Some("Hello"));
        assert_eq!(value.get("count").and_then(Value::as_f64), Some(3.0));
        let tags = value.get("tags").and_then(Value::as_sequence).unwrap();
        assert_eq!(tags.len(), 3);
        assert!(matches!(tags.get(1), Some(Value::Null)));
    }

    #[test]
    fn test_export_matches_import() {
        let source = json!({"arr": [{"foo": "bar"}], "x": 1.5, "flag": false});
        let exported = Value::from(&source).to_json().unwrap();
        assert_eq!(exported, source);
    }

    #[test]
    fn test_integers_export_as_integers() {
        let source = json!({
            "count": 3,
            "ids": [1, 2],
            "offset": -40,
            "zero": 0,
            "big": 9_007_199_254_740_992u64,
            "ratio": 0.25
        });
        let exported = Value::from(&source).to_json().unwrap();
        assert_eq!(exported, source);
        assert_eq!(
            serde_json::to_string(&exported["ids"]).unwrap(),
            "[1,2]"
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(Value::from(2.0).to_json().unwrap(), json!(2));
        assert_eq!(Value::from(2.5).to_json().unwrap(), json!(2.5));
        assert_eq!(Value::from(1e20).to_json().unwrap(), json!(1e20));
        assert_eq!(Value::from(-0.0).to_json().unwrap(), json!(-0.0));
    }

    #[test]
    fn test_export_undefined() {
        let value = Value::mapping([
            ("gone", Value::Undefined),
            ("list", Value::sequence([Value::Undefined])),
        ]);
        assert_eq!(value.to_json().unwrap(), json!({"list": [null]}));
    }

    #[test]
    fn test_export_cycle_fails() {
        let node = Mapping::deferred();
        node.seal_with([
            ("test", Value::from("foo")),
            ("self", Value::Mapping(node.clone())),
        ])
        .unwrap();

        let err = Value::Mapping(node).to_json().unwrap_err();
        assert_eq!(
            err,
            ValueError::Cycle {
                path: "$.self".to_string()
            }
        );
    }

    #[test]
    fn test_export_shared_node() {
        let shared = Value::mapping([("k", Value::from(1))]);
        let value = Value::sequence([shared.clone(), shared]);
        assert_eq!(value.to_json().unwrap(), json!([{"k": 1}, {"k": 1}]));
    }

    #[test]
    fn test_export_opaque_fails() {
        let value = Value::sequence([Value::opaque(|| ())]);
        assert!(matches!(
            serde_json::Value::try_from(&value),
            Err(ValueError::Opaque { path }) if path == "$[0]"
        ));
    }

    #[test]
    fn test_serde_round_trip_through_text() {
        let value: Value = serde_json::from_str(r#"{"a": [1, "two"]}"#).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":[1,"two"]}"#);
    }

    #[test]
    fn test_serialize_cycle_fails() {
        let seq = Sequence::deferred();
        seq.seal(vec![Value::Sequence(seq.clone())]).unwrap();
        let err = serde_json::to_string(&Value::Sequence(seq)).unwrap_err();
        assert!(err.to_string().contains("Cyclic value"));
    }

    #[test]
    fn test_export_nan_fails() {
        let value = Value::Number(f64::NAN);
        assert!(matches!(
            value.to_json(),
            Err(ValueError::NonFiniteNumber { .. })
        ));
    }
}
