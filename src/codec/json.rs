use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::warn;

use super::{Codec, Record, RecordMeta, SavedEntry};
use crate::{
    error::Result,
    flags::CVarFlags,
    value::{Bound, Value},
};

/// One JSON object per entry, keyed by full name:
///
/// ```json
/// {
///   "render.fov": {
///     "description": "Field of view",
///     "flags": 1,
///     "min": 30.0,
///     "max": 120.0,
///     "current": 90.0
///   }
/// }
/// ```
///
/// Hidden entries are written like any other archived entry since their
/// flags travel with them. Value types come from the JSON shape of
/// `current`; integers and floats are kept apart, so the round trip is exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[derive(Debug, Serialize, Deserialize)]
struct JsonEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    flags: u32,
    #[serde(default)]
    min: Option<Bound>,
    #[serde(default)]
    max: Option<Bound>,
    current: Json,
}

impl Codec for JsonCodec {
    fn encode(&self, entries: &[SavedEntry]) -> Result<String> {
        let mut root = Map::new();
        for entry in entries {
            let descriptor = &entry.descriptor;
            let Some(current) = to_json(&entry.current) else {
                warn!(name = %descriptor.name, "non-finite value cannot be written as JSON, skipping");
                continue;
            };
            let json_entry = JsonEntry {
                description: descriptor.description.clone(),
                flags: descriptor.flags.bits(),
                min: descriptor.min,
                max: descriptor.max,
                current,
            };
            root.insert(descriptor.name.clone(), serde_json::to_value(json_entry)?);
        }
        Ok(serde_json::to_string_pretty(&Json::Object(root))?)
    }

    fn decode(&self, text: &str) -> Result<Vec<Record>> {
        let root: Map<String, Json> = serde_json::from_str(text)?;
        let mut records = Vec::with_capacity(root.len());

        for (name, raw) in root {
            let entry: JsonEntry = match serde_json::from_value(raw) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(name = %name, %err, "skipping malformed JSON entry");
                    continue;
                }
            };
            let Some(value) = from_json(&entry.current) else {
                warn!(name = %name, current = %entry.current, "unsupported value shape, skipping");
                continue;
            };
            records.push(Record {
                name,
                value,
                meta: Some(RecordMeta {
                    description: entry.description,
                    flags: CVarFlags::from_bits_truncate(entry.flags),
                    min: entry.min,
                    max: entry.max,
                }),
            });
        }
        Ok(records)
    }
}

fn to_json(value: &Value) -> Option<Json> {
    let float = |x: f64| serde_json::Number::from_f64(x).map(Json::Number);
    match value {
        Value::Bool(b) => Some(Json::Bool(*b)),
        Value::Int(i) => Some(Json::from(*i)),
        Value::Float(x) => float(*x),
        Value::String(s) => Some(Json::String(s.clone())),
        Value::Vec2(_) | Value::Vec3(_) | Value::Vec4(_) => value
            .components()
            .unwrap_or_default()
            .iter()
            .map(|c| float(*c))
            .collect::<Option<Vec<_>>>()
            .map(Json::Array),
    }
}

/// Strict dispatch on the JSON shape; no coercion between kinds.
fn from_json(json: &Json) -> Option<Value> {
    match json {
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) if n.is_i64() => n.as_i64().map(Value::Int),
        Json::Number(n) if n.is_f64() => n.as_f64().map(Value::Float),
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Array(items) => {
            let components: Option<Vec<f64>> = items.iter().map(Json::as_f64).collect();
            components.and_then(|c| Value::from_components(&c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_map_to_variants() {
        assert_eq!(from_json(&serde_json::json!(true)), Some(Value::Bool(true)));
        assert_eq!(from_json(&serde_json::json!(5)), Some(Value::Int(5)));
        assert_eq!(from_json(&serde_json::json!(5.0)), Some(Value::Float(5.0)));
        assert_eq!(
            from_json(&serde_json::json!([1, 2.5])),
            Some(Value::Vec2([1.0, 2.5]))
        );
        assert_eq!(from_json(&serde_json::json!([1.0])), None);
        assert_eq!(from_json(&serde_json::json!(null)), None);
        assert_eq!(from_json(&serde_json::json!(u64::MAX)), None);
    }
}
