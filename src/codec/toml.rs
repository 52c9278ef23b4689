use ::toml::{Table, Value as TomlValue};
use tracing::warn;

use super::{Codec, Record, SavedEntry, join_name, section_of};
use crate::{descriptor::DEFAULT_CATEGORY, error::Result, value::Value};

/// One TOML table per category, values in native TOML types:
///
/// ```toml
/// [render]
/// fov = 90.0
/// clear_color = [0.1, 0.1, 0.1, 1.0]
/// ```
///
/// Like the ini format it is meant for hand editing, so hidden entries and
/// `global.` names are not written and metadata is not stored; unknown names
/// load as placeholders. Types are taken from the TOML value kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    fn encode(&self, entries: &[SavedEntry]) -> Result<String> {
        let mut root = Table::new();
        for entry in entries {
            let descriptor = &entry.descriptor;
            if descriptor.flags.is_hidden() {
                continue;
            }
            let Some(section) = section_of(descriptor) else {
                continue;
            };
            let section = root
                .entry(section)
                .or_insert_with(|| TomlValue::Table(Table::new()));
            if let TomlValue::Table(section) = section {
                section.insert(descriptor.key().to_string(), to_toml(&entry.current));
            }
        }
        Ok(::toml::to_string_pretty(&root)?)
    }

    fn decode(&self, text: &str) -> Result<Vec<Record>> {
        let root: Table = ::toml::from_str(text)?;
        let mut records = Vec::new();

        for (section, item) in &root {
            match item {
                TomlValue::Table(keys) => {
                    for (key, value) in keys {
                        push_record(&mut records, join_name(section, key), value);
                    }
                }
                value => push_record(&mut records, join_name(DEFAULT_CATEGORY, section), value),
            }
        }
        Ok(records)
    }
}

fn push_record(records: &mut Vec<Record>, name: String, value: &TomlValue) {
    match from_toml(value) {
        Some(value) => records.push(Record {
            name,
            value,
            meta: None,
        }),
        None => warn!(name = %name, kind = value.type_str(), "unsupported TOML value, skipping"),
    }
}

fn to_toml(value: &Value) -> TomlValue {
    match value {
        Value::Bool(b) => TomlValue::Boolean(*b),
        Value::Int(i) => TomlValue::Integer(*i),
        Value::Float(x) => TomlValue::Float(*x),
        Value::String(s) => TomlValue::String(s.clone()),
        Value::Vec2(_) | Value::Vec3(_) | Value::Vec4(_) => TomlValue::Array(
            value
                .components()
                .unwrap_or_default()
                .iter()
                .map(|c| TomlValue::Float(*c))
                .collect(),
        ),
    }
}

fn from_toml(value: &TomlValue) -> Option<Value> {
    match value {
        TomlValue::Boolean(b) => Some(Value::Bool(*b)),
        TomlValue::Integer(i) => Some(Value::Int(*i)),
        TomlValue::Float(x) => Some(Value::Float(*x)),
        TomlValue::String(s) => Some(Value::String(s.clone())),
        TomlValue::Array(items) => {
            let components: Option<Vec<f64>> = items
                .iter()
                .map(|item| match item {
                    TomlValue::Float(x) => Some(*x),
                    TomlValue::Integer(i) => Some(*i as f64),
                    _ => None,
                })
                .collect();
            components.and_then(|c| Value::from_components(&c))
        }
        _ => None,
    }
}
