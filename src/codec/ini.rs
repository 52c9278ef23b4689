use std::collections::BTreeMap;

use tracing::warn;

use super::{Codec, Record, SavedEntry, join_name, section_of};
use crate::{
    descriptor::DEFAULT_CATEGORY,
    error::{Error, Result},
    value::Value,
};

/// `[category]` / `key = value` text.
///
/// Hidden entries are not written, nor are names in the `global` category,
/// which would read back as bare names. Values carry no type annotation: on load
/// the type is read off the text with [`guess_value`], and a guess that does
/// not match an already declared entry is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniCodec;

impl Codec for IniCodec {
    fn encode(&self, entries: &[SavedEntry]) -> Result<String> {
        let mut sections: BTreeMap<&str, Vec<(&str, String)>> = BTreeMap::new();
        for entry in entries {
            let descriptor = &entry.descriptor;
            if descriptor.flags.is_hidden() {
                continue;
            }
            let Some(section) = section_of(descriptor) else {
                continue;
            };
            let text = entry.current.to_string();
            if text.contains(['\n', '\r']) {
                warn!(name = %descriptor.name, "multi-line value cannot be written as ini, skipping");
                continue;
            }
            sections
                .entry(section)
                .or_default()
                .push((descriptor.key(), text));
        }

        let mut out = String::new();
        for (section, keys) in sections {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{section}]\n"));
            for (key, value) in keys {
                out.push_str(&format!("{key} = {value}\n"));
            }
        }
        Ok(out)
    }

    fn decode(&self, text: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut section = DEFAULT_CATEGORY.to_string();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            match parse_line(raw, line) {
                Ok(Line::Blank) => {}
                Ok(Line::Section(name)) => section = name.to_string(),
                Ok(Line::Pair(key, value)) => records.push(Record {
                    name: join_name(&section, key),
                    value: guess_value(value),
                    meta: None,
                }),
                Err(err) => warn!(%err, "skipping ini line"),
            }
        }
        Ok(records)
    }
}

enum Line<'a> {
    Blank,
    Section(&'a str),
    Pair(&'a str, &'a str),
}

fn parse_line(raw: &str, line: usize) -> Result<Line<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with([';', '#']) {
        return Ok(Line::Blank);
    }

    if let Some(rest) = trimmed.strip_prefix('[') {
        let name = rest
            .strip_suffix(']')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Parse {
                line,
                reason: format!("malformed section header `{trimmed}`"),
            })?;
        return Ok(Line::Section(name));
    }

    match trimmed.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(Line::Pair(key.trim(), value.trim())),
        _ => Err(Error::Parse {
            line,
            reason: format!("expected `key = value`, found `{trimmed}`"),
        }),
    }
}

/// Reads a value's type off its text.
///
/// The ladder is tried in order, and the order matters for round trips:
///
/// 1. exactly `true` or `false` is a bool;
/// 2. text that parses entirely as an `i64` is an int;
/// 3. text that parses entirely as an `f64` (and contains a digit, so `inf`
///    and `nan` stay strings) is a float;
/// 4. two to four comma separated floats form a vector;
/// 5. anything else is a string.
pub fn guess_value(text: &str) -> Value {
    if text == "true" {
        return Value::Bool(true);
    }
    if text == "false" {
        return Value::Bool(false);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if let Some(x) = parse_float(text) {
        return Value::Float(x);
    }
    if text.contains(',') {
        let components: Option<Vec<f64>> = text.split(',').map(|c| parse_float(c.trim())).collect();
        if let Some(value) = components.and_then(|c| Value::from_components(&c)) {
            return value;
        }
    }
    Value::String(text.to_string())
}

fn parse_float(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok()
}
