//! Access helpers for the untyped site document.
//!
//! Keys are written in `snake_case`; the `camelCase` spelling used by
//! JavaScript site configs is accepted as an alias for every key.

use serde_json::{Map, Value};

use crate::error::ConfigShapeError;

/// One entry of the `locales` block.
#[derive(Debug)]
pub(crate) struct LocaleBlock<'a> {
    /// Locale prefix (map key or `prefix` field).
    pub prefix: String,
    /// Location of the block for error messages (e.g. `locales./zh/`).
    pub location: String,
    /// Block contents.
    pub body: &'a Map<String, Value>,
}

/// Split the `locales` block into per-locale blocks.
///
/// Accepts either a table keyed by prefix or an array of tables carrying a
/// `prefix` field. Blocks come out in the order they were written. The array
/// form keeps duplicates so the registry can reject them.
pub(crate) fn locale_blocks(raw: &Value) -> Result<Vec<LocaleBlock<'_>>, ConfigShapeError> {
    let root = raw.as_object().ok_or_else(|| {
        ConfigShapeError::new("", format!("expected a table, found {}", type_name(raw)))
    })?;
    let locales = root
        .get("locales")
        .ok_or_else(|| ConfigShapeError::new("locales", "missing required `locales` block"))?;

    match locales {
        Value::Object(map) => map
            .iter()
            .map(|(prefix, body)| {
                let location = format!("locales.{prefix}");
                let body = body
                    .as_object()
                    .ok_or_else(|| expected_table(&location, body))?;
                Ok(LocaleBlock {
                    prefix: prefix.clone(),
                    location,
                    body,
                })
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let location = format!("locales[{i}]");
                let body = body
                    .as_object()
                    .ok_or_else(|| expected_table(&location, body))?;
                let prefix = str_field(body, "prefix").ok_or_else(|| {
                    ConfigShapeError::new(format!("{location}.prefix"), "missing string `prefix`")
                })?;
                Ok(LocaleBlock {
                    prefix: prefix.to_owned(),
                    location,
                    body,
                })
            })
            .collect(),
        other => Err(ConfigShapeError::new(
            "locales",
            format!("expected a table or an array, found {}", type_name(other)),
        )),
    }
}

fn expected_table(location: &str, value: &Value) -> ConfigShapeError {
    ConfigShapeError::new(
        location,
        format!("expected a table, found {}", type_name(value)),
    )
}

/// Look up a key by its `snake_case` name or its `camelCase` alias.
pub(crate) fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| map.get(&camel_case(key)))
}

/// Look up a string value, ignoring values of other types.
pub(crate) fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    field(map, key).and_then(Value::as_str)
}

/// Keys of `map` that match none of `known` (in either spelling).
pub(crate) fn unknown_keys<'a>(
    map: &'a Map<String, Value>,
    known: &'a [&'a str],
) -> impl Iterator<Item = &'a str> {
    map.keys()
        .map(String::as_str)
        .filter(|key| !known.iter().any(|k| k == key || camel_case(k) == *key))
}

/// `edit_link_text` -> `editLinkText`.
pub(crate) fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// JSON type name for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
