//! Loading of the raw site configuration document.
//!
//! The site document (locales, navigation, sidebars, footer, theme) is kept
//! untyped here. It is normalized to a [`serde_json::Value`] regardless of the
//! source format so the validator sees one shape.
//!
//! Tables keep the key order they were written in, and a key repeated inside
//! one table is a parse error in every format.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};

use crate::ConfigError;

/// Source format of a site configuration file, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl SiteFormat {
    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse a document in this format.
    pub fn parse(self, content: &str) -> Result<Value, ConfigError> {
        let UniqueKeys(value) = match self {
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        };
        Ok(value)
    }
}

/// A document value whose tables never repeat a key.
///
/// `serde_json::Value` keeps the last of two equal keys, which would hide a
/// locale prefix defined twice.
struct UniqueKeys(Value);

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UniqueKeysVisitor;

        impl<'de> de::Visitor<'de> for UniqueKeysVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a site configuration value")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
                Ok(Value::String(value.to_owned()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                UniqueKeys::deserialize(deserializer).map(|UniqueKeys(value)| value)
            }

            fn visit_seq<S>(self, mut seq: S) -> Result<Value, S::Error>
            where
                S: de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
                while let Some(UniqueKeys(item)) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<M>(self, mut map: M) -> Result<Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut table = Map::new();
                while let Some(key) = map.next_key::<String>()? {
                    if table.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    let UniqueKeys(value) = map.next_value()?;
                    table.insert(key, value);
                }
                Ok(Value::Object(table))
            }
        }

        deserializer.deserialize_any(UniqueKeysVisitor).map(Self)
    }
}

/// Read and parse a site configuration file.
pub(crate) fn load_site_document(path: &Path) -> Result<Value, ConfigError> {
    let format =
        SiteFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.into()))?;
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SiteFormat::from_path(Path::new("site.toml")), Some(SiteFormat::Toml));
        assert_eq!(SiteFormat::from_path(Path::new("site.YML")), Some(SiteFormat::Yaml));
        assert_eq!(SiteFormat::from_path(Path::new("a/site.json")), Some(SiteFormat::Json));
        assert_eq!(SiteFormat::from_path(Path::new("site.js")), None);
        assert_eq!(SiteFormat::from_path(Path::new("site")), None);
    }

    #[test]
    fn test_formats_normalize_to_same_value() {
        let toml = r#"
title = "Egg"

[locales."/"]
lang = "en-US"
"#;
        let yaml = "title: Egg\nlocales:\n  /:\n    lang: en-US\n";
        let json = r#"{"title": "Egg", "locales": {"/": {"lang": "en-US"}}}"#;

        let expected = json!({"title": "Egg", "locales": {"/": {"lang": "en-US"}}});
        assert_eq!(SiteFormat::Toml.parse(toml).unwrap(), expected);
        assert_eq!(SiteFormat::Yaml.parse(yaml).unwrap(), expected);
        assert_eq!(SiteFormat::Json.parse(json).unwrap(), expected);
    }

    #[test]
    fn test_sidebar_tuples_survive_yaml() {
        let yaml = "sidebar:\n  /guide/:\n    - ['./', 'Description']\n    - egg\n";
        let value = SiteFormat::Yaml.parse(yaml).unwrap();
        assert_eq!(
            value["sidebar"]["/guide/"],
            json!([["./", "Description"], "egg"])
        );
    }

    #[test]
    fn test_tables_keep_written_order() {
        let json = r#"{"locales": {"/zh/": {}, "/": {}, "/ja/": {}}}"#;
        let yaml = "locales:\n  /zh/: {}\n  /: {}\n  /ja/: {}\n";
        let toml = "[locales.\"/zh/\"]\n[locales.\"/\"]\n[locales.\"/ja/\"]\n";

        for (format, content) in [
            (SiteFormat::Json, json),
            (SiteFormat::Yaml, yaml),
            (SiteFormat::Toml, toml),
        ] {
            let value = format.parse(content).unwrap();
            let keys: Vec<_> = value["locales"].as_object().unwrap().keys().collect();
            assert_eq!(keys, vec!["/zh/", "/", "/ja/"], "{format:?}");
        }
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let json = r#"{"locales": {"/": {"lang": "en-US"}, "/zh/": {}, "/zh/": {}}}"#;
        let err = SiteFormat::Json.parse(json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("duplicate key `/zh/`"), "{err}");

        let yaml = "locales:\n  /zh/:\n    lang: zh-CN\n  /zh/:\n    lang: zh-TW\n";
        let err = SiteFormat::Yaml.parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));

        let toml = "[locales.\"/zh/\"]\nlang = \"zh-CN\"\n[locales.\"/zh/\"]\nlang = \"zh-TW\"\n";
        let err = SiteFormat::Toml.parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_site_document_unsupported_extension() {
        let err = load_site_document(Path::new("config.js")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_site_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_site_document(&dir.path().join("site.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_site_document_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_site_document(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
