//! Locale registry.
//!
//! Holds the supported locale prefixes (`/`, `/zh/`, ...) and their metadata.
//! Registration order is preserved; lookups by prefix are O(1) and lookups by
//! page path use the longest matching prefix.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::raw::{self, LocaleBlock};

/// Prefix of the root locale.
pub const ROOT_PREFIX: &str = "/";

/// A language variant of the site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    /// URL prefix, starting and ending with `/` (e.g. `/`, `/zh/`).
    pub prefix: String,
    /// BCP 47 language tag (e.g. `en-US`).
    pub lang: String,
    /// Display title.
    pub title: String,
    /// Site description for this language.
    pub description: String,
    /// UI strings for this language.
    pub labels: LocaleLabels,
}

/// Per-locale UI strings consumed by the renderer's theme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleLabels {
    /// Name of the language in the language switcher (e.g. `简体中文`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Caption of the language switcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_text: Option<String>,
    /// Text of the "edit this page" link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_link_text: Option<String>,
    /// Strings of the "new content available" popup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_popup: Option<UpdatePopup>,
}

/// "New content is available" popup strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePopup {
    /// Popup message.
    pub message: String,
    /// Refresh button caption.
    pub button_text: String,
}

/// Locale registration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    /// Prefix already registered.
    #[error("duplicate locale prefix `{0}`")]
    DuplicatePrefix(String),
    /// Prefix does not start and end with `/`.
    #[error("invalid locale prefix `{0}`: must start and end with `/`")]
    InvalidPrefix(String),
    /// No locale with prefix `/`.
    #[error("no root locale: one locale must use the prefix `/`")]
    MissingRootLocale,
}

/// Set of registered locales.
#[derive(Debug, Default)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    index: HashMap<String, usize>,
}

impl LocaleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `locales` block of a raw site document.
    ///
    /// Locale titles and descriptions fall back to the site-level `title` and
    /// `description`. Field types are not checked here; the validator reports
    /// them.
    pub fn from_config(raw: &Value) -> Result<Self, crate::BuildError> {
        let blocks = raw::locale_blocks(raw)?;
        let site_title = raw.get("title").and_then(Value::as_str).unwrap_or_default();
        let site_description = raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut registry = Self::new();
        for block in &blocks {
            registry.register(Locale::from_block(block, site_title, site_description))?;
        }
        Ok(registry)
    }

    /// Register a locale.
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::InvalidPrefix` if the prefix does not start and end
    /// with `/`, or `LocaleError::DuplicatePrefix` if it is already registered.
    pub fn register(&mut self, locale: Locale) -> Result<(), LocaleError> {
        if !is_valid_prefix(&locale.prefix) {
            return Err(LocaleError::InvalidPrefix(locale.prefix));
        }
        if self.index.contains_key(&locale.prefix) {
            return Err(LocaleError::DuplicatePrefix(locale.prefix));
        }
        self.index.insert(locale.prefix.clone(), self.locales.len());
        self.locales.push(locale);
        Ok(())
    }

    /// The locale with prefix `/`.
    pub fn root_locale(&self) -> Result<&Locale, LocaleError> {
        self.get(ROOT_PREFIX).ok_or(LocaleError::MissingRootLocale)
    }

    /// Get locale by exact prefix.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&Locale> {
        self.index.get(prefix).map(|&i| &self.locales[i])
    }

    /// Whether a prefix is registered.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.index.contains_key(prefix)
    }

    /// Locale owning a URL path: the registered prefix with the longest match.
    ///
    /// `/zh/guide/` belongs to `/zh/`, `/guide/` to `/`.
    #[must_use]
    pub fn locale_for_path(&self, path: &str) -> Option<&Locale> {
        self.locales
            .iter()
            .filter(|l| path.starts_with(l.prefix.as_str()))
            .max_by_key(|l| l.prefix.len())
    }

    /// Registered prefixes in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(|l| l.prefix.as_str())
    }

    /// Registered locales in registration order.
    #[must_use]
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Number of registered locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locales.len()
    }

    /// Whether no locale is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Consume the registry into a prefix-keyed map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Locale> {
        self.locales
            .into_iter()
            .map(|l| (l.prefix.clone(), l))
            .collect()
    }
}

impl Locale {
    /// Locale with the given prefix and language tag, other fields empty.
    #[must_use]
    pub fn new(prefix: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lang: lang.into(),
            title: String::new(),
            description: String::new(),
            labels: LocaleLabels::default(),
        }
    }

    fn from_block(block: &LocaleBlock<'_>, site_title: &str, site_description: &str) -> Self {
        let text = |key: &str| raw::str_field(block.body, key).map(str::to_owned);
        let update_popup = raw::field(block.body, "update_popup")
            .and_then(Value::as_object)
            .map(|popup| UpdatePopup {
                message: raw::str_field(popup, "message")
                    .unwrap_or_default()
                    .to_owned(),
                button_text: raw::str_field(popup, "button_text")
                    .unwrap_or_default()
                    .to_owned(),
            });

        Self {
            prefix: block.prefix.clone(),
            lang: text("lang").unwrap_or_default(),
            title: text("title").unwrap_or_else(|| site_title.to_owned()),
            description: text("description").unwrap_or_else(|| site_description.to_owned()),
            labels: LocaleLabels {
                label: text("label"),
                select_text: text("select_text"),
                edit_link_text: text("edit_link_text"),
                update_popup,
            },
        }
    }
}

/// A prefix must start and end with `/`.
pub(crate) fn is_valid_prefix(prefix: &str) -> bool {
    prefix.starts_with('/') && prefix.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::BuildError;

    fn registry(prefixes: &[&str]) -> LocaleRegistry {
        let mut registry = LocaleRegistry::new();
        for prefix in prefixes {
            registry.register(Locale::new(*prefix, "en-US")).unwrap();
        }
        registry
    }

    #[test]
    fn test_root_locale() {
        let registry = registry(&["/zh/", "/"]);
        assert_eq!(registry.root_locale().unwrap().prefix, "/");
    }

    #[test]
    fn test_missing_root_locale() {
        let registry = registry(&["/zh/", "/ja/"]);
        assert_eq!(
            registry.root_locale().unwrap_err(),
            LocaleError::MissingRootLocale
        );
        assert_eq!(
            LocaleRegistry::new().root_locale().unwrap_err(),
            LocaleError::MissingRootLocale
        );
    }

    #[test]
    fn test_duplicate_prefix() {
        let mut registry = registry(&["/", "/zh/"]);
        let err = registry.register(Locale::new("/zh/", "zh-CN")).unwrap_err();
        assert_eq!(err, LocaleError::DuplicatePrefix("/zh/".to_owned()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_prefix() {
        let mut registry = LocaleRegistry::new();
        for prefix in ["zh/", "/zh", "", "zh"] {
            let err = registry.register(Locale::new(prefix, "zh-CN")).unwrap_err();
            assert_eq!(err, LocaleError::InvalidPrefix(prefix.to_owned()));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_locale_for_path_longest_match() {
        let registry = registry(&["/", "/zh/", "/zh/tw/"]);
        assert_eq!(registry.locale_for_path("/guide/").unwrap().prefix, "/");
        assert_eq!(registry.locale_for_path("/zh/guide/").unwrap().prefix, "/zh/");
        assert_eq!(
            registry.locale_for_path("/zh/tw/guide/").unwrap().prefix,
            "/zh/tw/"
        );
        assert!(registry.locale_for_path("guide/").is_none());
    }

    #[test]
    fn test_prefixes_keep_registration_order() {
        let registry = registry(&["/zh/", "/", "/ja/"]);
        assert_eq!(registry.prefixes().collect::<Vec<_>>(), vec!["/zh/", "/", "/ja/"]);
    }

    #[test]
    fn test_from_config_map_form() {
        let raw = json!({
            "title": "Egg",
            "description": "Born to build better enterprise frameworks",
            "locales": {
                "/": { "lang": "en-US", "label": "English", "selectText": "Languages" },
                "/zh/": {
                    "lang": "zh-CN",
                    "description": "为企业级框架和应用而生",
                    "update_popup": { "message": "发现新内容可用.", "buttonText": "刷新" }
                }
            }
        });

        let registry = LocaleRegistry::from_config(&raw).unwrap();
        let root = registry.root_locale().unwrap();
        assert_eq!(root.lang, "en-US");
        assert_eq!(root.title, "Egg");
        assert_eq!(root.description, "Born to build better enterprise frameworks");
        assert_eq!(root.labels.label.as_deref(), Some("English"));
        assert_eq!(root.labels.select_text.as_deref(), Some("Languages"));

        let zh = registry.get("/zh/").unwrap();
        assert_eq!(zh.title, "Egg");
        assert_eq!(zh.description, "为企业级框架和应用而生");
        assert_eq!(
            zh.labels.update_popup,
            Some(UpdatePopup {
                message: "发现新内容可用.".to_owned(),
                button_text: "刷新".to_owned(),
            })
        );
    }

    #[test]
    fn test_from_config_array_form_duplicate_prefix() {
        let raw = json!({
            "locales": [
                { "prefix": "/", "lang": "en-US" },
                { "prefix": "/zh/", "lang": "zh-CN" },
                { "prefix": "/zh/", "lang": "zh-TW" }
            ]
        });

        let err = LocaleRegistry::from_config(&raw).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Locale(LocaleError::DuplicatePrefix(ref p)) if p == "/zh/"
        ));
    }

    #[test]
    fn test_from_config_invalid_prefix() {
        let raw = json!({ "locales": { "/": { "lang": "en-US" }, "zh": { "lang": "zh-CN" } } });
        let err = LocaleRegistry::from_config(&raw).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Locale(LocaleError::InvalidPrefix(ref p)) if p == "zh"
        ));
    }

    #[test]
    fn test_from_config_shape_error() {
        let raw = json!({ "locales": "en" });
        let err = LocaleRegistry::from_config(&raw).unwrap_err();
        assert!(matches!(err, BuildError::Shape(_)));
    }

    #[test]
    fn test_into_map() {
        let map = registry(&["/zh/", "/"]).into_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["/", "/zh/"]);
    }
}
