//! Navigation config validation.
//!
//! Walks the untyped site document once and turns it into a typed
//! [`NavConfig`]. Sidebar shorthand (bare strings, `[path, label]` pairs,
//! `{ title, children }` groups) becomes a [`RawSidebarEntry`] here and is
//! never inspected as raw data again.
//!
//! Every defect is collected with its location; validation never stops at
//! the first one, and each defect is reported exactly once. A defective entry
//! is left out of the [`NavConfig`] while its siblings are kept, so one broken
//! sidebar entry never costs a whole section or locale.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ConfigShapeError, ValidationErrors};
use crate::locale::LocaleRegistry;
use crate::model::{
    Footer, FooterLink, FooterLinkGroup, HeadTag, NavItem, SiteExtras, ThemeOptions,
};
use crate::raw::{self, LocaleBlock};

const TOP_LEVEL_KEYS: &[&str] = &["title", "description", "head", "theme", "locales", "footer"];
const LOCALE_KEYS: &[&str] = &[
    "prefix",
    "lang",
    "title",
    "description",
    "label",
    "select_text",
    "edit_link_text",
    "update_popup",
    "nav",
    "sidebar",
];
const UPDATE_POPUP_KEYS: &[&str] = &["message", "button_text"];
const NAV_ITEM_KEYS: &[&str] = &["text", "link"];
const GROUP_KEYS: &[&str] = &["title", "children"];
const THEME_KEYS: &[&str] = &["logo", "repo", "docs_branch", "docs_dir", "edit_links"];
const FOOTER_KEYS: &[&str] = &["groups", "copyright"];
const FOOTER_GROUP_KEYS: &[&str] = &["title", "links", "qrcode"];
const FOOTER_LINK_KEYS: &[&str] = &["name", "url"];

/// Validated navigation configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavConfig {
    /// Site-wide title, description, head tags and theme options.
    pub extras: SiteExtras,
    /// Per-locale navigation, in registry order.
    pub locales: Vec<LocaleNav>,
    /// Footer shared by all locales.
    pub footer: Footer,
}

/// Navigation of one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleNav {
    /// Locale prefix.
    pub prefix: String,
    /// Navigation bar items.
    pub nav: Vec<NavItem>,
    /// Sidebar sections in key order.
    pub sidebar: Vec<SidebarConfig>,
}

/// Unresolved sidebar section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarConfig {
    /// Section prefix (e.g. `/zh/guide/`).
    pub prefix: String,
    /// Entries, top to bottom.
    pub entries: Vec<RawSidebarEntry>,
}

/// Sidebar entry as written in the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawSidebarEntry {
    /// Bare path (`"egg"`, `"./"`); the label is derived from the file name.
    Page(String),
    /// `[path, label]` pair.
    Titled {
        /// Path relative to the section.
        path: String,
        /// Explicit label.
        label: String,
    },
    /// Heading with pages below it.
    Group {
        /// Heading text.
        title: String,
        /// Pages in the group.
        children: Vec<RawSidebarEntry>,
    },
}

/// Result of [`validate`]: everything that passed plus what did not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// Configuration with every defective entry left out.
    pub config: NavConfig,
    /// Defects, in document order.
    pub errors: ValidationErrors,
}

/// Validate a raw site document against the registered locales.
///
/// # Errors
///
/// Only a document without a usable `locales` block fails outright. Every
/// other defect is collected in [`Validation::errors`].
pub fn validate(raw: &Value, registry: &LocaleRegistry) -> Result<Validation, ConfigShapeError> {
    let blocks = raw::locale_blocks(raw)?;
    let root = raw
        .as_object()
        .ok_or_else(|| ConfigShapeError::new("", "expected a table"))?;

    let mut validator = Validator {
        registry,
        errors: ValidationErrors::default(),
    };

    validator.unknown_keys(root, "", TOP_LEVEL_KEYS);
    let extras = SiteExtras {
        title: validator.opt_string(root, "", "title").unwrap_or_default(),
        description: validator
            .opt_string(root, "", "description")
            .unwrap_or_default(),
        head: validator.head(root),
        theme: validator.theme(root),
    };
    let locales = blocks.iter().map(|block| validator.locale(block)).collect();
    let footer = validator.footer(root);

    let errors = validator.errors;
    tracing::debug!(error_count = errors.len(), "Site configuration validated");
    Ok(Validation {
        config: NavConfig {
            extras,
            locales,
            footer,
        },
        errors,
    })
}

struct Validator<'a> {
    registry: &'a LocaleRegistry,
    errors: ValidationErrors,
}

impl Validator<'_> {
    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(location, message);
    }

    fn unknown_keys(&mut self, map: &Map<String, Value>, loc: &str, known: &[&str]) {
        for key in raw::unknown_keys(map, known) {
            self.errors.push(join(loc, key), format!("unknown key `{key}`"));
        }
    }

    /// Optional string; a value of another type is an error.
    fn opt_string(&mut self, map: &Map<String, Value>, loc: &str, key: &str) -> Option<String> {
        match raw::field(map, key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.error(
                    join(loc, key),
                    format!("expected a string, found {}", raw::type_name(other)),
                );
                None
            }
        }
    }

    /// Required non-empty string.
    fn required_string(
        &mut self,
        map: &Map<String, Value>,
        loc: &str,
        key: &str,
    ) -> Option<String> {
        if raw::field(map, key).is_none() {
            self.error(join(loc, key), format!("missing required `{key}`"));
            return None;
        }
        let value = self.opt_string(map, loc, key)?;
        if value.trim().is_empty() {
            self.error(join(loc, key), format!("`{key}` cannot be empty"));
            return None;
        }
        Some(value)
    }

    fn opt_array<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        loc: &str,
        key: &str,
    ) -> Option<&'v Vec<Value>> {
        match raw::field(map, key)? {
            Value::Array(items) => Some(items),
            other => {
                self.error(
                    join(loc, key),
                    format!("expected an array, found {}", raw::type_name(other)),
                );
                None
            }
        }
    }

    fn opt_table<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        loc: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        match raw::field(map, key)? {
            Value::Object(table) => Some(table),
            other => {
                self.error(
                    join(loc, key),
                    format!("expected a table, found {}", raw::type_name(other)),
                );
                None
            }
        }
    }

    /// Array element that must be a table.
    fn table_item<'v>(&mut self, item: &'v Value, loc: &str) -> Option<&'v Map<String, Value>> {
        if let Value::Object(table) = item {
            Some(table)
        } else {
            self.error(loc, format!("expected a table, found {}", raw::type_name(item)));
            None
        }
    }

    fn locale(&mut self, block: &LocaleBlock<'_>) -> LocaleNav {
        let body = block.body;
        let loc = block.location.as_str();

        self.unknown_keys(body, loc, LOCALE_KEYS);
        self.required_string(body, loc, "lang");
        for key in ["title", "description", "label", "select_text", "edit_link_text"] {
            self.opt_string(body, loc, key);
        }
        if let Some(popup) = self.opt_table(body, loc, "update_popup") {
            let popup_loc = join(loc, "update_popup");
            self.unknown_keys(popup, &popup_loc, UPDATE_POPUP_KEYS);
            self.required_string(popup, &popup_loc, "message");
            self.required_string(popup, &popup_loc, "button_text");
        }

        LocaleNav {
            prefix: block.prefix.clone(),
            nav: self.nav(body, loc),
            sidebar: self.sidebar(body, loc, &block.prefix),
        }
    }

    fn nav(&mut self, body: &Map<String, Value>, loc: &str) -> Vec<NavItem> {
        let Some(items) = self.opt_array(body, loc, "nav") else {
            return Vec::new();
        };
        let nav_loc = join(loc, "nav");

        let mut nav = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_loc = index(&nav_loc, i);
            let Some(table) = self.table_item(item, &item_loc) else {
                continue;
            };
            self.unknown_keys(table, &item_loc, NAV_ITEM_KEYS);
            let text = self.required_string(table, &item_loc, "text");
            let link = self.required_string(table, &item_loc, "link");
            let link = link.filter(|link| {
                let known = self.registry.locale_for_path(link).is_some();
                if !known {
                    self.error(
                        join(&item_loc, "link"),
                        format!("link `{link}` does not start with a registered locale prefix"),
                    );
                }
                known
            });
            if let (Some(text), Some(link)) = (text, link) {
                nav.push(NavItem { text, link });
            }
        }
        nav
    }

    fn sidebar(
        &mut self,
        body: &Map<String, Value>,
        loc: &str,
        prefix: &str,
    ) -> Vec<SidebarConfig> {
        let Some(table) = self.opt_table(body, loc, "sidebar") else {
            return Vec::new();
        };
        let sidebar_loc = join(loc, "sidebar");

        let mut sections = Vec::with_capacity(table.len());
        for (key, value) in table {
            let section_loc = join(&sidebar_loc, key);
            let owner = self.registry.locale_for_path(key).map(|l| l.prefix.as_str());
            if !key.ends_with('/') || owner != Some(prefix) {
                self.error(
                    &section_loc,
                    format!("sidebar key `{key}` must be a directory path under locale `{prefix}`"),
                );
                continue;
            }
            let Value::Array(items) = value else {
                self.error(
                    &section_loc,
                    format!("expected an array, found {}", raw::type_name(value)),
                );
                continue;
            };
            let entries = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    self.sidebar_entry(key, &index(&section_loc, i), item, false)
                })
                .collect();
            sections.push(SidebarConfig {
                prefix: key.clone(),
                entries,
            });
        }
        sections
    }

    fn sidebar_entry(
        &mut self,
        section: &str,
        loc: &str,
        item: &Value,
        in_group: bool,
    ) -> Option<RawSidebarEntry> {
        match item {
            Value::String(path) => self.entry_path(section, loc, path).map(RawSidebarEntry::Page),
            Value::Array(pair) => {
                let [path, label] = pair.as_slice() else {
                    self.error(
                        loc,
                        format!("expected a [path, label] pair, found {} element(s)", pair.len()),
                    );
                    return None;
                };
                let path = match path {
                    Value::String(p) => self.entry_path(section, &index(loc, 0), p),
                    other => {
                        self.error(
                            index(loc, 0),
                            format!("expected a string, found {}", raw::type_name(other)),
                        );
                        None
                    }
                };
                let label = match label {
                    Value::String(l) if !l.trim().is_empty() => Some(l.clone()),
                    Value::String(_) => {
                        self.error(index(loc, 1), "label cannot be empty");
                        None
                    }
                    other => {
                        self.error(
                            index(loc, 1),
                            format!("expected a string, found {}", raw::type_name(other)),
                        );
                        None
                    }
                };
                Some(RawSidebarEntry::Titled {
                    path: path?,
                    label: label?,
                })
            }
            Value::Object(group) => {
                if in_group {
                    self.error(loc, "sidebar groups cannot be nested");
                    return None;
                }
                self.unknown_keys(group, loc, GROUP_KEYS);
                let title = self.required_string(group, loc, "title");
                let children = match raw::field(group, "children") {
                    Some(Value::Array(items)) => {
                        let children_loc = join(loc, "children");
                        Some(
                            items
                                .iter()
                                .enumerate()
                                .filter_map(|(i, child)| {
                                    let child_loc = index(&children_loc, i);
                                    self.sidebar_entry(section, &child_loc, child, true)
                                })
                                .collect(),
                        )
                    }
                    Some(other) => {
                        self.error(
                            join(loc, "children"),
                            format!("expected an array, found {}", raw::type_name(other)),
                        );
                        None
                    }
                    None => {
                        self.error(join(loc, "children"), "missing required `children`");
                        None
                    }
                };
                Some(RawSidebarEntry::Group {
                    title: title?,
                    children: children?,
                })
            }
            other => {
                self.error(
                    loc,
                    format!(
                        "expected a path, a [path, label] pair or a group, found {}",
                        raw::type_name(other)
                    ),
                );
                None
            }
        }
    }

    /// Normalize an entry path to be relative to its section.
    ///
    /// Absolute paths must lie inside the section; `..` segments are rejected.
    fn entry_path(&mut self, section: &str, loc: &str, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            self.error(loc, "sidebar entry cannot be empty");
            return None;
        }
        let relative = if path.starts_with('/') {
            let Some(rest) = path.strip_prefix(section) else {
                self.error(loc, format!("entry `{path}` is outside section `{section}`"));
                return None;
            };
            if rest.is_empty() { "./" } else { rest }
        } else {
            path
        };
        if relative.split('/').any(|segment| segment == "..") {
            self.error(loc, format!("entry `{path}` must not leave section `{section}`"));
            return None;
        }
        Some(relative.to_owned())
    }

    fn head(&mut self, root: &Map<String, Value>) -> Vec<HeadTag> {
        let Some(items) = self.opt_array(root, "", "head") else {
            return Vec::new();
        };

        let mut head = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let loc = index("head", i);
            let Some([tag, attrs]) = item.as_array().map(Vec::as_slice) else {
                self.error(&loc, "expected a [tag, attributes] pair");
                continue;
            };
            let tag = match tag.as_str() {
                Some(t) if !t.trim().is_empty() => Some(t.to_owned()),
                _ => {
                    self.error(index(&loc, 0), "tag must be a non-empty string");
                    None
                }
            };
            let attrs = match attrs {
                Value::Object(map) => {
                    let mut out = BTreeMap::new();
                    let mut valid = true;
                    for (name, value) in map {
                        if let Some(v) = value.as_str() {
                            out.insert(name.clone(), v.to_owned());
                        } else {
                            valid = false;
                            self.error(
                                join(&index(&loc, 1), name),
                                format!("expected a string, found {}", raw::type_name(value)),
                            );
                        }
                    }
                    valid.then_some(out)
                }
                other => {
                    self.error(
                        index(&loc, 1),
                        format!("expected a table, found {}", raw::type_name(other)),
                    );
                    None
                }
            };
            if let (Some(tag), Some(attrs)) = (tag, attrs) {
                head.push(HeadTag { tag, attrs });
            }
        }
        head
    }

    fn theme(&mut self, root: &Map<String, Value>) -> ThemeOptions {
        let Some(theme) = self.opt_table(root, "", "theme") else {
            return ThemeOptions::default();
        };
        self.unknown_keys(theme, "theme", THEME_KEYS);

        let edit_links = match raw::field(theme, "edit_links") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                self.error(
                    "theme.edit_links",
                    format!("expected a boolean, found {}", raw::type_name(other)),
                );
                false
            }
        };
        ThemeOptions {
            logo: self.opt_string(theme, "theme", "logo"),
            repo: self.opt_string(theme, "theme", "repo"),
            docs_branch: self.opt_string(theme, "theme", "docs_branch"),
            docs_dir: self.opt_string(theme, "theme", "docs_dir"),
            edit_links,
        }
    }

    fn footer(&mut self, root: &Map<String, Value>) -> Footer {
        let Some(footer) = self.opt_table(root, "", "footer") else {
            return Footer::default();
        };
        self.unknown_keys(footer, "footer", FOOTER_KEYS);

        let mut groups = Vec::new();
        if let Some(items) = self.opt_array(footer, "footer", "groups") {
            for (i, item) in items.iter().enumerate() {
                let loc = index("footer.groups", i);
                if let Some(group) = self.footer_group(item, &loc) {
                    groups.push(group);
                }
            }
        }

        let mut copyright = Vec::new();
        if let Some(lines) = self.opt_array(footer, "footer", "copyright") {
            for (i, line) in lines.iter().enumerate() {
                let loc = index("footer.copyright", i);
                match line {
                    Value::String(text) => copyright.push(text.clone()),
                    Value::Object(map) => {
                        self.unknown_keys(map, &loc, &["text"]);
                        if let Some(text) = self.required_string(map, &loc, "text") {
                            copyright.push(text);
                        }
                    }
                    other => self.error(
                        loc,
                        format!("expected a string or a table, found {}", raw::type_name(other)),
                    ),
                }
            }
        }

        Footer { groups, copyright }
    }

    fn footer_group(&mut self, item: &Value, loc: &str) -> Option<FooterLinkGroup> {
        let group = self.table_item(item, loc)?;
        self.unknown_keys(group, loc, FOOTER_GROUP_KEYS);
        let title = self.required_string(group, loc, "title");

        match (raw::field(group, "links"), raw::field(group, "qrcode")) {
            (Some(_), Some(_)) => {
                self.error(loc, "a footer group has either `links` or `qrcode`, not both");
                None
            }
            (None, None) => {
                self.error(loc, "a footer group needs `links` or `qrcode`");
                None
            }
            (None, Some(_)) => {
                let qrcode = self.required_string(group, loc, "qrcode");
                Some(FooterLinkGroup::QrCode {
                    title: title?,
                    qrcode: qrcode?,
                })
            }
            (Some(_), None) => {
                let links = self.opt_array(group, loc, "links")?;
                let links_loc = join(loc, "links");
                let mut items = Vec::with_capacity(links.len());
                let mut valid = true;
                for (i, link) in links.iter().enumerate() {
                    match self.footer_link(link, &index(&links_loc, i)) {
                        Some(link) => items.push(link),
                        None => valid = false,
                    }
                }
                valid.then_some(())?;
                Some(FooterLinkGroup::Links {
                    title: title?,
                    items,
                })
            }
        }
    }

    fn footer_link(&mut self, item: &Value, loc: &str) -> Option<FooterLink> {
        let link = self.table_item(item, loc)?;
        self.unknown_keys(link, loc, FOOTER_LINK_KEYS);
        let name = self.required_string(link, loc, "name");
        let url = self.required_string(link, loc, "url").filter(|url| {
            let ok = ["http://", "https://", "/"]
                .iter()
                .any(|scheme| url.starts_with(scheme));
            if !ok {
                self.error(
                    join(loc, "url"),
                    format!("url `{url}` must be absolute (http://, https:// or /)"),
                );
            }
            ok
        });
        Some(FooterLink {
            name: name?,
            url: url?,
        })
    }
}

/// `a.b` location, or `b` at the root.
fn join(loc: &str, key: &str) -> String {
    if loc.is_empty() {
        key.to_owned()
    } else {
        format!("{loc}.{key}")
    }
}

fn index(loc: &str, i: usize) -> String {
    format!("{loc}[{i}]")
}
