//! Sidebar resolution.
//!
//! Expands validated sidebar shorthand into [`SidebarEntry`] values and checks
//! every page against the discovered files. A missing or repeated page is
//! reported and dropped; the rest of its section still resolves.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;

use crate::scanner::DiscoveredFiles;
use crate::validate::{LocaleNav, NavConfig, RawSidebarEntry};

/// Index files tried for a directory entry, in order.
const INDEX_FILES: &[&str] = &["README.md", "index.md"];

/// Resolved sidebar entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SidebarEntry {
    /// Link to a page.
    PageRef {
        /// Path of the page file relative to the section prefix.
        relative_path: String,
        /// Link text.
        label: String,
    },
    /// Non-clickable heading above a group of pages.
    GroupHeading {
        /// Heading text.
        label: String,
    },
}

/// Ordered sidebar of one section (e.g. `/zh/guide/`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarSection {
    /// Section prefix, starting and ending with `/`.
    pub prefix: String,
    /// Entries, top to bottom.
    pub entries: Vec<SidebarEntry>,
}

impl SidebarSection {
    /// Path of a section-relative file below the source directory.
    ///
    /// `README.md` in section `/zh/guide/` is `zh/guide/README.md`.
    #[must_use]
    pub fn docs_path(&self, relative_path: &str) -> String {
        docs_path(&self.prefix, relative_path)
    }

    /// Page entries only.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            SidebarEntry::PageRef {
                relative_path,
                label,
            } => Some((relative_path.as_str(), label.as_str())),
            SidebarEntry::GroupHeading { .. } => None,
        })
    }
}

/// Sidebar entry that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Referenced page does not exist.
    #[error("locale `{locale}`, section `{section}`: page `{path}` does not exist")]
    Dangling {
        /// Locale prefix.
        locale: String,
        /// Section prefix.
        section: String,
        /// Expected file, relative to the source directory.
        path: String,
    },
    /// Page is listed more than once in the same section.
    #[error("locale `{locale}`, section `{section}`: page `{path}` is listed more than once")]
    Duplicate {
        /// Locale prefix.
        locale: String,
        /// Section prefix.
        section: String,
        /// Repeated file, relative to the source directory.
        path: String,
    },
}

impl ResolutionError {
    /// Locale prefix the entry belongs to.
    #[must_use]
    pub fn locale(&self) -> &str {
        match self {
            Self::Dangling { locale, .. } | Self::Duplicate { locale, .. } => locale,
        }
    }

    /// Section prefix the entry belongs to.
    #[must_use]
    pub fn section(&self) -> &str {
        match self {
            Self::Dangling { section, .. } | Self::Duplicate { section, .. } => section,
        }
    }

    /// Offending file, relative to the source directory.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Dangling { path, .. } | Self::Duplicate { path, .. } => path,
        }
    }
}

/// Result of [`resolve`]: every section that could be built plus the entries that could not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sections keyed by locale prefix.
    pub sidebars: BTreeMap<String, Vec<SidebarSection>>,
    /// Dropped entries, in locale then section order.
    pub errors: Vec<ResolutionError>,
}

/// Resolve every locale's sidebar against the discovered files.
///
/// Pure: the same inputs always give the same result. Locales are resolved in
/// parallel and merged in configuration order.
#[must_use]
pub fn resolve(nav: &NavConfig, files: &DiscoveredFiles) -> Resolution {
    let per_locale: Vec<_> = nav
        .locales
        .par_iter()
        .map(|locale| resolve_locale(locale, files))
        .collect();

    let mut resolution = Resolution::default();
    for (prefix, sections, errors) in per_locale {
        resolution.sidebars.insert(prefix, sections);
        resolution.errors.extend(errors);
    }
    resolution
}

fn resolve_locale(
    locale: &LocaleNav,
    files: &DiscoveredFiles,
) -> (String, Vec<SidebarSection>, Vec<ResolutionError>) {
    let mut errors = Vec::new();
    let sections: Vec<_> = locale
        .sidebar
        .iter()
        .map(|config| {
            let mut section = SectionResolver {
                locale: &locale.prefix,
                section: &config.prefix,
                files,
                seen: HashSet::new(),
                entries: Vec::with_capacity(config.entries.len()),
                errors: &mut errors,
            };
            for entry in &config.entries {
                section.entry(entry);
            }
            SidebarSection {
                prefix: config.prefix.clone(),
                entries: section.entries,
            }
        })
        .collect();

    tracing::debug!(
        locale = %locale.prefix,
        section_count = sections.len(),
        error_count = errors.len(),
        "Locale sidebars resolved"
    );
    (locale.prefix.clone(), sections, errors)
}

struct SectionResolver<'a> {
    locale: &'a str,
    section: &'a str,
    files: &'a DiscoveredFiles,
    seen: HashSet<String>,
    entries: Vec<SidebarEntry>,
    errors: &'a mut Vec<ResolutionError>,
}

impl SectionResolver<'_> {
    fn entry(&mut self, entry: &RawSidebarEntry) {
        match entry {
            RawSidebarEntry::Page(path) => {
                let label = derived_label(self.section, path);
                self.page(path, label);
            }
            RawSidebarEntry::Titled { path, label } => self.page(path, label.clone()),
            RawSidebarEntry::Group { title, children } => {
                self.entries.push(SidebarEntry::GroupHeading {
                    label: title.clone(),
                });
                for child in children {
                    self.entry(child);
                }
            }
        }
    }

    fn page(&mut self, path: &str, label: String) {
        let relative_path = match expand(self.section, path, self.files) {
            Ok(relative_path) => relative_path,
            Err(missing) => {
                tracing::warn!(
                    locale = %self.locale,
                    section = %self.section,
                    path = %missing,
                    "Sidebar page not found"
                );
                self.errors.push(ResolutionError::Dangling {
                    locale: self.locale.to_owned(),
                    section: self.section.to_owned(),
                    path: missing,
                });
                return;
            }
        };
        if !self.seen.insert(relative_path.clone()) {
            self.errors.push(ResolutionError::Duplicate {
                locale: self.locale.to_owned(),
                section: self.section.to_owned(),
                path: docs_path(self.section, &relative_path),
            });
            return;
        }
        self.entries.push(SidebarEntry::PageRef {
            relative_path,
            label,
        });
    }
}

/// Map an entry to the page file it names, relative to the section.
///
/// On failure returns the preferred candidate relative to the source
/// directory, for error reporting.
fn expand(section: &str, path: &str, files: &DiscoveredFiles) -> Result<String, String> {
    let path = strip_current_dir(path);

    let candidates: Vec<String> = if path.is_empty() || path.ends_with('/') {
        INDEX_FILES.iter().map(|index| format!("{path}{index}")).collect()
    } else if has_page_extension(path) {
        vec![path.to_owned()]
    } else {
        std::iter::once(format!("{path}.md"))
            .chain(INDEX_FILES.iter().map(|index| format!("{path}/{index}")))
            .collect()
    };

    candidates
        .iter()
        .find(|candidate| files.contains(&docs_path(section, candidate)))
        .cloned()
        .ok_or_else(|| docs_path(section, &candidates[0]))
}

/// `./egg` -> `egg`, `./` -> ``.
fn strip_current_dir(mut path: &str) -> &str {
    loop {
        if path == "." {
            return "";
        }
        match path.strip_prefix("./") {
            Some(rest) => path = rest,
            None => return path,
        }
    }
}

fn has_page_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && (ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
    })
}

fn docs_path(section: &str, relative_path: &str) -> String {
    format!("{}{relative_path}", section.trim_start_matches('/'))
}

/// Label for an entry without an explicit one.
///
/// Uses the last path segment without extension; a directory entry uses the
/// directory name, and the site root is `Home`.
fn derived_label(section: &str, path: &str) -> String {
    let path = strip_current_dir(path).trim_end_matches('/');
    let name = if path.is_empty() {
        section.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    } else {
        path.rsplit('/').next().unwrap_or(path)
    };
    let stem = if has_page_extension(name) {
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    } else {
        name
    };
    if stem.is_empty() {
        "Home".to_owned()
    } else {
        title_case(stem)
    }
}

/// `quick_start` -> `Quick Start`.
fn title_case(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
