//! Site model assembly.
//!
//! The assembler is the single merge point of the pipeline. It re-checks
//! every cross-reference between locales, navigation, sidebars and the file
//! tree, and only returns a [`SiteModel`] when all of them hold. The renderer
//! never has to re-check anything.

use std::collections::{BTreeMap, HashSet};

use crate::error::indented;
use crate::locale::{LocaleError, LocaleRegistry};
use crate::model::{Footer, NavItem, SiteExtras, SiteModel};
use crate::scanner::DiscoveredFiles;
use crate::sidebar::{SidebarEntry, SidebarSection};

/// A site invariant that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Locale set is incomplete (no root locale).
    #[error(transparent)]
    Locale(#[from] LocaleError),
    /// Navigation or sidebars keyed by an unregistered locale.
    #[error("{kind} defined for unknown locale `{locale}`")]
    UnknownLocale {
        /// `navigation` or `sidebar`.
        kind: &'static str,
        /// Offending prefix.
        locale: String,
    },
    /// Nav link outside every registered locale.
    #[error("locale `{locale}`: nav link `{link}` does not start with a registered locale prefix")]
    ForeignNavLink {
        /// Locale prefix.
        locale: String,
        /// Offending link.
        link: String,
    },
    /// Sidebar section not owned by its locale.
    #[error("locale `{locale}`: section `{section}` is not under the locale prefix")]
    ForeignSection {
        /// Locale prefix.
        locale: String,
        /// Offending section.
        section: String,
    },
    /// Page entry naming a file that was not discovered.
    #[error("locale `{locale}`, section `{section}`: page `{path}` does not exist")]
    MissingPage {
        /// Locale prefix.
        locale: String,
        /// Section prefix.
        section: String,
        /// File relative to the source directory.
        path: String,
    },
    /// Same page twice in one section.
    #[error("locale `{locale}`, section `{section}`: page `{path}` is listed more than once")]
    DuplicatePage {
        /// Locale prefix.
        locale: String,
        /// Section prefix.
        section: String,
        /// File relative to the source directory.
        path: String,
    },
}

/// Every invariant violation found while assembling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "site assembly failed with {} violation(s){}",
    .violations.len(),
    indented(.violations)
)]
pub struct AssemblyError {
    /// Violations, in locale then section order.
    pub violations: Vec<Violation>,
}

/// Builds a [`SiteModel`] from resolved parts.
#[derive(Debug, Clone, Copy)]
pub struct SiteAssembler<'a> {
    files: &'a DiscoveredFiles,
}

impl<'a> SiteAssembler<'a> {
    /// Create an assembler checking pages against `files`.
    #[must_use]
    pub fn new(files: &'a DiscoveredFiles) -> Self {
        Self { files }
    }

    /// Check every invariant and build the model.
    ///
    /// # Errors
    ///
    /// Returns all violations at once; no partial model is produced.
    pub fn assemble(
        self,
        registry: LocaleRegistry,
        nav_by_locale: BTreeMap<String, Vec<NavItem>>,
        sidebars_by_locale: BTreeMap<String, Vec<SidebarSection>>,
        footer: Footer,
        extras: SiteExtras,
    ) -> Result<SiteModel, AssemblyError> {
        let mut violations = Vec::new();

        if let Err(err) = registry.root_locale() {
            violations.push(Violation::from(err));
        }

        for (locale, items) in &nav_by_locale {
            if !registry.contains(locale) {
                violations.push(Violation::UnknownLocale {
                    kind: "navigation",
                    locale: locale.clone(),
                });
            }
            for item in items {
                if registry.locale_for_path(&item.link).is_none() {
                    violations.push(Violation::ForeignNavLink {
                        locale: locale.clone(),
                        link: item.link.clone(),
                    });
                }
            }
        }

        for (locale, sections) in &sidebars_by_locale {
            if !registry.contains(locale) {
                violations.push(Violation::UnknownLocale {
                    kind: "sidebar",
                    locale: locale.clone(),
                });
            }
            for section in sections {
                self.check_section(&registry, locale, section, &mut violations);
            }
        }

        if !violations.is_empty() {
            return Err(AssemblyError { violations });
        }

        tracing::debug!(
            locale_count = registry.len(),
            file_count = self.files.len(),
            "Site model assembled"
        );
        Ok(SiteModel::new(
            registry.into_map(),
            nav_by_locale,
            sidebars_by_locale,
            footer,
            extras,
        ))
    }

    fn check_section(
        &self,
        registry: &LocaleRegistry,
        locale: &str,
        section: &SidebarSection,
        violations: &mut Vec<Violation>,
    ) {
        let owner = registry.locale_for_path(&section.prefix).map(|l| l.prefix.as_str());
        if owner != Some(locale) {
            violations.push(Violation::ForeignSection {
                locale: locale.to_owned(),
                section: section.prefix.clone(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &section.entries {
            let SidebarEntry::PageRef { relative_path, .. } = entry else {
                continue;
            };
            let path = section.docs_path(relative_path);
            if !self.files.contains(&path) {
                violations.push(Violation::MissingPage {
                    locale: locale.to_owned(),
                    section: section.prefix.clone(),
                    path,
                });
            } else if !seen.insert(relative_path.as_str()) {
                violations.push(Violation::DuplicatePage {
                    locale: locale.to_owned(),
                    section: section.prefix.clone(),
                    path,
                });
            }
        }
    }
}
