//! The assembled site model.
//!
//! [`SiteModel`] is the only artifact handed to the renderer. It is built once
//! per build by [`SiteAssembler`](crate::SiteAssembler), never mutated, and
//! shared as `Arc<SiteModel>`. A rebuild produces a new model.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::locale::Locale;
use crate::sidebar::SidebarSection;

/// Top navigation bar link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display text.
    pub text: String,
    /// Target path, starting with a registered locale prefix.
    pub link: String,
}

/// Footer link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FooterLink {
    /// Display name.
    pub name: String,
    /// Target URL.
    pub url: String,
}

/// Footer column: either a list of links or a QR code image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FooterLinkGroup {
    /// Column of links.
    Links {
        /// Column heading.
        title: String,
        /// Links, top to bottom.
        items: Vec<FooterLink>,
    },
    /// Column showing a QR code.
    QrCode {
        /// Column heading.
        title: String,
        /// Image path.
        qrcode: String,
    },
}

impl FooterLinkGroup {
    /// Column heading.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Links { title, .. } | Self::QrCode { title, .. } => title,
        }
    }
}

/// Footer groups plus copyright lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footer {
    /// Footer columns, left to right.
    pub groups: Vec<FooterLinkGroup>,
    /// Copyright lines.
    pub copyright: Vec<String>,
}

/// Extra element injected into every page's `<head>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeadTag {
    /// Element name (e.g. `link`).
    pub tag: String,
    /// Attributes.
    pub attrs: BTreeMap<String, String>,
}

/// Theme options that are not locale specific.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOptions {
    /// Logo image path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Repository, either a URL or a GitHub `owner/name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Branch holding the docs sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_branch: Option<String>,
    /// Docs directory inside the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<String>,
    /// Whether pages show an "edit this page" link.
    pub edit_links: bool,
}

/// Site-wide values that are not cross-checked by the assembler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteExtras {
    /// Site title.
    pub title: String,
    /// Site description.
    pub description: String,
    /// `<head>` elements.
    pub head: Vec<HeadTag>,
    /// Theme options.
    pub theme: ThemeOptions,
}

/// Immutable, fully validated site model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteModel {
    title: String,
    description: String,
    locales: BTreeMap<String, Locale>,
    nav_by_locale: BTreeMap<String, Vec<NavItem>>,
    sidebars_by_locale: BTreeMap<String, Vec<SidebarSection>>,
    footer: Vec<FooterLinkGroup>,
    copyright: Vec<String>,
    head: Vec<HeadTag>,
    theme: ThemeOptions,
}

impl SiteModel {
    pub(crate) fn new(
        locales: BTreeMap<String, Locale>,
        nav_by_locale: BTreeMap<String, Vec<NavItem>>,
        sidebars_by_locale: BTreeMap<String, Vec<SidebarSection>>,
        footer: Footer,
        extras: SiteExtras,
    ) -> Self {
        Self {
            title: extras.title,
            description: extras.description,
            locales,
            nav_by_locale,
            sidebars_by_locale,
            footer: footer.groups,
            copyright: footer.copyright,
            head: extras.head,
            theme: extras.theme,
        }
    }

    /// Site title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Site description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Locales keyed by prefix.
    #[must_use]
    pub fn locales(&self) -> &BTreeMap<String, Locale> {
        &self.locales
    }

    /// Navigation bar of a locale.
    #[must_use]
    pub fn nav(&self, prefix: &str) -> &[NavItem] {
        self.nav_by_locale
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sidebar sections of a locale.
    #[must_use]
    pub fn sidebars(&self, prefix: &str) -> &[SidebarSection] {
        self.sidebars_by_locale
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sidebar shown for a page path: the section with the longest matching prefix.
    #[must_use]
    pub fn sidebar_for(&self, path: &str) -> Option<&SidebarSection> {
        self.sidebars_by_locale
            .values()
            .flatten()
            .filter(|section| path.starts_with(section.prefix.as_str()))
            .max_by_key(|section| section.prefix.len())
    }

    /// Footer columns.
    #[must_use]
    pub fn footer(&self) -> &[FooterLinkGroup] {
        &self.footer
    }

    /// Copyright lines.
    #[must_use]
    pub fn copyright(&self) -> &[String] {
        &self.copyright
    }

    /// `<head>` elements.
    #[must_use]
    pub fn head(&self) -> &[HeadTag] {
        &self.head
    }

    /// Theme options.
    #[must_use]
    pub fn theme(&self) -> &ThemeOptions {
        &self.theme
    }

    /// "Edit this page" URL for a file relative to the docs directory.
    ///
    /// `None` unless edit links are enabled and a repository is set. A bare
    /// `owner/name` repository is taken to live on GitHub.
    #[must_use]
    pub fn edit_link(&self, docs_path: &str) -> Option<String> {
        if !self.theme.edit_links {
            return None;
        }
        let repo = self.theme.repo.as_deref()?.trim_end_matches('/');
        let repo_url = if repo.starts_with("http://") || repo.starts_with("https://") {
            repo.to_owned()
        } else {
            format!("https://github.com/{repo}")
        };
        let branch = self.theme.docs_branch.as_deref().unwrap_or("master");
        let docs_dir = self
            .theme
            .docs_dir
            .as_deref()
            .map(|d| d.trim_matches('/'))
            .filter(|d| !d.is_empty());
        let path = docs_path.trim_start_matches('/');

        Some(match docs_dir {
            Some(dir) => format!("{repo_url}/edit/{branch}/{dir}/{path}"),
            None => format!("{repo_url}/edit/{branch}/{path}"),
        })
    }

    /// Serialize as pretty-printed JSON for the renderer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
