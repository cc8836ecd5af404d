//! Multi-locale site model for locdoc.
//!
//! This crate turns a raw, locale-keyed site document and a docs directory
//! into an immutable [`SiteModel`]:
//! - [`LocaleRegistry`]: supported locale prefixes and their metadata
//! - [`Scanner`]: markdown files that exist on disk
//! - [`validate`]: typed navigation config, defective entries reported and left out
//! - [`resolve`]: sidebar shorthand expanded and checked against the files
//! - [`SiteAssembler`]: cross-reference checks and model construction
//!
//! [`SiteBuilder`] runs the whole pipeline and [`SiteLoader`] publishes the
//! result for concurrent readers.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use locdoc_site::SiteBuilder;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "title": "Egg",
//!     "locales": {
//!         "/": { "lang": "en-US", "sidebar": { "/guide/": [["./", "Description"], "egg"] } },
//!         "/zh/": { "lang": "zh-CN" }
//!     }
//! });
//! let output = SiteBuilder::new(&raw, "docs").build()?;
//! for error in &output.invalid {
//!     eprintln!("{error}");
//! }
//! for error in &output.unresolved {
//!     eprintln!("{error}");
//! }
//! println!("{}", output.model.to_json()?);
//! # Ok(())
//! # }
//! ```

mod assemble;
mod build;
mod error;
mod loader;
mod locale;
mod model;
mod raw;
mod scanner;
mod sidebar;
mod validate;

pub use assemble::{AssemblyError, SiteAssembler, Violation};
pub use build::{BuildOutput, SiteBuilder};
pub use error::{BuildError, ConfigShapeError, ValidationError, ValidationErrors};
pub use loader::SiteLoader;
pub use locale::{Locale, LocaleError, LocaleLabels, LocaleRegistry, ROOT_PREFIX, UpdatePopup};
pub use model::{
    Footer, FooterLink, FooterLinkGroup, HeadTag, NavItem, SiteExtras, SiteModel, ThemeOptions,
};
pub use scanner::{DiscoveredFiles, Files, ScanError, Scanner};
pub use sidebar::{Resolution, ResolutionError, SidebarEntry, SidebarSection, resolve};
pub use validate::{LocaleNav, NavConfig, RawSidebarEntry, SidebarConfig, Validation, validate};
