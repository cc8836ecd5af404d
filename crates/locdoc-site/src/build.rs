//! Build pipeline.
//!
//! Runs the stages in order: locale registry, then validation and one
//! filesystem scan side by side, then sidebar resolution and assembly.
//! Structural errors stop the build. Defective configuration entries and
//! missing or repeated sidebar pages are left out of the model and returned
//! next to it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::assemble::SiteAssembler;
use crate::error::{BuildError, ValidationErrors};
use crate::locale::LocaleRegistry;
use crate::model::SiteModel;
use crate::scanner::Scanner;
use crate::sidebar::{self, ResolutionError};
use crate::validate;

/// Convert Duration to milliseconds as f64.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Successful build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Assembled site.
    pub model: Arc<SiteModel>,
    /// Configuration entries left out of the model.
    pub invalid: ValidationErrors,
    /// Sidebar entries left out of the model.
    pub unresolved: Vec<ResolutionError>,
}

impl BuildOutput {
    /// Whether every configured entry made it into the model.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.invalid.is_empty() && self.unresolved.is_empty()
    }
}

/// Builds a [`SiteModel`] from a raw site document and a docs directory.
#[derive(Debug, Clone)]
pub struct SiteBuilder<'a> {
    raw: &'a Value,
    source_dir: PathBuf,
}

impl<'a> SiteBuilder<'a> {
    /// Create a builder for the given document and source directory.
    #[must_use]
    pub fn new(raw: &'a Value, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw,
            source_dir: source_dir.into(),
        }
    }

    /// Source directory scanned for pages.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first fatal stage error: malformed document, bad locale
    /// set, unreadable docs directory or a broken invariant at assembly.
    pub fn build(&self) -> Result<BuildOutput, BuildError> {
        let start = Instant::now();

        let registry = LocaleRegistry::from_config(self.raw)?;
        registry.root_locale()?;

        let scanner = Scanner::new(&self.source_dir);
        let (validated, scanned) = rayon::join(
            || validate::validate(self.raw, &registry),
            || scanner.scan(),
        );
        let validation = validated?;
        let files = scanned?;
        let nav = validation.config;

        let resolution = sidebar::resolve(&nav, &files);
        let nav_by_locale: BTreeMap<_, _> = nav
            .locales
            .into_iter()
            .map(|locale| (locale.prefix, locale.nav))
            .collect();
        let locale_count = registry.len();

        let model = SiteAssembler::new(&files).assemble(
            registry,
            nav_by_locale,
            resolution.sidebars,
            nav.footer,
            nav.extras,
        )?;

        tracing::info!(
            source_dir = %self.source_dir.display(),
            locale_count,
            file_count = files.len(),
            invalid_count = validation.errors.len(),
            unresolved_count = resolution.errors.len(),
            elapsed_ms = elapsed_ms(start),
            "Site built"
        );

        Ok(BuildOutput {
            model: Arc::new(model),
            invalid: validation.errors,
            unresolved: resolution.errors,
        })
    }
}
