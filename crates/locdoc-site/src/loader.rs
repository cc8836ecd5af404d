//! Publish-on-completion site loading.
//!
//! [`SiteLoader`] keeps the last successfully built [`SiteModel`] and hands
//! out cheap `Arc` snapshots of it. A rebuild runs to completion before its
//! model is swapped in, so readers never observe a half-built site. A failed
//! rebuild leaves the published model untouched.
//!
//! # Thread Safety
//!
//! - `get()` only clones an `Arc` under a read lock
//! - `reload_if_needed()` uses double-checked locking so concurrent callers
//!   trigger a single rebuild
//! - `invalidate()` is lock-free (atomic flag)

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use serde_json::Value;

use crate::build::{SiteBuilder, elapsed_ms};
use crate::error::BuildError;
use crate::model::SiteModel;

/// Builds and publishes site models for one docs directory.
pub struct SiteLoader {
    source_dir: PathBuf,
    /// Serializes rebuilds.
    reload_lock: Mutex<()>,
    /// Last published model.
    current: RwLock<Option<Arc<SiteModel>>>,
    /// Whether the published model is up to date.
    valid: AtomicBool,
}

impl SiteLoader {
    /// Create a loader for `source_dir`. Nothing is built until the first reload.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            reload_lock: Mutex::new(()),
            current: RwLock::new(None),
            valid: AtomicBool::new(false),
        }
    }

    /// Currently published model, if any build has succeeded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<SiteModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild from `raw` if the published model is stale.
    ///
    /// When the model is up to date `raw` is not looked at.
    ///
    /// # Errors
    ///
    /// Returns the build error; the previously published model stays in place
    /// and the next call retries.
    pub fn reload_if_needed(&self, raw: &Value) -> Result<Arc<SiteModel>, BuildError> {
        let start = Instant::now();

        if let Some(model) = self.fresh() {
            return Ok(model);
        }

        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(model) = self.fresh() {
            return Ok(model);
        }

        let output = match SiteBuilder::new(raw, &self.source_dir).build() {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    kept_previous = self.get().is_some(),
                    "Site rebuild failed"
                );
                return Err(err);
            }
        };

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&output.model));
        self.valid.store(true, Ordering::Release);

        tracing::info!(
            invalid_count = output.invalid.len(),
            unresolved_count = output.unresolved.len(),
            elapsed_ms = elapsed_ms(start),
            "Site reloaded"
        );
        Ok(output.model)
    }

    /// Mark the published model as stale.
    ///
    /// Readers keep their snapshots; the next `reload_if_needed()` rebuilds.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    /// Docs directory the loader builds from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Published model if it is still valid.
    fn fresh(&self) -> Option<Arc<SiteModel>> {
        if self.valid.load(Ordering::Acquire) {
            self.get()
        } else {
            None
        }
    }
}
