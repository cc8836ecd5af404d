//! Pipeline error types.
//!
//! Per-entry problems ([`ValidationError`],
//! [`ResolutionError`](crate::ResolutionError)) are collected and the entry is
//! left out. Structural problems abort the build and surface as [`BuildError`].

use std::fmt::{self, Write};

use crate::assemble::AssemblyError;
use crate::locale::LocaleError;
use crate::scanner::ScanError;

/// The site document does not have the expected overall structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed site configuration at `{location}`: {message}")]
pub struct ConfigShapeError {
    /// Location in the document (empty for the root).
    pub location: String,
    /// What is wrong.
    pub message: String,
}

impl ConfigShapeError {
    pub(crate) fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// One defect found while validating the site document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {message}")]
pub struct ValidationError {
    /// Location in the document (e.g. `locales./zh/.nav[1].link`).
    pub location: String,
    /// What is wrong.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Every defect found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} validation error(s){}", .errors.len(), indented(.errors))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn push(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(location, message));
    }

    /// Number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over collected errors in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// One `\n  item` line per item, for error lists.
pub(crate) fn indented<T: fmt::Display>(items: &[T]) -> String {
    items.iter().fold(String::new(), |mut out, item| {
        let _ = write!(out, "\n  {item}");
        out
    })
}

/// Fatal error of a site build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Malformed document structure.
    #[error("{0}")]
    Shape(#[from] ConfigShapeError),
    /// Locale registration failed.
    #[error("{0}")]
    Locale(#[from] LocaleError),
    /// Documentation tree could not be scanned.
    #[error("{0}")]
    Filesystem(#[from] ScanError),
    /// Cross-reference invariants do not hold.
    #[error("{0}")]
    Assembly(#[from] AssemblyError),
}
