//! CLI error types.

use locdoc_config::ConfigError;
use locdoc_site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("failed to serialize site model: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "{invalid} configuration error(s) and {unresolved} unresolved sidebar entry(ies)"
    )]
    Incomplete { invalid: usize, unresolved: usize },
}
