//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;

use std::path::PathBuf;

use clap::Args;
use locdoc_config::{CliSettings, Config};
use locdoc_site::{BuildOutput, SiteBuilder};

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

use crate::error::CliError;
use crate::output::Output;

/// Arguments shared by every command that runs the site pipeline.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Site configuration document, TOML, YAML or JSON (overrides config).
    #[arg(long, env = "LOCDOC_SITE_CONFIG")]
    site_config: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover locdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SiteArgs {
    /// Load the configuration with these arguments applied.
    fn load_config(&self, output: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            site_config: self.site_config.clone(),
            output,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Run the pipeline.
///
/// Configuration errors and unresolved sidebar entries are listed but do not
/// prevent the model from being built.
fn run_pipeline(config: &Config, output: &Output) -> Result<BuildOutput, CliError> {
    let raw = config.site_document()?;
    let source_dir = &config.docs_resolved.source_dir;
    output.info(&format!("Source: {}", source_dir.display()));

    let built = SiteBuilder::new(&raw, source_dir).build()?;
    output.dropped_entries(&built);
    Ok(built)
}

/// Fail when entries were left out of the model.
fn ensure_complete(built: &BuildOutput) -> Result<(), CliError> {
    if built.is_complete() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            invalid: built.invalid.len(),
            unresolved: built.unresolved.len(),
        })
    }
}
