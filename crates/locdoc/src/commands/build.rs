//! `locdoc build` command implementation.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::{SiteArgs, ensure_complete, run_pipeline};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,

    /// Output file for the site model (default: .locdoc/site.json).
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the site model to stdout instead of a file.
    #[arg(long)]
    stdout: bool,
}

impl BuildArgs {
    /// Build the site model and write it as JSON.
    ///
    /// The model is written even when entries were left out of it; the
    /// command still fails afterwards so the problem is not missed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(self.output)?;

        let built = run_pipeline(&config, &output)?;
        let json = built.model.to_json()?;

        if self.stdout {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        } else {
            let path = &config.docs_resolved.output;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            output.info(&format!("Output: {}", path.display()));
        }

        ensure_complete(&built)?;
        output.success("Site model built successfully");
        Ok(())
    }
}
