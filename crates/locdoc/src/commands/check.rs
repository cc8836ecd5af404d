//! `locdoc check` command implementation.

use clap::Args;

use super::{SiteArgs, ensure_complete, run_pipeline};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,
}

impl CheckArgs {
    /// Validate the site without writing anything.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(None)?;

        let built = run_pipeline(&config, &output)?;
        ensure_complete(&built)?;

        let model = &built.model;
        let sections: usize = model
            .locales()
            .keys()
            .map(|prefix| model.sidebars(prefix).len())
            .sum();
        output.success(&format!(
            "Site is valid: {} locale(s), {sections} sidebar section(s)",
            model.locales().len()
        ));
        Ok(())
    }
}
