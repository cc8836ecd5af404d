//! Terminal reporting for locdoc commands.
//!
//! Everything is written to stderr so `locdoc build --stdout` can be piped.

use console::{Style, Term};
use locdoc_site::{BuildOutput, ResolutionError};

/// Progress and problem reporter.
pub(crate) struct Output {
    term: Term,
    done: Style,
    dropped: Style,
    failed: Style,
}

impl Output {
    /// Reporter writing to stderr.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            dropped: Style::new().yellow(),
            failed: Style::new().red(),
        }
    }

    /// Plain progress line.
    pub(crate) fn info(&self, msg: &str) {
        self.write(msg);
    }

    /// Closing line of a command that succeeded.
    pub(crate) fn success(&self, msg: &str) {
        self.write(&self.done.apply_to(msg).to_string());
    }

    /// Error that ends the command.
    pub(crate) fn error(&self, msg: &str) {
        self.write(&self.failed.apply_to(msg).to_string());
    }

    /// List every entry the build left out of the model.
    ///
    /// Configuration errors come first, then unresolved sidebar pages.
    pub(crate) fn dropped_entries(&self, built: &BuildOutput) {
        for error in &built.invalid {
            self.error(&format!("invalid entry: {error}"));
        }
        for error in &built.unresolved {
            self.write(&self.dropped.apply_to(unresolved_line(error)).to_string());
        }
    }

    fn write(&self, line: &str) {
        let _ = self.term.write_line(line);
    }
}

/// One line per sidebar entry that was left out.
pub(crate) fn unresolved_line(error: &ResolutionError) -> String {
    let reason = match error {
        ResolutionError::Dangling { .. } => "missing page",
        ResolutionError::Duplicate { .. } => "duplicate page",
    };
    format!(
        "{reason}: locale {} section {} path {}",
        error.locale(),
        error.section(),
        error.path()
    )
}
