//! CLI error types.

use std::fmt::Write;

use folio_config::ConfigError;
use folio_site::AssemblyError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Assembly(#[from] AssemblyError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// The error and its chain of causes, one per line.
    ///
    /// Every variant displays its wrapped error, so the chain starts below it.
    pub(crate) fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self).and_then(|err| err.source());
        while let Some(err) = source {
            let _ = write!(report, "\n  caused by: {err}");
            source = err.source();
        }
        report
    }
}
