//! CLI error types.

use std::fmt;

use localedata::LocaleDataError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Missing or invalid settings.
    Config(String),

    /// Locale data resolution failed.
    LocaleData(LocaleDataError),

    /// Failed to create the Tokio runtime.
    Runtime(String),

    /// Failed to render output.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::LocaleData(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LocaleData(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LocaleDataError> for CliError {
    fn from(e: LocaleDataError) -> Self {
        CliError::LocaleData(e)
    }
}
