//! CLI error handling

use std::fmt;

use provmirror_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(provmirror_errors::ConfigError),
    /// Operations error
    Ops(provmirror_errors::Error),
    /// One or more entries of a batch failed; details were already reported
    Partial(String),
    /// The user declined a confirmation prompt
    Aborted,
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Response body the remote sent with the failure
    pub fn remote_body(&self) -> Option<&str> {
        match self {
            CliError::Ops(e) => e.remote_body(),
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(stage) = e.stage() {
                    write!(f, "\n  Stage: {stage}")?;
                }
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Partial(msg) => write!(f, "{msg}"),
            CliError::Aborted => write!(f, "Aborted"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<provmirror_errors::ConfigError> for CliError {
    fn from(e: provmirror_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<provmirror_errors::Error> for CliError {
    fn from(e: provmirror_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
