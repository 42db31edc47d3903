//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("failed to load CA bundle {path}: {message}")]
    CaBundle { path: String, message: String },

    #[error("provider {index}: missing required field '{field}'")]
    DocumentField { index: usize, field: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Provide a configuration file with --config."),
            Self::MissingField { field } => Some(match field.as_str() {
                "registry.organization" => {
                    "Set registry.organization in the config file or export TFC_ORGANIZATION."
                }
                _ => "Add the missing field noted in the error message.",
            }),
            Self::InvalidValue { .. } | Self::Invalid { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::EnvVarNotFound { .. } => {
                Some("Export the registry token, for example: export TFC_TOKEN=your-token-here")
            }
            Self::CaBundle { .. } => Some("Point network.ca_bundle at a readable PEM file."),
            Self::DocumentField { .. } => Some(
                "Each provider entry needs \"provider\", \"namespace\" and a non-empty \"platforms\" list.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::Invalid { .. } => "config.invalid",
            Self::ParseError { .. } => "config.parse_error",
            Self::MissingField { .. } => "config.missing_field",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::EnvVarNotFound { .. } => "config.env_var_not_found",
            Self::CaBundle { .. } => "config.ca_bundle",
            Self::DocumentField { .. } => "config.document_field",
        };
        Some(code)
    }
}
