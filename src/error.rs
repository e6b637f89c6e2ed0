use thiserror::Error;

use crate::types::IndexType;

#[derive(Error, Debug)]
pub enum BenchError {
    // Connection config errors
    #[error("validation error: {0}")]
    Validation(String),

    // Case config errors
    #[error("missing required field `{field}` for index {index}")]
    MissingRequiredField { index: IndexType, field: String },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    // Registry errors
    #[error("index type {index} is not supported by milvus")]
    NotSupported { index: IndexType },

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;

impl BenchError {
    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            BenchError::Validation(_)
            | BenchError::MissingRequiredField { .. }
            | BenchError::InvalidField { .. }
            | BenchError::NotSupported { .. }
            | BenchError::Config(_)
            | BenchError::Toml(_) => 2,

            _ => 1,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BenchError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
