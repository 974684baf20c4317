//! Error types.
//!
//! Scheduling, rendering and visibility tracking are total; only building a
//! [`GridConfig`](crate::config::GridConfig) can fail.

/// Errors from parsing or validating a grid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON or an unknown/mistyped field.
    Json(String),
    /// A field parsed but holds an unusable value.
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "config parse error: {msg}"),
            Self::InvalidField { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
