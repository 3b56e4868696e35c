//! Error types
//!
//! The estimator has exactly one failure mode, kept in its own type so the
//! pure core never depends on storage or I/O errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by the estimation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// The request cannot be evaluated (currently: non-positive quantity).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient result alias for the front-end modules.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised around the estimator: catalog, parsing, storage and files.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Raised when a liquid name matches nothing in the catalog.
    #[error("unknown liquid: {name}{}", format_suggestions(.suggestions))]
    UnknownLiquid {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a custom liquid profile fails validation.
    #[error("invalid liquid '{name}': {reason}")]
    InvalidLiquid { name: String, reason: String },

    /// Raised when user input cannot be parsed.
    #[error("could not parse {kind} from '{input}'")]
    Parse { kind: &'static str, input: String },

    /// Raised when a reference dataset file is unusable.
    #[error("dataset {path}: {message}")]
    Dataset { path: PathBuf, message: String },

    /// Raised when a configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn parse(kind: &'static str, input: &str) -> Self {
        Error::Parse {
            kind,
            input: input.to_string(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_liquid_lists_suggestions() {
        let err = Error::UnknownLiquid {
            name: "wat".to_string(),
            suggestions: vec!["Water".to_string()],
        };
        assert_eq!(err.to_string(), "unknown liquid: wat (did you mean Water?)");
    }

    #[test]
    fn unknown_liquid_without_suggestions() {
        let err = Error::UnknownLiquid {
            name: "lava".to_string(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "unknown liquid: lava");
    }

    #[test]
    fn estimate_error_is_transparent() {
        let err: Error =
            EstimateError::InvalidInput("quantity must be greater than zero".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid input: quantity must be greater than zero"
        );
    }
}
