//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why controller settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The settings file is not JSON.
    #[error("{} is not valid settings JSON: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser failure with line and column.
        source: serde_json::Error,
    },
    /// The merged document has a field of the wrong type.
    #[error("settings have the wrong shape: {0}")]
    Shape(#[from] serde_json::Error),
    /// A field parsed but holds a value the controller cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Dotted camelCase path, as written in the file.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    /// Shorthand for [`SettingsError::InvalidValue`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    /// Settings field at fault, if the error is about one value.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SettingsError::Parse {
            path: PathBuf::from("/home/pi/.snakebot/settings.json"),
            source,
        };
        assert!(
            err.to_string()
                .starts_with("/home/pi/.snakebot/settings.json is not valid settings JSON")
        );
    }

    #[test]
    fn invalid_value_carries_field_path() {
        let err = SettingsError::invalid("drive.defaultSpeed", "10 is below 50");
        assert_eq!(err.field(), Some("drive.defaultSpeed"));
        assert_eq!(err.to_string(), "invalid drive.defaultSpeed: 10 is below 50");
    }

    #[test]
    fn read_error_keeps_io_source() {
        let err = SettingsError::Read {
            path: PathBuf::from("settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.field().is_none());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "cannot read settings.json: denied");
    }
}
