//! Domain error types.

/// Top-level error type for rsdaily.
#[derive(Debug, thiserror::Error)]
pub enum RsError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price source error for {target}: {reason}")]
    PriceSource { target: String, reason: String },

    #[error("storage error at {path}: {reason}")]
    Storage { path: String, reason: String },

    #[error("unreadable history at {path}: {reason}")]
    CorruptHistory { path: String, reason: String },

    #[error("notification error: {reason}")]
    Notification { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RsError {
    pub fn missing(section: &str, key: &str) -> Self {
        RsError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        RsError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            RsError::ConfigParse { .. } | RsError::ConfigMissing { .. } | RsError::ConfigInvalid { .. }
        )
    }
}

impl From<&RsError> for std::process::ExitCode {
    fn from(err: &RsError) -> Self {
        let code: u8 = match err {
            RsError::Io(_) => 1,
            RsError::ConfigParse { .. }
            | RsError::ConfigMissing { .. }
            | RsError::ConfigInvalid { .. } => 2,
            RsError::Storage { .. } | RsError::CorruptHistory { .. } => 3,
            RsError::PriceSource { .. } => 4,
            RsError::Notification { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_name_section_and_key() {
        let err = RsError::missing("ranking", "short_days");
        assert_eq!(err.to_string(), "missing config key [ranking] short_days");

        let err = RsError::invalid("ranking", "long_days", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [ranking] long_days: must be positive"
        );
        assert!(err.is_config());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RsError = io.into();
        assert!(matches!(err, RsError::Io(_)));
        assert!(!err.is_config());
    }
}
