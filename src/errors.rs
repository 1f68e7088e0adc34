use thiserror::Error;

/// Main error type for presetenv
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Invalid version for {environment}: {value}")]
    InvalidVersion {
        environment: String,
        value: String,
    },

    #[error("Unknown target environment: {environment}")]
    UnknownEnvironment { environment: String },

    #[error("Unknown Electron version: {version}")]
    UnknownEmbeddingVersion { version: String },

    #[error("Invalid browser query `{query}`: {message}")]
    InvalidQuery {
        query: String,
        message: String,
    },

    #[error("Unable to determine the current {runtime} version")]
    RuntimeUnavailable {
        runtime: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid plugin(s) specified: {names:?}")]
    UnknownPlugin { names: Vec<String> },

    #[error("Plugin(s) both included and excluded: {names:?}")]
    DuplicateInclusion { names: Vec<String> },

    #[error("Invalid option `{option}`: {message}")]
    InvalidOption {
        option: String,
        message: String,
    },

    #[error("Bundled data error in {dataset}: {message}")]
    DataError {
        dataset: String,
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PresetError>;

impl PresetError {
    pub fn invalid_version(environment: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidVersion {
            environment: environment.into(),
            value: value.to_string(),
        }
    }

    pub fn unknown_environment(environment: impl Into<String>) -> Self {
        Self::UnknownEnvironment {
            environment: environment.into(),
        }
    }

    pub fn unknown_embedding_version(version: impl ToString) -> Self {
        Self::UnknownEmbeddingVersion {
            version: version.to_string(),
        }
    }

    pub fn invalid_query(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.into(),
            message: message.into(),
        }
    }

    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }

    pub fn data_error(dataset: impl Into<String>, message: impl ToString) -> Self {
        Self::DataError {
            dataset: dataset.into(),
            message: message.to_string(),
        }
    }

    /// Get error category for reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidVersion { .. } |
            Self::UnknownEnvironment { .. } |
            Self::UnknownEmbeddingVersion { .. } => ErrorCategory::Input,

            Self::InvalidQuery { .. } => ErrorCategory::Query,

            Self::RuntimeUnavailable { .. } => ErrorCategory::Runtime,

            Self::UnknownPlugin { .. } |
            Self::DuplicateInclusion { .. } |
            Self::InvalidOption { .. } => ErrorCategory::Configuration,

            Self::DataError { .. } => ErrorCategory::Data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorCategory {
    Input,
    Query,
    Runtime,
    Configuration,
    Data,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PresetError::unknown_environment("netscape");
        assert!(matches!(err, PresetError::UnknownEnvironment { .. }));
        assert_eq!(err.to_string(), "Unknown target environment: netscape");
    }

    #[test]
    fn test_error_categories() {
        let err = PresetError::unknown_embedding_version("999.0.0");
        assert_eq!(err.category(), ErrorCategory::Input);

        let err = PresetError::invalid_query("chrome >", "expected a version");
        assert_eq!(err.category(), ErrorCategory::Query);

        let err = PresetError::UnknownPlugin { names: vec!["transform-nope".to_string()] };
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_invalid_version_message() {
        let err = PresetError::invalid_version("chrome", "abc");
        assert_eq!(err.to_string(), "Invalid version for chrome: abc");
    }
}
