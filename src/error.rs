use thiserror::Error;

/// Main error type for the VerseCanvas library
#[derive(Error, Debug)]
pub enum VerseError {
    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the image compositor core
///
/// All of these are deterministic: retrying with the same inputs cannot succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("Font unavailable: {family}")]
    FontUnavailable { family: String },

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Invalid parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using VerseError
pub type Result<T> = std::result::Result<T, VerseError>;

impl CompositorError {
    pub fn invalid_image<S: Into<String>>(reason: S) -> Self {
        Self::InvalidImage { reason: reason.into() }
    }

    pub fn invalid_parameters<S: Into<String>>(details: S) -> Self {
        Self::InvalidParameters { details: details.into() }
    }
}

impl VerseError {
    /// Access the compositor condition, if this error carries one
    pub fn as_compositor(&self) -> Option<&CompositorError> {
        match self {
            Self::Compositor(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Disk hiccups while reading or writing images might be temporary
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Compositor(CompositorError::InvalidImage { reason }) => {
                format!("The image could not be edited ({}). Please generate it again.", reason)
            }
            Self::Compositor(CompositorError::FontUnavailable { family }) => {
                format!("Font '{}' is not installed. Choose another font style.", family)
            }
            Self::Compositor(CompositorError::NoImageLoaded) => {
                "Generate an image before editing it.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compositor_errors_are_not_recoverable() {
        let errors: Vec<VerseError> = vec![
            CompositorError::invalid_image("zero width").into(),
            CompositorError::FontUnavailable { family: "serif".to_string() }.into(),
            CompositorError::NoImageLoaded.into(),
            CompositorError::invalid_parameters("blur 9").into(),
        ];

        for err in errors {
            assert!(!err.is_recoverable(), "{} should not be retryable", err);
            assert!(err.as_compositor().is_some());
        }
    }

    #[test]
    fn test_io_errors_are_recoverable() {
        let err: VerseError = std::io::Error::new(std::io::ErrorKind::Interrupted, "busy").into();
        assert!(err.is_recoverable());
        assert!(err.as_compositor().is_none());
    }

    #[test]
    fn test_config_and_codec_errors_are_not_recoverable() {
        let errors: Vec<VerseError> = vec![
            ConfigError::ParseFailed { path: "verse.toml".to_string() }.into(),
            image::ImageError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad png")).into(),
        ];

        for err in errors {
            let kind = match &err {
                VerseError::Compositor(_) => "compositor",
                VerseError::Config(_) => "config",
                VerseError::Codec(_) => "codec",
                VerseError::Io(_) => "io",
            };
            assert!(!err.is_recoverable(), "{} error should not be retryable", kind);
            assert_eq!(err.user_message(), err.to_string());
        }
    }

    #[test]
    fn test_user_messages() {
        let err: VerseError = CompositorError::FontUnavailable { family: "times".to_string() }.into();
        assert!(err.user_message().contains("times"));

        let err: VerseError = CompositorError::NoImageLoaded.into();
        assert_eq!(err.user_message(), "Generate an image before editing it.");
    }
}
