//! # Error Handling
//!
//! Error types for the Flowplane xDS translation helpers, defined with `thiserror`.
//!
//! Conversions over absent or malformed input return `None` rather than an
//! error. The variants here cover the cases where a caller has to react:
//! a wire message that cannot be decoded or re-encoded, an endpoint family
//! the proxy cannot address, and bad settings.

/// Custom result type for translation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the translation helpers
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A type-tagged message (or an override aimed at it) could not be decoded
    #[error("Decode error for '{type_url}': {reason}")]
    Decode { type_url: String, reason: String },

    /// A merged message could not be serialized back into its wire form
    #[error("Encode error for '{type_url}': {reason}")]
    Encode { type_url: String, reason: String },

    /// Endpoint address family outside of the supported set
    #[error("Unsupported address family: {0}")]
    UnsupportedAddressFamily(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new decode error
    pub fn decode<T: Into<String>, R: Into<String>>(type_url: T, reason: R) -> Self {
        Self::Decode { type_url: type_url.into(), reason: reason.into() }
    }

    /// Create a new encode error
    pub fn encode<T: Into<String>, R: Into<String>>(type_url: T, reason: R) -> Self {
        Self::Encode { type_url: type_url.into(), reason: reason.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// True for failures raised while decoding
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// True for failures raised while encoding
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(format!("Validation failed: {}", err))
    }
}
