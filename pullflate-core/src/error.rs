//! Error types for pullflate operations.
//!
//! The DEFLATE core reports every kind of stream corruption through the
//! single [`PullflateError::InvalidFormat`] variant; running out of input or
//! output space is not an error but a status (see
//! [`InflateStatus`](crate::traits::InflateStatus)). The remaining variants
//! belong to the zlib framing layer and the one-shot conveniences.

use thiserror::Error;

/// The main error type for pullflate operations.
///
/// All errors are fatal for the decoder instance that raised them; callers
/// recover by discarding it and constructing a fresh one.
#[derive(Debug, Error)]
pub enum PullflateError {
    /// The DEFLATE stream violates RFC 1951.
    #[error("corrupted deflate stream: {message}")]
    InvalidFormat {
        /// Description of the violation.
        message: &'static str,
    },

    /// The zlib header violates RFC 1950.
    #[error("invalid zlib header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: &'static str,
    },

    /// The stream requests a feature this decoder does not implement.
    #[error("unsupported feature: {feature}")]
    Unsupported {
        /// Name of the feature.
        feature: &'static str,
    },

    /// A one-shot helper was handed a stream that ends mid-structure.
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

/// Result type alias for pullflate operations.
pub type Result<T> = std::result::Result<T, PullflateError>;

impl PullflateError {
    /// Create an invalid format error.
    pub fn invalid_format(message: &'static str) -> Self {
        Self::InvalidFormat { message }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: &'static str) -> Self {
        Self::InvalidHeader { message }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: &'static str) -> Self {
        Self::Unsupported { feature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PullflateError::invalid_format("reserved block type");
        assert!(err.to_string().contains("reserved block type"));

        let err = PullflateError::invalid_header("header check failed");
        assert!(err.to_string().contains("header check failed"));

        let err = PullflateError::unsupported("preset dictionary");
        assert!(err.to_string().contains("preset dictionary"));
    }
}
