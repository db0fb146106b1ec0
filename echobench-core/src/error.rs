//! Custom error types for echobench.
//!
//! Every failure is an explicit enum variant. A failed call is never retried:
//! the error propagates to the caller and aborts the current benchmark run.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Format;

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Wire Errors - No Recovery, the Call Is Aborted
    // =========================================================================
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // =========================================================================
    // Host Lifecycle Errors
    // =========================================================================
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors reject a configuration before anything is started.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u32, reason: String },

    #[error("Unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Duplicate {kind}: {value}")]
    DuplicateEntry { kind: &'static str, value: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Serializer failures, tagged with the format that produced them.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{format} serialization failed: {message}")]
    Serialize { format: Format, message: String },

    #[error("{format} deserialization failed: {message}")]
    Deserialize { format: Format, message: String },
}

/// Client-side transport failures. Any of these is fatal for the benchmark.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Response status was not 200 OK but {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Socket error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("RPC fault: {message}")]
    RpcFault { message: String },

    #[error("Client used before initialize()")]
    NotInitialized,
}

/// Service host lifecycle failures.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Host is already running on {addr}")]
    AlreadyRunning { addr: SocketAddr },

    #[error("Serve task failed: {reason}")]
    Join { reason: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

impl TransportError {
    /// Wrap an IO error with the step that failed.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        TransportError::Io { context, source }
    }

    /// Build a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        TransportError::MalformedResponse {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        let err = HardValidationError::UnknownVariant {
            kind: "format",
            value: "yaml".to_string(),
            expected: "json, xml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("format"));
        assert!(msg.contains("yaml"));
        assert!(msg.contains("json, xml"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::InvalidPort {
            port: 0,
            reason: "Port must be non-zero".to_string(),
        };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));

        let codec_err = CodecError::Deserialize {
            format: Format::Xml,
            message: "unexpected eof".to_string(),
        };
        let bench_err: BenchError = codec_err.into();
        assert!(bench_err.to_string().contains("xml deserialization failed"));
    }

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 415,
            body: "expected application/xml".to_string(),
        };
        assert!(err.to_string().contains("415"));
    }
}
