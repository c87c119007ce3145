//! Error types for the moderation intake pipeline.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chat platform errors (send, guild/channel/message lookup).
///
/// "Not found" is not an error here: lookups return `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Platform {platform} request failed: {reason}")]
    RequestFailed { platform: String, reason: String },

    #[error("Platform {platform} returned HTTP {status}: {body}")]
    Http {
        platform: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {platform}: {reason}")]
    InvalidResponse { platform: String, reason: String },

    #[error("Failed to send message to {target}: {reason}")]
    SendFailed { target: String, reason: String },

    #[error("Authentication failed for platform {platform}")]
    AuthFailed { platform: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Inbound channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Channel {name} disconnected: {reason}")]
    Disconnected { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Classifier evaluation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Classifier failed on example {index}: {source}")]
    Classifier {
        index: usize,
        #[source]
        source: LlmError,
    },
}
