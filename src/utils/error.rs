// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application.
// The extractor has none: malformed markup degrades to pending fields.

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read from text source: {0}")]
    Io(#[from] std::io::Error), // stdin closed abnormally, replay file unreadable, ...

    #[error("Stream ended inside a multi-byte character ({0} dangling bytes)")]
    TruncatedUtf8(usize),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Could not read generation config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid generation config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Text source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Prompt assembly failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
