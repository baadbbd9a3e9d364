// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to rebuild a board from a saved-game source. The live game is never
/// touched when one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read saved game: {0}")]
    Io(#[from] io::Error),
    #[error("malformed saved game at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error with config file '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid config file '{}': {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// Encoding or decoding a move message for the transport layer.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("move message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid square '{0}': use a file a-h followed by a rank 1-8, e.g. 'e2'")]
pub struct SquareParseError(pub String);
