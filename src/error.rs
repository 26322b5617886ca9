//! Centralized error types for flyway-validate
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Command whitelist errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid Command: {command}")]
    Invalid { command: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("{field} points to a path that does not exist: {path}")]
    PathNotFound { field: String, path: String },
}

/// Secrets store errors
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("Failed to fetch secret {secret_id}: {message}")]
    Request { secret_id: String, message: String },

    #[error("Secret {secret_id} has no string value")]
    EmptySecret { secret_id: String },

    #[error("Secret {secret_id} is not a valid credential record: {message}")]
    Parse { secret_id: String, message: String },

    #[error("LOCALURL must be set when MODE=DEV")]
    MissingEndpoint,
}

/// Flyway conf generation errors
#[derive(Error, Debug)]
pub enum ConfError {
    #[error("Secret {secret_id} carries neither a url nor host details to build one")]
    MissingUrl { secret_id: String },
}
