use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid tenant \"{input}\": {reason}")]
    InvalidTenant { input: String, reason: &'static str },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid experiment name \"{input}\" (expected a single path component)")]
    InvalidExperiment { input: String },

    #[error("Invalid {name} setting \"{value}\"")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Cannot find {name} executable in $PATH")]
    MissingExecutable { name: String },

    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[cfg_attr(unix, allow(dead_code))]
    #[error("{program} exited with {status}")]
    ServerExit { program: String, status: String },

    #[error("Provisioning failed in strict mode: {0}")]
    Provision(#[from] ProvisionError),

    #[error("{0}")]
    LogDir(#[from] LogDirError),
}

/// Failure of a single provisioning step. Non-fatal unless strict mode is on.
#[derive(Debug, Error)]
pub(crate) enum ProvisionError {
    #[error("invalid object store endpoint {endpoint}: {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("object store rejected {bucket}/{key} with HTTP {status}")]
    StorageStatus {
        bucket: String,
        key: String,
        status: u16,
    },

    #[error("object store request for {bucket}/{key} failed: {source}")]
    StorageTransport {
        bucket: String,
        key: String,
        source: ureq::Error,
    },

    #[error("connecting to database {host}:{port} timed out after {secs}s")]
    DatabaseTimeout { host: String, port: u16, secs: u64 },

    #[error("database error while creating schema {schema}: {source}")]
    Database {
        schema: String,
        source: sqlx::Error,
    },

    #[error("failed to start database runtime: {0}")]
    Runtime(std::io::Error),
}

#[derive(Debug, Error)]
pub(crate) enum LogDirError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read log directory {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not remove {failed} file(s) from {}", path.display())]
    PartialClear { path: PathBuf, failed: usize },
}
