// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Configuration module
//!

use std::{str::FromStr, time::Duration};

use serde::Deserialize;

use crate::error::Error;

/// Default bound for a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Engine and location.
    pub backend: StorageBackend,
    /// Bound for every call against the backend.
    pub timeout: Duration,
    /// Pool size for networked backends.
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            timeout: DEFAULT_STORAGE_TIMEOUT,
            max_connections: 5,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Storage engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite database.
    Sqlite {
        /// Path to the database file, or `:memory:`.
        path: String,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection url.
        url: String,
    },
    /// MongoDB database.
    MongoDb {
        /// Connection uri.
        uri: String,
        /// Database holding the `students` collection.
        database: String,
    },
}

impl StorageBackend {
    /// Builds a backend from its kind name and location.
    pub fn build(kind: &str, location: &str, database: &str) -> Result<Self, Error> {
        if location.trim().is_empty() {
            return Err(Error::Config("storage path is required".to_owned()));
        }
        match kind.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite {
                path: location.to_owned(),
            }),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres {
                url: location.to_owned(),
            }),
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDb {
                uri: location.to_owned(),
                database: database.to_owned(),
            }),
            other => Err(Error::Config(format!(
                "unknown storage backend {}",
                other
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite { .. } => "sqlite",
            StorageBackend::Postgres { .. } => "postgres",
            StorageBackend::MongoDb { .. } => "mongodb",
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingOutput {
    pub stdout: bool,
    pub file: bool,
}

impl FromStr for LoggingOutput {
    type Err = Error;

    /// Parses a comma separated list such as `stdout,file`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut output = LoggingOutput::default();
        for item in s.split(',').map(str::trim).filter(|x| !x.is_empty()) {
            match item.to_lowercase().as_str() {
                "stdout" => output.stdout = true,
                "file" => output.file = true,
                other => {
                    return Err(Error::Config(format!(
                        "unknown logging output {}",
                        other
                    )));
                }
            }
        }
        Ok(output)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingRotation {
    Size,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl FromStr for LoggingRotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "size" => Ok(LoggingRotation::Size),
            "hourly" => Ok(LoggingRotation::Hourly),
            "daily" => Ok(LoggingRotation::Daily),
            "weekly" => Ok(LoggingRotation::Weekly),
            "monthly" => Ok(LoggingRotation::Monthly),
            "yearly" => Ok(LoggingRotation::Yearly),
            "never" => Ok(LoggingRotation::Never),
            other => {
                Err(Error::Config(format!("unknown log rotation {}", other)))
            }
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Logging {
    pub output: LoggingOutput,
    /// Directory for rotated log files.
    pub file_path: String,
    pub rotation: LoggingRotation,
    /// Bytes per file when rotating by size.
    pub max_size: usize,
    /// Rotated files kept.
    pub max_files: usize,
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Logging {
    pub fn logs(&self) -> bool {
        self.output.stdout || self.output.file
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            output: LoggingOutput {
                stdout: true,
                file: false,
            },
            file_path: "logs".to_owned(),
            rotation: LoggingRotation::Size,
            max_size: 100 * 1024 * 1024,
            max_files: 3,
            level: "info".to_owned(),
        }
    }
}
