// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use students_base::{
    Error,
    config::{
        Logging, LoggingOutput, LoggingRotation, StorageBackend,
        StorageConfig,
    },
};
use tracing::error;

use crate::config::Config;

const TARGET_PARAMS: &str = "Students-Bridge-Params";

#[derive(Debug, Deserialize, Default)]
pub struct Params {
    #[serde(default)]
    env: Option<String>,
    /// Flat key kept for older settings files, same as `storage.path`.
    #[serde(default)]
    storage_path: Option<String>,
    #[serde(default)]
    http_server: HttpServerParams,
    #[serde(default)]
    storage: StorageParams,
    #[serde(default)]
    logging: LoggingParams,
}

#[derive(Debug, Deserialize, Default)]
struct RootParams {
    #[serde(default)]
    env: Option<String>,
}

impl Params {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_env_with_prefix("STUDENTS")
    }

    fn from_env_with_prefix(parent: &str) -> Result<Self, Error> {
        let root: RootParams = from_env_source(parent)?;

        Ok(Self {
            env: root.env,
            storage_path: None,
            http_server: HttpServerParams::from_env(&format!("{parent}_"))?,
            storage: StorageParams::from_env(&format!("{parent}_"))?,
            logging: LoggingParams::from_env(&format!("{parent}_"))?,
        })
    }

    /// Combines self (priority) with other (fallback).
    pub fn mix_config(&self, other: Params) -> Self {
        Self {
            env: self.env.clone().or(other.env),
            storage_path: self.storage_path.clone().or(other.storage_path),
            http_server: self.http_server.mix_config(other.http_server),
            storage: self.storage.mix_config(other.storage),
            logging: self.logging.mix_config(other.logging),
        }
    }
}

impl TryFrom<Params> for Config {
    type Error = Error;

    fn try_from(params: Params) -> Result<Self, Self::Error> {
        let env = required(params.env, "env")?;
        let http_address =
            required(params.http_server.address, "http_server.address")?;

        let location = params
            .storage
            .path
            .or(params.storage_path)
            .unwrap_or_default();
        let backend = StorageBackend::build(
            &params.storage.backend,
            &location,
            &params.storage.database,
        )?;

        let storage = StorageConfig::new(backend)
            .with_timeout(params.storage.timeout)
            .with_max_connections(params.storage.max_connections);

        let logging = Logging {
            output: LoggingOutput::from_str(&params.logging.output)?,
            file_path: params.logging.file_path,
            rotation: LoggingRotation::from_str(&params.logging.rotation)?,
            max_size: params.logging.max_size,
            max_files: params.logging.max_files,
            level: params.logging.level,
        };

        Ok(Self {
            env,
            http_address,
            storage,
            logging,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, Error> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} is required", key))),
    }
}

fn from_env_source<T: DeserializeOwned>(prefix: &str) -> Result<T, Error> {
    let config = config::Config::builder()
        .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
        .build()
        .map_err(|e| {
            error!(TARGET_PARAMS, "Error building config: {}", e);
            Error::Config(format!("Error building config: {}", e))
        })?;

    config.try_deserialize().map_err(|e| {
        error!(TARGET_PARAMS, "Error try deserialize config: {}", e);
        Error::Config(format!("Error try deserialize {} config: {}", prefix, e))
    })
}

#[derive(Debug, Deserialize, Default)]
struct HttpServerParams {
    #[serde(default)]
    address: Option<String>,
}

impl HttpServerParams {
    fn from_env(parent: &str) -> Result<Self, Error> {
        from_env_source(&format!("{parent}HTTP_SERVER"))
    }

    fn mix_config(&self, other: HttpServerParams) -> Self {
        Self {
            address: self.address.clone().or(other.address),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StorageParams {
    #[serde(default = "default_storage_backend")]
    backend: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default = "default_storage_database")]
    database: String,
    #[serde(
        default = "default_storage_timeout",
        deserialize_with = "deserialize_duration_secs"
    )]
    timeout: Duration,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_storage_backend() -> String {
    "sqlite".to_owned()
}

fn default_storage_database() -> String {
    "students".to_owned()
}

fn default_storage_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageParams {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
            database: default_storage_database(),
            timeout: default_storage_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl StorageParams {
    fn from_env(parent: &str) -> Result<Self, Error> {
        from_env_source(&format!("{parent}STORAGE"))
    }

    fn mix_config(&self, other: StorageParams) -> Self {
        Self {
            backend: if self.backend != default_storage_backend() {
                self.backend.clone()
            } else {
                other.backend
            },
            path: self.path.clone().or(other.path),
            database: if self.database != default_storage_database() {
                self.database.clone()
            } else {
                other.database
            },
            timeout: if self.timeout != default_storage_timeout() {
                self.timeout
            } else {
                other.timeout
            },
            max_connections: if self.max_connections
                != default_max_connections()
            {
                self.max_connections
            } else {
                other.max_connections
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
struct LoggingParams {
    #[serde(default = "default_log_output")]
    output: String, // "stdout" | "file" | "stdout,file"
    #[serde(default = "default_log_file_path")]
    file_path: String,
    #[serde(default = "default_log_rotation")]
    rotation: String, // "size" | "hourly" | "daily" ...
    #[serde(default = "default_log_max_size")]
    max_size: usize,
    #[serde(default = "default_log_max_files")]
    max_files: usize,
    #[serde(default = "default_log_level")]
    level: String,
}

fn default_log_output() -> String {
    "stdout".into()
}
fn default_log_file_path() -> String {
    "logs".into()
}
fn default_log_rotation() -> String {
    "size".into()
}
fn default_log_max_size() -> usize {
    100 * 1024 * 1024
}
fn default_log_max_files() -> usize {
    3
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingParams {
    fn default() -> Self {
        LoggingParams {
            output: default_log_output(),
            file_path: default_log_file_path(),
            rotation: default_log_rotation(),
            max_size: default_log_max_size(),
            max_files: default_log_max_files(),
            level: default_log_level(),
        }
    }
}

impl LoggingParams {
    fn from_env(parent: &str) -> Result<Self, Error> {
        from_env_source(&format!("{parent}LOGGING"))
    }

    fn mix_config(&self, other: LoggingParams) -> LoggingParams {
        LoggingParams {
            output: if self.output != default_log_output() {
                self.output.clone()
            } else {
                other.output
            },
            file_path: if self.file_path != default_log_file_path() {
                self.file_path.clone()
            } else {
                other.file_path
            },
            rotation: if self.rotation != default_log_rotation() {
                self.rotation.clone()
            } else {
                other.rotation
            },
            max_size: if self.max_size != default_log_max_size() {
                self.max_size
            } else {
                other.max_size
            },
            max_files: if self.max_files != default_log_max_files() {
                self.max_files
            } else {
                other.max_files
            },
            level: if self.level != default_log_level() {
                self.level.clone()
            } else {
                other.level
            },
        }
    }
}

fn deserialize_duration_secs<'de, D>(
    deserializer: D,
) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let u: u64 = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(u))
}
