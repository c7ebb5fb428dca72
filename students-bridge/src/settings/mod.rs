use std::env;

use config::Config;
use params::Params;
use students_base::Error;
use tracing::error;

pub mod command;
use crate::config::Config as BridgeConfig;
mod params;

const TARGET_SETTINGS: &str = "Students-Bridge-Settings";

pub fn build_config(env: bool, file: &str) -> Result<BridgeConfig, Error> {
    // Env configuration
    let mut params_env = Params::default();
    if env {
        params_env = Params::from_env()?;
    }

    // file configuration (json, yaml or toml)
    let mut params_file = Params::default();
    if !file.is_empty() {
        let mut config = Config::builder();

        config = config.add_source(config::File::with_name(file));

        let config = config.build().map_err(|e| {
            error!(TARGET_SETTINGS, "Error building config: {}", e);
            Error::Config(format!("Can not read {}: {}", file, e))
        })?;

        params_file = config.try_deserialize().map_err(|e| {
            error!(TARGET_SETTINGS, "Error try deserialize config: {}", e);
            Error::Config(format!("Can not parse {}: {}", file, e))
        })?;
    }

    // Mix configurations.
    BridgeConfig::try_from(params_env.mix_config(params_file))
}

pub fn build_file_path() -> String {
    env::var("CONFIG_PATH").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use serial_test::serial;
    use students_base::StorageBackend;
    use tempfile::tempdir;

    use super::*;

    const VARS: [&str; 5] = [
        "STUDENTS_ENV",
        "STUDENTS_HTTP_SERVER_ADDRESS",
        "STUDENTS_STORAGE_BACKEND",
        "STUDENTS_STORAGE_PATH",
        "STUDENTS_STORAGE_TIMEOUT",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_yaml_file() {
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.yaml");
        fs::write(
            &path,
            "env: dev\nstorage_path: storage/storage.db\nhttp_server:\n  address: localhost:8082\n",
        )
        .unwrap();

        let config = build_config(true, path.to_str().unwrap()).unwrap();
        assert_eq!(config.env, "dev");
        assert_eq!(config.http_address, "localhost:8082");
        assert_eq!(
            config.storage.backend,
            StorageBackend::Sqlite {
                path: "storage/storage.db".to_owned()
            }
        );
    }

    #[test]
    #[serial]
    fn test_env_over_file() {
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.toml");
        fs::write(
            &path,
            "env = \"dev\"\n\n[http_server]\naddress = \"localhost:8082\"\n\n[storage]\npath = \"storage/storage.db\"\ntimeout = 3\n\n[logging]\noutput = \"stdout,file\"\n",
        )
        .unwrap();

        unsafe {
            env::set_var("STUDENTS_HTTP_SERVER_ADDRESS", "0.0.0.0:9000");
            env::set_var("STUDENTS_STORAGE_BACKEND", "mongodb");
            env::set_var("STUDENTS_STORAGE_PATH", "mongodb://localhost:27017");
        }

        let config = build_config(true, path.to_str().unwrap());
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.env, "dev");
        assert_eq!(config.http_address, "0.0.0.0:9000");
        assert_eq!(
            config.storage.backend,
            StorageBackend::MongoDb {
                uri: "mongodb://localhost:27017".to_owned(),
                database: "students".to_owned()
            }
        );
        assert_eq!(config.storage.timeout, Duration::from_secs(3));
        assert!(config.logging.output.file);
    }

    #[test]
    #[serial]
    fn test_env_only() {
        clear_env();
        unsafe {
            env::set_var("STUDENTS_ENV", "production");
            env::set_var("STUDENTS_HTTP_SERVER_ADDRESS", "0.0.0.0:8082");
            env::set_var("STUDENTS_STORAGE_PATH", "/var/lib/students.db");
            env::set_var("STUDENTS_STORAGE_TIMEOUT", "10");
        }

        let config = build_config(true, "");
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.env, "production");
        assert_eq!(config.storage.timeout, Duration::from_secs(10));

        assert!(matches!(build_config(false, ""), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_missing_file() {
        clear_env();
        assert!(matches!(
            build_config(false, "/nonexistent/students.yaml"),
            Err(Error::Config(_))
        ));
    }
}
