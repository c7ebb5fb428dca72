// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Storage module.
//!
//! Every engine implements [`Storage`], so callers hold a [`SharedStorage`]
//! and never name the concrete backend.
//!

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::Error,
    model::{Student, StudentData, StudentId},
};

#[cfg(feature = "mongodb")]
pub mod mongo;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

const TARGET_STORAGE: &str = "Students-Base-Storage";

/// What happens to surviving identifiers after a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Survivors are renumbered contiguously from 1 after every delete.
    Reindexed,
    /// Identifiers never change once assigned.
    Stable,
}

/// Student records persistence.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the engine, used in logs.
    fn backend(&self) -> &'static str;

    /// Identifier stability of this engine.
    fn id_policy(&self) -> IdPolicy;

    /// Reads an identifier received from a client in this engine's key form.
    fn parse_id(&self, raw: &str) -> Result<StudentId, Error> {
        raw.parse()
    }

    /// Persists a new record and returns its generated identifier.
    async fn create_student(&self, data: &StudentData) -> Result<StudentId, Error>;

    /// Fails with [`Error::NotFound`] when no record has `id`.
    async fn get_student_by_id(&self, id: &StudentId) -> Result<Student, Error>;

    /// First record whose age matches exactly. Relational engines return
    /// the lowest id, the document store its natural order.
    async fn get_student_by_age(&self, age: i32) -> Result<Student, Error>;

    /// All records.
    async fn get_students(&self) -> Result<Vec<Student>, Error>;

    /// Deleting an unknown id is not an error.
    async fn delete_student_by_id(&self, id: &StudentId) -> Result<(), Error>;

    /// Removes every record and resets the identifier sequence.
    async fn delete_all_students(&self) -> Result<(), Error>;

    /// Overwrites name, email and age. Updating an unknown id is not an error.
    async fn update_student_by_id(
        &self,
        id: &StudentId,
        data: &StudentData,
    ) -> Result<(), Error>;
}

/// Shared storage reference.
pub type SharedStorage = Arc<dyn Storage>;

/// Opens the configured engine.
pub async fn open_storage(config: &StorageConfig) -> Result<SharedStorage, Error> {
    let storage: SharedStorage = match &config.backend {
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite { path } => {
            Arc::new(sqlite::SqliteStorage::open(path, config.timeout).await?)
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres { url } => Arc::new(
            postgres::PostgresStorage::connect(
                url,
                config.timeout,
                config.max_connections,
            )
            .await?,
        ),
        #[cfg(feature = "mongodb")]
        StorageBackend::MongoDb { uri, database } => Arc::new(
            mongo::MongoStorage::connect(uri, database, config.timeout)
                .await?,
        ),
        #[allow(unreachable_patterns)]
        other => {
            return Err(Error::Backend(format!(
                "{} support is not compiled in",
                other.kind()
            )));
        }
    };

    info!(
        TARGET_STORAGE,
        "{} storage opened, ids are {:?}",
        storage.backend(),
        storage.id_policy()
    );
    Ok(storage)
}

/// Bounds `fut` by `timeout`.
#[cfg(any(feature = "postgres", feature = "mongodb"))]
pub(crate) async fn with_timeout<T, F>(
    timeout: std::time::Duration,
    operation: &str,
    fut: F,
) -> Result<T, Error>
where
    F: std::future::Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(format!(
            "{} did not finish within {:?}",
            operation, timeout
        ))),
    }
}
