// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::future::Future;

pub use students_base::{
    Error, IdPolicy, SharedStorage, Student, StudentData, StudentId,
    config::{
        Logging, LoggingOutput, LoggingRotation, StorageBackend,
        StorageConfig,
    },
};
use students_base::open_storage;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;

pub mod config;
pub mod settings;
pub use clap;

const TARGET_BRIDGE: &str = "Students-Bridge";

#[derive(Clone)]
pub struct Bridge {
    storage: SharedStorage,
    cancellation: CancellationToken,
    env: String,
}

impl Bridge {
    pub async fn build(
        settings: Config,
        token: Option<CancellationToken>,
    ) -> Result<Self, Error> {
        let token = if let Some(token) = token {
            token
        } else {
            CancellationToken::new()
        };

        let storage = open_storage(&settings.storage).await?;
        info!(
            TARGET_BRIDGE,
            env = %settings.env,
            backend = storage.backend(),
            version = env!("CARGO_PKG_VERSION"),
            "storage initiated"
        );

        Self::bind_with_shutdown(token.clone(), shutdown_signal());

        Ok(Self {
            storage,
            cancellation: token,
            env: settings.env,
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.storage.id_policy()
    }

    fn bind_with_shutdown(
        token: CancellationToken,
        shutdown_signal: impl Future + Send + 'static,
    ) {
        let cancellation_token = token.clone();
        tokio::spawn(async move {
            shutdown_signal.await;
            cancellation_token.cancel();
        });
    }

    pub async fn create_student(
        &self,
        data: StudentData,
    ) -> Result<Student, Error> {
        data.validate()?;
        let id = self.storage.create_student(&data).await?;
        info!(TARGET_BRIDGE, "Student created with id {}", id);
        Ok(Student::new(id, data))
    }

    pub async fn get_student_by_id(&self, id: String) -> Result<Student, Error> {
        let id = self.storage.parse_id(&id)?;
        self.storage.get_student_by_id(&id).await
    }

    pub async fn get_student_by_age(&self, age: i32) -> Result<Student, Error> {
        self.storage.get_student_by_age(age).await
    }

    pub async fn get_students(&self) -> Result<Vec<Student>, Error> {
        self.storage.get_students().await
    }

    pub async fn update_student_by_id(
        &self,
        id: String,
        data: StudentData,
    ) -> Result<Student, Error> {
        let id = self.storage.parse_id(&id)?;
        data.validate()?;
        self.storage.update_student_by_id(&id, &data).await?;
        info!(TARGET_BRIDGE, "Student {} updated", id);
        Ok(Student::new(id, data))
    }

    pub async fn delete_student_by_id(&self, id: String) -> Result<(), Error> {
        let id = self.storage.parse_id(&id)?;
        self.storage.delete_student_by_id(&id).await?;
        info!(TARGET_BRIDGE, "Student {} deleted", id);
        Ok(())
    }

    pub async fn delete_all_students(&self) -> Result<(), Error> {
        self.storage.delete_all_students().await?;
        info!(TARGET_BRIDGE, "All students deleted");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(TARGET_BRIDGE, "Can not listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(TARGET_BRIDGE, "Can not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(TARGET_BRIDGE, "Shutdown signal received");
}
