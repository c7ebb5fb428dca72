// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # PostgreSQL storage.
//!

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    FromRow, PgPool,
    postgres::PgPoolOptions,
};
use tracing::{debug, error};

use crate::{
    error::Error,
    model::{Student, StudentData, StudentId},
};

use super::{IdPolicy, Storage, with_timeout};

const TARGET_POSTGRES: &str = "Students-Base-Postgres";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS students (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    age INT NOT NULL
)";

#[derive(Debug, FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    email: String,
    age: i32,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: StudentId::Sequence(row.id),
            name: row.name,
            email: row.email,
            age: row.age,
        }
    }
}

#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    timeout: Duration,
}

fn map_err(operation: &str, e: sqlx::Error) -> Error {
    error!(TARGET_POSTGRES, "{} failed: {}", operation, e);
    match e {
        sqlx::Error::PoolTimedOut => {
            Error::Timeout(format!("{}: no connection available", operation))
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            Error::Connection(format!("{}: {}", operation, e))
        }
        e => Error::Query(format!("{}: {}", operation, e)),
    }
}

impl PostgresStorage {
    /// Connects to `url` and creates the `students` table when missing.
    pub async fn connect(
        url: &str,
        timeout: Duration,
        max_connections: u32,
    ) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .map_err(|e| {
                Error::Connection(format!(
                    "PostgreSQL fail open connection: {}",
                    e
                ))
            })?;

        let storage = PostgresStorage { pool, timeout };
        with_timeout(timeout, "Create students table", async {
            sqlx::query(SCHEMA)
                .execute(&storage.pool)
                .await
                .map_err(|e| map_err("Create students table", e))
        })
        .await?;

        debug!(TARGET_POSTGRES, "PostgreSQL storage ready");
        Ok(storage)
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn id_policy(&self) -> IdPolicy {
        IdPolicy::Stable
    }

    async fn create_student(&self, data: &StudentData) -> Result<StudentId, Error> {
        let id = with_timeout(self.timeout, "Insert student", async {
            sqlx::query_scalar::<_, i64>(
                "INSERT INTO students (name, email, age) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(&data.name)
            .bind(&data.email)
            .bind(data.age)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_err("Insert student", e))
        })
        .await?;

        Ok(StudentId::Sequence(id))
    }

    async fn get_student_by_id(&self, id: &StudentId) -> Result<Student, Error> {
        let key = id.as_sequence()?;
        let row = with_timeout(self.timeout, "Select student by id", async {
            sqlx::query_as::<_, StudentRow>(
                "SELECT id, name, email, age FROM students WHERE id = $1",
            )
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err("Select student by id", e))
        })
        .await?;

        row.map(Student::from)
            .ok_or_else(|| Error::NotFound(format!("no student with id {}", id)))
    }

    async fn get_student_by_age(&self, age: i32) -> Result<Student, Error> {
        let row = with_timeout(self.timeout, "Select student by age", async {
            sqlx::query_as::<_, StudentRow>(
                "SELECT id, name, email, age FROM students WHERE age = $1 ORDER BY id LIMIT 1",
            )
            .bind(age)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err("Select student by age", e))
        })
        .await?;

        row.map(Student::from)
            .ok_or_else(|| Error::NotFound(format!("no student with age {}", age)))
    }

    async fn get_students(&self) -> Result<Vec<Student>, Error> {
        let rows = with_timeout(self.timeout, "Select students", async {
            sqlx::query_as::<_, StudentRow>(
                "SELECT id, name, email, age FROM students ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_err("Select students", e))
        })
        .await?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn delete_student_by_id(&self, id: &StudentId) -> Result<(), Error> {
        let key = id.as_sequence()?;
        with_timeout(self.timeout, "Delete student", async {
            sqlx::query("DELETE FROM students WHERE id = $1")
                .bind(key)
                .execute(&self.pool)
                .await
                .map_err(|e| map_err("Delete student", e))
        })
        .await?;
        Ok(())
    }

    async fn delete_all_students(&self) -> Result<(), Error> {
        with_timeout(self.timeout, "Delete all students", async {
            sqlx::query("TRUNCATE TABLE students RESTART IDENTITY")
                .execute(&self.pool)
                .await
                .map_err(|e| map_err("Delete all students", e))
        })
        .await?;
        Ok(())
    }

    async fn update_student_by_id(
        &self,
        id: &StudentId,
        data: &StudentData,
    ) -> Result<(), Error> {
        let key = id.as_sequence()?;
        with_timeout(self.timeout, "Update student", async {
            sqlx::query(
                "UPDATE students SET name = $1, email = $2, age = $3 WHERE id = $4",
            )
            .bind(&data.name)
            .bind(&data.email)
            .bind(data.age)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_err("Update student", e))
        })
        .await?;
        Ok(())
    }
}
