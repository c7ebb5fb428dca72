// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # SQLite storage.
//!
//! Identifiers are kept contiguous: every successful delete renumbers the
//! surviving rows from 1, ordered by their previous id, inside the same
//! transaction as the delete.
//!

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row, params};
use tokio_rusqlite::Connection;
use tracing::{debug, error};

use crate::{
    error::Error,
    model::{Student, StudentData, StudentId},
};

use super::{IdPolicy, Storage};

const TARGET_SQLITE: &str = "Students-Base-Sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        age INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS subjects (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        professor TEXT NOT NULL,
        marks INTEGER NOT NULL
    );";

const REINDEX: &str = "
    DROP TABLE IF EXISTS temp.students_reindex;
    CREATE TEMP TABLE students_reindex AS
        SELECT ROW_NUMBER() OVER (ORDER BY id) AS new_id, name, email, age
        FROM students;
    DELETE FROM students;
    INSERT INTO students (id, name, email, age)
        SELECT new_id, name, email, age FROM temp.students_reindex ORDER BY new_id;
    DROP TABLE temp.students_reindex;
    UPDATE sqlite_sequence SET seq = (SELECT COUNT(*) FROM students)
        WHERE name = 'students';";

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens `path`, or an in-memory database for `:memory:`, and creates
    /// the tables when missing.
    pub async fn open(path: &str, busy_timeout: Duration) -> Result<Self, Error> {
        let in_memory = path == ":memory:";
        let conn = if in_memory {
            Connection::open_in_memory().await
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        Error::Connection(format!(
                            "Can not create directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            Connection::open(path).await
        }
        .map_err(|e| {
            Error::Connection(format!("SQLite fail open connection: {}", e))
        })?;

        conn.call(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if !in_memory {
                let _: String = conn.pragma_update_and_check(
                    None,
                    "journal_mode",
                    "WAL",
                    |row| row.get(0),
                )?;
            }
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|e| {
            Error::Connection(format!("Can not create students table: {}", e))
        })?;

        debug!(TARGET_SQLITE, "SQLite storage ready at {}", path);
        Ok(SqliteStorage { conn })
    }
}

fn query_error(operation: &str, e: tokio_rusqlite::Error) -> Error {
    error!(TARGET_SQLITE, "{} failed: {}", operation, e);
    match e {
        tokio_rusqlite::Error::ConnectionClosed => {
            Error::Connection(format!("{}: connection closed", operation))
        }
        e => Error::Query(format!("{}: {}", operation, e)),
    }
}

fn read_student(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: StudentId::Sequence(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        age: row.get(3)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn id_policy(&self) -> IdPolicy {
        IdPolicy::Reindexed
    }

    async fn create_student(&self, data: &StudentData) -> Result<StudentId, Error> {
        let data = data.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO students (name, email, age) VALUES (?1, ?2, ?3)",
                    params![data.name, data.email, data.age],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| query_error("Insert student", e))?;

        Ok(StudentId::Sequence(id))
    }

    async fn get_student_by_id(&self, id: &StudentId) -> Result<Student, Error> {
        let key = id.as_sequence()?;
        let student = self
            .conn
            .call(move |conn| {
                let student = conn
                    .query_row(
                        "SELECT id, name, email, age FROM students WHERE id = ?1",
                        params![key],
                        read_student,
                    )
                    .optional()?;
                Ok(student)
            })
            .await
            .map_err(|e| query_error("Select student by id", e))?;

        student.ok_or_else(|| Error::NotFound(format!("no student with id {}", id)))
    }

    async fn get_student_by_age(&self, age: i32) -> Result<Student, Error> {
        let student = self
            .conn
            .call(move |conn| {
                let student = conn
                    .query_row(
                        "SELECT id, name, email, age FROM students WHERE age = ?1 ORDER BY id LIMIT 1",
                        params![age],
                        read_student,
                    )
                    .optional()?;
                Ok(student)
            })
            .await
            .map_err(|e| query_error("Select student by age", e))?;

        student
            .ok_or_else(|| Error::NotFound(format!("no student with age {}", age)))
    }

    async fn get_students(&self) -> Result<Vec<Student>, Error> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, email, age FROM students ORDER BY id",
                )?;
                let students = stmt
                    .query_map([], read_student)?
                    .collect::<Result<Vec<Student>, rusqlite::Error>>()?;
                Ok(students)
            })
            .await
            .map_err(|e| query_error("Select students", e))
    }

    async fn delete_student_by_id(&self, id: &StudentId) -> Result<(), Error> {
        let key = id.as_sequence()?;
        let deleted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let deleted =
                    tx.execute("DELETE FROM students WHERE id = ?1", params![key])?;
                if deleted > 0 {
                    tx.execute_batch(REINDEX)?;
                }
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(|e| query_error("Delete student", e))?;

        if deleted > 0 {
            debug!(TARGET_SQLITE, "Student {} deleted, ids reindexed", key);
        }
        Ok(())
    }

    async fn delete_all_students(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM students", [])?;
                tx.execute(
                    "UPDATE sqlite_sequence SET seq = 0 WHERE name = 'students'",
                    [],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| query_error("Delete all students", e))
    }

    async fn update_student_by_id(
        &self,
        id: &StudentId,
        data: &StudentData,
    ) -> Result<(), Error> {
        let key = id.as_sequence()?;
        let data = data.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE students SET name = ?1, email = ?2, age = ?3 WHERE id = ?4",
                    params![data.name, data.email, data.age, key],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| query_error("Update student", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    async fn storage() -> SqliteStorage {
        SqliteStorage::open(":memory:", Duration::from_secs(5))
            .await
            .unwrap()
    }

    async fn seed(storage: &SqliteStorage, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            storage
                .create_student(&StudentData::new(
                    name,
                    &format!("{}@uni.edu", name.to_lowercase()),
                    20 + i as i32,
                ))
                .await
                .unwrap();
        }
    }

    fn ids(students: &[Student]) -> Vec<StudentId> {
        students.iter().map(|x| x.id.clone()).collect()
    }

    #[test(tokio::test)]
    async fn test_create_and_get() {
        let storage = storage().await;
        let data = StudentData::new("Ada", "ada@uni.edu", 21);
        let id = storage.create_student(&data).await.unwrap();
        assert_eq!(id, StudentId::Sequence(1));

        let student = storage.get_student_by_id(&id).await.unwrap();
        assert_eq!(student.data(), data);

        let err = storage
            .get_student_by_id(&StudentId::Sequence(9))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test(tokio::test)]
    async fn test_object_id_rejected() {
        let storage = storage().await;
        let err = storage
            .get_student_by_id(&StudentId::Object("abc".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));
    }

    #[test(tokio::test)]
    async fn test_delete_missing_leaves_table() {
        let storage = storage().await;
        seed(&storage, &["Ada", "Alan", "Grace"]).await;
        let before = storage.get_students().await.unwrap();

        storage
            .delete_student_by_id(&StudentId::Sequence(42))
            .await
            .unwrap();

        assert_eq!(storage.get_students().await.unwrap(), before);
    }

    #[test(tokio::test)]
    async fn test_delete_reindexes() {
        let storage = storage().await;
        seed(&storage, &["Ada", "Alan", "Grace", "Linus"]).await;

        storage
            .delete_student_by_id(&StudentId::Sequence(2))
            .await
            .unwrap();

        let students = storage.get_students().await.unwrap();
        assert_eq!(
            ids(&students),
            vec![
                StudentId::Sequence(1),
                StudentId::Sequence(2),
                StudentId::Sequence(3)
            ]
        );
        let names: Vec<&str> = students.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Grace", "Linus"]);

        let id = storage
            .create_student(&StudentData::new("Barbara", "barbara@uni.edu", 30))
            .await
            .unwrap();
        assert_eq!(id, StudentId::Sequence(4));
    }

    #[test(tokio::test)]
    async fn test_failed_reindex_rolls_back() {
        let storage = storage().await;
        seed(&storage, &["Ada", "Alan", "Grace"]).await;
        storage
            .conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER abort_reindex BEFORE INSERT ON students
                     WHEN NEW.name = 'Grace' AND NEW.id = 2
                     BEGIN SELECT RAISE(ABORT, 'reindex aborted'); END;",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = storage
            .delete_student_by_id(&StudentId::Sequence(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));

        let students = storage.get_students().await.unwrap();
        let rows: Vec<(StudentId, &str)> = students
            .iter()
            .map(|x| (x.id.clone(), x.name.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (StudentId::Sequence(1), "Ada"),
                (StudentId::Sequence(2), "Alan"),
                (StudentId::Sequence(3), "Grace")
            ]
        );
    }

    #[test(tokio::test)]
    async fn test_subjects_code_is_text() {
        let storage = storage().await;
        let code: String = storage
            .conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO subjects (code, name, professor, marks) VALUES (?1, ?2, ?3, ?4)",
                    params!["CS101", "Algorithms", "Knuth", 9],
                )?;
                Ok(conn.query_row("SELECT code FROM subjects", [], |row| {
                    row.get(0)
                })?)
            })
            .await
            .unwrap();
        assert_eq!(code, "CS101");
    }

    #[test(tokio::test)]
    async fn test_delete_all_resets_sequence() {
        let storage = storage().await;
        seed(&storage, &["Ada", "Alan", "Grace"]).await;

        storage.delete_all_students().await.unwrap();
        assert!(storage.get_students().await.unwrap().is_empty());

        let id = storage
            .create_student(&StudentData::new("Ada", "ada@uni.edu", 21))
            .await
            .unwrap();
        assert_eq!(id, StudentId::Sequence(1));
    }

    #[test(tokio::test)]
    async fn test_delete_all_on_fresh_table() {
        let storage = storage().await;
        storage.delete_all_students().await.unwrap();
        assert!(storage.get_students().await.unwrap().is_empty());
    }

    #[test(tokio::test)]
    async fn test_update_only_target() {
        let storage = storage().await;
        seed(&storage, &["Ada", "Alan"]).await;

        let data = StudentData::new("Ada Lovelace", "ada@lovelace.org", 36);
        storage
            .update_student_by_id(&StudentId::Sequence(1), &data)
            .await
            .unwrap();

        let first = storage
            .get_student_by_id(&StudentId::Sequence(1))
            .await
            .unwrap();
        assert_eq!(first.data(), data);
        let second = storage
            .get_student_by_id(&StudentId::Sequence(2))
            .await
            .unwrap();
        assert_eq!(second.name, "Alan");

        storage
            .update_student_by_id(&StudentId::Sequence(77), &data)
            .await
            .unwrap();
        assert_eq!(storage.get_students().await.unwrap().len(), 2);
    }

    #[test(tokio::test)]
    async fn test_get_by_age() {
        let storage = storage().await;
        assert!(matches!(
            storage.get_student_by_age(20).await.unwrap_err(),
            Error::NotFound(_)
        ));

        for name in ["Ada", "Alan", "Grace"] {
            storage
                .create_student(&StudentData::new(name, "x@uni.edu", 20))
                .await
                .unwrap();
        }
        let student = storage.get_student_by_age(20).await.unwrap();
        assert_eq!(student.id, StudentId::Sequence(1));
        assert_eq!(student.name, "Ada");
    }

    #[test(tokio::test)]
    async fn test_file_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.db");
        let path = path.to_str().unwrap();

        let storage = SqliteStorage::open(path, Duration::from_secs(5))
            .await
            .unwrap();
        seed(&storage, &["Ada", "Alan"]).await;
        drop(storage);

        let storage = SqliteStorage::open(path, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(storage.get_students().await.unwrap().len(), 2);
    }
}
