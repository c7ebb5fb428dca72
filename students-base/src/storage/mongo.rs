// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # MongoDB storage.
//!
//! Records keep the native `ObjectId` as their identifier, exposed as
//! [`StudentId::Object`] with its hex form.
//!

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{doc, oid::ObjectId},
    error::ErrorKind,
    options::ClientOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    error::Error,
    model::{Student, StudentData, StudentId},
};

use super::{IdPolicy, Storage, with_timeout};

const TARGET_MONGO: &str = "Students-Base-Mongo";

const COLLECTION: &str = "students";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StudentDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    age: i32,
}

impl From<&StudentData> for StudentDocument {
    fn from(data: &StudentData) -> Self {
        StudentDocument {
            id: None,
            name: data.name.clone(),
            email: data.email.clone(),
            age: data.age,
        }
    }
}

impl TryFrom<StudentDocument> for Student {
    type Error = Error;

    fn try_from(document: StudentDocument) -> Result<Self, Self::Error> {
        let Some(id) = document.id else {
            return Err(Error::Query("document without _id".to_owned()));
        };
        Ok(Student {
            id: StudentId::Object(id.to_hex()),
            name: document.name,
            email: document.email,
            age: document.age,
        })
    }
}

fn object_id(id: &StudentId) -> Result<ObjectId, Error> {
    let hex = id.as_object()?;
    ObjectId::parse_str(hex)
        .map_err(|e| Error::InvalidId(format!("{} is not an object id: {}", hex, e)))
}

fn map_err(operation: &str, e: mongodb::error::Error) -> Error {
    error!(TARGET_MONGO, "{} failed: {}", operation, e);
    match e.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => {
            Error::Connection(format!("{}: {}", operation, e))
        }
        _ => Error::Query(format!("{}: {}", operation, e)),
    }
}

#[derive(Clone)]
pub struct MongoStorage {
    collection: Collection<StudentDocument>,
    timeout: Duration,
}

impl MongoStorage {
    /// Connects to `uri` and pings `database` so an unreachable server is
    /// reported at startup.
    pub async fn connect(
        uri: &str,
        database: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut options = with_timeout(timeout, "Parse MongoDB uri", async {
            ClientOptions::parse(uri).await.map_err(|e| {
                Error::Connection(format!("Invalid MongoDB uri: {}", e))
            })
        })
        .await?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("students-api".to_owned());

        let client = Client::with_options(options).map_err(|e| {
            Error::Connection(format!("MongoDB fail open connection: {}", e))
        })?;
        let db = client.database(database);

        with_timeout(timeout, "Ping MongoDB", async {
            db.run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| map_err("Ping MongoDB", e))
        })
        .await?;

        debug!(TARGET_MONGO, "MongoDB storage ready, database {}", database);
        Ok(MongoStorage {
            collection: db.collection::<StudentDocument>(COLLECTION),
            timeout,
        })
    }
}

#[async_trait]
impl Storage for MongoStorage {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    fn id_policy(&self) -> IdPolicy {
        IdPolicy::Stable
    }

    fn parse_id(&self, raw: &str) -> Result<StudentId, Error> {
        StudentId::parse_object(raw)
    }

    async fn create_student(&self, data: &StudentData) -> Result<StudentId, Error> {
        let document = StudentDocument::from(data);
        let result = with_timeout(self.timeout, "Insert student", async {
            self.collection
                .insert_one(document)
                .await
                .map_err(|e| map_err("Insert student", e))
        })
        .await?;

        match result.inserted_id.as_object_id() {
            Some(id) => Ok(StudentId::Object(id.to_hex())),
            None => Err(Error::Query(format!(
                "inserted id {} is not an object id",
                result.inserted_id
            ))),
        }
    }

    async fn get_student_by_id(&self, id: &StudentId) -> Result<Student, Error> {
        let oid = object_id(id)?;
        let document = with_timeout(self.timeout, "Find student by id", async {
            self.collection
                .find_one(doc! { "_id": oid })
                .await
                .map_err(|e| map_err("Find student by id", e))
        })
        .await?;

        match document {
            Some(document) => Student::try_from(document),
            None => Err(Error::NotFound(format!("no student with id {}", id))),
        }
    }

    async fn get_student_by_age(&self, age: i32) -> Result<Student, Error> {
        let document = with_timeout(self.timeout, "Find student by age", async {
            self.collection
                .find_one(doc! { "age": age })
                .await
                .map_err(|e| map_err("Find student by age", e))
        })
        .await?;

        match document {
            Some(document) => Student::try_from(document),
            None => Err(Error::NotFound(format!("no student with age {}", age))),
        }
    }

    async fn get_students(&self) -> Result<Vec<Student>, Error> {
        let documents = with_timeout(self.timeout, "Find students", async {
            let cursor = self
                .collection
                .find(doc! {})
                .await
                .map_err(|e| map_err("Find students", e))?;
            cursor
                .try_collect::<Vec<StudentDocument>>()
                .await
                .map_err(|e| map_err("Read students cursor", e))
        })
        .await?;

        documents.into_iter().map(Student::try_from).collect()
    }

    async fn delete_student_by_id(&self, id: &StudentId) -> Result<(), Error> {
        let oid = object_id(id)?;
        with_timeout(self.timeout, "Delete student", async {
            self.collection
                .delete_one(doc! { "_id": oid })
                .await
                .map_err(|e| map_err("Delete student", e))
        })
        .await?;
        Ok(())
    }

    /// Object ids are not sequential, so there is no counter to reset.
    async fn delete_all_students(&self) -> Result<(), Error> {
        with_timeout(self.timeout, "Delete all students", async {
            self.collection
                .delete_many(doc! {})
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
        let oid = object_id(id)?;
        let update = doc! {
            "$set": {
                "name": data.name.as_str(),
                "email": data.email.as_str(),
                "age": data.age,
            }
        };
        with_timeout(self.timeout, "Update student", async {
            self.collection
                .update_one(doc! { "_id": oid }, update)
                .await
                .map_err(|e| map_err("Update student", e))
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let document =
            StudentDocument::from(&StudentData::new("Ada", "ada@uni.edu", 21));
        let bson = mongodb::bson::to_document(&document).unwrap();
        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_i32("age").unwrap(), 21);

        let oid = ObjectId::new();
        let student = Student::try_from(StudentDocument {
            id: Some(oid),
            ..document
        })
        .unwrap();
        assert_eq!(student.id, StudentId::Object(oid.to_hex()));
    }

    #[test]
    fn test_object_id() {
        let oid = ObjectId::new();
        assert_eq!(
            object_id(&StudentId::Object(oid.to_hex())).unwrap(),
            oid
        );
        assert!(matches!(
            object_id(&StudentId::Object("zz".to_owned())),
            Err(Error::InvalidId(_))
        ));
        assert!(matches!(
            object_id(&StudentId::Sequence(1)),
            Err(Error::InvalidId(_))
        ));

        let digits = StudentId::parse_object("000000000000000000000001").unwrap();
        assert_eq!(object_id(&digits).unwrap().to_hex(), "000000000000000000000001");
    }
}
