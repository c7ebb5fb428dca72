// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Student records.
//!

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier assigned by a backend when a record is created.
///
/// Relational backends hand out integer keys from a sequence. The document
/// store keeps its native object id, carried as its 24 digit hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    /// Integer key of a relational backend.
    Sequence(i64),
    /// Hex encoded object id of the document store.
    Object(String),
}

impl StudentId {
    pub fn as_sequence(&self) -> Result<i64, Error> {
        match self {
            StudentId::Sequence(id) => Ok(*id),
            StudentId::Object(id) => Err(Error::InvalidId(format!(
                "{} is not an integer id",
                id
            ))),
        }
    }

    pub fn as_object(&self) -> Result<&str, Error> {
        match self {
            StudentId::Object(id) => Ok(id),
            StudentId::Sequence(id) => Err(Error::InvalidId(format!(
                "{} is not an object id",
                id
            ))),
        }
    }

    /// Reads `s` as a document store key, even when it is all digits.
    pub fn parse_object(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidId("empty id".to_owned()));
        }
        Ok(StudentId::Object(s.to_owned()))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentId::Sequence(id) => write!(f, "{}", id),
            StudentId::Object(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for StudentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidId("empty id".to_owned()));
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(StudentId::Sequence(id)),
            Err(_) => Ok(StudentId::Object(s.to_owned())),
        }
    }
}

impl From<i64> for StudentId {
    fn from(value: i64) -> Self {
        StudentId::Sequence(value)
    }
}

/// A persisted student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl Student {
    pub fn new(id: StudentId, data: StudentData) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            age: data.age,
        }
    }

    /// Data fields without the identifier.
    pub fn data(&self) -> StudentData {
        StudentData {
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
        }
    }
}

/// Fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentData {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl StudentData {
    pub fn new(name: &str, email: &str, age: i32) -> Self {
        Self {
            name: name.to_owned(),
            email: email.to_owned(),
            age,
        }
    }

    /// Checks that every field carries a usable value.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_owned()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::Validation("email is required".to_owned()));
        }
        if !self.email.contains('@') {
            return Err(Error::Validation(format!(
                "{} is not a valid email",
                self.email
            )));
        }
        if self.age <= 0 {
            return Err(Error::Validation(format!(
                "age must be positive, got {}",
                self.age
            )));
        }
        Ok(())
    }
}

/// Subject a student can be enrolled in. Not exercised by any storage
/// operation yet, the embedded backend only creates its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub professor: String,
    pub marks: i32,
}
