use serde::{Deserialize, Serialize};
use students_bridge::{Student, StudentData, StudentId};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(untagged)]
pub enum StudentIdInfo {
    /// Integer key of the relational engines.
    Sequence(i64),
    /// Hex object id of the document store.
    Object(String),
}

impl From<StudentId> for StudentIdInfo {
    fn from(value: StudentId) -> Self {
        match value {
            StudentId::Sequence(id) => StudentIdInfo::Sequence(id),
            StudentId::Object(id) => StudentIdInfo::Object(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct StudentInfo {
    pub id: StudentIdInfo,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl From<Student> for StudentInfo {
    fn from(value: Student) -> Self {
        Self {
            id: StudentIdInfo::from(value.id),
            name: value.name,
            email: value.email,
            age: value.age,
        }
    }
}

/// Body of create and update requests. Missing fields are left empty and
/// rejected by validation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: i32,
}

impl From<StudentRequest> for StudentData {
    fn from(value: StudentRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            age: value.age,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusInfo {
    pub status: String,
}

impl StatusInfo {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorInfo {
    pub status: String,
    pub error: String,
}

impl ErrorInfo {
    pub fn new(error: String) -> Self {
        Self {
            status: "Error".to_owned(),
            error,
        }
    }
}
