use std::sync::Arc;

use crate::{
    enviroment::build_doc,
    error::Error,
    wrappers::{ErrorInfo, StatusInfo, StudentInfo, StudentRequest},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use students_bridge::{Bridge, StudentData};
use tower::ServiceBuilder;

use crate::doc::ApiDoc;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

fn request_body(
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<StudentData, Error> {
    match payload {
        Ok(Json(request)) => Ok(StudentData::from(request)),
        Err(e) => Err(Error::BadRequest(format!("Invalid body: {}", e))),
    }
}

/// Create Student
///
/// Stores a new student and returns it with the identifier assigned by the storage.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
/// * `payload: Result<Json<StudentRequest>, JsonRejection>` - Name, email and age of the student.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<StudentInfo>), Error>` - 201 with the created student, or an error.
#[utoipa::path(
    post,
    path = "/api/students/",
    operation_id = "Create Student",
    tag = "Students",
    request_body(content = StudentRequest, content_type = "application/json", description = "Student data"),
    responses(
        (status = 201, description = "Student Created Successfully", body = StudentInfo,
        example = json!(
            {
                "id": 1,
                "name": "Ada",
                "email": "ada@uni.edu",
                "age": 21
            }
        )),
        (status = 400, description = "Invalid student data", body = ErrorInfo),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn create_student(
    Extension(bridge): Extension<Arc<Bridge>>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentInfo>), Error> {
    let data = request_body(payload)?;
    match bridge.create_student(data).await {
        Ok(response) => {
            Ok((StatusCode::CREATED, Json(StudentInfo::from(response))))
        }
        Err(e) => Err(Error::from(e)),
    }
}

/// Student by id
///
/// Allows obtaining a student by its identifier.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
/// * `Path(id): Path<String>` - Integer id, or object id for the document store.
///
/// # Returns
///
/// * `Result<Json<StudentInfo>, Error>` - The student, or 404 when the id is unknown.
#[utoipa::path(
    get,
    path = "/api/students/id/{id}",
    operation_id = "Student by id",
    tag = "Students",
    params(
        ("id" = String, Path, description = "Student's unique id"),
    ),
    responses(
        (status = 200, description = "Student successfully retrieved", body = StudentInfo),
        (status = 400, description = "Invalid id", body = ErrorInfo),
        (status = 404, description = "Student not found", body = ErrorInfo),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn get_student_by_id(
    Extension(bridge): Extension<Arc<Bridge>>,
    Path(id): Path<String>,
) -> Result<Json<StudentInfo>, Error> {
    match bridge.get_student_by_id(id).await {
        Ok(response) => Ok(Json(StudentInfo::from(response))),
        Err(e) => Err(Error::from(e)),
    }
}

/// Student by age
///
/// Returns the first student whose age matches exactly.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
/// * `Path(age): Path<String>` - The age to look for.
///
/// # Returns
///
/// * `Result<Json<StudentInfo>, Error>` - One matching student, or 404 when there is none.
#[utoipa::path(
    get,
    path = "/api/students/{age}",
    operation_id = "Student by age",
    tag = "Students",
    params(
        ("age" = i32, Path, description = "Student's age"),
    ),
    responses(
        (status = 200, description = "Student successfully retrieved", body = StudentInfo),
        (status = 400, description = "Age is not a number", body = ErrorInfo),
        (status = 404, description = "No student with that age", body = ErrorInfo),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn get_student_by_age(
    Extension(bridge): Extension<Arc<Bridge>>,
    Path(age): Path<String>,
) -> Result<Json<StudentInfo>, Error> {
    let age = age
        .parse::<i32>()
        .map_err(|e| Error::BadRequest(format!("Invalid age {}: {}", age, e)))?;
    match bridge.get_student_by_age(age).await {
        Ok(response) => Ok(Json(StudentInfo::from(response))),
        Err(e) => Err(Error::from(e)),
    }
}

/// Students
///
/// Lists every stored student.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
///
/// # Returns
///
/// * `Result<Json<Vec<StudentInfo>>, Error>` - All students, or an error.
#[utoipa::path(
    get,
    path = "/api/students/",
    operation_id = "Students",
    tag = "Students",
    responses(
        (status = 200, description = "Students successfully retrieved", body = [StudentInfo]),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn get_students(
    Extension(bridge): Extension<Arc<Bridge>>,
) -> Result<Json<Vec<StudentInfo>>, Error> {
    match bridge.get_students().await {
        Ok(response) => Ok(Json(
            response.into_iter().map(StudentInfo::from).collect(),
        )),
        Err(e) => Err(Error::from(e)),
    }
}

/// Update Student
///
/// Overwrites name, email and age of a student. An unknown id is not an error.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
/// * `Path(id): Path<String>` - The identifier of the student.
/// * `payload: Result<Json<StudentRequest>, JsonRejection>` - The new student data.
///
/// # Returns
///
/// * `Result<Json<StudentInfo>, Error>` - The student as written, or an error.
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    operation_id = "Update Student",
    tag = "Students",
    request_body(content = StudentRequest, content_type = "application/json", description = "Student data"),
    params(
        ("id" = String, Path, description = "Student's unique id"),
    ),
    responses(
        (status = 200, description = "Student Updated Successfully", body = StudentInfo),
        (status = 400, description = "Invalid id or student data", body = ErrorInfo),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn update_student_by_id(
    Extension(bridge): Extension<Arc<Bridge>>,
    Path(id): Path<String>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<Json<StudentInfo>, Error> {
    let data = request_body(payload)?;
    match bridge.update_student_by_id(id, data).await {
        Ok(response) => Ok(Json(StudentInfo::from(response))),
        Err(e) => Err(Error::from(e)),
    }
}

/// Delete Student
///
/// Removes a student. With the SQLite storage the remaining ids are renumbered from 1.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
/// * `Path(id): Path<String>` - The identifier of the student.
///
/// # Returns
///
/// * `Result<Json<StatusInfo>, Error>` - `{"status": "OK"}` or an error.
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    operation_id = "Delete Student",
    tag = "Students",
    params(
        ("id" = String, Path, description = "Student's unique id"),
    ),
    responses(
        (status = 200, description = "Student Deleted", body = StatusInfo,
        example = json!({ "status": "OK" })),
        (status = 400, description = "Invalid id", body = ErrorInfo),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn delete_student_by_id(
    Extension(bridge): Extension<Arc<Bridge>>,
    Path(id): Path<String>,
) -> Result<Json<StatusInfo>, Error> {
    match bridge.delete_student_by_id(id).await {
        Ok(_) => Ok(Json(StatusInfo::ok())),
        Err(e) => Err(Error::from(e)),
    }
}

/// Delete Students
///
/// Removes every student and restarts the id sequence.
///
/// # Parameters
///
/// * `Extension(bridge): Extension<Arc<Bridge>>` - The Bridge extension wrapped in an `Arc`.
///
/// # Returns
///
/// * `Result<Json<StatusInfo>, Error>` - `{"status": "OK"}` or an error.
#[utoipa::path(
    delete,
    path = "/api/students/",
    operation_id = "Delete Students",
    tag = "Students",
    responses(
        (status = 200, description = "Students Deleted", body = StatusInfo,
        example = json!({ "status": "OK" })),
        (status = 500, description = "Internal Server Error", body = ErrorInfo),
    )
)]
async fn delete_all_students(
    Extension(bridge): Extension<Arc<Bridge>>,
) -> Result<Json<StatusInfo>, Error> {
    match bridge.delete_all_students().await {
        Ok(_) => Ok(Json(StatusInfo::ok())),
        Err(e) => Err(Error::from(e)),
    }
}

pub fn build_routes(bridge: Bridge) -> Router {
    let bridge = Arc::new(bridge);
    let routes = Router::new()
        .route(
            "/api/students",
            get(get_students).post(create_student).delete(delete_all_students),
        )
        .route(
            "/api/students/",
            get(get_students).post(create_student).delete(delete_all_students),
        )
        .route(
            "/api/students/{key}",
            get(get_student_by_age)
                .put(update_student_by_id)
                .delete(delete_student_by_id),
        )
        .route("/api/students/id/{id}", get(get_student_by_id))
        .layer(ServiceBuilder::new().layer(Extension(bridge)));

    if build_doc() {
        Router::new().merge(routes).merge(
            RapiDoc::with_openapi("/doc/studentsapi.json", ApiDoc::openapi())
                .path("/doc"),
        )
    } else {
        Router::new().merge(routes)
    }
}
