use crate::{
    server::*,
    wrappers::{ErrorInfo, StatusInfo, StudentIdInfo, StudentInfo, StudentRequest},
};
use utoipa::OpenApi;
/// Students HTTP
///
/// This API manages student records (name, email and age) stored in SQLite,
/// PostgreSQL or MongoDB. The storage engine is chosen in the settings file.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Students HTTP",
        description = "This API manages student records (name, email and age). Records can be created, listed, fetched by id or by age, updated and deleted.",
        version = "0.1.0",
        contact(
            name = "Kore Information",
            url = "https://www.kore-ledger.net/",
            email = "info@kore-ledger.net"
        ),
        license(
            name = "AGPL-3.0-only",
            url = "https://www.gnu.org/licenses/agpl-3.0.html"
        )
    ),
    paths(
        create_student,
        get_student_by_id,
        get_student_by_age,
        get_students,
        update_student_by_id,
        delete_student_by_id,
        delete_all_students
    ),
    components(
        schemas(
            StudentIdInfo,
            StudentInfo,
            StudentRequest,
            StatusInfo,
            ErrorInfo
        )
    ),
    tags(
        (name = "Students", description = "Student records")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/students/"));
        assert!(doc.paths.paths.contains_key("/api/students/{id}"));
        assert!(doc.paths.paths.contains_key("/api/students/id/{id}"));
    }
}
