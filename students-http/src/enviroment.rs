use std::env;

pub fn build_doc() -> bool {
    env::var("STUDENTS_HTTP_DOC").unwrap_or_default() == "true"
}
