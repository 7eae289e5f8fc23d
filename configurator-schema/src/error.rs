use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors surfaced while reading a schema document from text.
///
/// Shape problems inside a well-formed JSON document never produce an error;
/// ingestion skips what it cannot use. Only text that is not JSON at all ends up here.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("JSON parse error at line {line}, column {column}: {message}")]
    JsonError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to read schema '{path}': {reason}")]
    ReadError { path: String, reason: String },
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::JsonError {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}
