use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory does not exist or is not accessible: {path}")]
    NotAccessible {
        path: String,
        details: String,
        code: Option<String>,
    },

    #[error("The specified path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Cannot read directory contents: {details}")]
    NotReadable { path: String, details: String },

    #[error("Error scanning directory: {details}")]
    WalkFailed { details: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
