//! Error types for the playbook core

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaybookError>;

#[derive(Error, Debug)]
pub enum PlaybookError {
    #[error("Unsupported search type: {0}")]
    UnsupportedSearchType(String),

    #[error("Unsupported storage type: {0}")]
    UnsupportedStorageType(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Playbook file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
