use thiserror::Error;

/// Failures talking to a completion provider.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("No completion returned: {0}")]
    EmptyResponse(String),

    #[error("Could not decode API response: {0}")]
    Decode(String),
}

/// Why a model response could not be turned into a design or project.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no JSON object found in the AI response")]
    NoObjectFound,

    #[error("malformed JSON in the AI response: {0}")]
    Malformed(String),

    #[error("the AI response did not contain any files")]
    EmptyProject,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(String),
}

/// Rejected hand edits to a project's file list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("Please enter a file name")]
    EmptyFileName,

    #[error("A file with this name already exists: {0}")]
    DuplicateFile(String),

    #[error("Cannot delete the entry file: {0}")]
    EntryFileProtected(String),

    #[error("No such file: {0}")]
    UnknownFile(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
