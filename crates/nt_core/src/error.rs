use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid field '{0}' for Article")]
    InvalidField(String),

    #[error("Schema violation on '{field}': {message}")]
    SchemaViolation { field: String, message: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Recoverable failures while normalizing a raw scraped article.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("unparsable publish date '{0}'")]
    PublishDate(String),

    #[error("metadata field '{field}' is not a string")]
    Metadata { field: String },
}

pub type Result<T> = std::result::Result<T, Error>;
