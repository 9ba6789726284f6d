use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanViewError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No {kind} with id '{id}' in the catalog")]
    MissingCatalogEntry { kind: &'static str, id: String },

    #[error("Page {page} does not exist (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanViewError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanViewError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for LoanViewError {
    fn from(e: serde_json::Error) -> Self {
        LoanViewError::Serialization(e.to_string())
    }
}
