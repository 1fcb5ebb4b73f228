use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate {entity_type} '{name}' in directory {directory}")]
    Duplicate {
        entity_type: String,
        name: String,
        directory: String,
    },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

impl LibraryError {
    pub(crate) fn directory_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Directory".to_string(),
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
