use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<mongodb::error::Error> for ModelError {
    fn from(e: mongodb::error::Error) -> Self {
        if crate::db::is_duplicate_key(&e) {
            ModelError::DuplicateKey(e.to_string())
        } else {
            ModelError::Db(e.to_string())
        }
    }
}
