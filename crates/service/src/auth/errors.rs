use models::errors::ModelError;
use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::DuplicateEmail => 1002,
            AuthError::UserNotFound => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::HashError(_) => 1101,
            AuthError::StoreUnavailable(_) => 1200,
        }
    }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => AuthError::Validation(msg),
            ModelError::DuplicateKey(_) => AuthError::DuplicateEmail,
            ModelError::Db(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_auth_errors() {
        assert!(matches!(AuthError::from(ModelError::Validation("x".into())), AuthError::Validation(_)));
        assert!(matches!(AuthError::from(ModelError::DuplicateKey("E11000".into())), AuthError::DuplicateEmail));
        assert!(matches!(AuthError::from(ModelError::Db("down".into())), AuthError::StoreUnavailable(_)));
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            AuthError::Validation(String::new()),
            AuthError::DuplicateEmail,
            AuthError::UserNotFound,
            AuthError::InvalidCredentials,
            AuthError::HashError(String::new()),
            AuthError::StoreUnavailable(String::new()),
        ];
        let mut codes: Vec<u16> = all.iter().map(AuthError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
