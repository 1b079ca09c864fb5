use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::ValidateEmail;

use crate::errors::ModelError;

pub const EMAIL_INDEX_NAME: &str = "email_unique";

/// Stored user record. Documents written before password hashing existed carry a
/// plaintext `password` field instead; it is ignored and `password_hash` reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl UserDocument {
    pub fn new(username: &str, email: &str, password_hash: String, password_algorithm: &str) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            password_algorithm: Some(password_algorithm.to_string()),
            created_at: Some(DateTime::now()),
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() {
        return Err(ModelError::Validation("email required".into()));
    }
    if !email.validate_email() {
        return Err(ModelError::Validation("invalid email".into()));
    }
    let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ModelError::Validation("invalid email domain".into()));
    }
    Ok(())
}

/// Canonical form used for lookup and storage: trimmed, domain lowercased,
/// local part untouched. Validates as a side effect.
pub fn normalize_email(email: &str) -> Result<String, ModelError> {
    let email = email.trim();
    validate_email(email)?;
    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| ModelError::Validation("invalid email".into()))?;
    Ok(format!("{local}@{}", domain.to_lowercase()))
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() {
        return Err(ModelError::Validation("username required".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.trim().is_empty() {
        return Err(ModelError::Validation("password required".into()));
    }
    Ok(())
}

/// Create the unique index on `email`. Idempotent; MongoDB accepts a repeat of an
/// identical index definition.
pub async fn ensure_indexes(users: &Collection<UserDocument>) -> Result<(), ModelError> {
    let model = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).name(EMAIL_INDEX_NAME.to_string()).build())
        .build();
    let res = users.create_index(model).await?;
    debug!(index = %res.index_name, "users index ensured");
    Ok(())
}

pub async fn find_by_email(users: &Collection<UserDocument>, email: &str) -> Result<Option<UserDocument>, ModelError> {
    let found = users.find_one(doc! { "email": email }).await?;
    Ok(found)
}

/// Insert and return the document with its store-assigned id.
pub async fn insert(users: &Collection<UserDocument>, mut user: UserDocument) -> Result<UserDocument, ModelError> {
    let res = users.insert_one(&user).await?;
    let id = res
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ModelError::Db(format!("unexpected inserted id: {}", res.inserted_id)))?;
    user.id = Some(id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn email_syntax() {
        assert!(validate_email("alice@x.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("  Alice@X.COM ").unwrap(), "Alice@x.com");
        assert_eq!(normalize_email("alice@x.com").unwrap(), "alice@x.com");
        assert!(matches!(normalize_email("a@b"), Err(ModelError::Validation(_))));
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn blank_fields_rejected() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username(" \t ").is_err());
        assert!(validate_password("pw123").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn new_document_has_no_id_and_skips_it_on_write() {
        let u = UserDocument::new("alice", "alice@x.com", "$argon2id$...".into(), "argon2id");
        let d = bson::to_document(&u).unwrap();
        assert!(!d.contains_key("_id"));
        assert_eq!(d.get_str("email").unwrap(), "alice@x.com");
        assert!(!d.contains_key("password"));
    }

    #[test]
    fn legacy_plaintext_document_reads_without_hash() {
        let oid = ObjectId::new();
        let d = doc! { "_id": oid, "username": "old", "email": "old@x.com", "password": "pw" };
        let u: UserDocument = bson::from_document(d).unwrap();
        assert_eq!(u.id, Some(oid));
        assert!(u.password_hash.is_none());
    }
}
