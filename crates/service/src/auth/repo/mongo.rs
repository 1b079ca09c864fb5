use async_trait::async_trait;
use models::db::Store;
use models::user::{self, UserDocument};
use tracing::error;

use crate::auth::domain::{AuthUser, NewUser, UserRecord};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

/// Users collection backed by MongoDB. Email uniqueness is enforced by the
/// `email_unique` index created through [`user::ensure_indexes`].
#[derive(Clone)]
pub struct MongoAuthRepository {
    store: Store,
}

impl MongoAuthRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AuthError> {
        user::ensure_indexes(&self.store.users()).await?;
        Ok(())
    }
}

fn to_record(doc: UserDocument) -> Result<UserRecord, AuthError> {
    let id = doc
        .id
        .ok_or_else(|| AuthError::StoreUnavailable("user document without _id".into()))?;
    Ok(UserRecord {
        user: AuthUser { id: id.to_hex(), username: doc.username, email: doc.email },
        password_hash: doc.password_hash,
        password_algorithm: doc.password_algorithm,
    })
}

#[async_trait]
impl AuthRepository for MongoAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let found = user::find_by_email(&self.store.users(), email).await.map_err(|e| {
            error!(error = %e, "user lookup failed");
            AuthError::from(e)
        })?;
        found.map(to_record).transpose()
    }

    async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
        let doc = UserDocument::new(
            &new_user.username,
            &new_user.email,
            new_user.password_hash,
            &new_user.password_algorithm,
        );
        let created = user::insert(&self.store.users(), doc).await?;
        Ok(to_record(created)?.user)
    }

    async fn ping(&self) -> Result<(), AuthError> {
        self.store.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configs::DatabaseConfig;
    use models::db::Store;

    #[test]
    fn document_without_id_is_rejected() {
        let doc = UserDocument::new("a", "a@x.com", "h".into(), "argon2id");
        assert!(matches!(to_record(doc), Err(AuthError::StoreUnavailable(_))));
    }

    // Runs only against a live server: MONGODB_URL=mongodb://localhost:27017 cargo test
    #[tokio::test]
    async fn unique_index_reports_duplicate_email() -> Result<(), Box<dyn std::error::Error>> {
        let url = match std::env::var("MONGODB_URL") {
            Ok(u) if std::env::var("SKIP_DB_TESTS").is_err() => u,
            _ => return Ok(()),
        };
        let cfg = DatabaseConfig {
            url,
            name: format!("accounts_test_{}", std::process::id()),
            ..DatabaseConfig::default()
        };
        let store = Store::connect(&cfg).await?;
        let repo = MongoAuthRepository::new(store.clone());
        repo.ensure_indexes().await?;

        let new_user = NewUser {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$placeholder".into(),
            password_algorithm: "argon2id".into(),
        };
        let created = repo.create_user(new_user.clone()).await?;
        assert_eq!(created.id.len(), 24);

        let again = repo.create_user(new_user).await;
        assert!(matches!(again, Err(AuthError::DuplicateEmail)));

        let found = repo.find_user_by_email("alice@x.com").await?.expect("inserted user");
        assert_eq!(found.user.id, created.id);

        store.database().drop().await?;
        store.close().await;
        Ok(())
    }
}
