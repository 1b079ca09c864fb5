use std::sync::Arc;

use models::user::{normalize_email, validate_password, validate_username};
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthUser, LoginInput, NewUser, RegisterInput};
use super::errors::AuthError;
use super::password::{self, PASSWORD_ALGORITHM};
use super::repository::AuthRepository;

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Register a new user with a hashed password.
    ///
    /// Input is validated before the store is touched. The lookup is only an early
    /// exit; a unique-index rejection on insert is reported as `DuplicateEmail` too.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo);
    /// let input = RegisterInput { username: "alice".into(), email: "alice@x.com".into(), password: "pw123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.id, "u1");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        validate_username(&input.username)?;
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        if self.repo.find_user_by_email(&email).await?.is_some() {
            debug!("email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = password::hash_password_blocking(input.password).await?;
        let user = self
            .repo
            .create_user(NewUser {
                username: input.username.trim().to_string(),
                email,
                password_hash,
                password_algorithm: PASSWORD_ALGORITHM.to_string(),
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Verify credentials and return the stored user. No session is created.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()));
    /// let registered = tokio_test::block_on(svc.register(RegisterInput { username: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// let user = tokio_test::block_on(svc.authenticate(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(user.id, registered.id);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<AuthUser, AuthError> {
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        let record = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let Some(hash) = record.password_hash else {
            warn!(user_id = %record.user.id, "stored user has no password hash");
            return Err(AuthError::InvalidCredentials);
        };
        if let Some(alg) = record.password_algorithm.as_deref().filter(|a| *a != PASSWORD_ALGORITHM) {
            warn!(user_id = %record.user.id, algorithm = %alg, "unsupported password algorithm");
            return Err(AuthError::InvalidCredentials);
        }
        if !password::verify_password_blocking(input.password, hash).await? {
            debug!(user_id = %record.user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %record.user.id, "user_authenticated");
        Ok(record.user)
    }

    /// Probe the store; any failure is reported as-is.
    pub async fn check_store(&self) -> Result<(), AuthError> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{AuthUser, UserRecord};
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        (repo.clone(), AuthService::new(repo))
    }

    fn reg(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput { username: username.into(), email: email.into(), password: password.into() }
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn alice_and_bob_scenario() {
        let (_repo, svc) = svc();
        let alice = svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        assert_eq!(alice.id, "u1");

        let signed_in = svc.authenticate(login("alice@x.com", "pw123")).await.unwrap();
        assert_eq!(signed_in.id, "u1");

        let wrong = svc.authenticate(login("alice@x.com", "wrong")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let bob = svc.register(reg("bob", "alice@x.com", "pw456")).await;
        assert!(matches!(bob, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let (repo, svc) = svc();
        svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        let rec = repo.get("alice@x.com").unwrap();
        let hash = rec.password_hash.unwrap();
        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(rec.password_algorithm.as_deref(), Some(PASSWORD_ALGORITHM));
    }

    #[tokio::test]
    async fn duplicate_email_rejected_regardless_of_other_fields() {
        let (repo, svc) = svc();
        svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        let again = svc.register(reg("someone else", "alice@x.com", "different")).await;
        assert!(matches!(again, Err(AuthError::DuplicateEmail)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn unique_constraint_is_authoritative_when_precheck_misses() {
        let repo = Arc::new(MockAuthRepository::with_stale_reads());
        let svc = AuthService::new(repo.clone());
        svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        let raced = svc.register(reg("bob", "alice@x.com", "pw456")).await;
        assert!(matches!(raced, Err(AuthError::DuplicateEmail)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_store() {
        let (repo, svc) = svc();
        let r = svc.register(reg("alice", "not-an-email", "pw123")).await;
        assert!(matches!(r, Err(AuthError::Validation(_))));
        let a = svc.authenticate(login("not-an-email", "pw123")).await;
        assert!(matches!(a, Err(AuthError::Validation(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn blank_fields_rejected_before_store() {
        let (repo, svc) = svc();
        assert!(matches!(svc.register(reg("  ", "a@x.com", "pw")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(reg("a", "a@x.com", " ")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.authenticate(login("a@x.com", "")).await, Err(AuthError::Validation(_))));
        assert_eq!(repo.calls(), 0);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn unknown_email_is_user_not_found() {
        let (_repo, svc) = svc();
        let r = svc.authenticate(login("nobody@x.com", "pw")).await;
        assert!(matches!(r, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn surrounding_whitespace_in_email_is_ignored() {
        let (_repo, svc) = svc();
        let u = svc.register(reg("alice", "  alice@x.com ", "pw123")).await.unwrap();
        assert_eq!(u.email, "alice@x.com");
        let again = svc.authenticate(login("alice@x.com", "pw123")).await.unwrap();
        assert_eq!(again.id, u.id);
    }

    #[tokio::test]
    async fn mixed_case_domain_is_the_same_mailbox() {
        let (repo, svc) = svc();
        let alice = svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        let bob = svc.register(reg("bob", "alice@X.COM", "pw456")).await;
        assert!(matches!(bob, Err(AuthError::DuplicateEmail)));
        assert_eq!(repo.len(), 1);

        let signed_in = svc.authenticate(login("alice@X.com", "pw123")).await.unwrap();
        assert_eq!(signed_in.id, alice.id);
    }

    #[tokio::test]
    async fn domain_without_dot_is_rejected() {
        let (repo, svc) = svc();
        assert!(matches!(svc.register(reg("a", "a@b", "pw")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.authenticate(login("a@b", "pw")).await, Err(AuthError::Validation(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn record_with_foreign_algorithm_cannot_sign_in() {
        let (repo, svc) = svc();
        repo.insert_raw(UserRecord {
            user: AuthUser { id: "old".into(), username: "old".into(), email: "old@x.com".into() },
            password_hash: Some(password::hash_password("pw").unwrap()),
            password_algorithm: Some("bcrypt".into()),
        });
        let r = svc.authenticate(login("old@x.com", "pw")).await;
        assert!(matches!(r, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn record_without_hash_cannot_sign_in() {
        let (repo, svc) = svc();
        repo.insert_raw(UserRecord {
            user: AuthUser { id: "legacy".into(), username: "old".into(), email: "old@x.com".into() },
            password_hash: None,
            password_algorithm: None,
        });
        let r = svc.authenticate(login("old@x.com", "pw")).await;
        assert!(matches!(r, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_unavailable() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::unavailable()));
        assert!(matches!(svc.register(reg("a", "a@x.com", "pw")).await, Err(AuthError::StoreUnavailable(_))));
        assert!(matches!(svc.authenticate(login("a@x.com", "pw")).await, Err(AuthError::StoreUnavailable(_))));
        assert!(matches!(svc.check_store().await, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn works_behind_a_trait_object() {
        let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo);
        let u = svc.register(reg("alice", "alice@x.com", "pw123")).await.unwrap();
        assert_eq!(svc.authenticate(login("alice@x.com", "pw123")).await.unwrap(), u);
        svc.check_store().await.unwrap();
    }
}
