use async_trait::async_trait;

use super::domain::{AuthUser, NewUser, UserRecord};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// `create_user` must report a unique-email violation as [`AuthError::DuplicateEmail`];
/// callers rely on that rather than on an earlier lookup.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
    async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError>;
    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Ids are handed out as `u1`, `u2`, ... in insertion order.
    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, UserRecord>>, // key: email
        next_id: AtomicUsize,
        calls: AtomicUsize,
        unavailable: bool,
        stale_reads: bool,
    }

    impl MockAuthRepository {
        /// Every call fails with `StoreUnavailable`.
        pub fn unavailable() -> Self {
            Self { unavailable: true, ..Self::default() }
        }

        /// Lookups never see existing rows, as when a concurrent registration
        /// lands between the check and the insert.
        pub fn with_stale_reads() -> Self {
            Self { stale_reads: true, ..Self::default() }
        }

        /// Number of store operations issued so far (lookups, inserts, pings).
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Stored record for inspection in tests.
        pub fn get(&self, email: &str) -> Option<UserRecord> {
            self.users.lock().unwrap().get(email).cloned()
        }

        /// Seed a record directly, bypassing hashing.
        pub fn insert_raw(&self, record: UserRecord) {
            self.users.lock().unwrap().insert(record.user.email.clone(), record);
        }

        fn enter(&self) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(AuthError::StoreUnavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            self.enter()?;
            if self.stale_reads {
                return Ok(None);
            }
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
            self.enter()?;
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&new_user.email) {
                return Err(AuthError::DuplicateEmail);
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let user = AuthUser { id: format!("u{n}"), username: new_user.username, email: new_user.email };
            users.insert(
                user.email.clone(),
                UserRecord {
                    user: user.clone(),
                    password_hash: Some(new_user.password_hash),
                    password_algorithm: Some(new_user.password_algorithm),
                },
            );
            Ok(user)
        }

        async fn ping(&self) -> Result<(), AuthError> {
            self.enter()
        }
    }
}
