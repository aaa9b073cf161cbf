// src/services/accounts.rs
//! Login, registration and profile lookup.
//!
//! Password hashing is CPU bound, so it runs on the blocking pool.

use log::info;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::WalletError;
use crate::models::user::{NewUser, PublicUser};
use crate::services::auth::SessionKeys;
use crate::storage::Storage;
use crate::utils::crypto::{hash_password, verify_password};

/// A session token together with the profile it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Self-service registration details.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub name: String,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Storage>,
    sessions: SessionKeys,
    /// Held across the username check and the insert
    registration: Arc<Mutex<()>>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Storage>, sessions: SessionKeys) -> Self {
        Self {
            store,
            sessions,
            registration: Arc::new(Mutex::new(())),
        }
    }

    async fn username_taken(&self, username: &str) -> Result<bool, WalletError> {
        Ok(self.store.get_user_by_username(username).await?.is_some())
    }

    /// Checks a username/password pair and opens a session.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, WalletError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(WalletError::InvalidCredentials)?;

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|_| WalletError::PasswordHash)?;
        if !matches {
            return Err(WalletError::InvalidCredentials);
        }

        info!("{} logged in", user.username);
        Ok(Session {
            token: self.sessions.issue(&user)?,
            user: PublicUser::from(&user),
        })
    }

    /// Creates a student account and opens a session for it.
    ///
    /// The username doubles as the student id. Self-registered accounts are
    /// never admins.
    ///
    /// # Errors
    /// Returns [`WalletError::Conflict`] when the username is taken.
    pub async fn register(&self, registration: Registration) -> Result<Session, WalletError> {
        if self.username_taken(&registration.username).await? {
            return Err(WalletError::Conflict("Username already exists".into()));
        }

        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| WalletError::PasswordHash)??;

        let _guard = self.registration.lock().await;
        if self.username_taken(&registration.username).await? {
            return Err(WalletError::Conflict("Username already exists".into()));
        }
        let user = self
            .store
            .create_user(NewUser {
                student_id: Some(registration.username.clone()),
                username: registration.username,
                password_hash,
                name: registration.name,
                institution: registration.institution,
                course: registration.course,
                year: registration.year,
                email: registration.email,
                phone: registration.phone,
                is_admin: false,
            })
            .await?;

        info!("registered {}", user.username);
        Ok(Session {
            token: self.sessions.issue(&user)?,
            user: PublicUser::from(&user),
        })
    }

    /// Profile of the user with internal id `id`.
    pub async fn me(&self, id: &str) -> Result<PublicUser, WalletError> {
        self.store
            .get_user(id)
            .await?
            .map(|user| PublicUser::from(&user))
            .ok_or_else(|| WalletError::NotFound("User".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemStorage;
    use crate::storage::seed::seed_demo_data;

    async fn accounts() -> (AccountService, SessionKeys) {
        let store = Arc::new(MemStorage::new());
        seed_demo_data(store.as_ref(), "https://csvtu.ac.in/registrar")
            .await
            .unwrap();
        let keys = SessionKeys::new(b"accounts-test", 24);
        (AccountService::new(store, keys.clone()), keys)
    }

    #[tokio::test]
    async fn test_login_with_seeded_admin() {
        let (accounts, keys) = accounts().await;
        let session = accounts.login("admin", "admin123").await.unwrap();

        assert!(session.user.is_admin);
        let caller = keys.authenticate(&session.token).unwrap();
        assert_eq!(caller.id, session.user.id);
        assert!(caller.is_admin);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (accounts, _) = accounts().await;
        assert!(matches!(
            accounts.login("2024CSE001", "wrong").await,
            Err(WalletError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login("ghost", "student123").await,
            Err(WalletError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login_and_me() {
        let (accounts, _) = accounts().await;
        let session = accounts
            .register(Registration {
                username: "2024CSE077".into(),
                password: "hunter22".into(),
                name: "Meera Sahu".into(),
                course: Some("BTech CSE".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!session.user.is_admin);
        assert_eq!(session.user.student_id.as_deref(), Some("2024CSE077"));

        let again = accounts.login("2024CSE077", "hunter22").await.unwrap();
        assert_eq!(again.user, session.user);
        assert_eq!(accounts.me(&session.user.id).await.unwrap(), session.user);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (accounts, _) = accounts().await;
        let result = accounts
            .register(Registration {
                username: "admin".into(),
                password: "x".into(),
                name: "Impostor".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(WalletError::Conflict(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_of_one_username() {
        let (accounts, _) = accounts().await;
        let registration = |name: &str| Registration {
            username: "2024CSE099".into(),
            password: "pw".into(),
            name: name.into(),
            ..Default::default()
        };

        let (first, second) = tokio::join!(
            accounts.register(registration("First")),
            accounts.register(registration("Second"))
        );

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        assert!(matches!(
            first.err().or(second.err()),
            Some(WalletError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_me_for_unknown_id() {
        let (accounts, _) = accounts().await;
        assert!(matches!(
            accounts.me("nope").await,
            Err(WalletError::NotFound(_))
        ));
    }
}
