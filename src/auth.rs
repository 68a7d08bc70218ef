//! Signup, signin and refresh flows.
//!
//! One refresh token is stored per user; a new signin overwrites it so the
//! previous session can no longer mint access tokens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{CryptoError, PasswordManager};
use crate::error::{Result, ServerError};
use crate::token::{TokenKind, TokenManager};
use crate::user::{NewUser, UserRepository};

/// Tokens handed out on signin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<PasswordManager>,
    tokens: TokenManager,
}

/// Run Argon2 work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, CryptoError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ServerError::Internal {
            details: "password task failed".into(),
            source: Some(Box::new(err)),
        })?
        .map_err(ServerError::from)
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<PasswordManager>,
        tokens: TokenManager,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Register a new user with a hashed password.
    pub async fn signup(
        &self,
        name: String,
        email: String,
        password: &str,
    ) -> Result<()> {
        let passwords = Arc::clone(&self.passwords);
        let password = Zeroizing::new(password.to_owned());
        let password =
            blocking(move || passwords.hash_password(password.as_bytes()))
                .await?;

        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password: Some(password),
            })
            .await?;
        tracing::info!(user_id = %user.id, "user signed up");

        Ok(())
    }

    /// Check credentials and open a new session.
    pub async fn signin(&self, email: &str, password: &str) -> Result<Session> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        // Users created through the CRUD route have no password.
        let Some(hash) = user.password.clone() else {
            return Err(ServerError::Unauthorized("invalid credentials"));
        };
        let passwords = Arc::clone(&self.passwords);
        let password = Zeroizing::new(password.to_owned());
        let matches = blocking(move || {
            passwords.verify_password(password.as_bytes(), &hash)
        })
        .await?;
        if !matches {
            tracing::debug!(user_id = %user.id, "wrong password");
            return Err(ServerError::Unauthorized("invalid credentials"));
        }

        let user_id = user.id.to_string();
        let access_token = self.tokens.create(TokenKind::Access, &user_id)?;
        let refresh_token = self.tokens.create(TokenKind::Refresh, &user_id)?;

        self.users
            .set_refresh_token(user.id, Some(&refresh_token))
            .await?;
        tracing::info!(%user_id, "user signed in");

        Ok(Session {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a stored refresh token.
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(ServerError::Unauthorized("missing refresh token"))?;

        // Both secrets are needed before touching the store.
        self.tokens.secret(TokenKind::Refresh)?;
        self.tokens.secret(TokenKind::Access)?;

        let user = self
            .users
            .find_by_refresh_token(token)
            .await?
            .ok_or(ServerError::Forbidden)?;

        let claims = self.tokens.decode(TokenKind::Refresh, token)?;
        if claims.sub != user.id.to_string() {
            tracing::warn!(user_id = %user.id, "refresh token subject mismatch");
            return Err(ServerError::Forbidden);
        }

        Ok(self.tokens.create(TokenKind::Access, &claims.sub)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Secrets, Token as TokenConfig};
    use crate::database::memory::MemoryStore;
    use crate::token::{Secret, issue};

    fn service(store: Arc<MemoryStore>) -> AuthService {
        AuthService::new(
            store,
            Arc::new(crate::crypto::test_manager()),
            crate::token::test_manager(),
        )
    }

    async fn signed_up(store: &Arc<MemoryStore>) -> AuthService {
        let auth = service(Arc::clone(store));
        auth.signup("Alice".into(), "alice@x.com".into(), "hunter22")
            .await
            .unwrap();
        auth
    }

    #[tokio::test]
    async fn test_plaintext_never_stored() {
        let store = Arc::new(MemoryStore::default());
        signed_up(&store).await;

        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        let stored = user.password.unwrap();
        assert!(!stored.contains("hunter22"));
        assert!(stored.starts_with("$argon2id$"));
        assert!(user.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup() {
        let store = Arc::new(MemoryStore::default());
        let auth = signed_up(&store).await;

        let result = auth
            .signup("Other".into(), "alice@x.com".into(), "secret")
            .await;
        assert!(matches!(result, Err(ServerError::Store(_))));
    }

    #[tokio::test]
    async fn test_signin() {
        let store = Arc::new(MemoryStore::default());
        let auth = signed_up(&store).await;

        assert!(matches!(
            auth.signin("bob@x.com", "hunter22").await,
            Err(ServerError::NotFound("user"))
        ));
        assert!(matches!(
            auth.signin("alice@x.com", "wrong").await,
            Err(ServerError::Unauthorized(_))
        ));

        let session = auth.signin("alice@x.com", "hunter22").await.unwrap();
        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(user.refresh_token, Some(session.refresh_token.clone()));

        let access = auth.refresh(Some(&session.refresh_token)).await.unwrap();
        let claims = crate::token::test_manager()
            .decode(TokenKind::Access, &access)
            .unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[tokio::test]
    async fn test_second_signin_invalidates_first() {
        let store = Arc::new(MemoryStore::default());
        let auth = signed_up(&store).await;

        let first = auth.signin("alice@x.com", "hunter22").await.unwrap();
        let second = auth.signin("alice@x.com", "hunter22").await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        assert!(matches!(
            auth.refresh(Some(&first.refresh_token)).await,
            Err(ServerError::Forbidden)
        ));
        assert!(auth.refresh(Some(&second.refresh_token)).await.is_ok());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_runtime_free() {
        let passwords = PasswordManager::new(Some(crate::config::Argon2 {
            memory_cost: 4096,
            iterations: 2,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap();
        let auth = AuthService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(passwords),
            crate::token::test_manager(),
        );

        let signup = tokio::spawn(async move {
            auth.signup("Alice".into(), "alice@x.com".into(), "hunter22")
                .await
        });

        // Inline hashing would finish within a single poll.
        let mut polls = 0;
        while !signup.is_finished() {
            polls += 1;
            tokio::task::yield_now().await;
        }
        assert!(polls > 1);
        assert!(signup.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_refresh_missing_token() {
        let store = Arc::new(MemoryStore::default());
        let auth = service(store);

        assert!(matches!(
            auth.refresh(None).await,
            Err(ServerError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.refresh(Some("")).await,
            Err(ServerError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_bad_tokens() {
        let store = Arc::new(MemoryStore::default());
        let auth = signed_up(&store).await;
        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();

        // Stored but signed with another secret.
        let forged = issue(
            TokenKind::Refresh,
            &user.id.to_string(),
            &Secret::new("not-the-secret"),
            std::time::Duration::from_secs(60),
        )
        .unwrap();
        store.set_refresh_token(user.id, Some(&forged)).await.unwrap();
        assert!(matches!(
            auth.refresh(Some(&forged)).await,
            Err(ServerError::Forbidden)
        ));

        // Valid signature, subject of someone else.
        let stolen = crate::token::test_manager()
            .create(TokenKind::Refresh, "someone-else")
            .unwrap();
        store.set_refresh_token(user.id, Some(&stolen)).await.unwrap();
        assert!(matches!(
            auth.refresh(Some(&stolen)).await,
            Err(ServerError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_missing_secrets() {
        let store = Arc::new(MemoryStore::default());
        signed_up(&store).await;

        let tokens =
            TokenManager::new(&Secrets::default(), &TokenConfig::default())
                .unwrap();
        let auth = AuthService::new(
            store,
            Arc::new(crate::crypto::test_manager()),
            tokens,
        );

        assert!(matches!(
            auth.signin("alice@x.com", "hunter22").await,
            Err(ServerError::Configuration(_))
        ));
        assert!(matches!(
            auth.refresh(Some("token")).await,
            Err(ServerError::Configuration(_))
        ));
    }
}
