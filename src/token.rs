//! Manage json web tokens.
//!
//! Access and refresh tokens are HS256 JWTs carrying the user identifier as
//! `sub`. Each kind is signed with its own secret so one leaked secret cannot
//! mint the other kind.

use std::fmt;
use std::time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH};

use axum::extract::FromRef;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::AppState;
use crate::config::{Secrets, Token as TokenConfig};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token failures. Verification failures stay distinct even though HTTP
/// callers answer all three with the same status.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("missing {0} token secret")]
    MissingSecret(TokenKind),
    #[error("access and refresh tokens must use distinct secrets")]
    SharedSecret,
    #[error("token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error(transparent)]
    Clock(#[from] SystemTimeError),
    #[error("{0} token lifetime overflows the expiration time")]
    Lifetime(TokenKind),
}

/// Kind of token, each kind owns its secret and lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Unique identifier, two tokens never share one.
    pub jti: String,
}

/// HMAC signing secret, wiped from memory on drop.
#[derive(Clone)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Zeroizing::new(secret.as_ref().to_vec()))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

fn now() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Sign a new token for `user_id`, valid for `ttl`.
pub fn issue(
    kind: TokenKind,
    user_id: &str,
    secret: &Secret,
    ttl: Duration,
) -> Result<String, TokenError> {
    issue_at(kind, user_id, secret, ttl, now()?)
}

/// Same as [`issue`] with an explicit issuing time, in seconds.
pub(crate) fn issue_at(
    kind: TokenKind,
    user_id: &str,
    secret: &Secret,
    ttl: Duration,
    issued_at: u64,
) -> Result<String, TokenError> {
    let exp = issued_at
        .checked_add(ttl.as_secs())
        .ok_or(TokenError::Lifetime(kind))?;
    let claims = Claims {
        sub: user_id.to_owned(),
        iat: issued_at,
        exp,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    tracing::trace!(%kind, user_id, exp = claims.exp, "issuing token");

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Encoding)
}

/// Decode and check a token against `secret`.
pub fn verify(token: &str, secret: &Secret) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
    })
}

/// Manage JWT tokens with process-wide secrets.
#[derive(Clone, Debug)]
pub struct TokenManager {
    access: Option<Secret>,
    refresh: Option<Secret>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    /// Create a new [`TokenManager`].
    ///
    /// Missing secrets are accepted here and reported when a token of that
    /// kind is needed; identical secrets are rejected.
    pub fn new(
        secrets: &Secrets,
        config: &TokenConfig,
    ) -> Result<Self, TokenError> {
        if secrets.access.is_some() && secrets.access == secrets.refresh {
            return Err(TokenError::SharedSecret);
        }

        Ok(Self {
            access: secrets.access.as_ref().map(Secret::new),
            refresh: secrets.refresh.as_ref().map(Secret::new),
            access_ttl: Duration::from_secs(config.access_ttl),
            refresh_ttl: Duration::from_secs(config.refresh_ttl),
        })
    }

    /// Whether both secrets are set.
    pub fn is_configured(&self) -> bool {
        self.access.is_some() && self.refresh.is_some()
    }

    /// Secret of a token kind.
    pub fn secret(&self, kind: TokenKind) -> Result<&Secret, TokenError> {
        match kind {
            TokenKind::Access => self.access.as_ref(),
            TokenKind::Refresh => self.refresh.as_ref(),
        }
        .ok_or(TokenError::MissingSecret(kind))
    }

    /// Lifetime of a token kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Create a new token.
    pub fn create(
        &self,
        kind: TokenKind,
        user_id: &str,
    ) -> Result<String, TokenError> {
        issue(kind, user_id, self.secret(kind)?, self.ttl(kind))
    }

    /// Decode and check a token.
    pub fn decode(
        &self,
        kind: TokenKind,
        token: &str,
    ) -> Result<Claims, TokenError> {
        verify(token, self.secret(kind)?)
    }
}

impl FromRef<AppState> for TokenManager {
    fn from_ref(state: &AppState) -> TokenManager {
        state.token.clone()
    }
}

#[cfg(test)]
pub(crate) fn test_manager() -> TokenManager {
    TokenManager::new(
        &Secrets {
            access: Some("access-secret".into()),
            refresh: Some("refresh-secret".into()),
        },
        &TokenConfig::default(),
    )
    .expect("distinct secrets")
}
