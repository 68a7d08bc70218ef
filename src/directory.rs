//! Referential check against the User service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use uuid::Uuid;

use crate::config::Directory as DirectoryConfig;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user service answered with status {0}")]
    Status(u16),
    #[error("user service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Answers whether a user exists.
///
/// `Ok(false)` is a definite answer; any doubt is an error.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, DirectoryError>;
}

/// [`UserDirectory`] calling `GET {base_url}/{id}` on the User service.
#[derive(Clone, Debug)]
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(
        base_url: impl Into<String>,
        config: &DirectoryConfig,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, DirectoryError> {
        let response = self
            .client
            .get(format!("{}/{user_id}", self.base_url))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                tracing::warn!(%user_id, %status, "unexpected user service status");
                Err(DirectoryError::Status(status.as_u16()))
            },
        }
    }
}

/// Directory answering from a fixed list, or failing on every call.
#[cfg(test)]
pub(crate) struct StubDirectory {
    pub users: std::sync::Mutex<Vec<Uuid>>,
    pub fail_with: Option<u16>,
}

#[cfg(test)]
impl StubDirectory {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
            fail_with: Some(status),
        }
    }

    pub fn add(&self, user_id: Uuid) {
        self.users.lock().unwrap().push(user_id);
    }
}

#[cfg(test)]
#[async_trait]
impl UserDirectory for StubDirectory {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, DirectoryError> {
        match self.fail_with {
            Some(status) => Err(DirectoryError::Status(status)),
            None => Ok(self.users.lock().unwrap().contains(&user_id)),
        }
    }
}
