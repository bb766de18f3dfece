pub mod error;

pub use error::{RemoteError, Result};

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use bodega_types::api::{LoginRequest, LoginSession, RegisterRequest, RemoteProfile};
use bodega_types::models::RegistrationInput;

/// Remote identity provider operations used by the sync service.
///
/// Implementations report transport failures and non-success HTTP statuses
/// as errors; callers treat both as the provider being unavailable. No
/// retries, no timeouts beyond the transport layer's own.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Create an account. `Ok(None)` means the provider accepted the
    /// registration but returned no profile body.
    async fn register(&self, input: &RegistrationInput) -> Result<Option<RemoteProfile>>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginSession>;

    /// Full user listing, the second call of the two-step login
    /// resolution. Requires the bearer token from `login`.
    async fn list_all(&self, token: &str) -> Result<Vec<RemoteProfile>>;

    async fn delete_account(&self, remote_id: i64) -> Result<()>;
}

/// HTTP/JSON client for the storefront identity service.
pub struct HttpIdentityClient {
    base_url: String,
    http: Client,
}

impl HttpIdentityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityClient {
    async fn register(&self, input: &RegistrationInput) -> Result<Option<RemoteProfile>> {
        let body = RegisterRequest {
            name: input.name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            password: input.password.clone(),
            region: input.region.clone(),
            registered_at: input.registered_at.clone(),
        };

        let resp = self
            .http
            .post(format!("{}/users", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        // Older provider deployments answer 201 with an empty body; treat
        // anything unreadable the same way and let the caller degrade to a
        // pending-sync record.
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<RemoteProfile>(&text) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("register: unreadable profile body: {}", e);
                Ok(None)
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginSession> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let resp = self
            .http
            .post(format!("{}/users/login", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        // A success response without a usable session body is reported as
        // an error; the sync service falls back to the local cache.
        Ok(resp.json::<LoginSession>().await?)
    }

    async fn list_all(&self, token: &str) -> Result<Vec<RemoteProfile>> {
        let resp = self
            .http
            .get(format!("{}/users", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Vec<RemoteProfile>>().await?)
    }

    async fn delete_account(&self, remote_id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/users/{}", self.base_url, remote_id))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        Ok(())
    }
}
