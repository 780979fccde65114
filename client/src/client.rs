use crate::{Error, Result};
use splitbet_types::api::{BetRequest, RegisterRequest, UserEnvelope, UserRecord};
use tracing::debug;
use url::Url;

/// Client for the splitbet HTTP API.
///
/// No call is retried automatically: bet submission is not idempotent and
/// the caller decides whether the user may retry manually.
#[derive(Clone, Debug)]
pub struct Client {
    pub base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client for the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(Error::InvalidScheme(other.to_string())),
        }
        // Url::join treats a path without a trailing slash as a file.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    /// Submit a bet for the currently active round of a room.
    ///
    /// Any 2xx status is success; the response body carries nothing the
    /// caller needs.
    pub async fn submit_bet(&self, token: &str, request: &BetRequest) -> Result<()> {
        let url = self.base_url.join("game/bet")?;
        debug!(room = request.room_id, amount = request.amount, "submitting bet");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Fetch the server's current view of a user, including a rotated
    /// bearer token.
    pub async fn fetch_user(&self, token: &str, id: u64) -> Result<UserRecord> {
        let url = self.base_url.join(&format!("users/{id}"))?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let response = Self::expect_success(response).await?;
        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|_| Error::UnexpectedResponse)?;
        Ok(envelope.result)
    }

    /// Register a new user. The request should be validated locally with
    /// [`RegisterRequest::validate`] before calling.
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let url = self.base_url.join("users")?;
        let response = self.http.post(url).json(request).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            return Err(Error::Failed(status));
        }
        Err(Error::FailedWithBody { status, body })
    }
}
