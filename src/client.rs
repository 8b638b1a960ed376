//! HTTP client for the Chronicle API.
//!
//! Lets an editing session persist through a remote server instead of a local
//! database. Configuration is via environment variables:
//! - `CHRONICLE_URL` - Base URL (default: `http://localhost:17020/api/v1`)
//! - `CHRONICLE_API_KEY` - Bearer token, if the server sits behind auth

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;
use crate::store::{CountryStore, StoreError};

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:17020/api/v1";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct ChronicleClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl ChronicleClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CHRONICLE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let api_key = std::env::var("CHRONICLE_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: Client::new(),
        }
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(error_for(status, response.text().await.unwrap_or_default()))
        }
    }

    /// Handle response that may return empty body (204 No Content).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_for(status, response.text().await.unwrap_or_default()))
        }
    }

    // ============================================================
    // Country Operations
    // ============================================================

    pub async fn list_countries(&self) -> Result<Vec<CountrySummary>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/countries")
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_country(&self, id: Uuid) -> Result<Country, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/countries/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn create_country(&self, input: &CountryInput) -> Result<Country, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/countries")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update_country(
        &self,
        id: Uuid,
        input: &CountryInput,
    ) -> Result<Country, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/countries/{}", id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_country(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/countries/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    /// Ask the server who held each role at `at` (a date or RFC 3339 instant).
    pub async fn holders_at(&self, id: Uuid, at: &str) -> Result<HoldersResponse, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/countries/{}/holders", id))
            .query(&[("at", at)])
            .send()
            .await?;
        self.handle_response(response).await
    }
}

fn error_for(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
        StatusCode::CONFLICT => ClientError::Conflict(body),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        _ => ClientError::Server(format!("{}: {}", status, body)),
    }
}

fn store_error(id: Option<Uuid>, err: ClientError) -> StoreError {
    match (err, id) {
        (ClientError::NotFound(_), Some(id)) => StoreError::NotFound(id),
        (ClientError::BadRequest(body), _) => StoreError::Validation(body),
        (ClientError::Conflict(body), _) => StoreError::Conflict(body),
        (other, _) => StoreError::Backend(other.into()),
    }
}

impl CountryStore for ChronicleClient {
    async fn load(&self, id: Uuid) -> Result<Country, StoreError> {
        self.get_country(id)
            .await
            .map_err(|e| store_error(Some(id), e))
    }

    async fn create(&self, payload: CountryInput) -> Result<Country, StoreError> {
        self.create_country(&payload)
            .await
            .map_err(|e| store_error(None, e))
    }

    async fn update(&self, id: Uuid, payload: CountryInput) -> Result<Country, StoreError> {
        self.update_country(id, &payload)
            .await
            .map_err(|e| store_error(Some(id), e))
    }
}
