//! Bearer-token HTTP client

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use ulid::Ulid;

use crate::{error::error_reason, ClientConfig, ClientError, ClientResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Authenticated request executor shared by every remote call
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Ulid::new().to_string();
        tracing::debug!("{} {} [{}]", method, path, request_id);

        let request = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    /// POST whose success body is returned as text, for endpoints that
    /// answer with a bare message.
    pub async fn post_text<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<String> {
        Self::send_text(self.request(Method::POST, path).json(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(Method::PATCH, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let body = Self::send_text(request).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn send_text(request: RequestBuilder) -> ClientResult<String> {
        let response = request.send().await.inspect_err(|e| {
            tracing::warn!("Request failed: {}", e);
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_reason(status, &body);
            tracing::warn!("{} returned {}: {}", url, status.as_u16(), message);
            return Err(ClientError::Status { status, message });
        }

        tracing::debug!("{} returned {}", url, status.as_u16());
        Ok(body)
    }
}
