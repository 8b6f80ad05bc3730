//! Client for the external REST API
//!
//! Every call carries the current session's token as a bearer credential.
//! A `401` answer ends the session through the [`SessionProvider`] and fires
//! the registered unauthorized hook before the error reaches the caller.

pub mod error;

pub use error::ClientError;

use hrdesk_core::SessionProvider;
use reqwest::{Client, ClientBuilder, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Callback run after a `401` has ended the session
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// REST API client bound to a session provider
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    provider: Arc<SessionProvider>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(
        base_url: impl Into<String>,
        provider: Arc<SessionProvider>,
    ) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).provider(provider).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn provider(&self) -> &Arc<SessionProvider> {
        &self.provider
    }

    /// Create a request builder carrying the session token
    pub fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self
            .provider
            .store()
            .token()
            .ok_or(ClientError::NotAuthenticated)?;
        let url = format!("{}{}", self.base_url, path);

        Ok(self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {token}")))
    }

    /// Execute a request and decode a JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a request whose body is not needed
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(drop)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path)?;
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.request(Method::POST, path)?.json(body);
        self.execute(request).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.request(Method::PUT, path)?.json(body);
        self.execute(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, path)?;
        self.execute_empty(request).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ClientError::SessionExpired);
        }

        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        debug!(status = status.as_u16(), "API request failed");
        Err(ClientError::from_status(status, message))
    }

    fn handle_unauthorized(&self) {
        warn!("API rejected the session token");
        self.provider.handle_unauthorized();
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_unauthorized_hook", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    provider: Option<Arc<SessionProvider>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Session provider supplying tokens and handling 401s
    pub fn provider(mut self, provider: Arc<SessionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Run `hook` after a 401 has ended the session
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| ClientError::Configuration("session provider is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("hrdesk/", env!("CARGO_PKG_VERSION")).to_string());
        client_builder = client_builder.user_agent(user_agent);

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            provider,
            on_unauthorized: self.on_unauthorized,
        })
    }
}
