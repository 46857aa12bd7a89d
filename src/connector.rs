use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::{
    Client, RequestBuilder,
    header::{HeaderName, HeaderValue},
};
use tracing::{debug, warn};
use url::Url;

use crate::provider::{Listing, Provider, TokenRequestFormat};
use crate::state::AuthorizationState;
use crate::store::{TRANSIENT_TTL, TransientStore, credentials_key, state_key};
use crate::types::{CallbackParams, Credentials};
use crate::{ConnectError, IntegrationItem};

/// Minimal page served after a successful callback; the flow is designed to
/// run in a popup, so the response just closes the window.
pub const CLOSE_WINDOW_HTML: &str = include_str!("html/close_window.html");

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub authorize_params: Vec<(String, String)>,
    pub token_params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl ConnectorConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
            scope: None,
            authorize_params: Vec::new(),
            token_params: Vec::new(),
            timeout: None,
        }
    }

    /// Reads `{PROVIDER}_CLIENT_ID` and `{PROVIDER}_CLIENT_SECRET` from the
    /// environment, e.g. `HUBSPOT_CLIENT_ID` for the provider id `hubspot`.
    pub fn from_env(provider_id: &str, redirect_uri: impl Into<String>) -> Self {
        let prefix = provider_id.to_uppercase();
        let client_id = env::var(format!("{prefix}_CLIENT_ID")).unwrap_or_default();
        let mut config = Self::new(client_id, redirect_uri);
        if let Ok(secret) = env::var(format!("{prefix}_CLIENT_SECRET")) {
            config.client_secret = Some(secret);
        }
        config
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_authorize_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.authorize_params.push((key.into(), value.into()));
        self
    }

    pub fn with_token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.token_params.push((key.into(), value.into()));
        self
    }
}

/// Drives the OAuth2 authorization-code flow and resource listing for one
/// provider, using a [`TransientStore`] for CSRF state and the single-use
/// credential handoff.
#[derive(Clone)]
pub struct Connector<P: Provider> {
    provider: P,
    config: ConnectorConfig,
    store: Arc<dyn TransientStore>,
    http: Client,
}

impl<P: Provider> Connector<P> {
    pub fn new(
        provider: P,
        config: ConnectorConfig,
        store: Arc<dyn TransientStore>,
    ) -> Result<Self, ConnectError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            provider,
            config,
            store,
            http,
        })
    }

    pub fn with_http_client(
        provider: P,
        config: ConnectorConfig,
        store: Arc<dyn TransientStore>,
        http: Client,
    ) -> Self {
        Self {
            provider,
            config,
            store,
            http,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Mints a CSRF state for `(user_id, org_id)`, stores it with a short
    /// expiry and returns the provider authorization URL carrying the
    /// serialized state. Performs no provider network call.
    pub async fn start_authorization(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<String, ConnectError> {
        let state = AuthorizationState::new(user_id, org_id)?;
        let encoded_state = serde_json::to_string(&state)?;
        let key = state_key(self.provider.id(), org_id, user_id);
        self.store.set(&key, &encoded_state, TRANSIENT_TTL).await?;

        let scope = self
            .config
            .scope
            .clone()
            .unwrap_or_else(|| self.provider.default_scope().to_string());

        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in self.provider.authorize_params() {
            params.insert(key, value);
        }
        for (key, value) in &self.config.authorize_params {
            params.insert(key.clone(), value.clone());
        }

        params.insert("response_type".to_string(), "code".to_string());
        params.insert("client_id".to_string(), self.config.client_id.clone());
        params.insert("redirect_uri".to_string(), self.config.redirect_uri.clone());
        params.insert("scope".to_string(), scope);
        params.insert("state".to_string(), encoded_state);

        let mut url = Url::parse(self.provider.authorize_url())?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(&key, &value);
            }
        }

        debug!(provider = self.provider.id(), user_id, org_id, "authorization started");
        Ok(url.to_string())
    }

    /// Completes the flow after the provider redirects back: verifies the
    /// CSRF state, exchanges the code for a token while deleting the
    /// consumed state, and parks the credentials for a single retrieval.
    ///
    /// Returns the HTML body the callback endpoint should serve.
    pub async fn handle_callback(
        &self,
        params: &CallbackParams,
    ) -> Result<&'static str, ConnectError> {
        if let Some(error) = &params.error {
            return Err(ConnectError::AuthorizationDenied(error.clone()));
        }
        let code = params
            .code
            .as_deref()
            .ok_or(ConnectError::MissingAuthorizationCode)?;
        let claimed: AuthorizationState = params
            .state
            .as_deref()
            .and_then(|encoded| serde_json::from_str(encoded).ok())
            .ok_or(ConnectError::StateMismatch)?;

        let key = state_key(self.provider.id(), &claimed.org_id, &claimed.user_id);
        let saved: AuthorizationState = self
            .store
            .get(&key)
            .await?
            .and_then(|encoded| serde_json::from_str(&encoded).ok())
            .ok_or(ConnectError::StateMismatch)?;
        if claimed.csrf_token != saved.csrf_token {
            return Err(ConnectError::StateMismatch);
        }

        let (credentials, deleted) =
            tokio::join!(self.exchange_code(code), self.store.delete(&key));
        deleted?;
        let credentials = credentials?;

        let key = credentials_key(self.provider.id(), &claimed.org_id, &claimed.user_id);
        self.store
            .set(&key, &serde_json::to_string(&credentials)?, TRANSIENT_TTL)
            .await?;

        debug!(
            provider = self.provider.id(),
            user_id = %claimed.user_id,
            org_id = %claimed.org_id,
            "authorization completed"
        );
        Ok(CLOSE_WINDOW_HTML)
    }

    /// Retrieves and consumes the credentials parked by a completed
    /// callback. Strictly single-use: the stored payload is deleted on the
    /// first successful read, so retrieval and resource listing must happen
    /// as one logical operation.
    pub async fn get_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<Credentials, ConnectError> {
        let key = credentials_key(self.provider.id(), org_id, user_id);
        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or(ConnectError::NoCredentials)?;
        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|_| ConnectError::NoCredentials)?;
        if credentials.is_empty() {
            return Err(ConnectError::NoCredentials);
        }
        self.store.delete(&key).await?;
        Ok(credentials)
    }

    /// Fans out to the provider's listing endpoints concurrently and maps
    /// every record into an [`IntegrationItem`].
    ///
    /// A listing that fails (transport error, non-200 status, non-JSON body
    /// or a provider-reported failure) is silently omitted from the result
    /// rather than aborting the call, so the returned list may be
    /// incomplete. Items appear in declared listing order, then in the
    /// provider's native order within each listing.
    pub async fn list_items(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<IntegrationItem>, ConnectError> {
        let access_token = credentials.access_token()?;
        let listings = self.provider.listings();
        let fetches = listings
            .iter()
            .map(|listing| self.fetch_listing(listing, access_token));

        let mut items = Vec::new();
        for listed in join_all(fetches).await.into_iter().flatten() {
            items.extend(listed);
        }

        debug!(
            provider = self.provider.id(),
            count = items.len(),
            "listed integration items"
        );
        Ok(items)
    }

    async fn fetch_listing(
        &self,
        listing: &Listing,
        access_token: &str,
    ) -> Option<Vec<IntegrationItem>> {
        let response = self
            .http
            .get(&listing.url)
            .bearer_auth(access_token)
            .query(&listing.query)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %listing.url, %error, "listing request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %listing.url, status = status.as_u16(), "listing request rejected");
            return None;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => Some((listing.parse)(&body)),
            Err(error) => {
                warn!(url = %listing.url, %error, "listing response was not json");
                None
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials, ConnectError> {
        let mut payload = HashMap::new();
        payload.insert("grant_type".to_string(), "authorization_code".to_string());
        payload.insert("code".to_string(), code.to_string());
        payload.insert("client_id".to_string(), self.config.client_id.clone());
        payload.insert("redirect_uri".to_string(), self.config.redirect_uri.clone());

        if let Some(secret) = &self.config.client_secret {
            payload.insert("client_secret".to_string(), secret.clone());
        }

        self.send_token_request(payload).await
    }

    async fn send_token_request(
        &self,
        mut payload: HashMap<String, String>,
    ) -> Result<Credentials, ConnectError> {
        for (key, value) in self.provider.token_params() {
            payload.insert(key, value);
        }
        for (key, value) in &self.config.token_params {
            payload.insert(key.clone(), value.clone());
        }

        let headers = self.provider.token_headers();
        let mut builder = self.http.post(self.provider.token_url());
        builder = apply_headers(builder, &headers)?;

        let response = match self.provider.token_request_format() {
            TokenRequestFormat::Json => builder.json(&payload).send().await?,
            TokenRequestFormat::Form => builder.form(&payload).send().await?,
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ConnectError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let credentials =
            serde_json::from_str(&body).map_err(|err| ConnectError::InvalidResponse {
                message: err.to_string(),
                body,
            })?;

        Ok(credentials)
    }
}

fn apply_headers(
    mut builder: RequestBuilder,
    headers: &[(String, String)],
) -> Result<RequestBuilder, ConnectError> {
    for (name, value) in headers {
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| ConnectError::InvalidHeader {
                name: name.clone(),
                value: value.clone(),
            })?;
        let value = HeaderValue::from_str(value).map_err(|_| ConnectError::InvalidHeader {
            name: name.to_string(),
            value: value.clone(),
        })?;
        builder = builder.header(name, value);
    }
    Ok(builder)
}
