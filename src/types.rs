use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConnectError;

/// Query parameters delivered to the OAuth2 callback endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_url(callback_url: &str) -> Result<Self, ConnectError> {
        let url = Url::parse(callback_url)?;
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.to_string()),
                "state" => params.state = Some(value.to_string()),
                "error" => params.error = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(params)
    }
}

/// Token payload returned by a provider's token endpoint.
///
/// Only `access_token` is interpreted; everything else the provider sends
/// (refresh token, scope, nested workspace data, ...) is preserved in
/// `extra` so the raw response survives the store round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Credentials {
    /// True when the payload carries nothing at all, which the credential
    /// retriever treats the same as a missing entry.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.extra.is_empty()
    }

    pub fn access_token(&self) -> Result<&str, ConnectError> {
        self.access_token
            .as_deref()
            .ok_or(ConnectError::MissingAccessToken)
    }
}

#[cfg(test)]
mod tests {
    use super::{CallbackParams, Credentials};

    #[test]
    fn from_url_parses_query_params() {
        let params =
            CallbackParams::from_url("http://localhost/cb?code=abc123&state=%7B%7D").unwrap();
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.state.as_deref(), Some("{}"));
        assert_eq!(params.error, None);
    }

    #[test]
    fn from_url_captures_provider_error() {
        let params = CallbackParams::from_url("http://localhost/cb?error=access_denied").unwrap();
        assert_eq!(params.error.as_deref(), Some("access_denied"));
    }

    #[test]
    fn credentials_preserve_extra_fields() {
        let credentials: Credentials = serde_json::from_str(
            r#"{"access_token":"tok","refresh_token":"ref","scope":"users:read"}"#,
        )
        .unwrap();
        assert_eq!(credentials.access_token().unwrap(), "tok");
        assert_eq!(credentials.extra["refresh_token"], "ref");
        assert!(!credentials.is_empty());

        let round_trip = serde_json::to_value(&credentials).unwrap();
        assert_eq!(round_trip["scope"], "users:read");
    }

    #[test]
    fn empty_payload_is_empty() {
        let credentials: Credentials = serde_json::from_str("{}").unwrap();
        assert!(credentials.is_empty());
        assert!(credentials.access_token().is_err());
    }
}
