use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use crate::ConnectError;

const CSRF_TOKEN_BYTES: usize = 32;

/// Anti-forgery state minted at authorization start and verified at callback.
///
/// The whole struct is JSON-serialized twice: once into the transient store
/// and once into the `state` query parameter of the authorization URL, so the
/// callback can recover the (user, org) pair without server-side sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationState {
    #[serde(rename = "state")]
    pub csrf_token: String,
    pub user_id: String,
    pub org_id: String,
}

impl AuthorizationState {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Result<Self, ConnectError> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| ConnectError::OsRng {
                message: err.to_string(),
            })?;
        Ok(Self {
            csrf_token: URL_SAFE_NO_PAD.encode(bytes),
            user_id: user_id.into(),
            org_id: org_id.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AuthorizationState;

    #[test]
    fn generates_url_safe_csrf_token() {
        let state = AuthorizationState::new("user", "org").unwrap();
        assert!(!state.csrf_token.contains('='), "token should be unpadded");
        assert!(!state.csrf_token.contains('+'), "token should be url safe");
        assert!(!state.csrf_token.contains('/'), "token should be url safe");
    }

    #[test]
    fn serializes_with_state_field_name() {
        let state = AuthorizationState::new("user-1", "org-1").unwrap();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["state"], state.csrf_token.as_str());
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["org_id"], "org-1");
    }

    #[test]
    fn tokens_are_unique() {
        let a = AuthorizationState::new("u", "o").unwrap();
        let b = AuthorizationState::new("u", "o").unwrap();
        assert_ne!(a.csrf_token, b.csrf_token);
    }
}
