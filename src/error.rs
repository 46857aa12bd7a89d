use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {message}")]
    Store { message: String },

    #[error("invalid header: {name}={value}")]
    InvalidHeader { name: String, value: String },

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    /// Provider denied or failed the authorization; carries the provider's
    /// `error` query parameter verbatim.
    #[error("{0}")]
    AuthorizationDenied(String),

    #[error("missing authorization code in callback")]
    MissingAuthorizationCode,

    #[error("state does not match")]
    StateMismatch,

    #[error("no credentials found")]
    NoCredentials,

    #[error("token payload has no access token")]
    MissingAccessToken,
}

impl ConnectError {
    /// Whether the failure is attributable to the caller (or end user)
    /// rather than an upstream or internal fault. Used to pick an HTTP
    /// status for callback responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied(_)
                | Self::MissingAuthorizationCode
                | Self::StateMismatch
                | Self::NoCredentials
                | Self::MissingAccessToken
        )
    }
}
