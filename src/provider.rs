use crate::IntegrationItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequestFormat {
    Json,
    Form,
}

/// One read-only listing endpoint of a provider, paired with the pure
/// mapping function that turns its response body into items.
///
/// The mapping function owns the provider-specific shape entirely: success
/// flags, result arrays, record filtering. Returning an empty vector omits
/// the listing from the aggregate.
#[derive(Debug, Clone)]
pub struct Listing {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub parse: fn(&serde_json::Value) -> Vec<IntegrationItem>,
}

impl Listing {
    pub fn new(url: impl Into<String>, parse: fn(&serde_json::Value) -> Vec<IntegrationItem>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            parse,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Static description of a SaaS platform: OAuth2 endpoints plus the listing
/// endpoints a connector fans out to. Implement this to add a new platform.
pub trait Provider: Send + Sync {
    /// Short lowercase identifier, used in callback routes and store keys.
    fn id(&self) -> &str;
    fn authorize_url(&self) -> &str;
    fn token_url(&self) -> &str;
    fn default_scope(&self) -> &str;

    /// Listing endpoints in the order their items should appear in the
    /// aggregated result.
    fn listings(&self) -> Vec<Listing>;

    fn authorize_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn token_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn token_request_format(&self) -> TokenRequestFormat {
        TokenRequestFormat::Json
    }

    fn token_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}
