use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::provider::{Listing, Provider, TokenRequestFormat};
use crate::{IntegrationItem, providers::str_field};

const AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";
const TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
const CONTACTS_URL: &str = "https://api.hubapi.com/crm/v3/objects/contacts";

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/integrations/hubspot/oauth2callback";
const DEFAULT_SCOPE: &str = "oauth crm.objects.contacts.read";

/// HubSpot CRM adapter. Lists contacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubSpotProvider;

impl Provider for HubSpotProvider {
    fn id(&self) -> &str {
        "hubspot"
    }

    fn authorize_url(&self) -> &str {
        AUTHORIZE_URL
    }

    fn token_url(&self) -> &str {
        TOKEN_URL
    }

    fn default_scope(&self) -> &str {
        DEFAULT_SCOPE
    }

    fn listings(&self) -> Vec<Listing> {
        vec![
            Listing::new(CONTACTS_URL, parse_contacts)
                .with_query("limit", "100")
                .with_query("properties", "firstname,lastname,email"),
        ]
    }

    fn token_request_format(&self) -> TokenRequestFormat {
        TokenRequestFormat::Form
    }
}

impl HubSpotProvider {
    pub fn default_redirect_uri() -> &'static str {
        DEFAULT_REDIRECT_URI
    }
}

/// Maps one CRM object record into an item. Display name falls back from
/// `firstname`/`lastname` to `email` to a sentinel.
pub(crate) fn contact_item(
    record: &Value,
    kind: &str,
    parent_id: Option<&str>,
    parent_name: Option<&str>,
) -> IntegrationItem {
    let empty = Value::Null;
    let properties = record.get("properties").unwrap_or(&empty);

    let first_name = str_field(properties, "firstname").unwrap_or("");
    let last_name = str_field(properties, "lastname").unwrap_or("");
    let email = str_field(properties, "email").unwrap_or("");

    let full_name = format!("{first_name} {last_name}").trim().to_string();
    let name = if !full_name.is_empty() {
        full_name
    } else if !email.is_empty() {
        email.to_string()
    } else {
        "Unknown Contact".to_string()
    };

    let mut item =
        IntegrationItem::new(str_field(record, "id"), name, kind).with_parent(parent_id, parent_name);
    item.creation_time = timestamp(record, "createdAt");
    item.last_modified_time = timestamp(record, "updatedAt");
    item
}

fn timestamp(record: &Value, key: &str) -> Option<DateTime<Utc>> {
    str_field(record, key)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn parse_contacts(body: &Value) -> Vec<IntegrationItem> {
    body.get("results")
        .and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .map(|record| contact_item(record, "Contact", None, None))
                .collect()
        })
        .unwrap_or_default()
}
