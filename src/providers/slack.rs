use serde_json::Value;

use crate::provider::{Listing, Provider, TokenRequestFormat};
use crate::{IntegrationItem, providers::str_field};

const AUTHORIZE_URL: &str = "https://slack.com/oauth/v2/authorize";
const TOKEN_URL: &str = "https://slack.com/api/oauth.v2.access";
const CONVERSATIONS_URL: &str = "https://slack.com/api/conversations.list";
const USERS_URL: &str = "https://slack.com/api/users.list";

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/integrations/slack/oauth2callback";
const DEFAULT_SCOPE: &str = "users:read,channels:read,groups:read,im:read";

/// Slack workspace adapter. Lists channels, non-bot users and direct-message
/// conversations, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlackProvider;

impl Provider for SlackProvider {
    fn id(&self) -> &str {
        "slack"
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
            Listing::new(CONVERSATIONS_URL, parse_channels)
                .with_query("types", "public_channel,private_channel"),
            Listing::new(USERS_URL, parse_users),
            Listing::new(CONVERSATIONS_URL, parse_dms).with_query("types", "im"),
        ]
    }

    fn token_request_format(&self) -> TokenRequestFormat {
        TokenRequestFormat::Form
    }
}

impl SlackProvider {
    pub fn default_redirect_uri() -> &'static str {
        DEFAULT_REDIRECT_URI
    }
}

/// Maps one Slack record into an item. Display name falls back from `name`
/// to `real_name` to a sentinel.
pub(crate) fn slack_item(
    record: &Value,
    kind: &str,
    parent_id: Option<&str>,
    parent_name: Option<&str>,
) -> IntegrationItem {
    let name = str_field(record, "name")
        .or_else(|| str_field(record, "real_name"))
        .unwrap_or("Unknown");
    IntegrationItem::new(str_field(record, "id"), name, kind).with_parent(parent_id, parent_name)
}

/// Slack wraps every web API response in an envelope with an `ok` flag; a
/// false flag means the listing failed even though the HTTP status was 200.
fn envelope<'a>(body: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    body.get(key).and_then(Value::as_array)
}

fn parse_channels(body: &Value) -> Vec<IntegrationItem> {
    envelope(body, "channels")
        .map(|channels| {
            channels
                .iter()
                .map(|channel| slack_item(channel, "Channel", None, None))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_users(body: &Value) -> Vec<IntegrationItem> {
    envelope(body, "members")
        .map(|members| {
            members
                .iter()
                .filter(|member| {
                    member.get("deleted").and_then(Value::as_bool) != Some(true)
                        && member.get("is_bot").and_then(Value::as_bool) != Some(true)
                })
                .map(|member| slack_item(member, "User", None, None))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_dms(body: &Value) -> Vec<IntegrationItem> {
    envelope(body, "channels")
        .map(|channels| {
            channels
                .iter()
                .map(|channel| slack_item(channel, "DirectMessage", None, None))
                .collect()
        })
        .unwrap_or_default()
}
