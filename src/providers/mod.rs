mod hubspot;
mod slack;

pub use hubspot::HubSpotProvider;
pub use slack::SlackProvider;

pub(crate) fn str_field<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(serde_json::Value::as_str)
}
