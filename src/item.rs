use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized representation of an external provider resource (a CRM
/// contact, a messaging channel, a workspace user, ...).
///
/// Items are produced fresh per listing call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    /// Provider-qualified identifier, `{raw_id}_{kind}`. `None` when the raw
    /// record carried no id.
    pub id: Option<String>,
    pub name: String,
    /// Type tag such as `Contact`, `Channel`, `User` or `DirectMessage`.
    pub kind: String,
    pub parent_id: Option<String>,
    pub parent_path_or_name: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_modified_time: Option<DateTime<Utc>>,
}

impl IntegrationItem {
    pub fn new(raw_id: Option<&str>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            id: composite_id(raw_id, &kind),
            name: name.into(),
            kind,
            parent_id: None,
            parent_path_or_name: None,
            creation_time: None,
            last_modified_time: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Option<&str>, parent_name: Option<&str>) -> Self {
        self.parent_id = parent_id.map(str::to_string);
        self.parent_path_or_name = parent_name.map(str::to_string);
        self
    }
}

/// Qualifies a raw provider id with the item type tag.
pub(crate) fn composite_id(raw_id: Option<&str>, kind: &str) -> Option<String> {
    raw_id.map(|id| format!("{id}_{kind}"))
}

#[cfg(test)]
mod tests {
    use super::{IntegrationItem, composite_id};

    #[test]
    fn composite_id_qualifies_raw_id_with_kind() {
        assert_eq!(composite_id(Some("123"), "Contact").as_deref(), Some("123_Contact"));
        assert_eq!(composite_id(None, "Contact"), None);
    }

    #[test]
    fn new_item_carries_no_parent_or_timestamps() {
        let item = IntegrationItem::new(Some("C42"), "general", "Channel");
        assert_eq!(item.id.as_deref(), Some("C42_Channel"));
        assert_eq!(item.name, "general");
        assert_eq!(item.parent_id, None);
        assert_eq!(item.creation_time, None);
    }

    #[test]
    fn with_parent_attaches_parent_fields() {
        let item = IntegrationItem::new(Some("1"), "x", "Contact")
            .with_parent(Some("p1"), Some("Parent"));
        assert_eq!(item.parent_id.as_deref(), Some("p1"));
        assert_eq!(item.parent_path_or_name.as_deref(), Some("Parent"));
    }
}
