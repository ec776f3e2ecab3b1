//! To-do item model and request payloads
//!
//! `Item` is the only entity. Requests are shared by the server (which
//! deserializes and validates them) and the client (which serializes them).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, TodoError};

/// Store-assigned item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Parse an id from a path segment.
    ///
    /// Only a complete base-10 integer is accepted; `"12abc"` is rejected
    /// rather than truncated to 12.
    pub fn parse(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TodoError::InvalidInput(format!("Invalid item id: {:?}", s)))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Free-form timestamp text, typically `YYYY-MM-DDTHH:MM`
    pub reminder_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "text"
    )]
    pub reminder_date: Option<String>,
}

impl CreateItemRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reminder(mut self, reminder_date: impl Into<String>) -> Self {
        self.reminder_date = Some(reminder_date.into());
        self
    }

    /// Check the title and normalize optional fields into a `NewItem`
    pub fn validate(&self) -> Result<NewItem> {
        let title = match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => return Err(TodoError::InvalidInput("Title is required".to_string())),
        };

        Ok(NewItem {
            title,
            description: non_blank(self.description.clone()),
            reminder_date: non_blank(self.reminder_date.clone()),
        })
    }
}

/// Validated fields for inserting an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub reminder_date: Option<String>,
}

/// Body of an update request
///
/// `description` and `reminder_date` are tri-state: field absent leaves the
/// column unchanged, `null` clears it, a value replaces it.
///
/// `reminder_date` is free-form: any JSON scalar is kept as its text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_text"
    )]
    pub reminder_date: Option<Option<String>>,
}

impl UpdateItemRequest {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    /// Reject a blank title and normalize blank optional text to "cleared"
    pub fn validate(&self) -> Result<ItemChanges> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TodoError::InvalidInput("Title cannot be empty".to_string()));
            }
        }

        Ok(ItemChanges {
            title: self.title.clone(),
            description: self.description.clone().map(non_blank),
            completed: self.completed,
            reminder_date: self.reminder_date.clone().map(non_blank),
        })
    }
}

/// Validated partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub reminder_date: Option<Option<String>>,
}

/// Deserialize a field that is present in the body, including as `null`
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize a scalar as text; `null` is `None`
fn text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::invalid_type(
            Unexpected::Other(if other.is_array() { "array" } else { "map" }),
            &"a string, number or boolean",
        )),
    }
}

/// `text` for a tri-state field
fn present_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer).map(Some)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(ItemId::parse("42").unwrap(), ItemId::new(42));
        assert_eq!(ItemId::parse(" 7 ").unwrap(), ItemId::new(7));
        assert!(ItemId::parse("abc").is_err());
        assert!(ItemId::parse("12abc").is_err());
        assert!(ItemId::parse("").is_err());
    }

    #[test]
    fn test_create_requires_title() {
        assert!(CreateItemRequest::default().validate().is_err());
        assert!(CreateItemRequest::new("").validate().is_err());
        assert!(CreateItemRequest::new("   \t").validate().is_err());

        let new_item = CreateItemRequest::new("Buy milk")
            .with_description("")
            .with_reminder("2026-10-18T09:30")
            .validate()
            .unwrap();
        assert_eq!(new_item.title, "Buy milk");
        assert_eq!(new_item.description, None);
        assert_eq!(new_item.reminder_date.as_deref(), Some("2026-10-18T09:30"));
    }

    #[test]
    fn test_update_tri_state_fields() {
        let absent: UpdateItemRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.reminder_date, None);

        let cleared: UpdateItemRequest =
            serde_json::from_str(r#"{"reminderDate":null,"description":"notes"}"#).unwrap();
        assert_eq!(cleared.reminder_date, Some(None));
        assert_eq!(cleared.description, Some(Some("notes".to_string())));

        let json = serde_json::to_value(&cleared).unwrap();
        assert_eq!(json, serde_json::json!({"description": "notes", "reminderDate": null}));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let request = UpdateItemRequest {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_reminder_accepts_any_scalar() {
        let create: CreateItemRequest =
            serde_json::from_str(r#"{"title":"a","reminderDate":20261201}"#).unwrap();
        assert_eq!(create.reminder_date.as_deref(), Some("20261201"));

        let create: CreateItemRequest =
            serde_json::from_str(r#"{"title":"a","reminderDate":null}"#).unwrap();
        assert_eq!(create.reminder_date, None);

        let update: UpdateItemRequest =
            serde_json::from_str(r#"{"reminderDate":1.5}"#).unwrap();
        assert_eq!(update.reminder_date, Some(Some("1.5".to_string())));

        let nested: serde_json::Result<CreateItemRequest> =
            serde_json::from_str(r#"{"title":"a","reminderDate":[1]}"#);
        assert!(nested.is_err());
    }

    #[test]
    fn test_item_json_shape() {
        let now = Utc::now();
        let item = Item {
            id: ItemId::new(1),
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            reminder_date: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["reminderDate"], serde_json::Value::Null);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
