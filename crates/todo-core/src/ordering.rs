//! Item ordering policy
//!
//! One policy shared by the store and the list view:
//! - items with a reminder come before items without one, in both directions
//! - reminders compare as ISO-8601 text, ascending or descending
//! - ties fall back to newest `created_at` first, then highest id

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// SQL `ORDER BY` clause matching `SortOrder::DateAsc`
pub const LIST_ORDER_SQL: &str =
    "reminder_date IS NULL, reminder_date ASC, created_at DESC, id DESC";

/// Direction of the reminder-date sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    DateAsc,
    DateDesc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::DateAsc => SortOrder::DateDesc,
            SortOrder::DateDesc => SortOrder::DateAsc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateAsc => "date-asc",
            SortOrder::DateDesc => "date-desc",
        }
    }

    /// Compare two items under this order
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let by_reminder = match (&a.reminder_date, &b.reminder_date) {
            (Some(x), Some(y)) => match self {
                SortOrder::DateAsc => x.cmp(y),
                SortOrder::DateDesc => y.cmp(x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        by_reminder
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-asc" => Ok(SortOrder::DateAsc),
            "date-desc" => Ok(SortOrder::DateDesc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Sort items in place under `order`
pub fn sort_items(items: &mut [Item], order: SortOrder) {
    items.sort_by(|a, b| order.compare(a, b));
}
