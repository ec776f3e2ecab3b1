//! List view state
//!
//! Mirrors the server's items in a local cache and reconciles each
//! confirmed response into it. Nothing is applied optimistically: a failed
//! call is logged and leaves the cache as it was.

use chrono::Local;

use todo_core::{sort_items, CreateItemRequest, Item, ItemId, SortOrder, UpdateItemRequest};

use crate::client::ItemApi;

/// `datetime-local` style timestamp, minute precision
pub const REMINDER_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Current local time formatted for the reminder field
pub fn default_reminder() -> String {
    Local::now().format(REMINDER_FORMAT).to_string()
}

/// Input fields of the create form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemForm {
    pub title: String,
    pub description: String,
    pub reminder_date: String,
}

impl NewItemForm {
    /// Empty form with the reminder prefilled to now
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            reminder_date: default_reminder(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn to_request(&self) -> CreateItemRequest {
        CreateItemRequest {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            reminder_date: Some(self.reminder_date.clone()),
        }
    }
}

impl Default for NewItemForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Cached item list plus the edit, sort and form state around it
pub struct ListView<A> {
    api: A,
    items: Vec<Item>,
    loading: bool,
    editing: Option<Item>,
    sort_order: SortOrder,
    /// Create form contents
    pub form: NewItemForm,
}

impl<A: ItemApi> ListView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            loading: false,
            editing: None,
            sort_order: SortOrder::default(),
            form: NewItemForm::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// The scratch copy being edited, if any
    pub fn editing(&self) -> Option<&Item> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut Item> {
        self.editing.as_mut()
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replace the cache with the server's list
    pub async fn load(&mut self) {
        self.loading = true;
        match self.api.list().await {
            Ok(items) => {
                self.items = items;
                self.resort();
            }
            Err(e) => tracing::error!("Error loading items: {}", e),
        }
        self.loading = false;
    }

    /// Submit the create form; returns whether an item was added
    pub async fn add(&mut self) -> bool {
        let request = self.form.to_request();
        if let Err(e) = request.validate() {
            tracing::debug!("Not submitting item: {}", e);
            return false;
        }

        match self.api.create(&request).await {
            Ok(item) => {
                self.items.push(item);
                self.resort();
                self.form.reset();
                true
            }
            Err(e) => {
                tracing::error!("Error creating item: {}", e);
                false
            }
        }
    }

    /// Flip `completed` once the server confirms
    pub async fn toggle_complete(&mut self, id: ItemId) -> bool {
        let Some(item) = self.find(id).cloned() else {
            return false;
        };

        match self.api.toggle_complete(&item).await {
            Ok(updated) => self.replace(updated),
            Err(e) => {
                tracing::error!("Error updating item {}: {}", id, e);
                false
            }
        }
    }

    /// Copy an item into the edit scratch space
    pub fn start_edit(&mut self, id: ItemId) -> bool {
        self.editing = self.find(id).cloned();
        self.editing.is_some()
    }

    /// Discard the scratch copy; no request is made
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send title, description and reminder from the scratch copy
    pub async fn save_edit(&mut self) -> bool {
        let Some(draft) = self.editing.as_ref() else {
            return false;
        };
        if draft.title.trim().is_empty() {
            return false;
        }

        let id = draft.id;
        let request = UpdateItemRequest {
            title: Some(draft.title.clone()),
            description: Some(draft.description.clone()),
            completed: None,
            reminder_date: Some(draft.reminder_date.clone()),
        };

        match self.api.update(id, &request).await {
            Ok(updated) => {
                self.replace(updated);
                self.resort();
                self.editing = None;
                true
            }
            Err(e) => {
                tracing::error!("Error updating item {}: {}", id, e);
                false
            }
        }
    }

    /// Delete after `confirm` approves; returns whether the item was removed
    pub async fn delete(&mut self, id: ItemId, confirm: impl FnOnce(&Item) -> bool) -> bool {
        let Some(item) = self.find(id) else {
            return false;
        };
        if !confirm(item) {
            return false;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                self.items.retain(|item| item.id != id);
                true
            }
            Err(e) => {
                tracing::error!("Error deleting item {}: {}", id, e);
                false
            }
        }
    }

    pub fn toggle_sort_order(&mut self) {
        self.set_sort_order(self.sort_order.toggled());
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.resort();
    }

    fn replace(&mut self, updated: Item) -> bool {
        match self.items.iter_mut().find(|item| item.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    fn resort(&mut self) {
        sort_items(&mut self.items, self.sort_order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use chrono::Utc;
    use std::cell::{Cell, RefCell};

    /// In-process stand-in for the server
    #[derive(Default)]
    struct FakeApi {
        items: RefCell<Vec<Item>>,
        next_id: Cell<i64>,
        fail: Cell<bool>,
        calls: Cell<usize>,
    }

    impl FakeApi {
        fn seeded(entries: &[(&str, Option<&str>)]) -> Self {
            let api = FakeApi::default();
            for (title, reminder) in entries {
                let mut request = CreateItemRequest::new(*title);
                request.reminder_date = reminder.map(str::to_string);
                api.insert(&request);
            }
            api
        }

        fn insert(&self, request: &CreateItemRequest) -> Item {
            let new_item = request.validate().unwrap();
            self.next_id.set(self.next_id.get() + 1);
            let now = Utc::now();
            let item = Item {
                id: ItemId::new(self.next_id.get()),
                title: new_item.title,
                description: new_item.description,
                completed: false,
                reminder_date: new_item.reminder_date,
                created_at: now,
                updated_at: now,
            };
            self.items.borrow_mut().push(item.clone());
            item
        }

        fn begin(&self) -> Result<(), ClientError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(ClientError::Status {
                    status: 500,
                    message: "Failed".to_string(),
                });
            }
            Ok(())
        }
    }

    impl ItemApi for FakeApi {
        async fn list(&self) -> Result<Vec<Item>, ClientError> {
            self.begin()?;
            Ok(self.items.borrow().clone())
        }

        async fn get(&self, id: ItemId) -> Result<Item, ClientError> {
            self.begin()?;
            self.items
                .borrow()
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or(ClientError::NotFound)
        }

        async fn create(&self, request: &CreateItemRequest) -> Result<Item, ClientError> {
            self.begin()?;
            Ok(self.insert(request))
        }

        async fn update(
            &self,
            id: ItemId,
            request: &UpdateItemRequest,
        ) -> Result<Item, ClientError> {
            self.begin()?;
            let changes = request.validate().unwrap();
            let mut items = self.items.borrow_mut();
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or(ClientError::NotFound)?;
            if let Some(title) = changes.title {
                item.title = title;
            }
            if let Some(description) = changes.description {
                item.description = description;
            }
            if let Some(completed) = changes.completed {
                item.completed = completed;
            }
            if let Some(reminder_date) = changes.reminder_date {
                item.reminder_date = reminder_date;
            }
            item.updated_at = Utc::now();
            Ok(item.clone())
        }

        async fn delete(&self, id: ItemId) -> Result<(), ClientError> {
            self.begin()?;
            let mut items = self.items.borrow_mut();
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Err(ClientError::NotFound);
            }
            Ok(())
        }
    }

    fn titles<A: ItemApi>(view: &ListView<A>) -> Vec<String> {
        view.items().iter().map(|i| i.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_load_sorts_locally() {
        let api = FakeApi::seeded(&[
            ("none", None),
            ("late", Some("2026-12-01T09:00")),
            ("early", Some("2026-11-01T09:00")),
        ]);
        let mut view = ListView::new(api);

        view.load().await;
        assert!(!view.is_loading());
        assert_eq!(titles(&view), vec!["early", "late", "none"]);

        view.toggle_sort_order();
        assert_eq!(view.sort_order(), SortOrder::DateDesc);
        assert_eq!(titles(&view), vec!["late", "early", "none"]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_cache_and_clears_loading() {
        let api = FakeApi::seeded(&[("kept", None)]);
        let mut view = ListView::new(api);
        view.load().await;

        view.api().fail.set(true);
        view.load().await;
        assert!(!view.is_loading());
        assert_eq!(titles(&view), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_title_without_request() {
        let mut view = ListView::new(FakeApi::default());
        view.form.title = "   ".to_string();

        assert!(!view.add().await);
        assert_eq!(view.api().calls.get(), 0);
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn test_add_inserts_sorted_and_resets_form() {
        let api = FakeApi::seeded(&[("later", Some("2026-12-01T09:00"))]);
        let mut view = ListView::new(api);
        view.load().await;

        view.form.title = "sooner".to_string();
        view.form.description = "first thing".to_string();
        view.form.reminder_date = "2026-10-01T09:00".to_string();
        assert!(view.add().await);

        assert_eq!(titles(&view), vec!["sooner", "later"]);
        assert!(view.form.title.is_empty());
        assert!(view.form.description.is_empty());
        assert_eq!(view.form.reminder_date.len(), "2026-10-18T09:30".len());
    }

    #[tokio::test]
    async fn test_add_failure_keeps_form() {
        let mut view = ListView::new(FakeApi::default());
        view.api().fail.set(true);
        view.form.title = "Retry me".to_string();

        assert!(!view.add().await);
        assert_eq!(view.form.title, "Retry me");
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_complete_replaces_entry() {
        let mut view = ListView::new(FakeApi::seeded(&[("a", None), ("b", None)]));
        view.load().await;

        assert!(view.toggle_complete(ItemId::new(1)).await);
        assert!(view.find(ItemId::new(1)).unwrap().completed);
        assert!(!view.find(ItemId::new(2)).unwrap().completed);

        assert!(view.toggle_complete(ItemId::new(1)).await);
        assert!(!view.find(ItemId::new(1)).unwrap().completed);
    }

    #[tokio::test]
    async fn test_toggle_failure_leaves_entry() {
        let mut view = ListView::new(FakeApi::seeded(&[("a", None)]));
        view.load().await;
        view.api().fail.set(true);

        assert!(!view.toggle_complete(ItemId::new(1)).await);
        assert!(!view.find(ItemId::new(1)).unwrap().completed);
    }

    #[tokio::test]
    async fn test_edit_save_and_cancel() {
        let mut view = ListView::new(FakeApi::seeded(&[
            ("first", Some("2026-11-01T09:00")),
            ("second", Some("2026-11-02T09:00")),
        ]));
        view.load().await;

        assert!(view.start_edit(ItemId::new(1)));
        view.editing_mut().unwrap().title = "changed".to_string();
        view.cancel_edit();
        assert!(view.editing().is_none());
        assert_eq!(titles(&view), vec!["first", "second"]);
        let calls = view.api().calls.get();

        assert!(view.start_edit(ItemId::new(1)));
        {
            let draft = view.editing_mut().unwrap();
            draft.title = "moved".to_string();
            draft.reminder_date = Some("2026-11-03T09:00".to_string());
            draft.completed = true;
        }
        assert!(view.save_edit().await);
        assert_eq!(view.api().calls.get(), calls + 1);
        assert!(view.editing().is_none());
        assert_eq!(titles(&view), vec!["second", "moved"]);
        assert!(!view.find(ItemId::new(1)).unwrap().completed);
    }

    #[tokio::test]
    async fn test_save_edit_rejects_blank_title() {
        let mut view = ListView::new(FakeApi::seeded(&[("keep", None)]));
        view.load().await;
        let calls = view.api().calls.get();

        view.start_edit(ItemId::new(1));
        view.editing_mut().unwrap().title = " ".to_string();
        assert!(!view.save_edit().await);
        assert_eq!(view.api().calls.get(), calls);
        assert!(view.editing().is_some());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut view = ListView::new(FakeApi::seeded(&[("a", None), ("b", None)]));
        view.load().await;
        let calls = view.api().calls.get();

        assert!(!view.delete(ItemId::new(1), |_| false).await);
        assert_eq!(view.api().calls.get(), calls);
        assert_eq!(view.items().len(), 2);

        assert!(view.delete(ItemId::new(1), |item| item.title == "a").await);
        assert_eq!(titles(&view), vec!["b"]);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_entry() {
        let mut view = ListView::new(FakeApi::seeded(&[("a", None)]));
        view.load().await;
        view.api().fail.set(true);

        assert!(!view.delete(ItemId::new(1), |_| true).await);
        assert_eq!(view.items().len(), 1);
    }

    #[test]
    fn test_default_reminder_format() {
        let reminder = default_reminder();
        assert!(chrono::NaiveDateTime::parse_from_str(&reminder, REMINDER_FORMAT).is_ok());
    }
}
