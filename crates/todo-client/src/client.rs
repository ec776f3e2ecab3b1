//! HTTP client for the item API

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use todo_core::{CreateItemRequest, Item, ItemId, UpdateItemRequest};

/// Base URL used when none is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Errors returned by `ItemApi` calls
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Item not found")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The five item operations, as seen from a client
#[allow(async_fn_in_trait)]
pub trait ItemApi {
    async fn list(&self) -> Result<Vec<Item>, ClientError>;

    async fn get(&self, id: ItemId) -> Result<Item, ClientError>;

    async fn create(&self, request: &CreateItemRequest) -> Result<Item, ClientError>;

    async fn update(&self, id: ItemId, request: &UpdateItemRequest) -> Result<Item, ClientError>;

    async fn delete(&self, id: ItemId) -> Result<(), ClientError>;

    /// Update the item with its `completed` flag negated; nothing else changes
    async fn toggle_complete(&self, item: &Item) -> Result<Item, ClientError> {
        self.update(item.id, &UpdateItemRequest::completed(!item.completed))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Liveness payload from `/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}

/// reqwest-backed `ItemApi`
#[derive(Debug, Clone)]
pub struct ItemClient {
    client: Client,
    base_url: String,
}

impl ItemClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn items_url(&self) -> String {
        format!("{}/items", self.base_url)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/items/{}", self.base_url, id)
    }

    /// Flip `completed` with the server's single-step toggle
    pub async fn toggle(&self, id: ItemId) -> Result<Item, ClientError> {
        let response = self
            .client
            .post(format!("{}/toggle", self.item_url(id)))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

impl Default for ItemClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ItemApi for ItemClient {
    async fn list(&self) -> Result<Vec<Item>, ClientError> {
        let response = self.client.get(self.items_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn get(&self, id: ItemId) -> Result<Item, ClientError> {
        let response = self.client.get(self.item_url(id)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, request: &CreateItemRequest) -> Result<Item, ClientError> {
        let response = self
            .client
            .post(self.items_url())
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, id: ItemId, request: &UpdateItemRequest) -> Result<Item, ClientError> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: ItemId) -> Result<(), ClientError> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into a `ClientError`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = ItemClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.items_url(), "http://localhost:3000/items");
        assert_eq!(
            client.item_url(ItemId::new(5)),
            "http://localhost:3000/items/5"
        );
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(ItemClient::default().base_url(), DEFAULT_BASE_URL);
    }
}
