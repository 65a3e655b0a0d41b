//! Read-side projection of the item registry plus the report submission
//! path. Items are refreshable copies of remote state; the registry never
//! caches across calls.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::AppResult;
use crate::model::{Item, ItemDraft, ItemKind, Page, PageQuery};
use crate::validate;

/// Remote items collaborator.
#[async_trait]
pub trait ItemsProvider: Send + Sync {
    async fn report(&self, kind: ItemKind, draft: &ItemDraft) -> AppResult<Item>;
    async fn list(&self, kind: ItemKind, query: &PageQuery) -> AppResult<Page<Item>>;
    async fn get(&self, kind: ItemKind, id: &str) -> AppResult<Item>;
    async fn list_mine(&self, kind: ItemKind) -> AppResult<Vec<Item>>;
}

pub struct ItemRegistry {
    provider: Arc<dyn ItemsProvider>,
}

impl ItemRegistry {
    pub fn new(provider: Arc<dyn ItemsProvider>) -> Self {
        Self { provider }
    }

    /// Zero-based page of items with optional free-text search.
    pub async fn browse(&self, kind: ItemKind, query: &PageQuery) -> AppResult<Page<Item>> {
        self.provider.list(kind, query).await
    }

    pub async fn detail(&self, kind: ItemKind, id: &str) -> AppResult<Item> {
        self.provider.get(kind, id).await
    }

    pub async fn mine(&self, kind: ItemKind) -> AppResult<Vec<Item>> {
        self.provider.list_mine(kind).await
    }

    /// Validates locally, then submits. A validation failure never issues
    /// the request.
    pub async fn report(&self, kind: ItemKind, draft: &ItemDraft) -> AppResult<Item> {
        validate::item_draft(draft)?;
        let item = self.provider.report(kind, draft).await?;
        info!(target: "reclaim::items", "reported {} item id={}", kind.segment(), item.id);
        Ok(item)
    }
}
