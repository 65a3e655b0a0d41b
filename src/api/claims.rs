use std::sync::Arc;

use async_trait::async_trait;

use crate::claims::ClaimsProvider;
use crate::error::AppResult;
use crate::model::{Claim, ClaimQuery, ItemKind, Page};

use super::client::HttpClient;

pub struct HttpClaimsProvider {
    client: Arc<HttpClient>,
}

impl HttpClaimsProvider {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClaimsProvider for HttpClaimsProvider {
    async fn submit(&self, kind: ItemKind, item_id: &str, description: &str) -> AppResult<Claim> {
        self.client
            .post_json(
                &format!("/claims/{}/{}", kind.segment(), item_id),
                &serde_json::json!({ "description": description }),
            )
            .await
    }

    async fn list(&self, query: &ClaimQuery) -> AppResult<Page<Claim>> {
        self.client.get_json("/claims", &query.params()).await
    }

    async fn approve(&self, id: &str) -> AppResult<()> {
        self.client.put_ack(&format!("/claims/approve/{}", id)).await
    }

    async fn reject(&self, id: &str) -> AppResult<()> {
        self.client.put_ack(&format!("/claims/reject/{}", id)).await
    }

    async fn list_mine(&self) -> AppResult<Vec<Claim>> {
        self.client.get_json("/claims/user", &[]).await
    }

    async fn export_approved(&self) -> AppResult<Vec<u8>> {
        self.client.get_bytes("/claims/approved/pdf").await
    }
}
