use std::sync::Arc;

use async_trait::async_trait;

use crate::admin::UsersProvider;
use crate::error::AppResult;
use crate::model::{Account, DashboardStats, Page, PageQuery};

use super::client::HttpClient;

pub struct HttpUsersProvider {
    client: Arc<HttpClient>,
}

impl HttpUsersProvider {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UsersProvider for HttpUsersProvider {
    async fn list(&self, query: &PageQuery) -> AppResult<Page<Account>> {
        self.client.get_json("/users", &query.params()).await
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> AppResult<()> {
        let action = if enabled { "enable" } else { "disable" };
        self.client.put_ack(&format!("/users/{}/{}", id, action)).await
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        self.client.get_json("/users/dashboard-stats", &[]).await
    }
}
