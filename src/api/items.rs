use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::AppResult;
use crate::model::{Item, ItemDraft, ItemKind, Page, PageQuery};
use crate::registry::ItemsProvider;

use super::client::HttpClient;

pub struct HttpItemsProvider {
    client: Arc<HttpClient>,
}

impl HttpItemsProvider {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

fn report_form(kind: ItemKind, draft: &ItemDraft) -> Form {
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("description", draft.description.clone())
        .text("category", draft.category.clone())
        .text("location", draft.location.clone())
        .text(kind.date_field(), draft.event_date.format("%Y-%m-%d").to_string())
        .text("contactInfo", draft.contact_info.clone());
    if let Some(image) = &draft.image {
        form = form.part("image", Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()));
    }
    form
}

#[async_trait]
impl ItemsProvider for HttpItemsProvider {
    async fn report(&self, kind: ItemKind, draft: &ItemDraft) -> AppResult<Item> {
        self.client
            .post_multipart(&format!("/{}/report", kind.segment()), report_form(kind, draft))
            .await
    }

    async fn list(&self, kind: ItemKind, query: &PageQuery) -> AppResult<Page<Item>> {
        self.client.get_json(&format!("/{}", kind.segment()), &query.params()).await
    }

    async fn get(&self, kind: ItemKind, id: &str) -> AppResult<Item> {
        self.client.get_json(&format!("/{}/{}", kind.segment(), id), &[]).await
    }

    async fn list_mine(&self, kind: ItemKind) -> AppResult<Vec<Item>> {
        self.client.get_json(&format!("/{}/user", kind.segment()), &[]).await
    }
}
