//! The user's "my reports" aggregate: lost items, found items and claims
//! fetched concurrently. Each section fails on its own; one broken read
//! never blanks the other two.

use std::sync::Arc;

use futures_util::join;

use crate::error::AppResult;
use crate::model::{Claim, Item, ItemKind};
use crate::claims::ClaimsProvider;
use crate::registry::ItemsProvider;

/// One independently fetched section: either its rows or its own error.
#[derive(Debug, Clone)]
pub enum Section<T> {
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Section<T> {
    fn from_result(res: AppResult<Vec<T>>) -> Self {
        match res {
            Ok(rows) => Section::Loaded(rows),
            Err(e) => Section::Failed(e.message().to_string()),
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Section::Loaded(rows) => rows,
            Section::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Loaded(_) => None,
            Section::Failed(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MyReports {
    pub lost: Section<Item>,
    pub found: Section<Item>,
    pub claims: Section<Claim>,
}

/// Issue the three reads concurrently and join; no ordering dependency
/// between them.
pub async fn fetch_my_reports(
    items: &Arc<dyn ItemsProvider>,
    claims: &Arc<dyn ClaimsProvider>,
) -> MyReports {
    let (lost, found, mine) = join!(
        items.list_mine(ItemKind::Lost),
        items.list_mine(ItemKind::Found),
        claims.list_mine(),
    );
    MyReports {
        lost: Section::from_result(lost),
        found: Section::from_result(found),
        claims: Section::from_result(mine),
    }
}
