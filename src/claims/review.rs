//! Admin review queue: one filtered, paginated page of claims held in
//! memory, with per-row in-flight flags. Page indices are zero-based here;
//! the console translates to 1-based display.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::identity::{check, Access, Capability, SessionState};
use crate::model::{Claim, ClaimQuery, ClaimStatus};

use super::lifecycle::{transition_allowed, ClaimsProvider};

struct QueueState {
    rows: Vec<Claim>,
    page: usize,
    total_pages: usize,
    status: ClaimStatus,
    search: String,
    /// Claim ids with a mutation in flight. Kept apart from `rows` so a
    /// refetch never disturbs other rows' flags.
    processing: HashSet<String>,
}

pub struct ReviewQueue {
    provider: Arc<dyn ClaimsProvider>,
    session: Arc<SessionState>,
    page_size: usize,
    state: RwLock<QueueState>,
}

#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub claim: Claim,
    pub processing: bool,
}

#[derive(Debug, Clone)]
pub struct ReviewSnapshot {
    pub rows: Vec<ReviewRow>,
    pub page: usize,
    pub total_pages: usize,
    pub status: ClaimStatus,
    pub search: String,
}

impl ReviewSnapshot {
    /// 1-based page number for display.
    pub fn display_page(&self) -> usize {
        self.page + 1
    }
}

impl ReviewQueue {
    pub fn new(provider: Arc<dyn ClaimsProvider>, session: Arc<SessionState>, page_size: usize) -> Self {
        Self {
            provider,
            session,
            page_size,
            state: RwLock::new(QueueState {
                rows: Vec::new(),
                page: 0,
                total_pages: 0,
                status: ClaimStatus::Pending,
                search: String::new(),
                processing: HashSet::new(),
            }),
        }
    }

    fn ensure_admin(&self) -> AppResult<()> {
        match check(&self.session, Capability::Admin) {
            Access::Granted => Ok(()),
            Access::ToLogin => Err(AppError::auth("unauthenticated", "Please log in first")),
            Access::ToDashboard => Err(AppError::forbidden("admin_only", "Administrator access required")),
        }
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        let s = self.state.read();
        ReviewSnapshot {
            rows: s
                .rows
                .iter()
                .map(|c| ReviewRow { claim: c.clone(), processing: s.processing.contains(&c.id) })
                .collect(),
            page: s.page,
            total_pages: s.total_pages,
            status: s.status,
            search: s.search.clone(),
        }
    }

    /// Fetch the current page under the current filter and replace the held
    /// rows wholesale.
    pub async fn refresh(&self) -> AppResult<()> {
        self.ensure_admin()?;
        let query = {
            let s = self.state.read();
            ClaimQuery { page: s.page, size: self.page_size, status: s.status, search: s.search.clone() }
        };
        let page = self.provider.list(&query).await?;
        let mut s = self.state.write();
        s.rows = page.content;
        s.total_pages = page.total_pages;
        Ok(())
    }

    /// Switching the status filter always resets to the first page before
    /// the fetch; a stale page number is never issued against a new filter.
    pub async fn set_status_filter(&self, status: ClaimStatus) -> AppResult<()> {
        {
            let mut s = self.state.write();
            s.status = status;
            s.page = 0;
        }
        self.refresh().await
    }

    /// New search term, same reset rule as the status filter.
    pub async fn set_search(&self, term: &str) -> AppResult<()> {
        {
            let mut s = self.state.write();
            s.search = term.to_string();
            s.page = 0;
        }
        self.refresh().await
    }

    /// Open a 1-based display page.
    pub async fn open_page(&self, display_page: usize) -> AppResult<()> {
        {
            let mut s = self.state.write();
            s.page = display_page.saturating_sub(1);
        }
        self.refresh().await
    }

    pub async fn approve(&self, id: &str) -> AppResult<()> {
        self.adjudicate(id, ClaimStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> AppResult<()> {
        self.adjudicate(id, ClaimStatus::Rejected).await
    }

    async fn adjudicate(&self, id: &str, to: ClaimStatus) -> AppResult<()> {
        self.ensure_admin()?;
        let active_filter;
        {
            let mut s = self.state.write();
            let Some(row) = s.rows.iter().find(|c| c.id == id) else {
                return Err(AppError::not_found("claim_missing", "No such claim on the current page"));
            };
            if !transition_allowed(row.status, to) {
                return Err(AppError::conflict("claim_resolved", "Claim has already been resolved"));
            }
            if !s.processing.insert(id.to_string()) {
                return Err(AppError::conflict("claim_busy", "This claim is still being processed"));
            }
            active_filter = s.status;
        }

        let result = if to == ClaimStatus::Approved {
            self.provider.approve(id).await
        } else {
            self.provider.reject(id).await
        };

        match result {
            Ok(()) => {
                {
                    // optimistic patch after remote confirmation; the row
                    // set is replaced as a whole
                    let mut s = self.state.write();
                    s.processing.remove(id);
                    let rows: Vec<Claim> = s
                        .rows
                        .iter()
                        .cloned()
                        .map(|mut c| {
                            if c.id == id {
                                c.status = to;
                            }
                            c
                        })
                        .collect();
                    s.rows = rows;
                }
                info!(target: "reclaim::claims", "claim {} -> {}", id, to);
                // a resolved claim no longer matches a PENDING-only filter;
                // refetch just the current page so it drops out of view
                if active_filter == ClaimStatus::Pending {
                    self.refresh().await?;
                }
                Ok(())
            }
            Err(e) => {
                // displayed status stays unchanged; no automatic retry
                self.state.write().processing.remove(id);
                Err(e)
            }
        }
    }
}
