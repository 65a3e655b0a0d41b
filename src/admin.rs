//! Admin-side account management, dashboard counts and the approved-claims
//! report export. Every operation here passes through the admin gate first.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

use crate::claims::ClaimsProvider;
use crate::error::{AppError, AppResult};
use crate::identity::{check, Access, AuthProvider, Capability, SessionState};
use crate::model::{Account, DashboardStats, Page, PageQuery};
use crate::validate;

/// Remote users collaborator (admin only).
#[async_trait]
pub trait UsersProvider: Send + Sync {
    async fn list(&self, query: &PageQuery) -> AppResult<Page<Account>>;
    async fn set_enabled(&self, id: &str, enabled: bool) -> AppResult<()>;
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}

fn ensure_admin(session: &SessionState) -> AppResult<()> {
    match check(session, Capability::Admin) {
        Access::Granted => Ok(()),
        Access::ToLogin => Err(AppError::auth("unauthenticated", "Please log in first")),
        Access::ToDashboard => Err(AppError::forbidden("admin_only", "Administrator access required")),
    }
}

struct DirectoryState {
    rows: Vec<Account>,
    page: usize,
    total_pages: usize,
    search: String,
    processing: HashSet<String>,
}

/// Paginated, searchable account listing with per-row enable/disable.
/// Same page-reset and in-flight rules as the claims review queue.
pub struct UserDirectory {
    provider: Arc<dyn UsersProvider>,
    session: Arc<SessionState>,
    page_size: usize,
    state: RwLock<DirectoryState>,
}

#[derive(Debug, Clone)]
pub struct DirectoryRow {
    pub account: Account,
    pub processing: bool,
}

#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    pub rows: Vec<DirectoryRow>,
    pub page: usize,
    pub total_pages: usize,
    pub search: String,
}

impl DirectorySnapshot {
    pub fn display_page(&self) -> usize {
        self.page + 1
    }
}

impl UserDirectory {
    pub fn new(provider: Arc<dyn UsersProvider>, session: Arc<SessionState>, page_size: usize) -> Self {
        Self {
            provider,
            session,
            page_size,
            state: RwLock::new(DirectoryState {
                rows: Vec::new(),
                page: 0,
                total_pages: 0,
                search: String::new(),
                processing: HashSet::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        let s = self.state.read();
        DirectorySnapshot {
            rows: s
                .rows
                .iter()
                .map(|a| DirectoryRow { account: a.clone(), processing: s.processing.contains(&a.id) })
                .collect(),
            page: s.page,
            total_pages: s.total_pages,
            search: s.search.clone(),
        }
    }

    pub async fn refresh(&self) -> AppResult<()> {
        ensure_admin(&self.session)?;
        let query = {
            let s = self.state.read();
            PageQuery {
                page: s.page,
                size: self.page_size,
                search: if s.search.is_empty() { None } else { Some(s.search.clone()) },
            }
        };
        let page = self.provider.list(&query).await?;
        let mut s = self.state.write();
        s.rows = page.content;
        s.total_pages = page.total_pages;
        Ok(())
    }

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

    pub async fn enable(&self, id: &str) -> AppResult<()> {
        self.toggle(id, true).await
    }

    pub async fn disable(&self, id: &str) -> AppResult<()> {
        self.toggle(id, false).await
    }

    async fn toggle(&self, id: &str, enabled: bool) -> AppResult<()> {
        ensure_admin(&self.session)?;
        {
            let mut s = self.state.write();
            let Some(row) = s.rows.iter().find(|a| a.id == id) else {
                return Err(AppError::not_found("user_missing", "No such user on the current page"));
            };
            if row.enabled == enabled {
                let msg = if enabled { "Account is already enabled" } else { "Account is already disabled" };
                return Err(AppError::conflict("user_state", msg));
            }
            if !s.processing.insert(id.to_string()) {
                return Err(AppError::conflict("user_busy", "This account is still being processed"));
            }
        }

        let result = self.provider.set_enabled(id, enabled).await;
        let mut s = self.state.write();
        s.processing.remove(id);
        match result {
            Ok(()) => {
                let rows: Vec<Account> = s
                    .rows
                    .iter()
                    .cloned()
                    .map(|mut a| {
                        if a.id == id {
                            a.enabled = enabled;
                        }
                        a
                    })
                    .collect();
                s.rows = rows;
                info!(target: "reclaim::admin", "user {} {}", id, if enabled { "enabled" } else { "disabled" });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Aggregate counts for the admin dashboard.
pub async fn dashboard(session: &SessionState, provider: &Arc<dyn UsersProvider>) -> AppResult<DashboardStats> {
    ensure_admin(session)?;
    provider.dashboard_stats().await
}

/// Provision another administrator. Does not authenticate the caller.
pub async fn register_admin(
    session: &SessionState,
    auth: &Arc<dyn AuthProvider>,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<()> {
    ensure_admin(session)?;
    validate::required("name", name)?;
    validate::email(email)?;
    validate::password(password)?;
    auth.register_admin(name, email, password).await?;
    info!(target: "reclaim::admin", "admin account registered for {}", email);
    Ok(())
}

/// Fetch the approved-claims report and persist the opaque bytes. The
/// document format is entirely the remote side's business.
pub async fn export_approved_claims(
    session: &SessionState,
    claims: &Arc<dyn ClaimsProvider>,
    path: &Path,
) -> AppResult<u64> {
    ensure_admin(session)?;
    let bytes = claims.export_approved().await?;
    std::fs::write(path, &bytes)
        .map_err(|e| AppError::internal("report_write", format!("failed to write report: {}", e).as_str()))?;
    info!(target: "reclaim::admin", "approved-claims report written to {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes.len() as u64)
}
