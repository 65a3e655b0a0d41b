//! Admin surface tests: the account directory's optimistic enable/disable
//! reconciliation and the gate in front of every admin operation.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;

use reclaim::admin::{self, UserDirectory, UsersProvider};
use reclaim::error::{AppError, AppResult};
use reclaim::identity::{
    AuthProvider, AuthSession, BearerToken, MemoryVault, Principal, SessionState, SessionVault,
    TOKEN_KEY, USER_KEY,
};
use reclaim::model::{Account, DashboardStats, Page, PageQuery, Role};

const PAGE_SIZE: usize = 10;

fn session_with_role(role: Role) -> Arc<SessionState> {
    let body = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::json!({ "exp": Utc::now().timestamp() + 3600 }).to_string());
    let vault = Arc::new(MemoryVault::new());
    vault.put(TOKEN_KEY, &format!("h.{}.s", body));
    let user = Principal { id: "admin-1".into(), name: "Root".into(), email: "root@example.com".into(), role };
    vault.put(USER_KEY, &serde_json::to_string(&user).unwrap());
    let state = SessionState::new(vault);
    state.initialize();
    state
}

fn account(id: &str, enabled: bool) -> Account {
    Account {
        id: id.into(),
        name: format!("user {}", id),
        email: format!("{}@example.com", id),
        role: Role::User,
        enabled,
    }
}

struct FakeUsers {
    backing: Mutex<Vec<Account>>,
    queries: Mutex<Vec<PageQuery>>,
    toggle_calls: Mutex<usize>,
    fail_toggle: bool,
}

impl FakeUsers {
    fn new(backing: Vec<Account>) -> Self {
        Self {
            backing: Mutex::new(backing),
            queries: Mutex::new(Vec::new()),
            toggle_calls: Mutex::new(0),
            fail_toggle: false,
        }
    }
}

#[async_trait]
impl UsersProvider for FakeUsers {
    async fn list(&self, query: &PageQuery) -> AppResult<Page<Account>> {
        self.queries.lock().push(query.clone());
        let rows: Vec<Account> = self
            .backing
            .lock()
            .iter()
            .filter(|a| query.search.as_deref().map(|s| a.name.contains(s)).unwrap_or(true))
            .cloned()
            .collect();
        let total_pages = rows.len().div_ceil(query.size);
        let content: Vec<Account> = rows.into_iter().skip(query.page * query.size).take(query.size).collect();
        let total = content.len() as u64;
        Ok(Page { content, total_pages, total_elements: total, number: query.page })
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> AppResult<()> {
        *self.toggle_calls.lock() += 1;
        if self.fail_toggle {
            return Err(AppError::internal("server_error", "boom"));
        }
        for a in self.backing.lock().iter_mut() {
            if a.id == id {
                a.enabled = enabled;
            }
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats { total_users: self.backing.lock().len() as u64, ..Default::default() })
    }
}

#[tokio::test]
async fn disable_patches_the_row_after_confirmation() {
    let provider = Arc::new(FakeUsers::new(vec![account("u-1", true), account("u-2", true)]));
    let directory = UserDirectory::new(provider.clone(), session_with_role(Role::Admin), PAGE_SIZE);
    directory.refresh().await.unwrap();

    directory.disable("u-1").await.unwrap();
    let snap = directory.snapshot();
    assert!(!snap.rows.iter().find(|r| r.account.id == "u-1").unwrap().account.enabled);
    assert!(snap.rows.iter().find(|r| r.account.id == "u-2").unwrap().account.enabled);
    assert!(snap.rows.iter().all(|r| !r.processing));

    // disabling again is a local conflict, not a remote call
    let err = directory.disable("u-1").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
    assert_eq!(*provider.toggle_calls.lock(), 1);

    directory.enable("u-1").await.unwrap();
    assert!(directory.snapshot().rows.iter().find(|r| r.account.id == "u-1").unwrap().account.enabled);
}

#[tokio::test]
async fn failed_toggle_leaves_the_row_unchanged() {
    let provider = Arc::new(FakeUsers { fail_toggle: true, ..FakeUsers::new(vec![account("u-1", true)]) });
    let directory = UserDirectory::new(provider.clone(), session_with_role(Role::Admin), PAGE_SIZE);
    directory.refresh().await.unwrap();

    let err = directory.disable("u-1").await.unwrap_err();
    assert!(matches!(err, AppError::Internal { .. }));
    let snap = directory.snapshot();
    assert!(snap.rows[0].account.enabled);
    assert!(!snap.rows[0].processing);
}

#[tokio::test]
async fn directory_search_resets_the_page() {
    let accounts: Vec<Account> = (0..25).map(|i| account(&format!("u-{}", i), true)).collect();
    let provider = Arc::new(FakeUsers::new(accounts));
    let directory = UserDirectory::new(provider.clone(), session_with_role(Role::Admin), PAGE_SIZE);

    directory.open_page(3).await.unwrap();
    assert_eq!(provider.queries.lock().last().unwrap().page, 2);

    directory.set_search("user u-1").await.unwrap();
    let q = provider.queries.lock().last().unwrap().clone();
    assert_eq!(q.page, 0);
    assert_eq!(q.search.as_deref(), Some("user u-1"));
}

#[tokio::test]
async fn every_admin_operation_is_gated() {
    let provider: Arc<dyn UsersProvider> = Arc::new(FakeUsers::new(vec![account("u-1", true)]));
    let plain = session_with_role(Role::User);

    let directory = UserDirectory::new(provider.clone(), plain.clone(), PAGE_SIZE);
    assert!(matches!(directory.refresh().await.unwrap_err(), AppError::Forbidden { .. }));
    assert!(matches!(admin::dashboard(&plain, &provider).await.unwrap_err(), AppError::Forbidden { .. }));

    struct NoAuth;
    #[async_trait]
    impl AuthProvider for NoAuth {
        async fn login(&self, _e: &str, _p: &str) -> AppResult<AuthSession> {
            Ok(AuthSession {
                token: BearerToken::new("t"),
                user: Principal { id: "x".into(), name: "x".into(), email: "x@y.zz".into(), role: Role::User },
            })
        }
        async fn register(&self, _n: &str, _e: &str, _p: &str) -> AppResult<AuthSession> {
            self.login(_e, _p).await
        }
        async fn forgot_password(&self, _e: &str) -> AppResult<()> { Ok(()) }
        async fn reset_password(&self, _e: &str, _o: &str, _p: &str) -> AppResult<()> { Ok(()) }
        async fn logout(&self) -> AppResult<()> { Ok(()) }
        async fn register_admin(&self, _n: &str, _e: &str, _p: &str) -> AppResult<()> { Ok(()) }
    }
    let auth: Arc<dyn AuthProvider> = Arc::new(NoAuth);
    let err = admin::register_admin(&plain, &auth, "New Admin", "new@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    // an admin session passes
    let root = session_with_role(Role::Admin);
    admin::register_admin(&root, &auth, "New Admin", "new@example.com", "secret1").await.unwrap();
    let stats = admin::dashboard(&root, &provider).await.unwrap();
    assert_eq!(stats.total_users, 1);
}
