//! Session lifecycle integration tests: vault rehydration, expiry at
//! startup, login/logout and the all-or-nothing adoption invariant.
//! Positive and negative paths use a scripted auth collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;

use reclaim::error::{AppError, AppResult};
use reclaim::identity::{
    AuthProvider, AuthSession, BearerToken, MemoryVault, Principal, SessionState, SessionStore,
    SessionVault, TOKEN_KEY, USER_KEY,
};
use reclaim::model::Role;

fn token_with_exp(exp: i64) -> String {
    let body = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::json!({ "sub": "u-1", "exp": exp }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body)
}

fn principal(role: Role) -> Principal {
    Principal { id: "u-1".into(), name: "Asha".into(), email: "asha@example.com".into(), role }
}

#[derive(Default)]
struct ScriptedAuth {
    fail_login: bool,
    fail_logout: bool,
    login_calls: Mutex<usize>,
    logout_calls: Mutex<usize>,
}

#[async_trait]
impl AuthProvider for ScriptedAuth {
    async fn login(&self, _email: &str, _password: &str) -> AppResult<AuthSession> {
        *self.login_calls.lock() += 1;
        if self.fail_login {
            return Err(AppError::auth("invalid_credentials", "Invalid email or password"));
        }
        Ok(AuthSession {
            token: BearerToken::new(token_with_exp(Utc::now().timestamp() + 3600)),
            user: principal(Role::User),
        })
    }

    async fn register(&self, _name: &str, _email: &str, _password: &str) -> AppResult<AuthSession> {
        Ok(AuthSession {
            token: BearerToken::new(token_with_exp(Utc::now().timestamp() + 3600)),
            user: principal(Role::User),
        })
    }

    async fn forgot_password(&self, _email: &str) -> AppResult<()> {
        Ok(())
    }

    async fn reset_password(&self, _email: &str, _otp: &str, _new_password: &str) -> AppResult<()> {
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        *self.logout_calls.lock() += 1;
        if self.fail_logout {
            return Err(AppError::network("request_failed", "connection refused"));
        }
        Ok(())
    }

    async fn register_admin(&self, _name: &str, _email: &str, _password: &str) -> AppResult<()> {
        Ok(())
    }
}

fn seeded_vault(exp: i64, role: Role) -> Arc<MemoryVault> {
    let vault = Arc::new(MemoryVault::new());
    vault.put(TOKEN_KEY, &token_with_exp(exp));
    vault.put(USER_KEY, &serde_json::to_string(&principal(role)).unwrap());
    vault
}

#[tokio::test]
async fn expired_token_is_never_adopted_at_startup() {
    // embedded expiry one second in the past at load time
    let state = SessionState::new(seeded_vault(Utc::now().timestamp() - 1, Role::User));
    state.initialize();
    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
}

#[tokio::test]
async fn live_token_is_adopted_and_survives_restart() {
    let vault = seeded_vault(Utc::now().timestamp() + 3600, Role::Admin);
    let state = SessionState::new(vault.clone());
    state.initialize();
    assert!(state.is_authenticated());
    assert!(state.is_admin());

    // a second process start over the same vault sees the same session
    let reloaded = SessionState::new(vault);
    reloaded.initialize();
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.user().unwrap().id, "u-1");
}

#[tokio::test]
async fn login_persists_both_entries() {
    let vault = Arc::new(MemoryVault::new());
    let state = SessionState::new(vault.clone());
    let store = SessionStore::new(state.clone(), Arc::new(ScriptedAuth::default()));

    let user = store.login("asha@example.com", "secret1").await.unwrap();
    assert_eq!(user.id, "u-1");
    assert!(store.is_authenticated());
    assert!(vault.get(TOKEN_KEY).is_some());
    assert!(vault.get(USER_KEY).is_some());
}

#[tokio::test]
async fn failed_login_leaves_prior_session_untouched() {
    let vault = seeded_vault(Utc::now().timestamp() + 3600, Role::User);
    let state = SessionState::new(vault);
    state.initialize();
    let store = SessionStore::new(
        state.clone(),
        Arc::new(ScriptedAuth { fail_login: true, ..Default::default() }),
    );

    let err = store.login("asha@example.com", "wrong-password").await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(state.is_authenticated());
    assert_eq!(state.user().unwrap().id, "u-1");
}

#[tokio::test]
async fn local_validation_blocks_before_any_remote_call() {
    let auth = Arc::new(ScriptedAuth::default());
    let state = SessionState::new(Arc::new(MemoryVault::new()));
    let store = SessionStore::new(state, auth.clone());

    let err = store.login("not-an-address", "secret1").await.unwrap_err();
    assert!(matches!(err, AppError::UserInput { .. }));
    let err = store.login("a@b.co", "tiny").await.unwrap_err();
    assert!(matches!(err, AppError::UserInput { .. }));
    assert_eq!(*auth.login_calls.lock(), 0);
}

#[tokio::test]
async fn logout_clears_locally_even_when_remote_fails() {
    let vault = seeded_vault(Utc::now().timestamp() + 3600, Role::User);
    let state = SessionState::new(vault.clone());
    state.initialize();
    let auth = Arc::new(ScriptedAuth { fail_logout: true, ..Default::default() });
    let store = SessionStore::new(state.clone(), auth.clone());

    store.logout().await;
    assert_eq!(*auth.logout_calls.lock(), 1);
    assert!(!state.is_authenticated());
    assert!(vault.get(TOKEN_KEY).is_none());
    assert!(vault.get(USER_KEY).is_none());
}

#[tokio::test]
async fn registration_authenticates_immediately() {
    let state = SessionState::new(Arc::new(MemoryVault::new()));
    let store = SessionStore::new(state.clone(), Arc::new(ScriptedAuth::default()));
    store.register("Asha", "asha@example.com", "secret1").await.unwrap();
    assert!(state.is_authenticated());
}

#[tokio::test]
async fn reset_flow_tracks_pending_verification() {
    let state = SessionState::new(Arc::new(MemoryVault::new()));
    let store = SessionStore::new(state.clone(), Arc::new(ScriptedAuth::default()));

    store.forgot_password("asha@example.com").await.unwrap();
    assert_eq!(store.pending_verification().unwrap().email, "asha@example.com");
    // requesting a code does not authenticate
    assert!(!state.is_authenticated());

    store.reset_password("asha@example.com", "123456", "newpass").await.unwrap();
    assert!(store.pending_verification().is_none());
    // neither does consuming it
    assert!(!state.is_authenticated());
}

#[tokio::test]
async fn auth_failure_signal_destroys_the_session() {
    let vault = seeded_vault(Utc::now().timestamp() + 3600, Role::User);
    let state = SessionState::new(vault.clone());
    state.initialize();
    assert!(state.is_authenticated());

    state.invalidate();
    assert!(!state.is_authenticated());
    assert!(vault.get(TOKEN_KEY).is_none());
}
