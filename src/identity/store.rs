use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::validate;

use super::principal::Principal;
use super::provider::{AuthProvider, AuthSession};
use super::token::BearerToken;
use super::vault::{SessionVault, TOKEN_KEY, USER_KEY};

/// The single authenticated identity plus its bearer credential. Always
/// replaced as a whole; there is never a token without a user or vice versa.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: BearerToken,
    pub user: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub email: String,
}

/// Process-wide session state shared between the store (which mutates it
/// through the auth operations) and the HTTP layer (which reads the token
/// and tears the session down on an auth-failure signal).
pub struct SessionState {
    current: RwLock<Option<Session>>,
    pending: RwLock<Option<PendingVerification>>,
    vault: Arc<dyn SessionVault>,
}

impl SessionState {
    pub fn new(vault: Arc<dyn SessionVault>) -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(None),
            pending: RwLock::new(None),
            vault,
        })
    }

    /// Rehydrate from the vault. An expired, corrupt or half-written pair is
    /// discarded silently; the result is simply an unauthenticated session.
    /// Must run before any authorization decision is trusted.
    pub fn initialize(&self) {
        let token = self.vault.get(TOKEN_KEY).map(BearerToken::new);
        let user = self
            .vault
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<Principal>(&raw).ok());
        match (token, user) {
            (Some(token), Some(user)) if token.usable_at(Utc::now()) => {
                debug!(target: "reclaim::auth", "session restored user={}", user.id);
                *self.current.write() = Some(Session { token, user });
            }
            (None, None) => {}
            _ => {
                debug!(target: "reclaim::auth", "discarding stale persisted session");
                self.vault.remove(TOKEN_KEY);
                self.vault.remove(USER_KEY);
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn user(&self) -> Option<Principal> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<BearerToken> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current.read().as_ref().map(|s| s.user.is_admin()).unwrap_or(false)
    }

    pub fn pending_verification(&self) -> Option<PendingVerification> {
        self.pending.read().clone()
    }

    pub fn set_pending_verification(&self, pending: Option<PendingVerification>) {
        *self.pending.write() = pending;
    }

    /// Persist then adopt. Vault first so a crash between the two steps
    /// leaves durable state ahead of memory, never behind it.
    pub(crate) fn adopt(&self, session: Session) {
        self.vault.put(TOKEN_KEY, session.token.as_str());
        if let Ok(raw) = serde_json::to_string(&session.user) {
            self.vault.put(USER_KEY, &raw);
        }
        *self.current.write() = Some(session);
    }

    /// Drop local and durable session state unconditionally.
    pub fn clear(&self) {
        self.vault.remove(TOKEN_KEY);
        self.vault.remove(USER_KEY);
        *self.current.write() = None;
    }

    /// The remote proved the token invalid (401); destroy the session.
    pub fn invalidate(&self) {
        if self.is_authenticated() {
            warn!(target: "reclaim::auth", "session invalidated by auth failure");
        }
        self.clear();
    }
}

/// Auth lifecycle operations over the shared state. All remote failures are
/// surfaced as a single error message and leave prior state untouched.
pub struct SessionStore {
    state: Arc<SessionState>,
    provider: Arc<dyn AuthProvider>,
}

impl SessionStore {
    pub fn new(state: Arc<SessionState>, provider: Arc<dyn AuthProvider>) -> Self {
        Self { state, provider }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn initialize(&self) {
        self.state.initialize();
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    pub fn current_user(&self) -> Option<Principal> {
        self.state.user()
    }

    pub fn pending_verification(&self) -> Option<PendingVerification> {
        self.state.pending_verification()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Principal> {
        validate::email(email)?;
        validate::password(password)?;
        let AuthSession { token, user } = self.provider.login(email, password).await?;
        info!(target: "reclaim::auth", "login ok user={}", user.id);
        self.state.adopt(Session { token, user: user.clone() });
        Ok(user)
    }

    /// Registration auto-logs-in on success.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<Principal> {
        validate::required("name", name)?;
        validate::email(email)?;
        validate::password(password)?;
        let AuthSession { token, user } = self.provider.register(name, email, password).await?;
        info!(target: "reclaim::auth", "register ok user={}", user.id);
        self.state.adopt(Session { token, user: user.clone() });
        Ok(user)
    }

    /// Requests a reset code; records the address awaiting verification.
    /// Does not change authentication state.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        validate::email(email)?;
        self.provider.forgot_password(email).await?;
        self.state.set_pending_verification(Some(PendingVerification { email: email.to_string() }));
        Ok(())
    }

    /// Consumes the code. Does not authenticate; the user logs in afterward.
    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> AppResult<()> {
        validate::email(email)?;
        validate::required("otp", otp)?;
        validate::password(new_password)?;
        self.provider.reset_password(email, otp, new_password).await?;
        self.state.set_pending_verification(None);
        Ok(())
    }

    /// Remote side is informed best-effort; local state clears regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.provider.logout().await {
            warn!(target: "reclaim::auth", "remote logout failed: {}", e);
        }
        self.state.clear();
        info!(target: "reclaim::auth", "logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::vault::MemoryVault;
    use crate::model::Role;
    use base64::Engine;

    fn principal(role: Role) -> Principal {
        Principal { id: "u-1".into(), name: "A".into(), email: "a@example.com".into(), role }
    }

    fn token_with_exp(exp: i64) -> String {
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::json!({ "exp": exp }).to_string());
        format!("h.{}.s", body)
    }

    fn seeded_state(token: &str, user: &Principal) -> Arc<SessionState> {
        let vault = Arc::new(MemoryVault::new());
        vault.put(TOKEN_KEY, token);
        vault.put(USER_KEY, &serde_json::to_string(user).unwrap());
        SessionState::new(vault)
    }

    #[test]
    fn initialize_adopts_live_token() {
        let state = seeded_state(&token_with_exp(Utc::now().timestamp() + 3600), &principal(Role::User));
        state.initialize();
        assert!(state.is_authenticated());
        assert!(!state.is_admin());
        assert_eq!(state.user().unwrap().id, "u-1");
    }

    #[test]
    fn initialize_discards_expired_token() {
        let state = seeded_state(&token_with_exp(Utc::now().timestamp() - 1), &principal(Role::Admin));
        state.initialize();
        assert!(!state.is_authenticated());
        assert!(!state.is_admin());
    }

    #[test]
    fn initialize_discards_half_written_pair() {
        let vault = Arc::new(MemoryVault::new());
        vault.put(TOKEN_KEY, &token_with_exp(Utc::now().timestamp() + 3600));
        let state = SessionState::new(vault.clone());
        state.initialize();
        assert!(!state.is_authenticated());
        assert!(vault.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn initialize_discards_corrupt_user_entry() {
        let vault = Arc::new(MemoryVault::new());
        vault.put(TOKEN_KEY, &token_with_exp(Utc::now().timestamp() + 3600));
        vault.put(USER_KEY, "{ this is not a principal");
        let state = SessionState::new(vault);
        state.initialize();
        assert!(!state.is_authenticated());
    }

    #[test]
    fn authenticated_iff_user_present() {
        let vault = Arc::new(MemoryVault::new());
        let state = SessionState::new(vault);
        assert_eq!(state.is_authenticated(), state.user().is_some());

        state.adopt(Session {
            token: BearerToken::new(token_with_exp(Utc::now().timestamp() + 3600)),
            user: principal(Role::Admin),
        });
        assert_eq!(state.is_authenticated(), state.user().is_some());
        assert!(state.is_admin());

        state.invalidate();
        assert_eq!(state.is_authenticated(), state.user().is_some());
        assert!(!state.is_authenticated());
    }
}
