//! Central identity and session management for the registry client.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod token;
mod vault;
mod provider;
mod store;
mod guard;

pub use principal::Principal;
pub use token::{BearerToken, TokenExpiry};
pub use vault::{FileVault, MemoryVault, SessionVault, TOKEN_KEY, USER_KEY};
pub use provider::{AuthProvider, AuthSession};
pub use store::{PendingVerification, Session, SessionState, SessionStore};
pub use guard::{check, Access, Capability};
