//! Route/action gating. Each protected surface declares the capability it
//! requires; one shared check answers against the session query surface.

use super::store::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Public,
    Authenticated,
    Admin,
}

/// Outcome of a gate check. Denials name a fallback surface instead of
/// erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Unauthenticated caller: send to the login page.
    ToLogin,
    /// Authenticated but not admin on an admin-only surface: send to the
    /// user dashboard.
    ToDashboard,
}

impl Access {
    pub fn granted(&self) -> bool {
        matches!(self, Access::Granted)
    }

    pub fn fallback(&self) -> Option<&'static str> {
        match self {
            Access::Granted => None,
            Access::ToLogin => Some("login"),
            Access::ToDashboard => Some("dashboard"),
        }
    }
}

pub fn check(state: &SessionState, required: Capability) -> Access {
    match required {
        Capability::Public => Access::Granted,
        Capability::Authenticated => {
            if state.is_authenticated() {
                Access::Granted
            } else {
                Access::ToLogin
            }
        }
        Capability::Admin => {
            if !state.is_authenticated() {
                Access::ToLogin
            } else if state.is_admin() {
                Access::Granted
            } else {
                Access::ToDashboard
            }
        }
    }
}
