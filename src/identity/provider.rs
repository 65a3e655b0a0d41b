use async_trait::async_trait;

use crate::error::AppResult;

use super::principal::Principal;
use super::token::BearerToken;

/// Credentials exchanged for an authenticated session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: BearerToken,
    pub user: Principal,
}

/// Remote auth collaborator. Implemented over HTTP by the api layer and by
/// scripted fakes in tests.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession>;
    async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<AuthSession>;
    async fn forgot_password(&self, email: &str) -> AppResult<()>;
    async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> AppResult<()>;
    async fn logout(&self) -> AppResult<()>;
    /// Same shape as register but never authenticates the caller.
    async fn register_admin(&self, name: &str, email: &str, password: &str) -> AppResult<()>;
}
