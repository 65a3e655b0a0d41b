use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppResult;
use crate::identity::{AuthProvider, AuthSession, BearerToken, Principal};

use super::client::HttpClient;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: Principal,
}

impl From<AuthResponse> for AuthSession {
    fn from(resp: AuthResponse) -> Self {
        AuthSession { token: BearerToken::new(resp.token), user: resp.user }
    }
}

pub struct HttpAuthProvider {
    client: Arc<HttpClient>,
}

impl HttpAuthProvider {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let resp: AuthResponse = self
            .client
            .post_json("/auth/login", &serde_json::json!({ "email": email, "password": password }))
            .await?;
        Ok(resp.into())
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<AuthSession> {
        let resp: AuthResponse = self
            .client
            .post_json(
                "/auth/register",
                &serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        Ok(resp.into())
    }

    async fn forgot_password(&self, email: &str) -> AppResult<()> {
        self.client
            .post_ack("/auth/forgot-password", &serde_json::json!({ "email": email }))
            .await
    }

    async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> AppResult<()> {
        self.client
            .post_ack(
                "/auth/reset-password",
                &serde_json::json!({ "email": email, "otp": otp, "newPassword": new_password }),
            )
            .await
    }

    async fn logout(&self) -> AppResult<()> {
        self.client.post_empty("/auth/logout").await
    }

    async fn register_admin(&self, name: &str, email: &str, password: &str) -> AppResult<()> {
        self.client
            .post_ack(
                "/auth/register-admin",
                &serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await
    }
}
