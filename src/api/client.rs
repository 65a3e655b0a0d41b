use std::sync::Arc;

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::identity::SessionState;

/// Shared HTTP transport: joins paths onto the API base, injects the bearer
/// token when a session exists, and classifies non-success statuses. A 401
/// is the auth-failure signal and tears the session down before the error
/// is returned.
pub struct HttpClient {
    base: String,
    http: reqwest::Client,
    session: Arc<SessionState>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpClient {
    pub fn new(api_url: &str, session: Arc<SessionState>) -> AppResult<Self> {
        // validate the base once; requests use plain concatenation so a base
        // with a path ("/api") keeps it
        Url::parse(api_url).map_err(|_| AppError::user("api_url", "invalid API base URL"))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::internal("http_client", e.to_string().as_str()))?;
        Ok(Self { base: api_url.trim_end_matches('/').to_string(), http, session })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn apply_auth(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => rb.bearer_auth(token.as_str()),
            None => rb,
        }
    }

    async fn execute(&self, rb: RequestBuilder) -> AppResult<Response> {
        let resp = self
            .apply_auth(rb)
            .send()
            .await
            .map_err(|e| AppError::network("request_failed", format!("Network error: {}", e).as_str()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| AppError::default_message(code).to_string());
        debug!(target: "reclaim::http", "remote error status={} message='{}'", code, message);
        if code == 401 {
            self.session.invalidate();
        }
        Err(AppError::from_status(code, message))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> AppResult<T> {
        resp.json::<T>()
            .await
            .map_err(|e| AppError::internal("decode_failed", format!("invalid response body: {}", e).as_str()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let rb = self.http.get(self.url(path)).query(query);
        Self::decode(self.execute(rb).await?).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let rb = self.http.post(self.url(path)).json(body);
        Self::decode(self.execute(rb).await?).await
    }

    /// POST with a body where only success matters.
    pub async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<()> {
        let rb = self.http.post(self.url(path)).json(body);
        self.execute(rb).await.map(|_| ())
    }

    /// Body-less POST (logout and friends).
    pub async fn post_empty(&self, path: &str) -> AppResult<()> {
        self.execute(self.http.post(self.url(path))).await.map(|_| ())
    }

    pub async fn put_ack(&self, path: &str) -> AppResult<()> {
        self.execute(self.http.put(self.url(path))).await.map(|_| ())
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: reqwest::multipart::Form) -> AppResult<T> {
        let rb = self.http.post(self.url(path)).multipart(form);
        Self::decode(self.execute(rb).await?).await
    }

    /// Opaque binary download (report export).
    pub async fn get_bytes(&self, path: &str) -> AppResult<Vec<u8>> {
        let resp = self.execute(self.http.get(self.url(path))).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::network("download_failed", format!("download interrupted: {}", e).as_str()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryVault;

    fn client(base: &str) -> HttpClient {
        let state = SessionState::new(Arc::new(MemoryVault::new()));
        HttpClient::new(base, state).unwrap()
    }

    #[test]
    fn base_path_is_preserved_when_joining() {
        let c = client("http://localhost:8080/api");
        assert_eq!(c.url("/lost"), "http://localhost:8080/api/lost");
        let c = client("http://localhost:8080/api/");
        assert_eq!(c.url("/claims/user"), "http://localhost:8080/api/claims/user");
    }

    #[test]
    fn invalid_base_is_rejected() {
        let state = SessionState::new(Arc::new(MemoryVault::new()));
        assert!(HttpClient::new("not a url", state).is_err());
    }
}
