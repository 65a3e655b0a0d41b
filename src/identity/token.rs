use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential with an embedded expiry claim. The token is
/// never minted locally; only its payload segment is inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken {
    raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExpiry {
    /// Payload decoded but carries no exp claim; the server stays authoritative.
    NoClaim,
    At(DateTime<Utc>),
    /// Not a decodable three-segment token; treated like a corrupt entry.
    Malformed,
}

impl BearerToken {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decode the middle segment and pull the registered exp claim.
    pub fn expiry(&self) -> TokenExpiry {
        let mut segments = self.raw.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(p), Some(_), None) => p,
            _ => return TokenExpiry::Malformed,
        };
        let bytes = match base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload) {
            Ok(b) => b,
            Err(_) => return TokenExpiry::Malformed,
        };
        let claims: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(_) => return TokenExpiry::Malformed,
        };
        match claims.get("exp").and_then(|v| v.as_i64()) {
            Some(secs) => match Utc.timestamp_opt(secs, 0).single() {
                Some(ts) => TokenExpiry::At(ts),
                None => TokenExpiry::Malformed,
            },
            None => TokenExpiry::NoClaim,
        }
    }

    /// Whether the token may be adopted at `now`. Expiry is evaluated here
    /// and nowhere else; `now >= exp` rejects.
    pub fn usable_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry() {
            TokenExpiry::At(exp) => now < exp,
            TokenExpiry::NoClaim => true,
            TokenExpiry::Malformed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn token_with_exp(exp: i64) -> BearerToken {
        let payload = serde_json::json!({ "sub": "u-1", "exp": exp });
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        BearerToken::new(format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body))
    }

    #[test]
    fn expiry_claim_is_decoded() {
        let t = token_with_exp(1_900_000_000);
        match t.expiry() {
            TokenExpiry::At(ts) => assert_eq!(ts.timestamp(), 1_900_000_000),
            other => panic!("unexpected expiry: {:?}", other),
        }
    }

    #[test]
    fn expired_token_is_not_usable() {
        let now = Utc::now();
        let t = token_with_exp(now.timestamp() - 1);
        assert!(!t.usable_at(now));
        // boundary: now == exp rejects
        let t = token_with_exp(now.timestamp());
        assert!(!t.usable_at(Utc.timestamp_opt(now.timestamp(), 0).single().unwrap()));
    }

    #[test]
    fn future_token_is_usable() {
        let now = Utc::now();
        assert!(token_with_exp(now.timestamp() + 3600).usable_at(now));
    }

    #[test]
    fn missing_claim_defers_to_server() {
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"u-1"}"#);
        let t = BearerToken::new(format!("h.{}.s", body));
        assert_eq!(t.expiry(), TokenExpiry::NoClaim);
        assert!(t.usable_at(Utc::now()));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(BearerToken::new("not-a-jwt").expiry(), TokenExpiry::Malformed);
        assert_eq!(BearerToken::new("a.!!!.c").expiry(), TokenExpiry::Malformed);
        assert!(!BearerToken::new("a.b.c.d").usable_at(Utc::now()));
    }
}
