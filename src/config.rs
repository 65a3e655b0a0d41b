//! Process configuration sourced from environment variables.
//! Expiry checks, vault location and the API base URL are all decided here
//! so the rest of the crate never reads the environment ad hoc.

use std::path::PathBuf;

use path_absolutize::Absolutize;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_HOME: &str = ".reclaim";
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub home: PathBuf,
}

impl Config {
    /// Read RECLAIM_API_URL / RECLAIM_HOME with defaults.
    pub fn from_env() -> Self {
        let api_url = std::env::var("RECLAIM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let home = std::env::var("RECLAIM_HOME").unwrap_or_else(|_| DEFAULT_HOME.to_string());
        Self { api_url, home: PathBuf::from(home) }
    }

    /// Absolute path of the persisted session vault file.
    pub fn session_path(&self) -> PathBuf {
        let joined = self.home.join(SESSION_FILE);
        let absolute = joined.absolutize().map(|p| p.to_path_buf()).ok();
        absolute.unwrap_or(joined)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), home: PathBuf::from(DEFAULT_HOME) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_path_is_absolute() {
        let cfg = Config { api_url: DEFAULT_API_URL.into(), home: PathBuf::from("some/rel/home") };
        assert!(cfg.session_path().is_absolute());
        assert!(cfg.session_path().ends_with("some/rel/home/session.json"));
    }
}
