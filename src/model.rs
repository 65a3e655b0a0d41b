//! Shared wire contracts for the registry API.
//! Items and claims are transient projections owned by the remote system of
//! record; nothing here is a source of truth.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item kind '{0}'")]
pub struct ParseItemKindError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown claim status '{0}'")]
pub struct ParseClaimStatusError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    /// URL path segment on the remote API ("/lost/...", "/found/...").
    pub fn segment(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }

    /// Field name carrying the event date in report submissions.
    pub fn date_field(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lostDate",
            ItemKind::Found => "foundDate",
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = ParseItemKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lost" => Ok(ItemKind::Lost),
            "found" => Ok(ItemKind::Found),
            other => Err(ParseItemKindError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }

    /// APPROVED and REJECTED admit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = ParseClaimStatusError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ClaimStatus::Pending),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(ParseClaimStatusError(other.to_string())),
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal user reference embedded in items and claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A lost or found item as reported by a user. Lost and found variants are
/// structurally identical; the kind travels alongside (claims carry it,
/// registry calls take it as a parameter).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub location: String,
    #[serde(alias = "lostDate", alias = "foundDate")]
    pub event_date: NaiveDateTime,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub reported_by: UserRef,
    pub created_at: DateTime<Utc>,
    /// At least one non-rejected claim exists against this item.
    #[serde(default)]
    pub claimed: bool,
}

impl Item {
    /// An item is claimable when no active claim exists and the viewer is
    /// not its own reporter.
    pub fn can_be_claimed(&self, viewer_id: &str) -> bool {
        !self.claimed && self.reported_by.id != viewer_id
    }
}

/// Fields of a new item report. The image rides along as a multipart part.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub contact_info: String,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Item summary embedded in a claim row for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub item_id: String,
    #[serde(rename = "itemType")]
    pub item_kind: ItemKind,
    pub description: String,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "user")]
    pub claimant: UserRef,
    #[serde(default)]
    pub item: Option<ClaimItem>,
}

/// Administrative view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool { true }

/// One page of a remote listing. Page numbers are zero-based throughout the
/// core; only the console translates to 1-based display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { content: Vec::new(), total_pages: 0, total_elements: 0, number: 0 }
    }
}

/// Zero-based page request with optional free-text search.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub page: usize,
    pub size: usize,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        if let Some(s) = self.search.as_deref() {
            if !s.is_empty() {
                out.push(("search", s.to_string()));
            }
        }
        out
    }
}

/// Claims listing request: status filter defaults to PENDING.
#[derive(Debug, Clone)]
pub struct ClaimQuery {
    pub page: usize,
    pub size: usize,
    pub status: ClaimStatus,
    pub search: String,
}

impl Default for ClaimQuery {
    fn default() -> Self {
        Self { page: 0, size: 10, status: ClaimStatus::Pending, search: String::new() }
    }
}

impl ClaimQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("status", self.status.as_str().to_string()),
        ];
        if !self.search.is_empty() {
            out.push(("search", self.search.clone()));
        }
        out
    }
}

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_lost_items: u64,
    #[serde(default)]
    pub total_found_items: u64,
    #[serde(default)]
    pub total_claims: u64,
    #[serde(default)]
    pub pending_claims: u64,
    #[serde(default)]
    pub approved_claims: u64,
    #[serde(default)]
    pub rejected_claims: u64,
}
