use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::{Claim, ClaimQuery, ClaimStatus, Item, ItemKind, Page};
use crate::validate;

/// Remote claims collaborator.
#[async_trait]
pub trait ClaimsProvider: Send + Sync {
    async fn submit(&self, kind: ItemKind, item_id: &str, description: &str) -> AppResult<Claim>;
    async fn list(&self, query: &ClaimQuery) -> AppResult<Page<Claim>>;
    async fn approve(&self, id: &str) -> AppResult<()>;
    async fn reject(&self, id: &str) -> AppResult<()>;
    async fn list_mine(&self) -> AppResult<Vec<Claim>>;
    async fn export_approved(&self) -> AppResult<Vec<u8>>;
}

/// PENDING is the only state with outgoing edges; APPROVED and REJECTED are
/// terminal. Attempting a transition out of a terminal state is a caller
/// error, not a no-op.
pub fn transition_allowed(from: ClaimStatus, to: ClaimStatus) -> bool {
    from == ClaimStatus::Pending && to.is_terminal()
}

/// An item counts as claimed while any non-rejected claim exists against
/// it; a rejection reopens the item for new claims.
pub fn item_claimed(claims: &[Claim]) -> bool {
    claims.iter().any(|c| c.status != ClaimStatus::Rejected)
}

/// User-side claim operations.
pub struct ClaimDesk {
    provider: Arc<dyn ClaimsProvider>,
}

impl ClaimDesk {
    pub fn new(provider: Arc<dyn ClaimsProvider>) -> Self {
        Self { provider }
    }

    /// Submit a claim against `item`. The claimability check runs before
    /// any remote call: the item must carry no active claim and must not be
    /// the viewer's own report. Advisory only; the remote side re-enforces.
    pub async fn submit(&self, item: &Item, kind: ItemKind, viewer_id: &str, description: &str) -> AppResult<Claim> {
        validate::claim_description(description)?;
        if !item.can_be_claimed(viewer_id) {
            return Err(AppError::conflict("not_claimable", "This item cannot be claimed"));
        }
        let claim = self.provider.submit(kind, &item.id, description).await?;
        info!(target: "reclaim::claims", "claim submitted id={} item={}", claim.id, item.id);
        Ok(claim)
    }

    pub async fn mine(&self) -> AppResult<Vec<Claim>> {
        self.provider.list_mine().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::model::UserRef;

    fn claim(status: ClaimStatus) -> Claim {
        Claim {
            id: "c-1".into(),
            item_id: "i-1".into(),
            item_kind: ItemKind::Lost,
            description: "that's mine, it has a scratch on the back".into(),
            status,
            created_at: Utc::now(),
            claimant: UserRef { id: "u-2".into(), name: "B".into(), email: "b@example.com".into() },
            item: None,
        }
    }

    #[test]
    fn only_pending_has_outgoing_edges() {
        assert!(transition_allowed(ClaimStatus::Pending, ClaimStatus::Approved));
        assert!(transition_allowed(ClaimStatus::Pending, ClaimStatus::Rejected));
        assert!(!transition_allowed(ClaimStatus::Approved, ClaimStatus::Rejected));
        assert!(!transition_allowed(ClaimStatus::Rejected, ClaimStatus::Approved));
        assert!(!transition_allowed(ClaimStatus::Approved, ClaimStatus::Pending));
        assert!(!transition_allowed(ClaimStatus::Pending, ClaimStatus::Pending));
    }

    #[test]
    fn rejection_reopens_the_item() {
        assert!(!item_claimed(&[]));
        assert!(item_claimed(&[claim(ClaimStatus::Pending)]));
        assert!(item_claimed(&[claim(ClaimStatus::Approved)]));
        assert!(!item_claimed(&[claim(ClaimStatus::Rejected)]));
        assert!(item_claimed(&[claim(ClaimStatus::Rejected), claim(ClaimStatus::Pending)]));
    }
}
