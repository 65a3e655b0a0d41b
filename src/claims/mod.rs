//! Claim lifecycle: submission, per-claim state machine and the admin
//! review queue.

mod lifecycle;
mod review;

pub use lifecycle::{item_claimed, transition_allowed, ClaimDesk, ClaimsProvider};
pub use review::{ReviewQueue, ReviewRow, ReviewSnapshot};
