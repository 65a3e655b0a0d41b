//! HTTP implementations of the remote collaborator contracts. Transport
//! mechanics live in `client`; one file per collaborator mirrors the remote
//! API's surface.

pub mod client;
pub mod auth;
pub mod items;
pub mod claims;
pub mod users;

pub use client::HttpClient;
pub use auth::HttpAuthProvider;
pub use items::HttpItemsProvider;
pub use claims::HttpClaimsProvider;
pub use users::HttpUsersProvider;
