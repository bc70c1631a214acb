//! Entity cache and fetch orchestration for browsing GitHub accounts and
//! their follower networks.
//!
//! The crate is the stateful core of a user-lookup client: a process-wide
//! [`EntityStore`] holding one record per login, a [`Fetcher`] that decides
//! cache-hit vs. network per request and writes results back, and a
//! [`GitHubClient`] that performs the actual GET calls. Presentation layers
//! consume the fetcher's operations and read records back out of the store.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hublook::{EntityStore, Fetcher, GitHubClient};
//!
//! # async fn run() -> hublook::Result<()> {
//! let store = Arc::new(EntityStore::new());
//! let fetcher = Fetcher::new(GitHubClient::new()?, store.clone());
//!
//! let record = fetcher.get_profile("octocat", false).await?;
//! let followers = fetcher.get_followers("octocat", false).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod github;
pub mod store;
pub mod uri;

pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use github::{GitHubClient, Profile, SearchPage, UserApi, UserSummary};
pub use store::{EntityStore, Relation, UserRecord};
