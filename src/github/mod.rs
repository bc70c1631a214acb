// GitHub API module.
// Provides the client, typed endpoints, and wire types for the REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use endpoints::UserApi;
pub use types::*;
