// Typed endpoint functions for the GitHub REST API.
// Resolves URIs, issues requests, and deserializes responses.

use crate::error::Result;
use crate::uri::{self, templates};

use super::client::GitHubClient;
use super::types::{Profile, SearchPage, UserSummary};

/// The four logical endpoints the fetch orchestrator drives.
///
/// [`GitHubClient`] is the live implementation. Keeping the orchestrator
/// generic over this trait lets tests substitute a scripted transport and
/// observe exactly which calls would reach the network.
#[allow(async_fn_in_trait)]
pub trait UserApi {
    /// Fetch the profile for a login.
    async fn fetch_profile(&self, login: &str) -> Result<Profile>;

    /// Fetch the accounts following a login.
    async fn fetch_followers(&self, login: &str) -> Result<Vec<UserSummary>>;

    /// Fetch the accounts a login follows.
    async fn fetch_following(&self, login: &str) -> Result<Vec<UserSummary>>;

    /// Free-text profile search, ranked by the remote system.
    async fn search_users(&self, query: &str) -> Result<SearchPage>;
}

impl UserApi for GitHubClient {
    async fn fetch_profile(&self, login: &str) -> Result<Profile> {
        let path = uri::resolve(templates::USER, &[("login", login)])?;
        let response = self.get(&path).await?;
        let profile: Profile = response.json().await?;
        Ok(profile)
    }

    async fn fetch_followers(&self, login: &str) -> Result<Vec<UserSummary>> {
        let path = uri::resolve(templates::FOLLOWERS, &[("login", login)])?;
        let response = self.get(&path).await?;
        let followers: Vec<UserSummary> = response.json().await?;
        Ok(followers)
    }

    async fn fetch_following(&self, login: &str) -> Result<Vec<UserSummary>> {
        let path = uri::resolve(templates::FOLLOWING, &[("login", login)])?;
        let response = self.get(&path).await?;
        let following: Vec<UserSummary> = response.json().await?;
        Ok(following)
    }

    async fn search_users(&self, query: &str) -> Result<SearchPage> {
        let path = uri::resolve(templates::SEARCH, &[("query", query)])?;
        let response = self.get(&path).await?;
        let page: SearchPage = response.json().await?;
        Ok(page)
    }
}
