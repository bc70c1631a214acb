// Fetch orchestration.
// Decides cache-hit vs. network per login and writes results back into the
// entity store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::github::endpoints::UserApi;
use crate::github::types::{SearchPage, UserSummary};
use crate::store::{EntityStore, Relation, UserRecord};

/// Orchestrates profile, relation, and search fetches against a shared store.
///
/// Each login's check-then-fetch-then-write sequence runs under a per-login
/// async lock, so concurrent callers for the same entity cost at most one
/// network round trip per freshness window. Operations on different logins do
/// not contend. In-flight requests are never cancelled; a completed write with
/// no live reader is harmless because the store only appends or overwrites.
pub struct Fetcher<A: UserApi> {
    api: A,
    store: Arc<EntityStore>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<A: UserApi> Fetcher<A> {
    pub fn new(api: A, store: Arc<EntityStore>) -> Self {
        Self {
            api,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The store this fetcher writes into. Consumers re-read records from
    /// here after an operation completes.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Profile for a login.
    ///
    /// Served from the store unless the record is absent or `force_refresh`
    /// is set. A successful fetch replaces the profile scalars but preserves
    /// any cached relation lists; a failed fetch leaves the store untouched
    /// and propagates the error unchanged.
    pub async fn get_profile(&self, login: &str, force_refresh: bool) -> Result<UserRecord> {
        let lock = self.login_lock(login);
        let _guard = lock.lock().await;

        if !force_refresh {
            if let Some(record) = self.store.get(login) {
                tracing::debug!(%login, "profile cache hit");
                return Ok(record);
            }
        }

        tracing::debug!(%login, force_refresh, "fetching profile");
        let profile = self.api.fetch_profile(login).await?;
        Ok(self.store.upsert_profile(profile))
    }

    /// Followers of a login. Cached once fetched, even when the remote
    /// reported zero entries; only a never-fetched list misses.
    pub async fn get_followers(
        &self,
        login: &str,
        force_refresh: bool,
    ) -> Result<Vec<UserSummary>> {
        self.get_relation(login, Relation::Followers, force_refresh)
            .await
    }

    /// Accounts a login follows. Symmetric with [`get_followers`](Self::get_followers).
    pub async fn get_following(
        &self,
        login: &str,
        force_refresh: bool,
    ) -> Result<Vec<UserSummary>> {
        self.get_relation(login, Relation::Following, force_refresh)
            .await
    }

    async fn get_relation(
        &self,
        login: &str,
        relation: Relation,
        force_refresh: bool,
    ) -> Result<Vec<UserSummary>> {
        let lock = self.login_lock(login);
        let _guard = lock.lock().await;

        if !force_refresh {
            let cached = self
                .store
                .get(login)
                .and_then(|record| record.relation(relation).map(<[UserSummary]>::to_vec));
            if let Some(list) = cached {
                tracing::debug!(%login, ?relation, "relation cache hit");
                return Ok(list);
            }
        }

        tracing::debug!(%login, ?relation, force_refresh, "fetching relation");
        let list = match relation {
            Relation::Followers => self.api.fetch_followers(login).await?,
            Relation::Following => self.api.fetch_following(login).await?,
        };
        self.store.set_relation(login, relation, list.clone());
        Ok(list)
    }

    /// Free-text profile search.
    ///
    /// Empty text short-circuits with an empty page and no network call;
    /// anything else always hits the network. Results are transient and never
    /// enter the store.
    pub async fn search(&self, text: &str) -> Result<SearchPage> {
        if text.is_empty() {
            return Ok(SearchPage::default());
        }

        tracing::debug!(query = %text, "searching users");
        self.api.search_users(text).await
    }

    fn login_lock(&self, login: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(login.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;
    use crate::github::types::Profile;

    /// Scripted transport counting the calls that would reach the network.
    #[derive(Default)]
    struct MockApi {
        profile_calls: AtomicUsize,
        follower_calls: AtomicUsize,
        following_calls: AtomicUsize,
        search_calls: AtomicUsize,
        not_found: AtomicBool,
        failing: AtomicBool,
    }

    impl MockApi {
        fn check(&self) -> Result<()> {
            if self.not_found.load(Ordering::SeqCst) {
                return Err(Error::NotFound {
                    message: "Not Found".to_string(),
                });
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Status {
                    code: 500,
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(())
        }
    }

    impl UserApi for MockApi {
        async fn fetch_profile(&self, login: &str) -> Result<Profile> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.check()?;
            Ok(profile(login))
        }

        async fn fetch_followers(&self, _login: &str) -> Result<Vec<UserSummary>> {
            self.follower_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(vec![summary("defunkt"), summary("pjhyett")])
        }

        async fn fetch_following(&self, _login: &str) -> Result<Vec<UserSummary>> {
            self.following_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(Vec::new())
        }

        async fn search_users(&self, _query: &str) -> Result<SearchPage> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(SearchPage {
                total_count: 1,
                incomplete_results: false,
                items: vec![summary("torvalds")],
            })
        }
    }

    fn profile(login: &str) -> Profile {
        Profile {
            name: Some(format!("{login} name")),
            avatar_url: Some(format!("https://avatars.example/{login}")),
            followers: Some(2),
            ..Profile::placeholder(login)
        }
    }

    fn summary(login: &str) -> UserSummary {
        UserSummary {
            login: login.to_string(),
            id: None,
            avatar_url: None,
        }
    }

    fn fetcher() -> Fetcher<MockApi> {
        Fetcher::new(MockApi::default(), Arc::new(EntityStore::new()))
    }

    #[tokio::test]
    async fn cache_hit_is_idempotent() {
        let f = fetcher();

        let first = f.get_profile("octocat", false).await.unwrap();
        let second = f.get_profile("octocat", false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.api.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forced_refresh_always_hits_network() {
        let f = fetcher();

        f.get_profile("octocat", false).await.unwrap();
        f.get_profile("octocat", true).await.unwrap();

        assert_eq!(f.api.profile_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn profile_refresh_preserves_followers_list() {
        let f = fetcher();

        f.get_profile("octocat", false).await.unwrap();
        f.get_followers("octocat", false).await.unwrap();

        let record = f.get_profile("octocat", true).await.unwrap();
        assert_eq!(
            record.followers,
            Some(vec![summary("defunkt"), summary("pjhyett")])
        );
    }

    #[tokio::test]
    async fn followers_fetch_leaves_profile_scalars_unchanged() {
        let f = fetcher();

        let before = f.get_profile("octocat", false).await.unwrap();
        f.get_followers("octocat", false).await.unwrap();

        let after = f.store().get("octocat").unwrap();
        assert_eq!(after.profile, before.profile);
    }

    #[tokio::test]
    async fn empty_relation_result_is_still_a_cache_hit() {
        let f = fetcher();

        // Remote reports zero following; the second read must not refetch.
        let first = f.get_following("octocat", false).await.unwrap();
        let second = f.get_following("octocat", false).await.unwrap();

        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(f.api.following_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn relations_are_cached_independently() {
        let f = fetcher();

        f.get_profile("octocat", false).await.unwrap();
        f.get_followers("octocat", false).await.unwrap();
        f.get_followers("octocat", false).await.unwrap();

        let record = f.store().get("octocat").unwrap();
        assert!(record.followers.is_some());
        assert_eq!(record.following, None);
        assert_eq!(f.api.follower_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.api.following_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn not_found_leaves_store_empty() {
        let f = fetcher();
        f.api.not_found.store(true, Ordering::SeqCst);

        let err = f.get_profile("__does_not_exist__", false).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.code(), 404);
        assert!(!f.store().contains("__does_not_exist__"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_cached_list() {
        let f = fetcher();

        f.get_profile("octocat", false).await.unwrap();
        f.get_followers("octocat", false).await.unwrap();

        f.api.failing.store(true, Ordering::SeqCst);
        let err = f.get_followers("octocat", true).await.unwrap_err();
        assert_eq!(err.code(), 500);

        let record = f.store().get("octocat").unwrap();
        assert_eq!(
            record.followers,
            Some(vec![summary("defunkt"), summary("pjhyett")])
        );
    }

    #[tokio::test]
    async fn relation_fetch_without_profile_creates_minimal_record() {
        let f = fetcher();

        f.get_followers("ghost", false).await.unwrap();

        let record = f.store().get("ghost").unwrap();
        assert_eq!(record.profile, Profile::placeholder("ghost"));
        assert!(record.followers.is_some());
    }

    #[tokio::test]
    async fn concurrent_fetches_for_one_login_share_a_round_trip() {
        let f = fetcher();

        let (a, b) = tokio::join!(
            f.get_profile("octocat", false),
            f.get_profile("octocat", false)
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(f.api.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_search_skips_the_network() {
        let f = fetcher();

        let page = f.search("").await.unwrap();

        assert!(page.is_empty());
        assert_eq!(f.api.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_results_are_not_cached_as_entities() {
        let f = fetcher();

        let page = f.search("torvalds").await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(f.api.search_calls.load(Ordering::SeqCst), 1);
        assert!(f.store().is_empty());
    }

    #[tokio::test]
    async fn search_always_refetches() {
        let f = fetcher();

        f.search("torvalds").await.unwrap();
        f.search("torvalds").await.unwrap();

        assert_eq!(f.api.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn profile_then_followers_then_cached_profile() {
        let f = fetcher();

        // First profile fetch on an empty store.
        let record = f.get_profile("octocat", false).await.unwrap();
        assert_eq!(f.api.profile_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.store().len(), 1);
        assert_eq!(record.followers, None);

        // Followers fetch populates the list without touching the scalars.
        f.get_followers("octocat", false).await.unwrap();
        assert_eq!(f.api.follower_calls.load(Ordering::SeqCst), 1);
        let record_with_list = f.store().get("octocat").unwrap();
        assert_eq!(record_with_list.profile, record.profile);
        assert!(record_with_list.followers.is_some());

        // Unforced re-read stays off the network and keeps the list.
        let cached = f.get_profile("octocat", false).await.unwrap();
        assert_eq!(f.api.profile_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached, record_with_list);
    }
}
