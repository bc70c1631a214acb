// Process-wide entity store.
// One record per login; follower/following lists cached independently of the
// profile scalars.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::github::types::{Profile, UserSummary};

/// Direction of a follower relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Followers,
    Following,
}

/// One remote account as last observed, plus its cached relation lists.
///
/// A `None` list was never fetched; `Some(vec![])` means the remote reported
/// zero entries. The two states stay distinct so a zero-follower account is
/// not refetched on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub profile: Profile,
    pub followers: Option<Vec<UserSummary>>,
    pub following: Option<Vec<UserSummary>>,
}

impl UserRecord {
    /// Fresh record with both relation lists absent.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            followers: None,
            following: None,
        }
    }

    /// The cached list for one relation, if it was ever fetched.
    pub fn relation(&self, relation: Relation) -> Option<&[UserSummary]> {
        match relation {
            Relation::Followers => self.followers.as_deref(),
            Relation::Following => self.following.as_deref(),
        }
    }
}

/// In-memory map from login to record.
///
/// Created empty at process start, cleared only by [`reset`](Self::reset),
/// shared behind an `Arc`. Any component may read; only the fetch
/// orchestrator writes. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct EntityStore {
    records: Mutex<HashMap<String, UserRecord>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloned snapshot of the record for a login.
    pub fn get(&self, login: &str) -> Option<UserRecord> {
        self.lock().get(login).cloned()
    }

    pub fn contains(&self, login: &str) -> bool {
        self.lock().contains_key(login)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace the profile fields for a login, preserving any cached relation
    /// lists. Profile payloads never carry those lists, so a refresh must not
    /// clear them. Returns the resulting record.
    pub fn upsert_profile(&self, profile: Profile) -> UserRecord {
        let mut records = self.lock();
        match records.entry(profile.login.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().profile = profile;
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant.insert(UserRecord::new(profile)).clone(),
        }
    }

    /// Store a fetched relation list, leaving the profile scalars and the
    /// opposite relation untouched. Creates a minimal placeholder record when
    /// no profile was ever fetched for this login.
    pub fn set_relation(&self, login: &str, relation: Relation, list: Vec<UserSummary>) {
        let mut records = self.lock();
        let record = records
            .entry(login.to_string())
            .or_insert_with(|| UserRecord::new(Profile::placeholder(login)));
        match relation {
            Relation::Followers => record.followers = Some(list),
            Relation::Following => record.following = Some(list),
        }
    }

    /// Drop every record.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, UserRecord>> {
        // A poisoned map still holds consistent data; keep serving it.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}
