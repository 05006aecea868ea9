use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How reads reconcile the local cache with the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Cache answers when it has the key; remote is consulted only on a miss
    /// and a non-empty answer warms the cache.
    #[default]
    CacheFirst,
    /// Both stores are read and the newest record wins (per slot for meals,
    /// by `updated_at` for profiles).
    LatestTimestamp,
    /// Remote answers whenever it is reachable; cache is the fallback.
    RemoteAuthoritative,
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPolicy::CacheFirst => write!(f, "cache_first"),
            ReadPolicy::LatestTimestamp => write!(f, "latest_timestamp"),
            ReadPolicy::RemoteAuthoritative => write!(f, "remote_authoritative"),
        }
    }
}

/// What `record_water` sends to the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterSyncPolicy {
    /// `(new - old) * 250` ml, signed.
    #[default]
    SignedDelta,
    /// +250 ml per call whatever the new count is. Only correct when every
    /// call adds exactly one glass.
    FixedIncrement,
}

impl fmt::Display for WaterSyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaterSyncPolicy::SignedDelta => write!(f, "signed_delta"),
            WaterSyncPolicy::FixedIncrement => write!(f, "fixed_increment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub read_policy: ReadPolicy,
    pub water_policy: WaterSyncPolicy,
    /// Upper bound on every remote call.
    pub remote_timeout: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::default(),
            water_policy: WaterSyncPolicy::default(),
            remote_timeout: Duration::from_secs(5),
        }
    }
}
