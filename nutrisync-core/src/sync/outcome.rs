use serde::Serialize;
use std::fmt;

/// How far a write made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// Both stores accepted the write (or there was nothing to send).
    Synced,
    /// No session or no remote configured; only the local cache was written.
    LocalOnly,
    /// The local write succeeded, the remote one did not.
    PartiallySynced { reason: String },
}

impl SyncStatus {
    pub fn partial(reason: impl Into<String>) -> Self {
        SyncStatus::PartiallySynced {
            reason: reason.into(),
        }
    }

    /// Combines the statuses of two remote attempts made by one operation.
    /// A partial result always wins.
    pub fn merge(self, other: SyncStatus) -> SyncStatus {
        match (self, other) {
            (partial @ SyncStatus::PartiallySynced { .. }, _) => partial,
            (_, partial @ SyncStatus::PartiallySynced { .. }) => partial,
            (SyncStatus::LocalOnly, _) | (_, SyncStatus::LocalOnly) => SyncStatus::LocalOnly,
            (SyncStatus::Synced, SyncStatus::Synced) => SyncStatus::Synced,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncStatus::PartiallySynced { .. })
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::LocalOnly => write!(f, "local only"),
            SyncStatus::PartiallySynced { reason } => write!(f, "pending sync ({})", reason),
        }
    }
}

/// A write result paired with its sync status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synced<T> {
    pub value: T,
    pub status: SyncStatus,
}

impl<T> Synced<T> {
    pub fn new(value: T, status: SyncStatus) -> Self {
        Self { value, status }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Synced<U> {
        Synced {
            value: f(self.value),
            status: self.status,
        }
    }
}
