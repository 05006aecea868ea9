//! Cache-first synchronization between the device cache and the remote store.
//!
//! Every write lands in the [`LocalCache`](crate::cache::LocalCache) first;
//! the remote write follows and its outcome is reported as a [`SyncStatus`].
//! Reads are resolved according to a [`ReadPolicy`].

mod coordinator;
mod error;
mod locks;
mod outcome;
mod policy;
mod profile;
mod resolve;
mod streak;
mod water;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::SyncCoordinator;
pub use error::SyncError;
pub use outcome::{SyncStatus, Synced};
pub use policy::{CoordinatorOptions, ReadPolicy, WaterSyncPolicy};
pub use resolve::{current_entries, merge_latest};
