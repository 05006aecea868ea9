//! Gateway to the networked, multi-tenant relational store.
//!
//! Every method takes a [`RemoteIdentity`] obtained from the caller's
//! [`Session`](crate::session::Session); rows are always read and written
//! under that identity. Absent rows come back as `None`/empty, failures as
//! [`RemoteError`]. What to do about a failure is the coordinator's decision.

mod sql;

pub use sql::SqlRemoteGateway;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MealLogEntry, UserProfile};
use crate::session::RemoteIdentity;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed remote data: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn fetch_profile(
        &self,
        identity: &RemoteIdentity,
    ) -> Result<Option<UserProfile>, RemoteError>;

    /// Upserts the profile row (streak included), replaces both tag sets
    /// wholesale and writes or clears the nutrition target.
    async fn save_profile(
        &self,
        identity: &RemoteIdentity,
        profile: &UserProfile,
    ) -> Result<(), RemoteError>;

    async fn fetch_meal_entries(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
    ) -> Result<Vec<MealLogEntry>, RemoteError>;

    /// Stores `entry` as the only entry of its (date, meal type) slot.
    async fn replace_meal_entry(
        &self,
        identity: &RemoteIdentity,
        entry: &MealLogEntry,
    ) -> Result<(), RemoteError>;

    /// Returns whether a row was deleted.
    async fn delete_meal_entry(
        &self,
        identity: &RemoteIdentity,
        entry_id: Uuid,
    ) -> Result<bool, RemoteError>;

    async fn fetch_water_ml(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
    ) -> Result<Option<i64>, RemoteError>;

    /// Adds a signed milliliter delta to the day's total, clamped at zero.
    /// Returns the new total.
    async fn add_water_ml(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
        delta_ml: i64,
    ) -> Result<i64, RemoteError>;
}
