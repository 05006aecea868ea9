//! Fixtures shared by the coordinator tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use super::coordinator::SyncCoordinator;
use super::policy::CoordinatorOptions;
use crate::cache::LocalCache;
use crate::clock::FixedClock;
use crate::models::{Meal, MealLogEntry, MealType, Nutrition, UserProfile};
use crate::remote::{RemoteError, RemoteGateway, SqlRemoteGateway};
use crate::session::RemoteIdentity;

pub(crate) fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub(crate) fn meal(meal_type: MealType, name: &str, calories: f64) -> Meal {
    Meal::new(meal_type, name, Nutrition::new(calories, 10.0, 20.0, 5.0))
}

pub(crate) struct Harness {
    pub coordinator: SyncCoordinator,
    pub remote: Arc<SqlRemoteGateway>,
    pub clock: Arc<FixedClock>,
    _temp: TempDir,
}

pub(crate) async fn harness() -> Harness {
    harness_with(CoordinatorOptions::default()).await
}

pub(crate) async fn harness_with(options: CoordinatorOptions) -> Harness {
    let temp = TempDir::new().unwrap();
    let cache = LocalCache::open(&temp.path().join("cache.db")).await.unwrap();
    let url = format!("sqlite://{}", temp.path().join("remote.db").display());
    let remote = Arc::new(SqlRemoteGateway::connect(&url).await.unwrap());
    let clock = Arc::new(FixedClock::on(day()));

    let coordinator = SyncCoordinator::new(cache)
        .with_remote(remote.clone())
        .with_clock(clock.clone())
        .with_options(options);

    Harness {
        coordinator,
        remote,
        clock,
        _temp: temp,
    }
}

/// Coordinator with a cache and a clock but no remote store.
pub(crate) async fn local_only() -> (SyncCoordinator, Arc<FixedClock>, TempDir) {
    let temp = TempDir::new().unwrap();
    let cache = LocalCache::open(&temp.path().join("cache.db")).await.unwrap();
    let clock = Arc::new(FixedClock::on(day()));
    let coordinator = SyncCoordinator::new(cache).with_clock(clock.clone());
    (coordinator, clock, temp)
}

/// A remote that never succeeds.
pub(crate) enum FailingRemote {
    /// Every call errors immediately.
    Error,
    /// Every call hangs well past any test timeout.
    Hang,
}

impl FailingRemote {
    async fn fail<T>(&self) -> Result<T, RemoteError> {
        if let FailingRemote::Hang = self {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Err(RemoteError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[async_trait]
impl RemoteGateway for FailingRemote {
    async fn fetch_profile(&self, _: &RemoteIdentity) -> Result<Option<UserProfile>, RemoteError> {
        self.fail().await
    }

    async fn save_profile(&self, _: &RemoteIdentity, _: &UserProfile) -> Result<(), RemoteError> {
        self.fail().await
    }

    async fn fetch_meal_entries(
        &self,
        _: &RemoteIdentity,
        _: NaiveDate,
    ) -> Result<Vec<MealLogEntry>, RemoteError> {
        self.fail().await
    }

    async fn replace_meal_entry(&self, _: &RemoteIdentity, _: &MealLogEntry) -> Result<(), RemoteError> {
        self.fail().await
    }

    async fn delete_meal_entry(&self, _: &RemoteIdentity, _: Uuid) -> Result<bool, RemoteError> {
        self.fail().await
    }

    async fn fetch_water_ml(&self, _: &RemoteIdentity, _: NaiveDate) -> Result<Option<i64>, RemoteError> {
        self.fail().await
    }

    async fn add_water_ml(&self, _: &RemoteIdentity, _: NaiveDate, _: i64) -> Result<i64, RemoteError> {
        self.fail().await
    }
}
