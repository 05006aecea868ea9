use chrono::NaiveDate;

use super::coordinator::{RemoteTarget, SyncCoordinator};
use super::error::SyncError;
use super::outcome::{SyncStatus, Synced};
use super::policy::WaterSyncPolicy;
use crate::cache::{CacheKey, CacheKind};
use crate::models::{WaterRecord, ML_PER_GLASS};
use crate::session::Session;

impl SyncCoordinator {
    /// Sets the day's glass count.
    ///
    /// What reaches the remote total depends on the configured
    /// [`WaterSyncPolicy`].
    pub async fn record_water(
        &self,
        session: &Session,
        user_id: &str,
        date: NaiveDate,
        glasses: u32,
    ) -> Result<Synced<WaterRecord>, SyncError> {
        let policy = self.options.water_policy;
        self.write_water(session, user_id, date, policy, |_| glasses)
            .await
    }

    /// Adds (or with a negative delta, removes) glasses, never going below
    /// zero. Always sends the true milliliter delta.
    pub async fn add_water(
        &self,
        session: &Session,
        user_id: &str,
        date: NaiveDate,
        delta_glasses: i32,
    ) -> Result<Synced<WaterRecord>, SyncError> {
        self.write_water(session, user_id, date, WaterSyncPolicy::SignedDelta, |previous| {
            let next = i64::from(previous) + i64::from(delta_glasses);
            u32::try_from(next.max(0)).unwrap_or(u32::MAX)
        })
        .await
    }

    /// The day's water record: cache, then remote, then zero.
    pub async fn get_water(&self, session: &Session, user_id: &str, date: NaiveDate) -> WaterRecord {
        let key = CacheKey::day(CacheKind::Water, user_id, date);
        if let Some(record) = self.read_cache::<WaterRecord>(&key).await {
            return record;
        }

        let Some(ml) = self.fetch_remote_water(session, user_id, date).await else {
            return WaterRecord::empty(user_id, date);
        };

        let record = WaterRecord::from_ml(user_id, date, ml);
        let _guard = self.locks.acquire(key.as_str()).await;
        if let Some(current) = self.read_cache::<WaterRecord>(&key).await {
            return current;
        }
        self.warm(&key, &record).await;
        record
    }

    async fn write_water(
        &self,
        session: &Session,
        user_id: &str,
        date: NaiveDate,
        policy: WaterSyncPolicy,
        next: impl FnOnce(u32) -> u32,
    ) -> Result<Synced<WaterRecord>, SyncError> {
        let key = CacheKey::day(CacheKind::Water, user_id, date);
        let _guard = self.locks.acquire(key.as_str()).await;

        let previous = match self.cache.get::<WaterRecord>(&key).await? {
            Some(record) => record.glasses,
            None => self
                .fetch_remote_water(session, user_id, date)
                .await
                .map(|ml| WaterRecord::from_ml(user_id, date, ml).glasses)
                .unwrap_or(0),
        };

        let record = WaterRecord::new(user_id, date, next(previous));
        self.cache.set(&key, &record).await?;

        tracing::info!(
            user_id = %user_id,
            date = %date,
            from = previous,
            to = record.glasses,
            "water recorded locally"
        );

        let delta_ml = match policy {
            WaterSyncPolicy::FixedIncrement => ML_PER_GLASS,
            WaterSyncPolicy::SignedDelta => {
                (i64::from(record.glasses) - i64::from(previous)) * ML_PER_GLASS
            }
        };

        let status = match self.remote_target(session, user_id) {
            RemoteTarget::Gateway(_, _) if delta_ml == 0 => SyncStatus::Synced,
            RemoteTarget::Gateway(remote, identity) => {
                match self
                    .call_remote(remote.add_water_ml(identity, date, delta_ml))
                    .await
                {
                    Ok(total) => {
                        if total != record.ml {
                            tracing::warn!(
                                user_id = %user_id,
                                date = %date,
                                local_ml = record.ml,
                                remote_ml = total,
                                %policy,
                                "remote water total diverged from local"
                            );
                        }
                        SyncStatus::Synced
                    }
                    Err(e) => self.remote_failed("add_water_ml", user_id, e),
                }
            }
            RemoteTarget::Skipped(status) => status,
        };

        Ok(Synced::new(record, status))
    }

    async fn fetch_remote_water(&self, session: &Session, user_id: &str, date: NaiveDate) -> Option<i64> {
        let RemoteTarget::Gateway(remote, identity) = self.remote_target(session, user_id) else {
            return None;
        };
        match self.call_remote(remote.fetch_water_ml(identity, date)).await {
            Ok(ml) => ml,
            Err(e) => {
                tracing::warn!(user_id = %user_id, date = %date, error = %e, "remote water read failed");
                None
            }
        }
    }
}
