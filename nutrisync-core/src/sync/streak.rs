use super::coordinator::SyncCoordinator;
use super::error::SyncError;
use super::outcome::Synced;
use crate::cache::CacheKey;
use crate::models::{StreakState, UserProfile};
use crate::session::Session;

impl SyncCoordinator {
    /// Same as [`recompute_streak_from_activity`](Self::recompute_streak_from_activity).
    pub async fn update_streak(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Option<Synced<StreakState>>, SyncError> {
        self.recompute_streak_from_activity(session, user_id).await
    }

    /// Advances the streak for today based on logged activity.
    ///
    /// Returns `None` when the user has no profile yet. Calling it again on
    /// a day that already counted changes nothing and writes nothing.
    pub async fn recompute_streak_from_activity(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Option<Synced<StreakState>>, SyncError> {
        let key = CacheKey::profile(user_id);
        let _guard = self.locks.acquire(key.as_str()).await;

        let Some(profile) = self.get_user_profile(session, user_id).await else {
            tracing::debug!(user_id = %user_id, "no profile, streak not tracked");
            return Ok(None);
        };

        let today = self.clock.today();
        if profile.streak.is_active_on(today) {
            let status = self.idle_status(session, user_id);
            return Ok(Some(Synced::new(profile.streak, status)));
        }

        let yesterday_logged = match today.pred_opt() {
            Some(yesterday) => !self
                .get_daily_logs(session, user_id, yesterday)
                .await
                .is_empty(),
            None => false,
        };

        let next = profile.streak.advanced(today, yesterday_logged);
        self.store_streak(session, user_id, profile, next).await.map(Some)
    }

    /// Counts today as complete: one more day, no lookback and no same-day
    /// guard.
    pub async fn confirm_day_complete(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Option<Synced<StreakState>>, SyncError> {
        let key = CacheKey::profile(user_id);
        let _guard = self.locks.acquire(key.as_str()).await;

        let Some(profile) = self.get_user_profile(session, user_id).await else {
            return Ok(None);
        };

        let next = profile.streak.confirmed(self.clock.today());
        self.store_streak(session, user_id, profile, next).await.map(Some)
    }

    // Caller holds the profile lock.
    async fn store_streak(
        &self,
        session: &Session,
        user_id: &str,
        mut profile: UserProfile,
        streak: StreakState,
    ) -> Result<Synced<StreakState>, SyncError> {
        let previous = profile.streak.current_streak;
        profile.streak = streak;
        profile.updated_at = self.clock.now();
        self.cache.set(&CacheKey::profile(user_id), &profile).await?;

        tracing::info!(
            user_id = %user_id,
            from = previous,
            to = streak.current_streak,
            longest = streak.longest_streak,
            "streak updated"
        );

        let status = self.push_profile(session, user_id, &profile).await;
        Ok(Synced::new(streak, status))
    }
}
