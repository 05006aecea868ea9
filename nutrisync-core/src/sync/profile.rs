use super::coordinator::{RemoteTarget, SyncCoordinator};
use super::error::SyncError;
use super::outcome::{SyncStatus, Synced};
use super::policy::ReadPolicy;
use crate::cache::CacheKey;
use crate::models::{ProfilePatch, UserProfile};
use crate::session::Session;

impl SyncCoordinator {
    /// Reads the profile according to the read policy. `None` when neither
    /// store has one.
    pub async fn get_user_profile(&self, session: &Session, user_id: &str) -> Option<UserProfile> {
        let key = CacheKey::profile(user_id);
        let cached: Option<UserProfile> = self.read_cache(&key).await;

        match self.options.read_policy {
            ReadPolicy::CacheFirst => {
                if cached.is_some() {
                    return cached;
                }
                let remote = self.fetch_remote_profile(session, user_id).await?;
                self.warm(&key, &remote).await;
                Some(remote)
            }
            ReadPolicy::LatestTimestamp => {
                let remote = self.fetch_remote_profile(session, user_id).await;
                match (cached, remote) {
                    (Some(local), Some(remote)) if remote.updated_at > local.updated_at => {
                        self.warm(&key, &remote).await;
                        Some(remote)
                    }
                    (Some(local), _) => Some(local),
                    (None, Some(remote)) => {
                        self.warm(&key, &remote).await;
                        Some(remote)
                    }
                    (None, None) => None,
                }
            }
            ReadPolicy::RemoteAuthoritative => {
                match self.fetch_remote_profile(session, user_id).await {
                    Some(remote) => {
                        self.warm(&key, &remote).await;
                        Some(remote)
                    }
                    None => cached,
                }
            }
        }
    }

    /// Applies `patch` to the current profile (or a fresh one) and stores the
    /// result in both stores. The calorie target is recomputed.
    pub async fn update_user_profile(
        &self,
        session: &Session,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Synced<UserProfile>, SyncError> {
        let key = CacheKey::profile(user_id);
        let _guard = self.locks.acquire(key.as_str()).await;

        let mut profile = match self.get_user_profile(session, user_id).await {
            Some(profile) => profile,
            None => UserProfile::new(user_id, patch.email.clone().unwrap_or_default()),
        };
        profile.apply(patch);
        profile.updated_at = self.clock.now();
        self.cache.set(&key, &profile).await?;

        tracing::info!(
            user_id = %user_id,
            calorie_target = ?profile.calorie_target,
            "profile updated locally"
        );

        let status = self.push_profile(session, user_id, &profile).await;
        Ok(Synced::new(profile, status))
    }

    pub(super) async fn push_profile(
        &self,
        session: &Session,
        user_id: &str,
        profile: &UserProfile,
    ) -> SyncStatus {
        match self.remote_target(session, user_id) {
            RemoteTarget::Gateway(remote, identity) => {
                match self.call_remote(remote.save_profile(identity, profile)).await {
                    Ok(()) => SyncStatus::Synced,
                    Err(e) => self.remote_failed("save_profile", user_id, e),
                }
            }
            RemoteTarget::Skipped(status) => status,
        }
    }

    async fn fetch_remote_profile(&self, session: &Session, user_id: &str) -> Option<UserProfile> {
        let RemoteTarget::Gateway(remote, identity) = self.remote_target(session, user_id) else {
            return None;
        };
        match self.call_remote(remote.fetch_profile(identity)).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "remote profile read failed");
                None
            }
        }
    }
}
