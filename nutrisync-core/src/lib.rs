//! NutriSync Core Library
//!
//! Meal, water and profile tracking with a durable on-device cache and
//! best-effort synchronization to a remote relational store.

pub mod cache;
pub mod clock;
pub mod db;
pub mod generator;
pub mod models;
pub mod remote;
pub mod session;
pub mod sync;

pub use cache::{CacheError, CacheKey, CacheKind, LocalCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use generator::{GeneratorError, MealGenerator};
pub use models::{
    ActivityLevel, DailyTotals, Gender, Meal, MealLogEntry, MealType, Nutrition, ProfilePatch,
    RecipeSnapshot, StreakState, UserProfile, WaterRecord, ML_PER_GLASS,
};
pub use remote::{RemoteError, RemoteGateway, SqlRemoteGateway};
pub use session::{RemoteIdentity, Session, SessionProvider, StaticSession};
pub use sync::{
    CoordinatorOptions, ReadPolicy, SyncCoordinator, SyncError, SyncStatus, Synced,
    WaterSyncPolicy,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
