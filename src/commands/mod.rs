mod cache_cmd;
mod config_cmd;
mod meal;
mod profile;
mod streak;
mod water;

pub use cache_cmd::CacheCommand;
pub use config_cmd::ConfigCommand;
pub use meal::MealCommand;
pub use profile::ProfileCommand;
pub use streak::StreakCommand;
pub use water::WaterCommand;

use chrono::NaiveDate;
use clap::ValueEnum;
use nutrisync_core::{Session, SyncCoordinator, SyncStatus};

/// Cache namespace used when nobody is signed in.
pub const LOCAL_USER: &str = "local";

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a command needs to talk to the stores.
pub struct AppContext {
    pub coordinator: SyncCoordinator,
    pub session: Session,
    pub user_id: String,
}

impl AppContext {
    /// The given `YYYY-MM-DD` date, or today.
    pub fn date_or_today(&self, date: &Option<String>) -> Result<NaiveDate, String> {
        match date {
            Some(d) => parse_date(d),
            None => Ok(self.coordinator.today()),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}

/// Tells the user when a write did not reach the remote store.
pub fn report_status(status: &SyncStatus) {
    match status {
        SyncStatus::Synced => {}
        SyncStatus::LocalOnly => println!("(saved locally; not signed in or no remote configured)"),
        SyncStatus::PartiallySynced { reason } => {
            println!("Saved locally, pending sync: {}", reason)
        }
    }
}
