use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Volume of one glass of water.
pub const ML_PER_GLASS: i64 = 250;

/// Water intake for one user and day, kept in both glasses and milliliters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub glasses: u32,
    pub ml: i64,
}

impl WaterRecord {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, glasses: u32) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            glasses,
            ml: i64::from(glasses) * ML_PER_GLASS,
        }
    }

    /// Builds a record from a remote milliliter total. Partial glasses round down.
    pub fn from_ml(user_id: impl Into<String>, date: NaiveDate, ml: i64) -> Self {
        let glasses = u32::try_from(ml.max(0) / ML_PER_GLASS).unwrap_or(u32::MAX);
        Self {
            user_id: user_id.into(),
            date,
            glasses,
            ml: ml.max(0),
        }
    }

    pub fn empty(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(user_id, date, 0)
    }
}
