use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::streak::StreakState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!(
                "Invalid gender '{}'. Valid options: male, female, other",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Factor applied to the basal metabolic rate.
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(format!(
                "Invalid activity level '{}'. Valid options: sedentary, light, moderate, active, very_active",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: ActivityLevel,
    pub diseases: BTreeSet<String>,
    pub allergies: BTreeSet<String>,
    pub calorie_target: Option<u32>,
    #[serde(default)]
    pub streak: StreakState,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            age: None,
            gender: None,
            weight_kg: None,
            height_cm: None,
            activity_level: ActivityLevel::default(),
            diseases: BTreeSet::new(),
            allergies: BTreeSet::new(),
            calorie_target: None,
            streak: StreakState::default(),
            updated_at: Utc::now(),
        }
    }

    /// Daily calorie target from the Mifflin-St Jeor equation scaled by
    /// activity level. `None` until age, gender, weight and height are known.
    pub fn compute_calorie_target(&self) -> Option<u32> {
        let age = f64::from(self.age?);
        let weight = self.weight_kg?;
        let height = self.height_cm?;
        let offset = match self.gender? {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            Gender::Other => -78.0,
        };

        let bmr = 10.0 * weight + 6.25 * height - 5.0 * age + offset;
        let target = (bmr * self.activity_level.multiplier()).round();
        if target.is_finite() && target > 0.0 {
            Some(target as u32)
        } else {
            None
        }
    }

    /// Applies a patch field by field, then refreshes the calorie target.
    pub fn apply(&mut self, patch: ProfilePatch) {
        let ProfilePatch {
            email,
            age,
            gender,
            weight_kg,
            height_cm,
            activity_level,
            diseases,
            allergies,
        } = patch;

        if let Some(email) = email {
            self.email = email;
        }
        if let Some(age) = age {
            self.age = Some(age);
        }
        if let Some(gender) = gender {
            self.gender = Some(gender);
        }
        if let Some(weight) = weight_kg {
            self.weight_kg = Some(weight);
        }
        if let Some(height) = height_cm {
            self.height_cm = Some(height);
        }
        if let Some(level) = activity_level {
            self.activity_level = level;
        }
        if let Some(diseases) = diseases {
            self.diseases = diseases;
        }
        if let Some(allergies) = allergies {
            self.allergies = allergies;
        }

        self.calorie_target = self.compute_calorie_target();
    }
}

/// Explicit profile update. `None` keeps the stored value, `Some` replaces it.
/// Tag sets are replaced whole. Identity and streak are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub diseases: Option<BTreeSet<String>>,
    pub allergies: Option<BTreeSet<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Profile: {} <{}>", self.id, self.email)?;
        writeln!(f, "{}", "=".repeat(30))?;

        let unknown = || "-".to_string();
        writeln!(f, "Age: {}", self.age.map(|a| a.to_string()).unwrap_or_else(unknown))?;
        writeln!(
            f,
            "Gender: {}",
            self.gender.map(|g| g.to_string()).unwrap_or_else(unknown)
        )?;
        writeln!(
            f,
            "Weight: {}",
            self.weight_kg.map(|w| format!("{} kg", w)).unwrap_or_else(unknown)
        )?;
        writeln!(
            f,
            "Height: {}",
            self.height_cm.map(|h| format!("{} cm", h)).unwrap_or_else(unknown)
        )?;
        writeln!(f, "Activity: {}", self.activity_level)?;

        if !self.allergies.is_empty() {
            let allergies: Vec<&str> = self.allergies.iter().map(String::as_str).collect();
            writeln!(f, "Allergies: {}", allergies.join(", "))?;
        }
        if !self.diseases.is_empty() {
            let diseases: Vec<&str> = self.diseases.iter().map(String::as_str).collect();
            writeln!(f, "Conditions: {}", diseases.join(", "))?;
        }
        if let Some(target) = self.calorie_target {
            writeln!(f, "Calorie target: {} kcal", target)?;
        }

        write!(
            f,
            "Streak: {} day(s), longest {}",
            self.streak.current_streak, self.streak.longest_streak
        )
    }
}
