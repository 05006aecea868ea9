use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::meal_type::MealType;
use super::nutrition::Nutrition;

/// Recipe details captured at commit time. Order of ingredients and
/// instructions is preserved as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeSnapshot {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub emoji: Option<String>,
    pub description: Option<String>,
}

/// A meal as handed over by a caller or the meal generator, before it is
/// bound to a user and a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_type: MealType,
    pub name: String,
    pub nutrition: Nutrition,
    pub recipe: Option<RecipeSnapshot>,
}

impl Meal {
    pub fn new(meal_type: MealType, name: impl Into<String>, nutrition: Nutrition) -> Self {
        Self {
            meal_type,
            name: name.into(),
            nutrition,
            recipe: None,
        }
    }

    pub fn with_recipe(mut self, recipe: RecipeSnapshot) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Basic shape check: a non-blank name and sane nutrition figures.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("meal name must not be empty".to_string());
        }
        if !self.nutrition.is_valid() {
            return Err(format!(
                "nutrition values for '{}' must be finite and non-negative",
                self.name
            ));
        }
        Ok(())
    }
}

/// A committed meal. For a given (user, date, meal type) slot the entry with
/// the latest `created_at` is the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogEntry {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub name: String,
    pub nutrition: Nutrition,
    pub recipe: Option<RecipeSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl MealLogEntry {
    pub fn from_meal(
        user_id: impl Into<String>,
        date: NaiveDate,
        meal: Meal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            meal_type: meal.meal_type,
            name: meal.name,
            nutrition: meal.nutrition,
            recipe: meal.recipe,
            created_at,
        }
    }

    /// True if both entries compete for the same slot.
    pub fn same_slot(&self, other: &MealLogEntry) -> bool {
        self.user_id == other.user_id && self.date == other.date && self.meal_type == other.meal_type
    }
}

impl fmt::Display for MealLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let emoji = self
            .recipe
            .as_ref()
            .and_then(|r| r.emoji.as_deref())
            .unwrap_or("");
        writeln!(f, "{} - {}: {} {}", self.date, self.meal_type, self.name, emoji)?;
        write!(f, "  {}", self.nutrition)?;

        if let Some(recipe) = &self.recipe {
            if !recipe.ingredients.is_empty() {
                write!(f, "\n  Ingredients:")?;
                for ingredient in &recipe.ingredients {
                    write!(f, "\n    - {}", ingredient)?;
                }
            }
        }

        Ok(())
    }
}
