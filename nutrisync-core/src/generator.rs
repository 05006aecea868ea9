//! Contract for the meal-generation collaborator.
//!
//! How a meal is produced (prompting, ranking, recipes) is not this crate's
//! concern. The coordinator only checks the returned meal's basic shape.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Meal, MealType, UserProfile};

#[derive(Error, Debug)]
#[error("Meal generation failed: {0}")]
pub struct GeneratorError(pub String);

#[async_trait]
pub trait MealGenerator: Send + Sync {
    async fn generate_meal(
        &self,
        meal_type: MealType,
        profile: &UserProfile,
        preference: Option<&str>,
    ) -> Result<Meal, GeneratorError>;
}
