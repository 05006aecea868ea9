mod meal_log;
mod meal_type;
mod nutrition;
mod profile;
mod streak;
mod water;

pub use meal_log::{Meal, MealLogEntry, RecipeSnapshot};
pub use meal_type::MealType;
pub use nutrition::{DailyTotals, Nutrition};
pub use profile::{ActivityLevel, Gender, ProfilePatch, UserProfile};
pub use streak::StreakState;
pub use water::{WaterRecord, ML_PER_GLASS};
