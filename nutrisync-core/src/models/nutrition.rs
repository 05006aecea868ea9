use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

use super::meal_log::MealLogEntry;

/// Macronutrients consumed for one meal. Calories in kcal, the rest in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Nutrition {
    pub fn new(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    /// True when every figure is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fats]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(self, rhs: Nutrition) -> Nutrition {
        Nutrition {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Nutrition) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Nutrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} kcal, protein {:.1} g, carbs {:.1} g, fats {:.1} g",
            self.calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Totals for one day, derived from the current entry of each slot. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meals_count: usize,
}

impl DailyTotals {
    /// Folds entries that have already been deduplicated to one per slot.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a MealLogEntry>) -> Self {
        let mut sum = Nutrition::default();
        let mut meals_count = 0;
        for entry in entries {
            sum += entry.nutrition;
            meals_count += 1;
        }
        Self {
            calories: sum.calories,
            protein: sum.protein,
            carbs: sum.carbs,
            fats: sum.fats,
            meals_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Meal, MealType};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_nutrition_add() {
        let a = Nutrition::new(300.0, 20.0, 30.0, 10.0);
        let b = Nutrition::new(200.0, 5.5, 25.0, 4.0);
        assert_eq!(a + b, Nutrition::new(500.0, 25.5, 55.0, 14.0));
    }

    #[test]
    fn test_nutrition_validity() {
        assert!(Nutrition::new(0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Nutrition::new(-1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Nutrition::new(f64::NAN, 0.0, 0.0, 0.0).is_valid());
        assert!(!Nutrition::new(100.0, f64::INFINITY, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_daily_totals_from_entries() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entries = vec![
            MealLogEntry::from_meal(
                "u1",
                date,
                Meal::new(MealType::Breakfast, "Oats", Nutrition::new(350.0, 12.0, 60.0, 6.0)),
                Utc::now(),
            ),
            MealLogEntry::from_meal(
                "u1",
                date,
                Meal::new(MealType::Lunch, "Salad", Nutrition::new(420.0, 25.0, 20.0, 22.0)),
                Utc::now(),
            ),
        ];

        let totals = DailyTotals::from_entries(&entries);
        assert_eq!(totals.calories, 770.0);
        assert_eq!(totals.protein, 37.0);
        assert_eq!(totals.carbs, 80.0);
        assert_eq!(totals.fats, 28.0);
        assert_eq!(totals.meals_count, 2);
    }

    #[test]
    fn test_daily_totals_empty() {
        let totals = DailyTotals::from_entries(&Vec::<MealLogEntry>::new());
        assert_eq!(totals, DailyTotals::default());
    }
}
