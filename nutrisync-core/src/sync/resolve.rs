//! Slot deduplication for meal log entries.

use std::collections::BTreeMap;

use crate::models::{MealLogEntry, MealType};

/// Reduces a day's entries to the current one per meal type: the entry with
/// the greatest `created_at`, the later one in input order on a tie. The
/// result is in breakfast, lunch, dinner, snack order.
///
/// All entries are expected to belong to the same user and date.
pub fn current_entries(entries: impl IntoIterator<Item = MealLogEntry>) -> Vec<MealLogEntry> {
    let mut slots: BTreeMap<MealType, MealLogEntry> = BTreeMap::new();

    for entry in entries {
        match slots.get(&entry.meal_type) {
            Some(existing) if existing.created_at > entry.created_at => {}
            _ => {
                slots.insert(entry.meal_type, entry);
            }
        }
    }

    slots.into_values().collect()
}

/// Union of both stores, resolved per slot by latest `created_at`. Local
/// entries are fed last so they win exact ties.
pub fn merge_latest(local: Vec<MealLogEntry>, remote: Vec<MealLogEntry>) -> Vec<MealLogEntry> {
    current_entries(remote.into_iter().chain(local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Meal, Nutrition};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn entry(meal_type: MealType, name: &str, minute: i64) -> MealLogEntry {
        let base = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        MealLogEntry::from_meal(
            "u1",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            Meal::new(meal_type, name, Nutrition::new(100.0, 1.0, 1.0, 1.0)),
            base + Duration::minutes(minute),
        )
    }

    #[test]
    fn test_keeps_latest_per_slot() {
        let entries = vec![
            entry(MealType::Lunch, "late lunch", 30),
            entry(MealType::Lunch, "early lunch", 10),
            entry(MealType::Breakfast, "toast", 0),
        ];

        let current = current_entries(entries);

        assert_eq!(current.len(), 2);
        assert_eq!(current[0].name, "toast");
        assert_eq!(current[1].name, "late lunch");
    }

    #[test]
    fn test_tie_goes_to_later_input() {
        let first = entry(MealType::Dinner, "first", 5);
        let mut second = entry(MealType::Dinner, "second", 0);
        second.created_at = first.created_at;

        let current = current_entries(vec![first, second]);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name, "second");
    }

    #[test]
    fn test_sorted_by_meal_type() {
        let current = current_entries(vec![
            entry(MealType::Snack, "nuts", 1),
            entry(MealType::Dinner, "pasta", 2),
            entry(MealType::Breakfast, "eggs", 3),
        ]);
        let types: Vec<MealType> = current.iter().map(|e| e.meal_type).collect();
        assert_eq!(
            types,
            vec![MealType::Breakfast, MealType::Dinner, MealType::Snack]
        );
    }

    #[test]
    fn test_merge_latest_picks_newest_across_stores() {
        let local = vec![entry(MealType::Lunch, "local lunch", 10)];
        let remote = vec![
            entry(MealType::Lunch, "remote lunch", 20),
            entry(MealType::Dinner, "remote dinner", 30),
        ];

        let merged = merge_latest(local, remote);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "remote lunch");
        assert_eq!(merged[1].name, "remote dinner");
    }

    #[test]
    fn test_merge_latest_local_wins_tie() {
        let local = vec![entry(MealType::Lunch, "local", 10)];
        let mut remote_entry = entry(MealType::Lunch, "remote", 10);
        remote_entry.created_at = local[0].created_at;

        let merged = merge_latest(local, vec![remote_entry]);
        assert_eq!(merged[0].name, "local");
    }
}
