use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::{RemoteError, RemoteGateway};
use crate::db::init_remote_db;
use crate::models::{
    ActivityLevel, Gender, MealLogEntry, MealType, Nutrition, RecipeSnapshot, StreakState,
    UserProfile,
};
use crate::session::RemoteIdentity;

const TAG_ALLERGY: &str = "allergy";
const TAG_MEDICAL_CONDITION: &str = "medical_condition";

/// Normalized relational implementation of [`RemoteGateway`].
#[derive(Clone, Debug)]
pub struct SqlRemoteGateway {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    age: Option<i64>,
    gender: Option<String>,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    activity_level: String,
    current_streak: i64,
    longest_streak: i64,
    last_activity_date: Option<String>,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    kind: String,
    value: String,
}

#[derive(sqlx::FromRow)]
struct MealEntryRow {
    id: String,
    date: String,
    meal_type: String,
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    created_at: String,
    recipe_id: Option<String>,
    description: Option<String>,
    emoji: Option<String>,
    prep_time_minutes: Option<i64>,
    cook_time_minutes: Option<i64>,
    ingredients: Option<String>,
    instructions: Option<String>,
}

impl SqlRemoteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, RemoteError> {
        Ok(Self::new(init_remote_db(database_url).await?))
    }

    fn hydrate_profile(
        row: ProfileRow,
        tags: Vec<TagRow>,
        calorie_target: Option<i64>,
    ) -> Result<UserProfile, RemoteError> {
        let gender = row
            .gender
            .as_deref()
            .map(|g| g.parse::<Gender>().map_err(RemoteError::Malformed))
            .transpose()?;
        let activity_level: ActivityLevel =
            row.activity_level.parse().map_err(RemoteError::Malformed)?;
        let last_activity_date = row
            .last_activity_date
            .as_deref()
            .map(parse_date)
            .transpose()?;

        let mut allergies = BTreeSet::new();
        let mut diseases = BTreeSet::new();
        for tag in tags {
            match tag.kind.as_str() {
                TAG_ALLERGY => {
                    allergies.insert(tag.value);
                }
                TAG_MEDICAL_CONDITION => {
                    diseases.insert(tag.value);
                }
                other => {
                    return Err(RemoteError::Malformed(format!("unknown tag kind '{}'", other)))
                }
            }
        }

        Ok(UserProfile {
            id: row.id,
            email: row.email,
            age: row.age.map(to_u32).transpose()?,
            gender,
            weight_kg: row.weight_kg,
            height_cm: row.height_cm,
            activity_level,
            diseases,
            allergies,
            calorie_target: calorie_target.map(to_u32).transpose()?,
            streak: StreakState {
                current_streak: to_u32(row.current_streak)?,
                longest_streak: to_u32(row.longest_streak)?,
                last_activity_date,
            },
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }

    fn hydrate_entry(user_id: &str, row: MealEntryRow) -> Result<MealLogEntry, RemoteError> {
        let meal_type: MealType = row.meal_type.parse().map_err(RemoteError::Malformed)?;

        let recipe = match row.recipe_id {
            Some(_) => Some(RecipeSnapshot {
                ingredients: parse_json_list(row.ingredients.as_deref())?,
                instructions: parse_json_list(row.instructions.as_deref())?,
                prep_time_minutes: row.prep_time_minutes.map(to_u32).transpose()?,
                cook_time_minutes: row.cook_time_minutes.map(to_u32).transpose()?,
                emoji: row.emoji,
                description: row.description,
            }),
            None => None,
        };

        Ok(MealLogEntry {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RemoteError::Malformed(format!("invalid entry id '{}': {}", row.id, e)))?,
            user_id: user_id.to_string(),
            date: parse_date(&row.date)?,
            meal_type,
            name: row.name,
            nutrition: Nutrition::new(row.calories, row.protein, row.carbs, row.fats),
            recipe,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Returns the id of the user's log row for `date`, creating it if missing.
async fn ensure_daily_log(
    conn: &mut SqliteConnection,
    user_id: &str,
    date: NaiveDate,
) -> Result<String, sqlx::Error> {
    let date = date.to_string();

    sqlx::query(
        "INSERT INTO daily_logs (id, user_id, date) VALUES (?, ?, ?) ON CONFLICT (user_id, date) DO NOTHING",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(&date)
    .execute(&mut *conn)
    .await?;

    let (id,): (String,) = sqlx::query_as("SELECT id FROM daily_logs WHERE user_id = ? AND date = ?")
        .bind(user_id)
        .bind(&date)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

#[async_trait]
impl RemoteGateway for SqlRemoteGateway {
    async fn fetch_profile(
        &self,
        identity: &RemoteIdentity,
    ) -> Result<Option<UserProfile>, RemoteError> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(identity.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tags: Vec<TagRow> =
            sqlx::query_as("SELECT kind, value FROM profile_tags WHERE profile_id = ?")
                .bind(identity.as_str())
                .fetch_all(&self.pool)
                .await?;

        let target: Option<(i64,)> =
            sqlx::query_as("SELECT daily_calories FROM nutrition_targets WHERE profile_id = ?")
                .bind(identity.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Self::hydrate_profile(row, tags, target.map(|t| t.0)).map(Some)
    }

    async fn save_profile(
        &self,
        identity: &RemoteIdentity,
        profile: &UserProfile,
    ) -> Result<(), RemoteError> {
        let id = identity.as_str();
        let updated_at = profile.updated_at.to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, age, gender, weight_kg, height_cm, activity_level,
                                  current_streak, longest_streak, last_activity_date, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                age = excluded.age,
                gender = excluded.gender,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                activity_level = excluded.activity_level,
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_activity_date = excluded.last_activity_date,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(&profile.email)
        .bind(profile.age.map(i64::from))
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.weight_kg)
        .bind(profile.height_cm)
        .bind(profile.activity_level.as_str())
        .bind(i64::from(profile.streak.current_streak))
        .bind(i64::from(profile.streak.longest_streak))
        .bind(profile.streak.last_activity_date.map(|d| d.to_string()))
        .bind(&updated_at)
        .execute(&mut *tx)
        .await?;

        // Tags are replaced wholesale so the stored set always equals the
        // profile's current set.
        sqlx::query("DELETE FROM profile_tags WHERE profile_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let tags = profile
            .allergies
            .iter()
            .map(|v| (TAG_ALLERGY, v))
            .chain(profile.diseases.iter().map(|v| (TAG_MEDICAL_CONDITION, v)));
        for (kind, value) in tags {
            sqlx::query("INSERT INTO profile_tags (profile_id, kind, value) VALUES (?, ?, ?)")
                .bind(id)
                .bind(kind)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        match profile.calorie_target {
            Some(calories) => {
                sqlx::query(
                    r#"
                    INSERT INTO nutrition_targets (profile_id, daily_calories, updated_at)
                    VALUES (?, ?, ?)
                    ON CONFLICT(profile_id) DO UPDATE SET
                        daily_calories = excluded.daily_calories,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(id)
                .bind(i64::from(calories))
                .bind(&updated_at)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM nutrition_targets WHERE profile_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_meal_entries(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
    ) -> Result<Vec<MealLogEntry>, RemoteError> {
        let rows: Vec<MealEntryRow> = sqlx::query_as(
            r#"
            SELECT m.id, d.date, m.meal_type, m.name, m.calories, m.protein, m.carbs, m.fats,
                   m.created_at, r.meal_entry_id AS recipe_id, r.description, r.emoji,
                   r.prep_time_minutes, r.cook_time_minutes, r.ingredients, r.instructions
            FROM meal_entries m
            INNER JOIN daily_logs d ON d.id = m.daily_log_id
            LEFT JOIN recipes r ON r.meal_entry_id = m.id
            WHERE d.user_id = ? AND d.date = ?
            ORDER BY m.created_at
            "#,
        )
        .bind(identity.as_str())
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::hydrate_entry(identity.as_str(), row))
            .collect()
    }

    async fn replace_meal_entry(
        &self,
        identity: &RemoteIdentity,
        entry: &MealLogEntry,
    ) -> Result<(), RemoteError> {
        let id = entry.id.to_string();
        let mut tx = self.pool.begin().await?;

        let daily_log_id = ensure_daily_log(&mut tx, identity.as_str(), entry.date).await?;

        sqlx::query("DELETE FROM meal_entries WHERE daily_log_id = ? AND meal_type = ?")
            .bind(&daily_log_id)
            .bind(entry.meal_type.as_str())
            .execute(&mut *tx)
            .await?;

        // A resend of the same entry may have landed on another day's row.
        sqlx::query(
            "DELETE FROM meal_entries WHERE id = ? AND daily_log_id IN (SELECT id FROM daily_logs WHERE user_id = ?)",
        )
        .bind(&id)
        .bind(identity.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO meal_entries (id, daily_log_id, meal_type, name, calories, protein, carbs, fats, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&daily_log_id)
        .bind(entry.meal_type.as_str())
        .bind(&entry.name)
        .bind(entry.nutrition.calories)
        .bind(entry.nutrition.protein)
        .bind(entry.nutrition.carbs)
        .bind(entry.nutrition.fats)
        .bind(entry.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        if let Some(recipe) = &entry.recipe {
            let ingredients = serde_json::to_string(&recipe.ingredients)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;
            let instructions = serde_json::to_string(&recipe.instructions)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO recipes (meal_entry_id, description, emoji, prep_time_minutes,
                                     cook_time_minutes, ingredients, instructions)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&recipe.description)
            .bind(&recipe.emoji)
            .bind(recipe.prep_time_minutes.map(i64::from))
            .bind(recipe.cook_time_minutes.map(i64::from))
            .bind(&ingredients)
            .bind(&instructions)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_meal_entry(
        &self,
        identity: &RemoteIdentity,
        entry_id: Uuid,
    ) -> Result<bool, RemoteError> {
        let result = sqlx::query(
            "DELETE FROM meal_entries WHERE id = ? AND daily_log_id IN (SELECT id FROM daily_logs WHERE user_id = ?)",
        )
        .bind(entry_id.to_string())
        .bind(identity.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_water_ml(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
    ) -> Result<Option<i64>, RemoteError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT water_ml FROM daily_logs WHERE user_id = ? AND date = ?")
                .bind(identity.as_str())
                .bind(date.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| r.0))
    }

    async fn add_water_ml(
        &self,
        identity: &RemoteIdentity,
        date: NaiveDate,
        delta_ml: i64,
    ) -> Result<i64, RemoteError> {
        let mut tx = self.pool.begin().await?;
        let daily_log_id = ensure_daily_log(&mut tx, identity.as_str(), date).await?;

        sqlx::query("UPDATE daily_logs SET water_ml = MAX(0, water_ml + ?) WHERE id = ?")
            .bind(delta_ml)
            .bind(&daily_log_id)
            .execute(&mut *tx)
            .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT water_ml FROM daily_logs WHERE id = ?")
            .bind(&daily_log_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(total)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, RemoteError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RemoteError::Malformed(format!("invalid date '{}': {}", s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RemoteError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RemoteError::Malformed(format!("invalid timestamp '{}': {}", s, e)))
}

fn parse_json_list(raw: Option<&str>) -> Result<Vec<String>, RemoteError> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| RemoteError::Malformed(format!("invalid recipe list: {}", e))),
        None => Ok(Vec::new()),
    }
}

fn to_u32(value: i64) -> Result<u32, RemoteError> {
    u32::try_from(value).map_err(|_| RemoteError::Malformed(format!("value {} out of range", value)))
}
