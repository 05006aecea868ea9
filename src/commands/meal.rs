use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{report_status, AppContext, OutputFormat};
use nutrisync_core::{Meal, MealLogEntry, MealType, Nutrition, RecipeSnapshot};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Commit a meal to today's slot, replacing what was there
    Commit {
        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// Meal name
        #[arg(long, short)]
        name: String,

        #[arg(long, default_value_t = 0.0)]
        calories: f64,

        /// Protein in grams
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Carbohydrates in grams
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Fats in grams
        #[arg(long, default_value_t = 0.0)]
        fats: f64,

        /// JSON file with recipe details (ingredients, instructions, ...)
        #[arg(long, value_name = "FILE")]
        recipe: Option<PathBuf>,
    },

    /// Remove a logged meal by ID
    Remove {
        /// Meal entry ID (UUID)
        id: String,

        /// Date the meal was logged on (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List the meals for a day
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show nutrition totals for a day
    Totals {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MealCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Commit {
                meal_type,
                name,
                calories,
                protein,
                carbs,
                fats,
                recipe,
            } => {
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let mut meal = Meal::new(
                    meal_type,
                    name.as_str(),
                    Nutrition::new(*calories, *protein, *carbs, *fats),
                );
                if let Some(path) = recipe {
                    meal = meal.with_recipe(load_recipe(path)?);
                }

                let committed = ctx
                    .coordinator
                    .commit_meal(&ctx.session, &ctx.user_id, meal)
                    .await?;

                println!("Committed {}:", committed.value.meal_type);
                println!();
                print_entry(&committed.value);
                report_status(&committed.status);
                Ok(())
            }

            MealSubcommand::Remove { id, date } => {
                let entry_id =
                    Uuid::parse_str(id).map_err(|_| format!("Invalid meal ID: {}", id))?;
                let date = ctx.date_or_today(date)?;

                let removed = ctx
                    .coordinator
                    .remove_meal(&ctx.session, &ctx.user_id, date, entry_id)
                    .await?;

                if removed.value {
                    println!("Removed meal {}", entry_id);
                } else {
                    println!("No meal {} found on {}", entry_id, date);
                }
                report_status(&removed.status);
                Ok(())
            }

            MealSubcommand::List { date, format } => {
                let date = ctx.date_or_today(date)?;
                let entries = ctx
                    .coordinator
                    .get_daily_logs(&ctx.session, &ctx.user_id, date)
                    .await;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        if entries.is_empty() {
                            println!("No meals logged on {}", date);
                            return Ok(());
                        }

                        println!("{}", date);
                        println!("{}", "-".repeat(10));
                        for entry in &entries {
                            println!(
                                "  {:10} {} ({:.0} kcal)",
                                entry.meal_type, entry.name, entry.nutrition.calories
                            );
                            println!("             ID: {}", entry.id);
                        }
                        println!("\nTotal: {} meal(s)", entries.len());
                    }
                }
                Ok(())
            }

            MealSubcommand::Totals { date, format } => {
                let date = ctx.date_or_today(date)?;
                let totals = ctx
                    .coordinator
                    .get_daily_nutrition_totals(&ctx.session, &ctx.user_id, date)
                    .await;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&totals)?);
                    }
                    OutputFormat::Text => {
                        println!("Totals for {}", date);
                        println!("{}", "=".repeat(20));
                        println!("Calories: {:.0} kcal", totals.calories);
                        println!("Protein:  {:.1} g", totals.protein);
                        println!("Carbs:    {:.1} g", totals.carbs);
                        println!("Fats:     {:.1} g", totals.fats);
                        println!("Meals:    {}", totals.meals_count);
                    }
                }
                Ok(())
            }
        }
    }
}

fn load_recipe(path: &Path) -> Result<RecipeSnapshot, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read recipe file '{}': {}", path.display(), e))?;
    let recipe = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse recipe file '{}': {}", path.display(), e))?;
    Ok(recipe)
}

fn print_entry(entry: &MealLogEntry) {
    println!("{}", entry);
    println!();
    println!("Meal ID: {}", entry.id);
}
