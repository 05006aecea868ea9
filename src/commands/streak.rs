use clap::{Args, Subcommand};

use super::{report_status, AppContext};
use nutrisync_core::StreakState;

#[derive(Args)]
pub struct StreakCommand {
    #[command(subcommand)]
    pub command: StreakSubcommand,
}

#[derive(Subcommand)]
pub enum StreakSubcommand {
    /// Recompute today's streak from logged meals
    Recompute,

    /// Mark today as complete (always adds a day)
    Confirm,
}

impl StreakCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let result = match &self.command {
            StreakSubcommand::Recompute => {
                ctx.coordinator
                    .recompute_streak_from_activity(&ctx.session, &ctx.user_id)
                    .await?
            }
            StreakSubcommand::Confirm => {
                ctx.coordinator
                    .confirm_day_complete(&ctx.session, &ctx.user_id)
                    .await?
            }
        };

        match result {
            Some(updated) => {
                print_streak(&updated.value);
                report_status(&updated.status);
            }
            None => {
                println!("No profile for {}; streaks are tracked on the profile.", ctx.user_id);
                println!("Use 'nutrisync profile update' to create one.");
            }
        }
        Ok(())
    }
}

fn print_streak(streak: &StreakState) {
    println!("Current streak: {} day(s)", streak.current_streak);
    println!("Longest streak: {} day(s)", streak.longest_streak);
    if let Some(date) = streak.last_activity_date {
        println!("Last active:    {}", date);
    }
}
