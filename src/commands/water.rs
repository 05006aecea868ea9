use clap::{Args, Subcommand};

use super::{report_status, AppContext, OutputFormat};
use nutrisync_core::WaterRecord;

#[derive(Args)]
pub struct WaterCommand {
    #[command(subcommand)]
    pub command: WaterSubcommand,
}

#[derive(Subcommand)]
pub enum WaterSubcommand {
    /// Set the number of glasses for a day
    Set {
        glasses: u32,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Add glasses (negative to remove)
    Add {
        #[arg(allow_hyphen_values = true)]
        glasses: i32,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Show water intake for a day
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WaterCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WaterSubcommand::Set { glasses, date } => {
                let date = ctx.date_or_today(date)?;
                let recorded = ctx
                    .coordinator
                    .record_water(&ctx.session, &ctx.user_id, date, *glasses)
                    .await?;
                print_record(&recorded.value);
                report_status(&recorded.status);
                Ok(())
            }

            WaterSubcommand::Add { glasses, date } => {
                let date = ctx.date_or_today(date)?;
                let recorded = ctx
                    .coordinator
                    .add_water(&ctx.session, &ctx.user_id, date, *glasses)
                    .await?;
                print_record(&recorded.value);
                report_status(&recorded.status);
                Ok(())
            }

            WaterSubcommand::Show { date, format } => {
                let date = ctx.date_or_today(date)?;
                let record = ctx
                    .coordinator
                    .get_water(&ctx.session, &ctx.user_id, date)
                    .await;

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
                    OutputFormat::Text => print_record(&record),
                }
                Ok(())
            }
        }
    }
}

fn print_record(record: &WaterRecord) {
    println!(
        "{}: {} glass(es), {} ml",
        record.date, record.glasses, record.ml
    );
}
