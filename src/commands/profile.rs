use clap::{Args, Subcommand};
use std::collections::BTreeSet;

use super::{report_status, AppContext, OutputFormat};
use nutrisync_core::{ActivityLevel, Gender, ProfilePatch};

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the current profile
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update profile fields; omitted fields keep their value
    Update(ProfileUpdateArgs),
}

#[derive(Args, Default)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    age: Option<u32>,

    /// male, female or other
    #[arg(long)]
    gender: Option<String>,

    /// Weight in kilograms
    #[arg(long)]
    weight: Option<f64>,

    /// Height in centimeters
    #[arg(long)]
    height: Option<f64>,

    /// sedentary, light, moderate, active or very_active
    #[arg(long)]
    activity: Option<String>,

    /// Allergy (can be repeated); replaces the stored set
    #[arg(long = "allergy", value_name = "ALLERGY")]
    allergies: Vec<String>,

    /// Medical condition (can be repeated); replaces the stored set
    #[arg(long = "condition", value_name = "CONDITION")]
    conditions: Vec<String>,

    /// Remove all allergies
    #[arg(long, conflicts_with = "allergies")]
    clear_allergies: bool,

    /// Remove all medical conditions
    #[arg(long, conflicts_with = "conditions")]
    clear_conditions: bool,
}

impl ProfileUpdateArgs {
    fn to_patch(&self) -> Result<ProfilePatch, String> {
        let gender = self
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()?;
        let activity_level = self
            .activity
            .as_deref()
            .map(str::parse::<ActivityLevel>)
            .transpose()?;

        Ok(ProfilePatch {
            email: self.email.clone(),
            age: self.age,
            gender,
            weight_kg: self.weight,
            height_cm: self.height,
            activity_level,
            diseases: tag_set(&self.conditions, self.clear_conditions),
            allergies: tag_set(&self.allergies, self.clear_allergies),
        })
    }
}

fn tag_set(values: &[String], clear: bool) -> Option<BTreeSet<String>> {
    if clear {
        return Some(BTreeSet::new());
    }
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect(),
    )
}

impl ProfileCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ProfileSubcommand::Show { format } => {
                let profile = ctx
                    .coordinator
                    .get_user_profile(&ctx.session, &ctx.user_id)
                    .await;

                match (profile, format) {
                    (None, _) => {
                        println!("No profile for {}", ctx.user_id);
                        println!("Use 'nutrisync profile update' to create one.");
                    }
                    (Some(profile), OutputFormat::Json) => {
                        println!("{}", serde_json::to_string_pretty(&profile)?);
                    }
                    (Some(profile), OutputFormat::Text) => {
                        println!("{}", profile);
                    }
                }
                Ok(())
            }

            ProfileSubcommand::Update(args) => {
                let patch = args.to_patch()?;
                if patch.is_empty() {
                    return Err("Nothing to update. See 'nutrisync profile update --help'.".into());
                }

                let updated = ctx
                    .coordinator
                    .update_user_profile(&ctx.session, &ctx.user_id, patch)
                    .await?;

                println!("Profile updated:");
                println!();
                println!("{}", updated.value);
                report_status(&updated.status);
                Ok(())
            }
        }
    }
}
