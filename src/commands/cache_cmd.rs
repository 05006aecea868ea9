use clap::{Args, Subcommand};

use super::AppContext;

#[derive(Args)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand)]
pub enum CacheSubcommand {
    /// Delete every cached record for the current user (remote data is kept)
    Clear,
}

impl CacheCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            CacheSubcommand::Clear => {
                let removed = ctx.coordinator.clear_local(&ctx.user_id).await?;
                println!("Cleared {} cached record(s) for {}", removed, ctx.user_id);
                Ok(())
            }
        }
    }
}
