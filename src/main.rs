use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AppContext, CacheCommand, ConfigCommand, MealCommand, ProfileCommand, StreakCommand,
    WaterCommand,
};
use config::Config;
use nutrisync_core::{
    CoordinatorOptions, LocalCache, Session, SqlRemoteGateway, StaticSession, SyncCoordinator,
};

#[derive(Parser)]
#[command(name = "nutrisync")]
#[command(version)]
#[command(about = "Meal, water and profile tracking with offline-first sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Act as this signed-in user (overrides config)
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log, remove and list meals
    Meal(MealCommand),

    /// Track water intake
    Water(WaterCommand),

    /// Show or update the user profile
    Profile(ProfileCommand),

    /// Update the logging streak
    Streak(StreakCommand),

    /// Manage the local cache
    Cache(CacheCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrisync=warn,nutrisync_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?.with_user(cli.user);

    match cli.command {
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        Some(Commands::Meal(cmd)) => {
            let ctx = build_context(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Water(cmd)) => {
            let ctx = build_context(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Profile(cmd)) => {
            let ctx = build_context(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Streak(cmd)) => {
            let ctx = build_context(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Cache(cmd)) => {
            let ctx = build_context(&config).await?;
            cmd.run(&ctx).await?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

async fn build_context(config: &Config) -> Result<AppContext, Box<dyn std::error::Error>> {
    let cache = LocalCache::open(&config.cache_path.value).await?;
    let options = CoordinatorOptions {
        read_policy: config.sync.read_policy,
        water_policy: config.sync.water_policy,
        remote_timeout: config.remote.timeout(),
    };
    let mut coordinator = SyncCoordinator::new(cache).with_options(options);

    if let Some(url) = &config.remote.database_url {
        // An unreachable remote is not fatal; the session just stays local.
        match SqlRemoteGateway::connect(url).await {
            Ok(remote) => coordinator = coordinator.with_remote(Arc::new(remote)),
            Err(e) => tracing::warn!(error = %e, "remote store unavailable, working locally"),
        }
    }

    let session = Session::from_provider(&StaticSession::new(config.user_id.value.clone()));
    let user_id = session
        .user_id()
        .unwrap_or(commands::LOCAL_USER)
        .to_string();

    tracing::debug!(
        user_id = %user_id,
        remote = coordinator.has_remote(),
        "context ready"
    );

    Ok(AppContext {
        coordinator,
        session,
        user_id,
    })
}
