#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use house_ledger::{
    bot::{self, BotData},
    config::{self, database, expenses},
    core::migrate,
    errors::{Error, Result},
};
use std::{env, path::Path};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: house-ledger [migrate <target-database-url>]";

/// Creates the parent directory of a file-backed `SQLite` URL so `mode=rwc` can create the file.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(file)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load configuration and validate the participants
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let settings = app_config.settings()?;
    info!(
        "Sharing expenses between {}",
        settings.participants.names().join(", ")
    );

    // 4. Initialize database
    let database_url = database::get_database_url();
    ensure_sqlite_dir(&database_url)?;
    let db = database::connect(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. One-off migration to another database
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [command, target_url] if command == "migrate" => {
            ensure_sqlite_dir(target_url)?;
            let target = database::connect(target_url).await?;
            let report = migrate::copy_ledger(&db, &target).await?;
            info!("Migration finished: {}", report);
            return Ok(());
        }
        _ => {
            return Err(Error::Config {
                message: USAGE.to_string(),
            });
        }
    }

    // 6. Seed expenses from config.toml on first run
    let seeded = expenses::seed_expenses(&db, &settings.participants, &app_config.expenses)
        .await
        .inspect_err(|e| error!("Failed to seed expenses: {}", e))?;
    if seeded > 0 {
        info!("Seeded {} expenses", seeded);
    }

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))?;

    bot::run_bot(token, BotData::new(db, settings)).await
}
