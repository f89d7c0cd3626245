//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `HouseLedger`, including all
//! slash commands, autocomplete handlers, error rendering and bot context.

/// Discord command implementations (expenses, groups, payments, balances, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Conversion of raw command parameters into ledger types
pub mod params;

use crate::{
    config::LedgerSettings,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Discord's message length limit, minus some headroom.
const MESSAGE_LIMIT: usize = 1900;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the validated ledger settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Participants and payment tolerance
    pub settings: LedgerSettings,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { database, settings }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::expense_manage(),
        commands::set_amount(),
        commands::clear_amount(),
        commands::group_manage(),
        commands::pay(),
        commands::payments(),
        commands::balance(),
        commands::report(),
        commands::history(),
    ]
}

/// Whether the error was caused by the user's input rather than the system.
#[must_use]
pub const fn is_user_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Validation { .. }
            | Error::ExpenseNotFound { .. }
            | Error::GroupNotFound { .. }
            | Error::DuplicatePayment { .. }
    )
}

/// The reply shown to the user when a command fails.
#[must_use]
pub fn describe_error(error: &Error) -> String {
    match error {
        Error::Validation { message } => format!("❌ {message}"),
        Error::ExpenseNotFound { id } => {
            format!("❌ Expense #{id} not found. Use `/expense_manage list` to see expenses.")
        }
        Error::GroupNotFound { id } => {
            format!("❌ Group #{id} not found. Use `/group_manage list` to see groups.")
        }
        Error::DuplicatePayment {
            period, payer, ..
        } => format!("⚠️ {payer} already paid this expense for {period}."),
        _ => "❌ Something went wrong. Please try again later.".to_string(),
    }
}

/// Splits text into messages under Discord's length limit, breaking on lines.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            messages.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

/// Sends `text`, split over several messages if it is too long for one.
pub async fn say_long(ctx: poise::Context<'_, BotData, Error>, text: &str) -> Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if is_user_error(&error) {
                warn!("Command `{}` rejected: {}", ctx.command().name, error);
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
            }
            if let Err(e) = ctx.say(describe_error(&error)).await {
                error!("Failed to send error message: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Starting Discord client...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;
    client.start().await?;
    Ok(())
}
