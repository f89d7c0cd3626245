//! General Discord commands - ping and help.
//! These commands don't touch the ledger.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let participants = ctx.data().settings.participants.names().join(", ");
        let help_text = format!(
            "**HouseLedger Help**\n\
            Shared household expenses between: {participants}.\n\
            Month options default to the current month.\n\n\
            **Payments & Balances**\n\
            • `/pay <expense> [participant] [amount] [month] [year]` - Records a share as paid.\n\
            • `/payments [month] [year]` - Lists the payments of a month.\n\
            • `/balance [month] [year]` - Shows who still owes what.\n\
            • `/report [month] [year]` - Full breakdown per expense and participant.\n\
            • `/history` - What everyone paid, month by month.\n\n\
            **Expenses**\n\
            • `/expense_manage <subcommand>` - Manage expenses (add, list, update, deactivate).\n\
            • `/set_amount <expense> <amount> [month] [year]` - Changes an expense's amount for one month.\n\
            • `/clear_amount <expense> [month] [year]` - Reverts a month to the usual amount.\n\
            • `/group_manage <subcommand>` - Group expenses under one fixed payment (create, list, update, add, remove, delete).\n\n\
            **Utility Commands**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
