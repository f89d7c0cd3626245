//! Balance Discord commands - `balance`, `report` and `history`.
//!
//! Read-only views over the balance calculator and the payment ledger.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, params::period_or_current, say_long},
        core::{balance, payment, report},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Shows what each participant owes, has paid and still has pending for a month.
    #[poise::command(slash_command)]
    pub async fn balance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let period = period_or_current(month, year)?;
        let monthly = balance::monthly_balance(&data.database, &data.settings, period).await?;

        let mut response = format!(
            "💰 **Balance for {period}** (total {})\n",
            report::format_money(monthly.total)
        );
        for summary in &monthly.summaries {
            writeln!(
                response,
                "• {}: owes {}, paid {}, pending {}",
                summary.participant,
                report::format_money(summary.total_owed),
                report::format_money(summary.total_paid),
                report::format_money(summary.total_pending)
            )?;
        }
        writeln!(response)?;
        response.push_str(&report::settlement_message(&monthly));

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows the full breakdown of a month, expense by expense.
    #[poise::command(slash_command)]
    pub async fn report(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let period = period_or_current(month, year)?;
        let monthly = balance::monthly_balance(&data.database, &data.settings, period).await?;

        say_long(ctx, &report::format_balance_report(&monthly)?).await
    }

    /// Shows what everyone paid, month by month.
    #[poise::command(slash_command)]
    pub async fn history(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let totals = payment::payment_history(&ctx.data().database).await?;
        say_long(ctx, &report::format_history(&totals)?).await
    }
}

// Re-export all commands
pub use inner::*;
