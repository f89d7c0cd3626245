//! Payment Discord commands - `pay` and `payments`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, handlers::autocomplete,
            params::{parse_amount, period_or_current, resolve_expense, resolve_participant},
            say_long,
        },
        core::{
            expense,
            payment::{self, NewPayment},
            report::format_money,
        },
        errors::{Error, Result},
    };
    use std::{collections::HashMap, fmt::Write};

    /// Records that a participant paid their share of an expense for a month.
    ///
    /// Without an amount the expected share is used. Without a participant the
    /// one linked to your Discord account pays.
    #[poise::command(slash_command)]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense being paid"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
        #[description = "Who is paying, defaults to you"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        participant: Option<String>,
        #[description = "Amount paid, defaults to the expected share"] amount: Option<f64>,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let period = period_or_current(month, year)?;
        let target = resolve_expense(db, &expense).await?;
        let payer = resolve_participant(
            &data.settings,
            participant.as_deref(),
            &ctx.author().id.to_string(),
        )?;

        let amount = match amount {
            Some(amount) => parse_amount(amount)?,
            None => payment::expected_share(db, &data.settings, target.id, period, &payer).await?,
        };

        let recorded = payment::record_payment(
            db,
            &data.settings,
            NewPayment {
                expense_id: target.id,
                period,
                payer,
                amount,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ {} paid {} for **{}** ({period}).",
            recorded.payer,
            format_money(recorded.amount_paid),
            target.concept
        ))
        .await?;
        Ok(())
    }

    /// Lists the payments recorded for a month.
    #[poise::command(slash_command)]
    pub async fn payments(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let period = period_or_current(month, year)?;
        let recorded = payment::list_payments(db, period).await?;

        if recorded.is_empty() {
            ctx.say(format!("💸 No payments recorded for {period}."))
                .await?;
            return Ok(());
        }

        let concepts: HashMap<i64, String> = expense::list_expenses(db, true)
            .await?
            .into_iter()
            .map(|e| (e.id, e.concept))
            .collect();

        let mut response = format!("💸 **Payments for {period}**\n");
        for p in &recorded {
            let concept = concepts
                .get(&p.expense_id)
                .map_or("unknown expense", String::as_str);
            writeln!(
                response,
                "• {}: {} paid {} on {}",
                concept,
                p.payer,
                format_money(p.amount_paid),
                p.paid_at.format("%Y-%m-%d")
            )?;
        }

        say_long(ctx, &response).await
    }
}

// Re-export all commands
pub use inner::*;
