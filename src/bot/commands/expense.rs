//! Expense Discord commands - `expense_manage`, `set_amount` and `clear_amount`.
//!
//! These commands maintain the expense registry and the per-month amount overrides.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, handlers::autocomplete,
            params::{parse_amount, period_or_current, resolve_expense, split_from_options},
        },
        core::{
            expense::{self, ExpenseUpdate, NewExpense},
            frequency::Frequency,
            overrides,
            report::format_money,
            split::SplitRule,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for managing the shared expenses.
    #[poise::command(
        slash_command,
        subcommands("expense_add", "expense_list", "expense_update", "expense_deactivate")
    )]
    pub async fn expense_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense management command. Available subcommands:\n\
            `/expense_manage add` - Add a new expense\n\
            `/expense_manage list` - List expenses\n\
            `/expense_manage update` - Change an expense\n\
            `/expense_manage deactivate` - Stop an expense from applying to new months";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new recurring expense.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the expense (e.g., 'Rent')"] concept: String,
        #[description = "Amount per occurrence (e.g., 600.00)"] amount: f64,
        #[description = "monthly, weekly, biweekly or annual. Defaults to monthly."]
        #[autocomplete = "autocomplete::autocomplete_frequency"]
        frequency: Option<String>,
        #[description = "Participant with a fixed amount or percentage"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        split_participant: Option<String>,
        #[description = "Fixed monthly amount that participant pays"] split_fixed: Option<f64>,
        #[description = "Percentage that participant pays"] split_percent: Option<f64>,
    ) -> Result<()> {
        let data = ctx.data();
        let frequency = match frequency {
            Some(f) => f.parse::<Frequency>()?,
            None => Frequency::Monthly,
        };
        let split = split_from_options(split_participant, split_fixed, split_percent)?
            .unwrap_or_default();

        let new = NewExpense {
            concept,
            total_amount: parse_amount(amount)?,
            frequency,
            split,
        };
        let created =
            expense::create_expense(&data.database, &data.settings.participants, new).await?;

        ctx.say(format!(
            "✅ Added expense #{} **{}**: {} {} ({})",
            created.id,
            created.concept,
            format_money(created.total_amount),
            created.frequency,
            SplitRule::from_model(&created)
        ))
        .await?;
        Ok(())
    }

    /// Lists expenses with their amounts and split rules.
    #[poise::command(slash_command, rename = "list")]
    pub async fn expense_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Also show deactivated expenses"] include_inactive: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let expenses = expense::list_expenses(db, include_inactive.unwrap_or(false)).await?;

        if expenses.is_empty() {
            ctx.say("📋 No expenses yet. Add one with `/expense_manage add`.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📋 **Expenses**\n");
        for e in &expenses {
            write!(
                response,
                "#{} **{}**: {} {} ({})",
                e.id,
                e.concept,
                format_money(e.total_amount),
                e.frequency,
                SplitRule::from_model(e)
            )?;
            if !e.active {
                response.push_str(" *(inactive)*");
            }
            response.push('\n');
        }

        crate::bot::say_long(ctx, &response).await
    }

    /// Changes the name, amount, frequency or split of an expense.
    #[poise::command(slash_command, rename = "update")]
    pub async fn expense_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense to change"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
        #[description = "New name"] concept: Option<String>,
        #[description = "New amount per occurrence"] amount: Option<f64>,
        #[description = "New frequency"]
        #[autocomplete = "autocomplete::autocomplete_frequency"]
        frequency: Option<String>,
        #[description = "Participant with a fixed amount or percentage"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        split_participant: Option<String>,
        #[description = "Fixed monthly amount that participant pays"] split_fixed: Option<f64>,
        #[description = "Percentage that participant pays"] split_percent: Option<f64>,
        #[description = "Go back to the weighted split"] weighted: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let target = resolve_expense(&data.database, &expense).await?;

        let split = if weighted.unwrap_or(false) {
            Some(SplitRule::Weighted)
        } else {
            split_from_options(split_participant, split_fixed, split_percent)?
        };
        let update = ExpenseUpdate {
            concept,
            total_amount: amount.map(parse_amount).transpose()?,
            frequency: frequency.map(|f| f.parse::<Frequency>()).transpose()?,
            split,
        };
        if update.is_empty() {
            ctx.say("ℹ️ Nothing to change.").await?;
            return Ok(());
        }

        let updated = expense::update_expense(
            &data.database,
            &data.settings.participants,
            target.id,
            update,
        )
        .await?;

        ctx.say(format!(
            "✅ Updated expense #{} **{}**: {} {} ({})",
            updated.id,
            updated.concept,
            format_money(updated.total_amount),
            updated.frequency,
            SplitRule::from_model(&updated)
        ))
        .await?;
        Ok(())
    }

    /// Deactivates an expense. Months already paid keep it.
    #[poise::command(slash_command, rename = "deactivate")]
    pub async fn expense_deactivate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense to deactivate"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let target = resolve_expense(db, &expense).await?;
        let deactivated = expense::deactivate_expense(db, target.id).await?;

        ctx.say(format!(
            "🗑️ Expense **{}** no longer applies to new months.",
            deactivated.concept
        ))
        .await?;
        Ok(())
    }

    /// Changes the amount of an expense for a single month (e.g., this month's electricity bill).
    #[poise::command(slash_command)]
    pub async fn set_amount(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense to adjust"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
        #[description = "Amount for that month"] amount: f64,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let period = period_or_current(month, year)?;
        let target = resolve_expense(db, &expense).await?;

        let set = overrides::set_override(db, target.id, period, parse_amount(amount)?).await?;
        let effective = overrides::get_effective_amount(db, target.id, period).await?;

        ctx.say(format!(
            "✅ **{}** for {period} set to {} (owed this month: {}).",
            target.concept,
            format_money(set.amount),
            format_money(effective)
        ))
        .await?;
        Ok(())
    }

    /// Reverts a month to the expense's usual amount.
    #[poise::command(slash_command)]
    pub async fn clear_amount(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense to revert"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
        #[description = "Month (1-12), defaults to the current one"] month: Option<u32>,
        #[description = "Year, defaults to the current one"] year: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let period = period_or_current(month, year)?;
        let target = resolve_expense(db, &expense).await?;

        if overrides::clear_override(db, target.id, period).await? {
            ctx.say(format!(
                "✅ **{}** for {period} is back to {}.",
                target.concept,
                format_money(target.total_amount)
            ))
            .await?;
        } else {
            ctx.say(format!(
                "ℹ️ **{}** had no special amount for {period}.",
                target.concept
            ))
            .await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
