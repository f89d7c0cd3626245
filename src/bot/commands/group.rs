//! Distribution group Discord commands - `group_manage` and its subcommands.
//!
//! A group lets one participant pay a fixed amount toward several expenses at once.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, handlers::autocomplete,
            params::{parse_amount, resolve_expense, resolve_expenses, resolve_group},
            say_long,
        },
        core::{
            expense,
            group::{self, Group, GroupUpdate, NewGroup},
            report::format_money,
        },
        errors::{Error, Result},
    };
    use std::{collections::HashMap, fmt::Write};

    fn describe(group: &Group, concepts: &HashMap<i64, String>) -> String {
        let members = group
            .expense_ids
            .iter()
            .map(|id| concepts.get(id).map_or("unknown expense", String::as_str))
            .collect::<Vec<_>>()
            .join(" + ");
        format!(
            "#{} **{}**: {} pays {} of {}",
            group.group.id,
            group.group.name,
            group.group.participant,
            format_money(group.group.fixed_amount),
            if members.is_empty() { "no expenses" } else { &members }
        )
    }

    async fn concepts(data: &BotData) -> Result<HashMap<i64, String>> {
        Ok(expense::list_expenses(&data.database, true)
            .await?
            .into_iter()
            .map(|e| (e.id, e.concept))
            .collect())
    }

    /// Parent command for managing distribution groups.
    #[poise::command(
        slash_command,
        subcommands(
            "group_create",
            "group_list",
            "group_update",
            "group_add",
            "group_remove",
            "group_delete"
        )
    )]
    pub async fn group_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Distribution group command. Available subcommands:\n\
            `/group_manage create` - Group expenses under one fixed payment\n\
            `/group_manage list` - List groups\n\
            `/group_manage update` - Change a group's name or fixed payment\n\
            `/group_manage add` - Add an expense to a group\n\
            `/group_manage remove` - Take an expense out of a group\n\
            `/group_manage delete` - Delete a group and release its expenses";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Groups several expenses: one participant pays a fixed amount, the others the rest.
    #[poise::command(slash_command, rename = "create")]
    pub async fn group_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the group (e.g., 'Utilities')"] name: String,
        #[description = "Participant paying the fixed amount"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        participant: String,
        #[description = "Fixed monthly amount that participant pays"] amount: f64,
        #[description = "Comma-separated expenses (e.g., 'Electricity, Water')"] expenses: String,
        #[description = "Optional note"] description: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let members = resolve_expenses(&data.database, &expenses).await?;

        let created = group::create_group(
            &data.database,
            &data.settings.participants,
            NewGroup {
                name,
                description,
                participant,
                fixed_amount: parse_amount(amount)?,
                expense_ids: members.iter().map(|e| e.id).collect(),
            },
        )
        .await?;

        let concepts = concepts(data).await?;
        ctx.say(format!("✅ Created group {}", describe(&created, &concepts)))
            .await?;
        Ok(())
    }

    /// Lists distribution groups with their expenses.
    #[poise::command(slash_command, rename = "list")]
    pub async fn group_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let groups = group::list_groups(&data.database).await?;

        if groups.is_empty() {
            ctx.say("📦 No groups yet. Create one with `/group_manage create`.")
                .await?;
            return Ok(());
        }

        let concepts = concepts(data).await?;
        let mut response = String::from("📦 **Groups**\n");
        for g in &groups {
            writeln!(response, "{}", describe(g, &concepts))?;
        }
        say_long(ctx, &response).await
    }

    /// Changes a group's name, note, payer or fixed amount.
    #[poise::command(slash_command, rename = "update")]
    pub async fn group_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to change"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New participant paying the fixed amount"]
        #[autocomplete = "autocomplete::autocomplete_participant"]
        participant: Option<String>,
        #[description = "New fixed monthly amount"] amount: Option<f64>,
        #[description = "New note"] description: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let target = resolve_group(&data.database, &group).await?;

        let update = GroupUpdate {
            name,
            description,
            participant,
            fixed_amount: amount.map(parse_amount).transpose()?,
        };
        if update.is_empty() {
            ctx.say("ℹ️ Nothing to change.").await?;
            return Ok(());
        }

        let updated = group::update_group(
            &data.database,
            &data.settings.participants,
            target.group.id,
            update,
        )
        .await?;

        let concepts = concepts(data).await?;
        ctx.say(format!("✅ Updated group {}", describe(&updated, &concepts)))
            .await?;
        Ok(())
    }

    /// Adds an expense to a group.
    #[poise::command(slash_command, rename = "add")]
    pub async fn group_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to extend"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group: String,
        #[description = "Expense to add"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
    ) -> Result<()> {
        let data = ctx.data();
        let target = resolve_group(&data.database, &group).await?;
        let member = resolve_expense(&data.database, &expense).await?;

        let updated =
            group::add_expense_to_group(&data.database, target.group.id, member.id).await?;

        let concepts = concepts(data).await?;
        ctx.say(format!("✅ {}", describe(&updated, &concepts)))
            .await?;
        Ok(())
    }

    /// Takes an expense out of a group; it goes back to its own split.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn group_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to shrink"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group: String,
        #[description = "Expense to remove"]
        #[autocomplete = "autocomplete::autocomplete_expense"]
        expense: String,
    ) -> Result<()> {
        let data = ctx.data();
        let target = resolve_group(&data.database, &group).await?;
        let member = resolve_expense(&data.database, &expense).await?;

        if group::remove_expense_from_group(&data.database, target.group.id, member.id).await? {
            ctx.say(format!(
                "✅ **{}** is no longer part of **{}**.",
                member.concept, target.group.name
            ))
            .await?;
        } else {
            ctx.say(format!(
                "ℹ️ **{}** is not part of **{}**.",
                member.concept, target.group.name
            ))
            .await?;
        }
        Ok(())
    }

    /// Deletes a group. Its expenses go back to their own splits.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn group_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to delete"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let target = resolve_group(db, &group).await?;
        let deleted = group::delete_group(db, target.group.id).await?;

        ctx.say(format!("🗑️ Group **{}** deleted.", deleted.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
