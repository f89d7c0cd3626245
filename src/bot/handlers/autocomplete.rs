//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions for expense concepts, group names, participant names and
//! frequencies, so users pick valid values as they type.

use crate::{
    bot::BotData,
    config::participants::Participants,
    core::{expense, frequency::Frequency, group},
    errors::Error,
};

/// Discord's limit on autocomplete choices.
const MAX_CHOICES: usize = 25;

fn matching<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.trim().to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}

/// Suggests active expense concepts containing the typed text.
pub async fn autocomplete_expense(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(expenses) = expense::list_expenses(db, false).await else {
        return Vec::new();
    };

    let mut concepts = matching(expenses.into_iter().map(|e| e.concept), partial);
    concepts.sort();
    concepts
}

/// Suggests distribution group names containing the typed text.
pub async fn autocomplete_group(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(groups) = group::list_groups(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(groups.into_iter().map(|g| g.group.name), partial)
}

fn participant_names(participants: &Participants, partial: &str) -> Vec<String> {
    matching(participants.iter().map(|p| p.name.clone()), partial)
}

/// Suggests configured participants, in configuration order.
pub async fn autocomplete_participant(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    participant_names(&ctx.data().settings.participants, partial)
}

/// Suggests billing frequencies.
pub async fn autocomplete_frequency(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Frequency::ALL.iter().map(ToString::to_string), partial)
}
