//! Participant configuration.
//!
//! The people sharing the household expenses are configuration, not data: an
//! ordered list loaded from `config.toml`. Each participant has a weight (equal
//! by default) and may be linked to a Discord user so commands can infer who is
//! paying. The first participant is the designated one that absorbs rounding
//! remainders when amounts are split.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person taking part in the expense split.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Participant {
    /// Display name, also stored as the payer of payments
    pub name: String,
    /// Relative share of weighted splits
    #[serde(default = "default_weight")]
    pub weight: Decimal,
    /// Discord user ID of this participant, if linked
    #[serde(default)]
    pub discord_id: Option<String>,
}

impl Participant {
    /// Participant with weight 1 and no Discord link.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: default_weight(),
            discord_id: None,
        }
    }
}

const fn default_weight() -> Decimal {
    Decimal::ONE
}

/// Validated, ordered, non-empty list of participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants {
    members: Vec<Participant>,
}

impl Participants {
    /// Validates and wraps the participant list.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the list is empty, a name is blank or repeated
    /// (case-insensitive), or a weight is not strictly positive.
    pub fn new(members: Vec<Participant>) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::Config {
                message: "At least one participant must be configured".to_string(),
            });
        }

        let mut seen: Vec<String> = Vec::with_capacity(members.len());
        let mut cleaned = Vec::with_capacity(members.len());
        for mut member in members {
            let name = member.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Config {
                    message: "Participant names cannot be empty".to_string(),
                });
            }
            let key = name.to_lowercase();
            if seen.contains(&key) {
                return Err(Error::Config {
                    message: format!("Participant '{name}' is configured twice"),
                });
            }
            if member.weight <= Decimal::ZERO {
                return Err(Error::Config {
                    message: format!("Participant '{name}' must have a positive weight"),
                });
            }
            seen.push(key);
            member.name = name;
            cleaned.push(member);
        }

        Ok(Self { members: cleaned })
    }

    /// Participants with equal weights, in the given order.
    ///
    /// # Errors
    /// Same conditions as [`Participants::new`].
    pub fn equal<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Participant::named).collect())
    }

    /// Participant receiving rounding remainders (the first configured one).
    #[must_use]
    pub fn designated(&self) -> &Participant {
        &self.members[0]
    }

    /// Participants in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.members.iter()
    }

    /// Participants as a slice, in configuration order.
    #[must_use]
    pub fn as_slice(&self) -> &[Participant] {
        &self.members
    }

    /// Participant names in configuration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|p| p.name.as_str()).collect()
    }

    /// Looks a participant up by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Participant> {
        let wanted = name.trim().to_lowercase();
        self.members
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
    }

    /// Participant linked to the given Discord user ID.
    #[must_use]
    pub fn for_discord_user(&self, discord_id: &str) -> Option<&Participant> {
        self.members
            .iter()
            .find(|p| p.discord_id.as_deref() == Some(discord_id))
    }
}

impl Default for Participants {
    fn default() -> Self {
        Self {
            members: vec![Participant::named("Person A"), Participant::named("Person B")],
        }
    }
}
