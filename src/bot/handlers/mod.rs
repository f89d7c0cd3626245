//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete
//! and other non-command interactions.

/// Autocomplete handlers for expense concepts, participants and frequencies
pub mod autocomplete;
