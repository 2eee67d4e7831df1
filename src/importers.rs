//! One-shot imports of account data into games already stored by the host.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::{
    data::{GameRecord, SupportedLibraries},
    error::ValidationError,
};

/// Persisted games of the host application
pub trait GameStore {
    fn is_open(&self) -> bool;
    fn find_mut(&mut self, source: SupportedLibraries, game_id: &str) -> Option<&mut GameRecord>;
}

/// Checks the preconditions of a one-shot import
pub fn validate(account_id: u64, store: &dyn GameStore) -> Result<(), ValidationError> {
    if account_id == 0 {
        return Err(ValidationError::InvalidAccount);
    }

    if !store.is_open() {
        return Err(ValidationError::StoreUnavailable);
    }

    Ok(())
}

/// Sets the last activity of stored games to the given timestamps, only where they are newer.
/// Returns the number of updated games.
pub fn apply_last_activity(
    store: &mut dyn GameStore,
    source: SupportedLibraries,
    activity: &HashMap<String, DateTime<Utc>>,
) -> usize {
    let mut updated = 0;

    for (game_id, last_activity) in activity {
        let Some(game) = store.find_mut(source, game_id) else {
            trace!("{source} - No stored game for {game_id}");
            continue;
        };

        if game
            .last_activity
            .is_some_and(|current| current >= *last_activity)
        {
            continue;
        }

        game.last_activity = Some(*last_activity);
        updated += 1;
    }

    debug!("{source} - Updated the last activity of {updated} games");
    updated
}

/// Merges the categories of `categorized` games into the stored games with the same id. Hidden
/// and favorite flags are only ever set, never cleared. Returns the number of matched games.
pub fn apply_categories(store: &mut dyn GameStore, categorized: &[GameRecord]) -> usize {
    let mut updated = 0;

    for categorized_game in categorized {
        let Some(game) = store.find_mut(categorized_game.source, &categorized_game.game_id) else {
            trace!(
                "{} - No stored game for {}",
                categorized_game.source, categorized_game.game_id
            );
            continue;
        };

        game.categories
            .extend(categorized_game.categories.iter().cloned());

        if categorized_game.hidden {
            game.hidden = true;
        }

        if categorized_game.favorite {
            game.favorite = true;
        }

        updated += 1;
    }

    debug!("Updated the categories of {updated} games");
    updated
}
