// Captain extraction from operator selections.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::ids::Id;
use crate::model::{Captain, Player};

/// Result of matching operator selections against the player directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptainSelection {
    /// One captain per matched player, in directory order.
    pub captains: Vec<Captain>,
    /// Selections that matched nobody, as typed (trimmed).
    pub unmatched: Vec<String>,
}

/// Match each selection (a player name or a player id) against the directory.
///
/// A selection that parses as an id matching a directory entry selects that
/// player; otherwise it is compared with player names exactly. Selecting the
/// same player twice, by name or by id, yields a single captain. Selections
/// that match nobody are reported in `unmatched` and otherwise ignored.
pub fn select_captains<S: AsRef<str>>(
    directory: &[Player],
    selections: &[S],
    alt_name_slug: &str,
) -> CaptainSelection {
    let mut chosen: HashSet<Id> = HashSet::new();
    let mut unmatched = Vec::new();

    for raw in selections {
        let selection = raw.as_ref().trim();
        if selection.is_empty() {
            continue;
        }

        let by_id = selection
            .parse::<Id>()
            .ok()
            .and_then(|id| directory.iter().find(|p| p.id == id));
        let by_name = || directory.iter().find(|p| p.name == selection);

        match by_id.or_else(by_name) {
            Some(player) => {
                chosen.insert(player.id);
            }
            None => {
                warn!("Captain selection '{}' matched no registered player", selection);
                unmatched.push(selection.to_string());
            }
        }
    }

    let captains: Vec<Captain> = directory
        .iter()
        .filter(|p| chosen.remove(&p.id))
        .map(|p| Captain::from_player(p, alt_name_slug))
        .collect();

    debug!(
        "Selected {} captains ({} unmatched selections)",
        captains.len(),
        unmatched.len()
    );

    CaptainSelection { captains, unmatched }
}
