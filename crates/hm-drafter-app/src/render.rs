// Plain-text rendering of draft views for the console.

use std::fmt::Write;

use hm_drafter_api::Tournament;
use hm_drafter_core::draft::{CaptainSelection, Direction, DraftSnapshot};
use hm_drafter_core::model::{Captain, DraftPick};

pub fn tournaments(list: &[Tournament]) -> String {
    if list.is_empty() {
        return "No tournaments found.".to_string();
    }
    let mut out = String::from("    ID  Date        Name");
    for t in list {
        let _ = write!(out, "\n{t}");
    }
    out
}

pub fn captain_selection(selection: &CaptainSelection) -> String {
    let mut out = if selection.captains.is_empty() {
        "No captains selected.".to_string()
    } else {
        format!(
            "Captains: {}",
            selection
                .captains
                .iter()
                .map(|c| format!("{} ({})", c.display_name(), c.id))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    if !selection.unmatched.is_empty() {
        let _ = write!(out, "\nNo player matched: {}", selection.unmatched.join(", "));
    }
    out
}

pub fn draft_order(order: &[Captain]) -> String {
    let mut out = String::from("Draft order:");
    for captain in order {
        let _ = write!(
            out,
            "\n  {}. {} ({})",
            captain.order.unwrap_or_default(),
            captain.display_name(),
            captain.id
        );
    }
    out
}

pub fn up_next(captain: &Captain) -> String {
    format!("Up next: {}", captain.display_name())
}

pub fn pick(pick: &DraftPick, remaining: usize) -> String {
    let mut out = format!("Pick #{}: {}", pick.pick_number, pick.player_name);
    if remaining == 0 {
        out.push_str("\nThe pool is empty. Draft complete.");
    } else {
        let _ = write!(out, "\n{remaining} players left.");
    }
    out
}

pub fn teams(snapshot: &DraftSnapshot) -> String {
    if snapshot.teams.is_empty() {
        return "No teams yet.".to_string();
    }
    let mut out = String::new();
    for team in &snapshot.teams {
        if !out.is_empty() {
            out.push('\n');
        }
        let captain = team
            .captain
            .as_ref()
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| "no captain".to_string());
        let _ = write!(out, "[{}] {} ({})", team.id, team.name, captain);
        for player in &team.players {
            let _ = write!(out, "\n    {player}");
        }
    }
    out
}

pub fn status(snapshot: &DraftSnapshot) -> String {
    let mut out = format!("Tournament {}", snapshot.tournament);

    if snapshot.draft_order.is_empty() {
        out.push_str("\nNo draft order yet.");
    } else {
        let _ = write!(out, "\n{}", draft_order(&snapshot.draft_order));
    }

    if let Some(captain) = &snapshot.current_captain {
        let arrow = match snapshot.direction {
            Some(Direction::Backward) => "<-",
            _ => "->",
        };
        let _ = write!(out, "\nOn the clock: {} {}", captain.display_name(), arrow);
    }

    if !snapshot.unassigned_captains.is_empty() {
        let _ = write!(
            out,
            "\nCaptains without a team: {}",
            snapshot
                .unassigned_captains
                .iter()
                .map(|c| format!("{} ({})", c.display_name(), c.id))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let _ = write!(out, "\nPicks made: {}", snapshot.picks.len());
    if snapshot.is_complete {
        out.push_str("\nDraft complete.");
    } else {
        let _ = write!(
            out,
            "\nAvailable ({}): {}",
            snapshot.pool.len(),
            snapshot.pool.join(", ")
        );
    }
    out
}
