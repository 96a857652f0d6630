// Tolerant decoding of tournament API payloads.
//
// The API returns players as loosely typed objects: ids may come back as
// floats, optional strings as null, and registration answers under opaque
// per-tournament keys. Everything here works on `serde_json::Value` so that a
// single odd field never sinks a whole page.

use std::collections::HashMap;

use serde_json::Value;

use hm_drafter_core::model::{FormField, Player, Team};
use hm_drafter_core::{Id, StoreError};

use crate::tournament::Tournament;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// One page of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub results: Vec<Value>,
    /// Link to the following page, if the API reported one.
    pub next: Option<String>,
}

impl Page {
    /// Whether another page should be requested after this one.
    pub fn has_more(&self) -> bool {
        !self.results.is_empty() && self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Split a listing body into its results and next link. A body without a
/// `results` array counts as an empty page.
pub fn parse_page(mut body: Value) -> Page {
    let results = match body.get_mut("results").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let next = body
        .get("next")
        .and_then(Value::as_str)
        .map(str::to_string);
    Page { results, next }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Read an id from a number (integer or whole float) or a numeric string.
pub fn parse_id(value: &Value) -> Option<Id> {
    match value {
        Value::Number(n) => n.as_u64().map(Id).or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| Id(f as u64))
        }),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Render a scalar field as text. Missing and null fields become "".
fn scalar_string(data: &Value, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render a registration answer: strings as-is, arrays joined with ", ",
/// anything else in its JSON form.
fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Decode one player object, keying registration answers by the slugs in
/// `catalog`.
pub fn parse_player(data: &Value, catalog: &[FormField]) -> Result<Player, StoreError> {
    let id = data
        .get("id")
        .and_then(parse_id)
        .ok_or_else(|| StoreError::Decode(format!("player without a usable id: {data}")))?;

    let mut form_fields = HashMap::new();
    for field in catalog {
        if let Some(value) = data.get(&field.field_name) {
            form_fields.insert(field.field_slug.clone(), form_value(value));
        }
    }

    Ok(Player {
        id,
        name: scalar_string(data, "name"),
        scene: scalar_string(data, "scene"),
        pronouns: scalar_string(data, "pronouns"),
        image: scalar_string(data, "image"),
        form_fields,
        team: data.get("team").and_then(parse_id),
    })
}

pub fn parse_team(data: &Value) -> Result<Team, StoreError> {
    let id = data
        .get("id")
        .and_then(parse_id)
        .ok_or_else(|| StoreError::Decode(format!("team without a usable id: {data}")))?;
    Ok(Team::new(id, scalar_string(data, "name")))
}

pub fn parse_form_field(data: &Value) -> Result<FormField, StoreError> {
    let field_name = scalar_string(data, "field_name");
    let field_slug = scalar_string(data, "field_slug");
    if field_name.is_empty() || field_slug.is_empty() {
        return Err(StoreError::Decode(format!(
            "form field without name or slug: {data}"
        )));
    }
    Ok(FormField {
        field_name,
        field_slug,
        field_description: scalar_string(data, "field_description"),
    })
}

pub fn parse_tournament(data: &Value) -> Result<Tournament, StoreError> {
    let id = data
        .get("id")
        .and_then(parse_id)
        .ok_or_else(|| StoreError::Decode(format!("tournament without a usable id: {data}")))?;
    Ok(Tournament::new(
        id,
        scalar_string(data, "name"),
        &scalar_string(data, "date"),
        scalar_string(data, "scene_name"),
    ))
}

/// Give each team the players whose binding points at it.
pub fn attach_rosters(teams: &mut [Team], players: &[Player]) {
    for team in teams.iter_mut() {
        team.players = players
            .iter()
            .filter(|p| p.team == Some(team.id))
            .cloned()
            .collect();
    }
}
