// Tournament listing entries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hm_drafter_core::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Id,
    pub name: String,
    /// Event date, when the API gave one in `YYYY-MM-DD` form.
    pub date: Option<NaiveDate>,
    pub scene_name: String,
}

impl Tournament {
    pub fn new(id: Id, name: String, date: &str, scene_name: String) -> Self {
        Tournament {
            id,
            name,
            date: parse_date(date),
            scene_name,
        }
    }
}

/// Accepts a bare date or the date part of a timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl fmt::Display for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{:>6}  {}  {}", self.id.get(), date.format("%Y-%m-%d"), self.name),
            None => write!(f, "{:>6}  ----------  {}", self.id.get(), self.name),
        }
    }
}
