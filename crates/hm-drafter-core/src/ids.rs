// Identifier shared by players, captains, teams and tournaments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DraftError;

/// Stable numeric identifier assigned by the tournament API.
///
/// Players, captains (which reuse their player's id), teams and tournaments
/// all use this one type so that ids can be compared and parsed the same way
/// everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub u64);

impl Id {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id(value)
    }
}

impl FromStr for Id {
    type Err = DraftError;

    /// Parse an id typed by an operator or carried in a form value.
    ///
    /// Surrounding whitespace is ignored. Integral float renderings such as
    /// `"42.0"` are accepted because the API has served ids that way.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u64>() {
            return Ok(Id(n));
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(Id(f as u64))
            }
            _ => Err(DraftError::MalformedId {
                input: s.to_string(),
            }),
        }
    }
}
