//! Requested time of day and the two application slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// When the user wants to apply a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
    Both,
}

impl TimeOfDay {
    /// Slots a product with this request initially occupies.
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            TimeOfDay::Morning => &[Slot::Morning],
            TimeOfDay::Evening => &[Slot::Evening],
            TimeOfDay::Both => &[Slot::Morning, Slot::Evening],
        }
    }

    /// True when the scheduler may drop the product from one of its slots.
    pub fn is_flexible(&self) -> bool {
        matches!(self, TimeOfDay::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Both => "both",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "am" => Ok(TimeOfDay::Morning),
            "evening" | "pm" => Ok(TimeOfDay::Evening),
            "both" => Ok(TimeOfDay::Both),
            other => Err(ValidationError::invalid_format(
                "time_of_day",
                format!("unknown time of day '{}'", other),
            )),
        }
    }
}

/// An application session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Evening,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Morning, Slot::Evening];

    pub fn opposite(&self) -> Slot {
        match self {
            Slot::Morning => Slot::Evening,
            Slot::Evening => Slot::Morning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Evening => "evening",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
