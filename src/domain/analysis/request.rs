//! Routine request and its cache fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::{ProductId, Slot, TimeOfDay, ValidationError};
use crate::domain::profile::UserProfile;

/// Largest slot budget accepted, one full day.
const MAX_SLOT_BUDGET_MINUTES: u32 = 24 * 60;

/// A product the user wants in their routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestedProduct {
    pub product_id: ProductId,
    pub time_of_day: TimeOfDay,
}

impl RequestedProduct {
    pub fn new(product_id: ProductId, time_of_day: TimeOfDay) -> Self {
        Self { product_id, time_of_day }
    }
}

/// Optional per-slot time budgets in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotBudgets {
    #[serde(default)]
    pub morning_minutes: Option<u32>,
    #[serde(default)]
    pub evening_minutes: Option<u32>,
}

impl SlotBudgets {
    pub fn for_slot(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::Morning => self.morning_minutes,
            Slot::Evening => self.evening_minutes,
        }
    }
}

/// Input of one routine analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutineRequest {
    #[serde(default)]
    pub products: Vec<RequestedProduct>,
    pub profile: UserProfile,
    #[serde(default)]
    pub time_budget: SlotBudgets,
}

impl RoutineRequest {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            products: Vec::new(),
            profile,
            time_budget: SlotBudgets::default(),
        }
    }

    pub fn with_product(mut self, product_id: ProductId, time_of_day: TimeOfDay) -> Self {
        self.products.push(RequestedProduct::new(product_id, time_of_day));
        self
    }

    pub fn with_budget(mut self, slot: Slot, minutes: u32) -> Self {
        match slot {
            Slot::Morning => self.time_budget.morning_minutes = Some(minutes),
            Slot::Evening => self.time_budget.evening_minutes = Some(minutes),
        }
        self
    }

    /// Rejects duplicate products and out-of-range budgets.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = BTreeSet::new();
        for requested in &self.products {
            if !seen.insert(requested.product_id) {
                return Err(ValidationError::duplicate("products", requested.product_id));
            }
        }
        for slot in Slot::ALL {
            if let Some(minutes) = self.time_budget.for_slot(slot) {
                if minutes > MAX_SLOT_BUDGET_MINUTES {
                    return Err(ValidationError::out_of_range(
                        format!("time_budget.{}", slot),
                        0,
                        MAX_SLOT_BUDGET_MINUTES,
                        minutes,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Stable key over the normalized request. Product order does not matter.
    pub fn fingerprint(&self) -> Result<Fingerprint, ValidationError> {
        let mut products = self.products.clone();
        products.sort();
        let normalized = NormalizedRequest {
            products: &products,
            profile: &self.profile,
            time_budget: &self.time_budget,
        };
        let bytes = serde_json::to_vec(&normalized)
            .map_err(|e| ValidationError::invalid_format("request", e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(Fingerprint(format!("{:x}", hasher.finalize())))
    }
}

#[derive(Serialize)]
struct NormalizedRequest<'a> {
    products: &'a [RequestedProduct],
    profile: &'a UserProfile,
    time_budget: &'a SlotBudgets,
}

/// Hex SHA-256 of a normalized request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
