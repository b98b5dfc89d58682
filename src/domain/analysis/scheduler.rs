//! Routine Scheduler - Orders products into morning and evening steps.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::finding::link;
use super::{AnalysisPolicy, ConflictFinding, DecomposedProduct, SlotBudgets};
use crate::domain::catalog::{ProductCategory, Separation};
use crate::domain::foundation::{ProductId, Severity, Slot};
use crate::domain::profile::SensitivityTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    AlternateDays,
}

/// One product application inside a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    /// 1-based position in the slot.
    pub order: u32,
    pub product_id: ProductId,
    pub product_name: String,
    pub category: ProductCategory,
    /// Minutes to wait before the next step. Zero for the last step.
    pub wait_minutes_after: u32,
    pub frequency: Frequency,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSchedule {
    pub slot: Slot,
    pub steps: Vec<RoutineStep>,
    /// Minutes from the first step to the start of the last.
    pub total_minutes: u32,
}

impl SlotSchedule {
    pub fn empty(slot: Slot) -> Self {
        Self {
            slot,
            steps: Vec::new(),
            total_minutes: 0,
        }
    }

    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.steps.iter().map(|s| s.product_id)
    }

    pub fn contains(&self, product: ProductId) -> bool {
        self.steps.iter().any(|s| s.product_id == product)
    }
}

/// Two products that share a slot although a finding asks to keep them apart.
/// Requires a manual decision by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedConflict {
    pub slot: Slot,
    pub earlier: ProductId,
    pub later: ProductId,
    pub separation: Separation,
    pub severity: Severity,
    pub reason: String,
}

/// A flexible product dropped from one of its two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub product_id: ProductId,
    pub from: Slot,
    pub to: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub morning: SlotSchedule,
    pub evening: SlotSchedule,
    pub unresolved: Vec<UnresolvedConflict>,
    pub relocations: Vec<Relocation>,
}

impl Schedule {
    pub fn slot(&self, slot: Slot) -> &SlotSchedule {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Evening => &self.evening,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Constraint {
    separation: Separation,
    severity: Severity,
}

enum Layout {
    Placed(Vec<u32>),
    Conflict {
        earlier: usize,
        later: usize,
        constraint: Constraint,
    },
}

pub struct RoutineScheduler<'a> {
    policy: &'a AnalysisPolicy,
}

impl<'a> RoutineScheduler<'a> {
    pub fn new(policy: &'a AnalysisPolicy) -> Self {
        Self { policy }
    }

    /// Builds both slot schedules.
    ///
    /// # Algorithm
    /// 1. Each product enters the slots its time of day names.
    /// 2. Within a slot, products are ordered by category precedence, then by
    ///    ascending product id.
    /// 3. Steps start after the previous one plus the default absorption wait,
    ///    later if a linked finding requires more separation from any earlier
    ///    step. A requirement that pushes past the slot budget, or a
    ///    never-combine link, is a slot conflict.
    /// 4. A slot conflict moves the later product out of the slot when it was
    ///    requested for both slots, else the earlier one. A product leaves at
    ///    most one slot. If neither can move, both stay and the pair is reported
    ///    as unresolved.
    ///
    /// Morning is planned before evening. The result does not depend on input
    /// order.
    pub fn schedule(
        &self,
        products: &[DecomposedProduct],
        findings: &[ConflictFinding],
        budgets: &SlotBudgets,
        tier: SensitivityTier,
    ) -> Schedule {
        let constraints = Self::constraints(findings);
        let alternate = Self::alternate_day_products(products, findings, tier);

        let mut left_a_slot = BTreeSet::new();
        let mut relocations = Vec::new();
        let mut unresolved = Vec::new();

        let mut plan = |slot: Slot| {
            let members: Vec<&DecomposedProduct> = products
                .iter()
                .filter(|p| p.time_of_day.slots().contains(&slot))
                .collect();
            let budget = budgets
                .for_slot(slot)
                .unwrap_or(self.policy.default_slot_budget_minutes);
            self.plan_slot(
                slot,
                members,
                &constraints,
                budget,
                &alternate,
                &mut left_a_slot,
                &mut relocations,
                &mut unresolved,
            )
        };
        let morning = plan(Slot::Morning);
        let evening = plan(Slot::Evening);

        Schedule {
            morning,
            evening,
            unresolved,
            relocations,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_slot(
        &self,
        slot: Slot,
        mut members: Vec<&DecomposedProduct>,
        constraints: &BTreeMap<(ProductId, ProductId), Constraint>,
        budget: u32,
        alternate: &BTreeSet<ProductId>,
        left_a_slot: &mut BTreeSet<ProductId>,
        relocations: &mut Vec<Relocation>,
        unresolved: &mut Vec<UnresolvedConflict>,
    ) -> SlotSchedule {
        members.sort_by_key(|p| (p.product.category.precedence(), p.id()));
        let mut accepted: BTreeSet<(ProductId, ProductId)> = BTreeSet::new();

        let starts = loop {
            match self.layout(&members, constraints, budget, &accepted) {
                Layout::Placed(starts) => break starts,
                Layout::Conflict {
                    earlier,
                    later,
                    constraint,
                } => {
                    let movable = [later, earlier].into_iter().find(|idx| {
                        let candidate = members[*idx];
                        candidate.time_of_day.is_flexible() && !left_a_slot.contains(&candidate.id())
                    });
                    match movable {
                        Some(idx) => {
                            let moved = members.remove(idx);
                            left_a_slot.insert(moved.id());
                            relocations.push(Relocation {
                                product_id: moved.id(),
                                from: slot,
                                to: slot.opposite(),
                            });
                        }
                        None => {
                            let (first, second) = (members[earlier], members[later]);
                            accepted.insert(link(first.id(), second.id()));
                            unresolved.push(UnresolvedConflict {
                                slot,
                                earlier: first.id(),
                                later: second.id(),
                                separation: constraint.separation,
                                severity: constraint.severity,
                                reason: Self::conflict_reason(slot, first, second, constraint, budget),
                            });
                        }
                    }
                }
            }
        };

        let steps: Vec<RoutineStep> = members
            .iter()
            .enumerate()
            .map(|(idx, product)| RoutineStep {
                order: idx as u32 + 1,
                product_id: product.id(),
                product_name: product.product.name.clone(),
                category: product.product.category,
                wait_minutes_after: starts.get(idx + 1).map_or(0, |next| next - starts[idx]),
                frequency: if alternate.contains(&product.id()) {
                    Frequency::AlternateDays
                } else {
                    Frequency::Daily
                },
                instructions: product.product.category.application_hint().to_string(),
            })
            .collect();

        SlotSchedule {
            slot,
            steps,
            total_minutes: starts.last().copied().unwrap_or(0),
        }
    }

    /// Start offsets for `members`, or the first slot conflict.
    fn layout(
        &self,
        members: &[&DecomposedProduct],
        constraints: &BTreeMap<(ProductId, ProductId), Constraint>,
        budget: u32,
        accepted: &BTreeSet<(ProductId, ProductId)>,
    ) -> Layout {
        let mut starts: Vec<u32> = Vec::with_capacity(members.len());
        for later in 0..members.len() {
            let mut start = match starts.last() {
                Some(previous) => previous + self.policy.default_absorption_wait_minutes,
                None => 0,
            };
            let mut blocking: Option<(usize, Constraint, u32)> = None;

            for earlier in 0..later {
                let key = link(members[earlier].id(), members[later].id());
                if accepted.contains(&key) {
                    continue;
                }
                let Some(constraint) = constraints.get(&key).copied() else {
                    continue;
                };
                let Some(minutes) = constraint.separation.minutes() else {
                    return Layout::Conflict {
                        earlier,
                        later,
                        constraint,
                    };
                };
                let required = starts[earlier].saturating_add(minutes);
                start = start.max(required);
                if required > budget && blocking.map_or(true, |(_, _, worst)| required > worst) {
                    blocking = Some((earlier, constraint, required));
                }
            }

            if let Some((earlier, constraint, _)) = blocking {
                return Layout::Conflict {
                    earlier,
                    later,
                    constraint,
                };
            }
            starts.push(start);
        }
        Layout::Placed(starts)
    }

    /// Product pairs that need a gap, with the strictest separation per pair.
    fn constraints(findings: &[ConflictFinding]) -> BTreeMap<(ProductId, ProductId), Constraint> {
        let mut constraints: BTreeMap<(ProductId, ProductId), Constraint> = BTreeMap::new();
        for finding in findings.iter().filter(|f| f.separation.requires_gap()) {
            for key in &finding.product_links {
                constraints
                    .entry(*key)
                    .and_modify(|c| {
                        c.separation = c.separation.max(finding.separation);
                        c.severity = c.severity.max(finding.severity);
                    })
                    .or_insert(Constraint {
                        separation: finding.separation,
                        severity: finding.severity,
                    });
            }
        }
        constraints
    }

    fn alternate_day_products(
        products: &[DecomposedProduct],
        findings: &[ConflictFinding],
        tier: SensitivityTier,
    ) -> BTreeSet<ProductId> {
        let mut alternate: BTreeSet<ProductId> = findings
            .iter()
            .filter(|f| f.severity.is_serious() || (f.separation.is_never() && !f.product_links.is_empty()))
            .flat_map(|f| f.products.iter().copied())
            .collect();
        if tier == SensitivityTier::High {
            alternate.extend(products.iter().filter(|p| p.photosensitive).map(|p| p.id()));
        }
        alternate
    }

    fn conflict_reason(
        slot: Slot,
        earlier: &DecomposedProduct,
        later: &DecomposedProduct,
        constraint: Constraint,
        budget: u32,
    ) -> String {
        match constraint.separation {
            Separation::Never => format!(
                "{} and {} must never be combined but are both requested in the {} routine",
                earlier.product.name, later.product.name, slot
            ),
            separation => format!(
                "{} and {} need {} between them, which exceeds the {} minute {} budget",
                earlier.product.name, later.product.name, separation, budget, slot
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::test_support::*;
    use crate::domain::analysis::{ConflictEngine, FindingKind, FindingSubject};
    use crate::domain::catalog::{CanonicalPair, ConflictType};
    use crate::domain::foundation::{Confidence, TimeOfDay};
    use crate::domain::profile::{SkinType, UserProfile};

    fn run(products: &[DecomposedProduct], budgets: SlotBudgets, tier: SensitivityTier) -> Schedule {
        let graph = graph();
        let policy = AnalysisPolicy::default();
        let profile = UserProfile::new(SkinType::Normal).with_tier(tier);
        let findings = ConflictEngine::new(&graph, &policy).detect(products, &profile).findings;
        RoutineScheduler::new(&policy).schedule(products, &findings, &budgets, tier)
    }

    fn ids(slot: &SlotSchedule) -> Vec<i64> {
        slot.product_ids().map(|p| p.value()).collect()
    }

    fn gap_finding(a: i64, b: i64, hours: u32) -> ConflictFinding {
        ConflictFinding {
            subject: FindingSubject::Pair {
                pair: CanonicalPair::new(ing(RETINOL), ing(VITAMIN_C)).unwrap(),
            },
            kind: FindingKind::Rule {
                conflict_type: ConflictType::Physical,
            },
            title: "test".into(),
            products: [pid(a), pid(b)].into_iter().collect(),
            product_links: [link(pid(a), pid(b))].into_iter().collect(),
            severity: Severity::Low,
            confidence: Confidence::new(0.5),
            separation: Separation::Hours(hours),
            explanation: String::new(),
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_slots() {
        let schedule = run(&[], SlotBudgets::default(), SensitivityTier::Moderate);
        assert!(schedule.morning.steps.is_empty());
        assert!(schedule.evening.steps.is_empty());
        assert!(schedule.unresolved.is_empty());
        assert!(schedule.relocations.is_empty());
    }

    #[test]
    fn steps_follow_category_precedence() {
        let products = [
            product(5, "Sunscreen", ProductCategory::Sunscreen, TimeOfDay::Morning, &[(HYALURONIC_ACID, None)]),
            product(4, "Cream", ProductCategory::Moisturizer, TimeOfDay::Morning, &[]),
            product(3, "Serum", ProductCategory::Serum, TimeOfDay::Morning, &[]),
            product(2, "Toner", ProductCategory::Toner, TimeOfDay::Morning, &[]),
            product(1, "Cleanser", ProductCategory::Cleanser, TimeOfDay::Morning, &[]),
        ];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);

        assert_eq!(ids(&schedule.morning), vec![1, 2, 3, 4, 5]);
        let waits: Vec<u32> = schedule.morning.steps.iter().map(|s| s.wait_minutes_after).collect();
        assert_eq!(waits, vec![1, 1, 1, 1, 0]);
        assert_eq!(schedule.morning.total_minutes, 4);
        assert_eq!(schedule.morning.steps[0].order, 1);
        assert!(schedule.evening.steps.is_empty());
    }

    #[test]
    fn same_category_ties_break_by_product_id() {
        let products = [
            product(9, "Serum B", ProductCategory::Serum, TimeOfDay::Evening, &[]),
            product(8, "Treatment A", ProductCategory::Treatment, TimeOfDay::Evening, &[]),
        ];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        assert_eq!(ids(&schedule.evening), vec![8, 9]);
    }

    #[test]
    fn both_products_appear_in_each_slot() {
        let products = [product(1, "Cleanser", ProductCategory::Cleanser, TimeOfDay::Both, &[])];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        assert_eq!(ids(&schedule.morning), vec![1]);
        assert_eq!(ids(&schedule.evening), vec![1]);
    }

    #[test]
    fn fixed_conflicting_products_are_reported_not_dropped() {
        let products = [retinol_serum(TimeOfDay::Evening), vitamin_c_serum(TimeOfDay::Evening)];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);

        assert_eq!(ids(&schedule.evening), vec![10, 20]);
        assert_eq!(schedule.unresolved.len(), 1);
        let conflict = &schedule.unresolved[0];
        assert_eq!(conflict.slot, Slot::Evening);
        assert_eq!((conflict.earlier, conflict.later), (pid(10), pid(20)));
        assert_eq!(conflict.separation, Separation::Hours(12));
        assert!(schedule.relocations.is_empty());
    }

    #[test]
    fn flexible_later_product_moves_to_the_other_slot() {
        let products = [retinol_serum(TimeOfDay::Evening), vitamin_c_serum(TimeOfDay::Both)];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);

        assert_eq!(ids(&schedule.morning), vec![20]);
        assert_eq!(ids(&schedule.evening), vec![10]);
        assert!(schedule.unresolved.is_empty());
        assert_eq!(
            schedule.relocations,
            vec![Relocation {
                product_id: pid(20),
                from: Slot::Evening,
                to: Slot::Morning
            }]
        );
    }

    #[test]
    fn flexible_earlier_product_moves_when_later_is_fixed() {
        let products = [retinol_serum(TimeOfDay::Both), vitamin_c_serum(TimeOfDay::Evening)];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);

        assert_eq!(ids(&schedule.morning), vec![10]);
        assert_eq!(ids(&schedule.evening), vec![20]);
        assert_eq!(schedule.relocations[0].product_id, pid(10));
    }

    #[test]
    fn two_flexible_products_end_up_in_different_slots() {
        let products = [retinol_serum(TimeOfDay::Both), vitamin_c_serum(TimeOfDay::Both)];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);

        assert_eq!(ids(&schedule.morning), vec![10]);
        assert_eq!(ids(&schedule.evening), vec![20]);
        assert_eq!(schedule.relocations.len(), 2);
        assert!(schedule.unresolved.is_empty());
    }

    #[test]
    fn never_combine_conflicts_regardless_of_budget() {
        let products = [retinol_serum(TimeOfDay::Evening), glycolic_toner(TimeOfDay::Evening)];
        let budgets = SlotBudgets {
            morning_minutes: None,
            evening_minutes: Some(24 * 60),
        };
        let schedule = run(&products, budgets, SensitivityTier::Moderate);

        assert_eq!(schedule.unresolved.len(), 1);
        assert_eq!(schedule.unresolved[0].separation, Separation::Never);
        assert_eq!(ids(&schedule.evening), vec![50, 10]);
    }

    #[test]
    fn separation_within_budget_becomes_a_wait() {
        let policy = AnalysisPolicy::default();
        let products = [
            product(1, "Toner", ProductCategory::Toner, TimeOfDay::Morning, &[]),
            product(2, "Serum", ProductCategory::Serum, TimeOfDay::Morning, &[]),
            product(3, "Cream", ProductCategory::Moisturizer, TimeOfDay::Morning, &[]),
        ];
        let findings = [gap_finding(1, 3, 1)];
        let budgets = SlotBudgets {
            morning_minutes: Some(90),
            evening_minutes: None,
        };
        let schedule =
            RoutineScheduler::new(&policy).schedule(&products, &findings, &budgets, SensitivityTier::Moderate);

        let waits: Vec<u32> = schedule.morning.steps.iter().map(|s| s.wait_minutes_after).collect();
        assert_eq!(waits, vec![1, 59, 0]);
        assert_eq!(schedule.morning.total_minutes, 60);
        assert!(schedule.unresolved.is_empty());
    }

    #[test]
    fn separation_beyond_budget_is_a_slot_conflict() {
        let policy = AnalysisPolicy::default();
        let products = [
            product(1, "Toner", ProductCategory::Toner, TimeOfDay::Morning, &[]),
            product(3, "Cream", ProductCategory::Moisturizer, TimeOfDay::Morning, &[]),
        ];
        let findings = [gap_finding(1, 3, 1)];
        let budgets = SlotBudgets {
            morning_minutes: Some(30),
            evening_minutes: None,
        };
        let schedule =
            RoutineScheduler::new(&policy).schedule(&products, &findings, &budgets, SensitivityTier::Moderate);

        assert_eq!(schedule.unresolved.len(), 1);
        assert_eq!(schedule.morning.steps[0].wait_minutes_after, 1);
        assert!(schedule.unresolved[0].reason.contains("30 minute"));
    }

    #[test]
    fn serious_findings_mark_products_for_alternate_days() {
        let products = [retinol_serum(TimeOfDay::Evening), bha_toner(TimeOfDay::Morning)];
        let schedule = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        assert_eq!(schedule.morning.steps[0].frequency, Frequency::AlternateDays);
        assert_eq!(schedule.evening.steps[0].frequency, Frequency::AlternateDays);
    }

    #[test]
    fn high_tier_limits_photosensitive_products() {
        let products = [retinol_serum(TimeOfDay::Evening), niacinamide_cream(TimeOfDay::Evening)];
        let relaxed = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        let strict = run(&products, SlotBudgets::default(), SensitivityTier::High);

        assert!(relaxed.evening.steps.iter().all(|s| s.frequency == Frequency::Daily));
        let retinol = strict.evening.steps.iter().find(|s| s.product_id == pid(10)).unwrap();
        let cream = strict.evening.steps.iter().find(|s| s.product_id == pid(40)).unwrap();
        assert_eq!(retinol.frequency, Frequency::AlternateDays);
        assert_eq!(cream.frequency, Frequency::Daily);
    }

    #[test]
    fn schedule_is_deterministic_and_order_independent() {
        let products = vec![
            retinol_serum(TimeOfDay::Both),
            vitamin_c_serum(TimeOfDay::Both),
            bha_toner(TimeOfDay::Evening),
            niacinamide_cream(TimeOfDay::Both),
        ];
        let mut reversed = products.clone();
        reversed.reverse();

        let first = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        let second = run(&products, SlotBudgets::default(), SensitivityTier::Moderate);
        let third = run(&reversed, SlotBudgets::default(), SensitivityTier::Moderate);
        assert_eq!(first, second);
        assert_eq!(first, third);
    }
}
