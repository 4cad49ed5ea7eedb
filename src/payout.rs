//! The compensation engine: deriving staff pay from contracts and KPIs.
//!
//! Pay is recomputed from scratch on every invocation — nothing here writes
//! or keeps history. For each role a company has staffed:
//!
//! - the base comes from the company's share override for the role (a fixed
//!   sum, or a percent of contract), falling back to the role's default
//!   percent;
//! - the KPI delta sums the role's rule-table entries: reward when the
//!   indicator is satisfied, penalty otherwise, in percentage points of the
//!   contract amount.
//!
//! Missing inputs (no contract, no KPI set, unassigned role) degrade to
//! zero or no entry; incomplete data is normal for a reporting derivation.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::model::{Company, KpiSet, Role};

/// Which pay rule produced a base amount, kept so the cascade is auditable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayRule {
    /// The company carries a fixed sum for the role.
    FixedSum(f64),

    /// Percent of contract: the company's override, or the role default.
    Percent(f64),
}

/// One KPI rule: the indicator checked and its reward/penalty deltas,
/// in percentage points of the contract amount.
#[derive(Debug, Clone, Copy)]
pub struct KpiRule {
    pub indicator: &'static str,
    pub reward: f64,
    pub penalty: f64,
}

/// Rule table: for each role, which indicators move its pay and by how much.
pub type RuleTable = fn(Role) -> &'static [KpiRule];

/// The firm's default rule table.
pub fn default_rules(role: Role) -> &'static [KpiRule] {
    match role {
        Role::Accountant => &[
            KpiRule {
                indicator: "attendance",
                reward: 1.0,
                penalty: 0.0,
            },
            KpiRule {
                indicator: "one_c_entry",
                reward: 0.5,
                penalty: 0.0,
            },
            KpiRule {
                indicator: "didox_usage",
                reward: 0.5,
                penalty: 0.0,
            },
            KpiRule {
                indicator: "punctuality",
                reward: 0.0,
                penalty: -1.0,
            },
        ],
        Role::BankClient => &[KpiRule {
            indicator: "attendance",
            reward: 0.5,
            penalty: -0.5,
        }],
        Role::Supervisor => &[KpiRule {
            indicator: "attendance",
            reward: 0.5,
            penalty: 0.0,
        }],
        Role::ChiefAccountant => &[KpiRule {
            indicator: "reporting_discipline",
            reward: 1.0,
            penalty: -1.0,
        }],
    }
}

/// One derived pay line: what one staff member earns on one company role.
#[derive(Debug, Clone)]
pub struct PayoutEntry {
    pub staff_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
    pub base: f64,
    pub rule_applied: PayRule,
    pub kpi_delta_percent: f64,
    pub kpi_bonus: f64,
    pub total: f64,
}

/// The base pay for one role on one company, and the rule that produced it.
///
/// Kept as its own function so each step of the cascade is testable alone:
/// fixed sum → percent override → role default percent, missing contract
/// amounts degrade to zero.
pub fn role_base(company: &Company, role: Role) -> (f64, PayRule) {
    let share = company.shares.get(&role);

    if let Some(sum) = share.and_then(|s| s.fixed_sum) {
        return (sum, PayRule::FixedSum(sum));
    }

    let percent = share
        .and_then(|s| s.percent)
        .unwrap_or_else(|| role.default_percent());
    (
        company.contract_amount * percent / 100.0,
        PayRule::Percent(percent),
    )
}

/// The KPI delta for one role, in percentage points.
///
/// Each rule contributes its reward when the indicator is satisfied and its
/// penalty otherwise. No KPI set recorded means nothing is satisfied.
pub fn kpi_delta_percent(role: Role, kpi: Option<&KpiSet>, rules: RuleTable) -> f64 {
    rules(role)
        .iter()
        .map(|rule| {
            if kpi.is_some_and(|set| set.satisfied(rule.indicator)) {
                rule.reward
            } else {
                rule.penalty
            }
        })
        .sum()
}

/// Compute the pay entries for one company and one period's KPI set.
///
/// One entry per staffed role; roles without an assignment produce none.
pub fn compute_company(
    company: &Company,
    kpi: Option<&KpiSet>,
    rules: RuleTable,
) -> Vec<PayoutEntry> {
    Role::ALL
        .into_iter()
        .filter_map(|role| {
            let staff_id = *company.assignments.get(&role)?;
            let (base, rule_applied) = role_base(company, role);
            let delta = kpi_delta_percent(role, kpi, rules);
            let bonus = company.contract_amount * delta / 100.0;
            Some(PayoutEntry {
                staff_id,
                company_id: company.id,
                role,
                base,
                rule_applied,
                kpi_delta_percent: delta,
                kpi_bonus: bonus,
                total: base + bonus,
            })
        })
        .collect()
}

/// Grand totals per staff member across a set of entries.
///
/// A staff member holding several roles, or roles on several companies,
/// accumulates each entry independently.
pub fn totals_by_staff(entries: &[PayoutEntry]) -> BTreeMap<Uuid, f64> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.staff_id).or_insert(0.0) += entry.total;
    }
    totals
}
