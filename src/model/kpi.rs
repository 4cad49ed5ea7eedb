//! KPI metric sets: per-company, per-period performance checklists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

/// The checklist indicators recorded for one (company, period).
///
/// Which role an indicator affects is decided by the payout rule table, not
/// stored here; the set itself is a flat name → satisfied map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSet {
    pub company_id: Uuid,
    pub period: Period,
    pub indicators: BTreeMap<String, bool>,
}

impl KpiSet {
    /// Whether the named indicator is satisfied. Missing means unsatisfied.
    pub fn satisfied(&self, indicator: &str) -> bool {
        self.indicators.get(indicator).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_indicator_is_unsatisfied() {
        let set = KpiSet {
            company_id: Uuid::new_v4(),
            period: Period::new("2026-01"),
            indicators: [("attendance".to_string(), true)].into(),
        };
        assert!(set.satisfied("attendance"));
        assert!(!set.satisfied("punctuality"));
    }
}
