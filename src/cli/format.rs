//! Output formatting for CLI display.

use crate::model::{Company, Staff};
use crate::payout::{PayRule, PayoutEntry};
use crate::reconcile::TaskChange;

/// Format an amount with thousands separators: `1234567.5` → `1 234 567.50`.
pub(super) fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

/// One line per changed task, stable order as reported.
pub(super) fn format_task_changes(changes: &[TaskChange]) -> Vec<String> {
    changes
        .iter()
        .map(|c| {
            format!(
                "{}  {}  {}",
                &c.company_id.to_string()[..8],
                c.template_key,
                c.status.as_str()
            )
        })
        .collect()
}

/// One line per payout entry: staff, company, role, base (with the rule
/// that produced it), KPI delta, and total.
pub(super) fn format_payout_lines(
    entries: &[PayoutEntry],
    companies: &[Company],
    roster: &[Staff],
) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            let staff = roster
                .iter()
                .find(|s| s.id == e.staff_id)
                .map_or_else(|| e.staff_id.to_string()[..8].to_string(), |s| s.name.clone());
            let company = companies
                .iter()
                .find(|c| c.id == e.company_id)
                .map_or_else(|| e.company_id.to_string()[..8].to_string(), |c| c.name.clone());
            let rule = match e.rule_applied {
                PayRule::FixedSum(_) => "fixed".to_string(),
                PayRule::Percent(p) => format!("{p}%"),
            };
            format!(
                "{staff}  {company}  [{}] base {} ({rule})  kpi {:+.1}pp {}  total {}",
                e.role.as_str(),
                format_amount(e.base),
                e.kpi_delta_percent,
                format_amount(e.kpi_bonus),
                format_amount(e.total)
            )
        })
        .collect()
}
