//! Mapping raw snapshot cells to task statuses.
//!
//! Snapshot cells are free text in whatever shorthand the roster's authors
//! use that month. The mapping is a total function: every input, including
//! unrecognized ones, lands on a defined status, so a snapshot can never
//! fail on cell content alone.

use crate::model::TaskStatus;

/// Map one raw cell value to a task status.
///
/// | raw value | status |
/// |---|---|
/// | `+` or anything starting with `+` | approved |
/// | `0`, `not_required` | not_required |
/// | contains `kartoteka` (account blocked by authority) | blocked |
/// | contains `ariza` (application pending) or `in_progress` | pending_review |
/// | `rad etildi` | rejected |
/// | `-`, `?`, empty, anything else | new |
pub fn map_status(raw: &str) -> TaskStatus {
    let value = raw.trim().to_lowercase();

    if value.starts_with('+') {
        return TaskStatus::Approved;
    }
    if value == "0" || value == "not_required" {
        return TaskStatus::NotRequired;
    }
    if value.contains("kartoteka") {
        return TaskStatus::Blocked;
    }
    if value.contains("ariza") || value == "in_progress" {
        return TaskStatus::PendingReview;
    }
    if value == "rad etildi" {
        return TaskStatus::Rejected;
    }
    TaskStatus::New
}
