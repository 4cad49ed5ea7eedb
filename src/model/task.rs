//! Operation tasks: the recurring filing obligations tracked per company.
//!
//! The template catalog is static configuration — one entry per recurring
//! report, carrying the snapshot column it is fed from. Tasks live in a
//! ledger, one ledger per (company, period), which is the unit of read and
//! write against storage.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Period, Role};

/// Status of one filing task.
///
/// Deliberately a weak state space: any status may follow any other, set by
/// reconciliation or by hand, and the later write always wins. The external
/// system is the source of truth, so no transition graph is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    PendingReview,
    Submitted,
    Approved,
    Rejected,
    Blocked,
    NotRequired,
    Overdue,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 8] = [
        TaskStatus::New,
        TaskStatus::PendingReview,
        TaskStatus::Submitted,
        TaskStatus::Approved,
        TaskStatus::Rejected,
        TaskStatus::Blocked,
        TaskStatus::NotRequired,
        TaskStatus::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::PendingReview => "pending_review",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Approved => "approved",
            TaskStatus::Rejected => "rejected",
            TaskStatus::Blocked => "blocked",
            TaskStatus::NotRequired => "not_required",
            TaskStatus::Overdue => "overdue",
        }
    }

    /// Parse a stored or user-entered status name.
    pub fn parse(s: &str) -> Option<TaskStatus> {
        TaskStatus::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// How often a template recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

/// A catalog entry for one recurring filing obligation.
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub role: Role,
    pub due_day: u8,
    pub frequency: Frequency,
    /// The external snapshot column header this template is fed from.
    pub column: &'static str,
}

/// The fixed template catalog. Templates are configuration, never created
/// at runtime; the column strings double as the static field-to-template
/// map for reconciliation.
pub fn template_catalog() -> &'static [TaskTemplate] {
    CATALOG
}

/// Look up a catalog template by key.
pub fn template(key: &str) -> Option<&'static TaskTemplate> {
    CATALOG.iter().find(|t| t.key == key)
}

const CATALOG: &[TaskTemplate] = {
    use Frequency::{Monthly, Quarterly, Yearly};
    use Role::{Accountant, BankClient, ChiefAccountant};

    &[
        TaskTemplate {
            key: "one_c",
            name: "1C kiritish",
            role: Accountant,
            due_day: 5,
            frequency: Monthly,
            column: "1C",
        },
        TaskTemplate {
            key: "bank",
            name: "Bank vypiska",
            role: BankClient,
            due_day: 7,
            frequency: Monthly,
            column: "Bank",
        },
        TaskTemplate {
            key: "stat",
            name: "Statistika hisoboti",
            role: Accountant,
            due_day: 10,
            frequency: Monthly,
            column: "Statistika",
        },
        TaskTemplate {
            key: "inps",
            name: "INPS hisoboti",
            role: Accountant,
            due_day: 15,
            frequency: Monthly,
            column: "INPS",
        },
        TaskTemplate {
            key: "qqs",
            name: "QQS hisoboti",
            role: Accountant,
            due_day: 20,
            frequency: Monthly,
            column: "QQS",
        },
        TaskTemplate {
            key: "foyda",
            name: "Foyda solig'i hisoboti",
            role: ChiefAccountant,
            due_day: 20,
            frequency: Quarterly,
            column: "Foyda",
        },
        TaskTemplate {
            key: "didox",
            name: "Didox hujjatlari",
            role: Accountant,
            due_day: 25,
            frequency: Monthly,
            column: "Didox",
        },
        TaskTemplate {
            key: "yillik",
            name: "Yillik hisobot",
            role: ChiefAccountant,
            due_day: 15,
            frequency: Yearly,
            column: "Yillik hisobot",
        },
    ]
};

/// One filing task for one (company, period, template) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationTask {
    pub template_key: String,
    pub status: TaskStatus,

    /// The last raw cell value seen from a snapshot, kept for audit.
    pub raw_value: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The full set of tasks for one (company, period) pair.
///
/// A ledger is merged in memory and persisted as a whole; tasks are never
/// deleted from it, only re-statused. At most one task per template key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLedger {
    pub company_id: Uuid,
    pub period: Period,
    pub tasks: Vec<OperationTask>,
}

impl TaskLedger {
    pub fn empty(company_id: Uuid, period: Period) -> Self {
        Self {
            company_id,
            period,
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, template_key: &str) -> Option<&OperationTask> {
        self.tasks.iter().find(|t| t.template_key == template_key)
    }

    /// Set the task for `template_key` to `status` with the given raw value,
    /// creating it if absent. Returns `true` when anything changed.
    ///
    /// Total last-writer-wins assignment: no transition checks, any status
    /// may replace any other.
    pub fn apply(
        &mut self,
        template_key: &str,
        status: TaskStatus,
        raw_value: Option<&str>,
        now: Timestamp,
    ) -> bool {
        match self.tasks.iter_mut().find(|t| t.template_key == template_key) {
            Some(task) => {
                if task.status == status && task.raw_value.as_deref() == raw_value {
                    return false;
                }
                task.status = status;
                task.raw_value = raw_value.map(String::from);
                task.updated_at = now;
                true
            }
            None => {
                self.tasks.push(OperationTask {
                    template_key: template_key.to_string(),
                    status,
                    raw_value: raw_value.map(String::from),
                    created_at: now,
                    updated_at: now,
                });
                true
            }
        }
    }
}
