//! Core data model for taskbook.
//!
//! These types cover the two sides of the firm's bookkeeping:
//! client companies with their recurring filing obligations (task ledgers),
//! and the staff/KPI records that compensation is derived from.

mod company;
mod kpi;
mod period;
mod task;

pub use company::{Company, Role, RoleShare, Staff};
pub use kpi::KpiSet;
pub use period::Period;
pub use task::{
    Frequency, OperationTask, TaskLedger, TaskStatus, TaskTemplate, template, template_catalog,
};
