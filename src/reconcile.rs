//! The reconciliation engine: merging roster snapshots into task ledgers.
//!
//! A snapshot is the external system's word on where every company's filings
//! stand for one period. The engine folds it into storage without touching
//! anything the snapshot doesn't mention:
//!
//! 1. Each record is resolved to a company (tax-id, then normalized name);
//!    unresolved records are skipped and counted, never fatal.
//! 2. The company's ledger for the period is loaded once and cached for the
//!    whole batch, so repeated records fold into one ledger — one writer per
//!    (company, period) partition.
//! 3. Every catalog template whose column appears in the record gets its
//!    target status from the field mapper; templates not fed by the snapshot
//!    are left untouched. The engine never deletes and never infers absence.
//! 4. Only ledgers that actually changed are written back, each as a single
//!    whole-ledger replace.
//!
//! Re-running an unchanged snapshot writes nothing. A store failure aborts
//! the call; ledgers committed by earlier calls stay put, and the batch is
//! safe to retry in full.

use jiff::Timestamp;
use log::{info, warn};
use uuid::Uuid;

use crate::mapper::map_status;
use crate::matcher::match_company;
use crate::model::{Period, TaskLedger, TaskStatus, template_catalog};
use crate::snapshot::SnapshotRecord;
use crate::storage::{Result, Storage};

/// One task whose status changed during a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    pub company_id: Uuid,
    pub template_key: String,
    pub status: TaskStatus,
}

/// What a reconciliation run did.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Records in the snapshot.
    pub records: usize,

    /// Records skipped because no company matched. A data-quality signal
    /// for the caller, not an error.
    pub skipped: usize,

    /// Ledgers written back (only dirty ones are).
    pub ledgers_written: usize,

    /// The exact write-set: every task created or re-statused.
    pub changes: Vec<TaskChange>,
}

/// Run one snapshot for one period against storage.
pub fn run(
    storage: &mut Storage,
    period: &Period,
    snapshot: &[SnapshotRecord],
) -> Result<ReconcileReport> {
    let companies = storage.list_companies()?;
    let now = Timestamp::now();

    let mut report = ReconcileReport {
        records: snapshot.len(),
        ..ReconcileReport::default()
    };
    // Ledger cache keyed by company: the unit of write for the whole batch.
    let mut ledgers: Vec<(Uuid, TaskLedger, bool)> = Vec::new();

    for record in snapshot {
        let Some(company) = match_company(&companies, record.tax_id(), record.name()) else {
            report.skipped += 1;
            warn!(
                "skipping unmatched snapshot record: tax_id={:?} name={:?}",
                record.tax_id(),
                record.name()
            );
            continue;
        };

        let slot = match ledgers.iter().position(|(id, _, _)| *id == company.id) {
            Some(i) => i,
            None => {
                let ledger = storage.load_ledger(company.id, period)?;
                ledgers.push((company.id, ledger, false));
                ledgers.len() - 1
            }
        };
        let (_, ledger, dirty) = &mut ledgers[slot];

        for template in template_catalog() {
            let Some(raw) = record.value(template.column) else {
                continue;
            };
            // A template disabled for the company is pinned to not_required
            // no matter what the cell says.
            let status = if company.template_enabled(template.key) {
                map_status(raw)
            } else {
                TaskStatus::NotRequired
            };
            if ledger.apply(template.key, status, Some(raw), now) {
                *dirty = true;
                report.changes.push(TaskChange {
                    company_id: company.id,
                    template_key: template.key.to_string(),
                    status,
                });
            }
        }
    }

    for (_, ledger, dirty) in &ledgers {
        if *dirty {
            storage.store_ledger(ledger)?;
            report.ledgers_written += 1;
        }
    }

    info!(
        "reconciled period {period}: {} records, {} skipped, {} ledgers written, {} task changes",
        report.records,
        report.skipped,
        report.ledgers_written,
        report.changes.len()
    );
    Ok(report)
}

/// Manually set one task's status, creating the task if absent.
///
/// Last writer wins, same as reconciliation; the recorded raw value is kept.
pub fn set_task_status(
    storage: &mut Storage,
    company_id: Uuid,
    period: &Period,
    template_key: &str,
    status: TaskStatus,
) -> Result<()> {
    let mut ledger = storage.load_ledger(company_id, period)?;
    let raw = ledger
        .task(template_key)
        .and_then(|t| t.raw_value.clone());
    if ledger.apply(template_key, status, raw.as_deref(), Timestamp::now()) {
        storage.store_ledger(&ledger)?;
    }
    Ok(())
}

/// Enable or disable a template for a company.
///
/// Updates the company's enabled set and the period's ledger together:
/// disabling forces the task to `not_required`, re-enabling resets it to
/// `new`. Returns the updated company record.
pub fn set_template_enabled(
    storage: &mut Storage,
    company_id: Uuid,
    period: &Period,
    template_key: &str,
    enabled: bool,
) -> Result<crate::model::Company> {
    let mut company = storage.load_company(company_id)?;

    let mut set = company.enabled_templates.take().unwrap_or_else(|| {
        // No explicit set means all enabled; materialize the catalog before
        // carving a key out of it.
        template_catalog().iter().map(|t| t.key.to_string()).collect()
    });
    if enabled {
        set.insert(template_key.to_string());
    } else {
        set.remove(template_key);
    }
    company.enabled_templates = Some(set);
    storage.upsert_company(&company)?;

    let status = if enabled {
        TaskStatus::New
    } else {
        TaskStatus::NotRequired
    };
    set_task_status(storage, company_id, period, template_key, status)?;

    Ok(company)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use crate::model::Company;
    use crate::snapshot::parse_snapshot;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("data")).unwrap();
        (dir, storage)
    }

    fn seed_company(storage: &Storage, tax_id: &str, name: &str) -> Company {
        let company = Company {
            id: Uuid::new_v4(),
            tax_id: Some(tax_id.into()),
            name: name.into(),
            active: true,
            contract_amount: 1_000_000.0,
            shares: BTreeMap::new(),
            assignments: BTreeMap::new(),
            enabled_templates: None,
        };
        storage.upsert_company(&company).unwrap();
        company
    }

    fn period() -> Period {
        Period::new("2026 Yanvar")
    }

    #[test]
    fn creates_tasks_from_matched_records() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo Savdo MChJ");
        let snapshot = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo Savdo MChJ",
                 "1C": "kartoteka", "QQS": "+"}]"#,
        )
        .unwrap();

        let report = run(&mut storage, &period(), &snapshot).unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.ledgers_written, 1);
        assert_eq!(report.changes.len(), 2);

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::Blocked);
        assert_eq!(ledger.task("qqs").unwrap().status, TaskStatus::Approved);
    }

    #[test]
    fn unmatched_records_are_counted_not_fatal() {
        let (_dir, mut storage) = test_storage();
        seed_company(&storage, "123456789", "Bravo");
        let snapshot = parse_snapshot(
            r#"[
                {"STIR": "999999999", "Korxona nomi": "Nobody Knows MChJ", "1C": "+"},
                {"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+"}
            ]"#,
        )
        .unwrap();

        let report = run(&mut storage, &period(), &snapshot).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.ledgers_written, 1);
    }

    #[test]
    fn rerun_of_identical_snapshot_writes_nothing() {
        let (_dir, mut storage) = test_storage();
        seed_company(&storage, "123456789", "Bravo");
        let snapshot = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+", "QQS": "ariza"}]"#,
        )
        .unwrap();

        let first = run(&mut storage, &period(), &snapshot).unwrap();
        assert_eq!(first.ledgers_written, 1);

        let second = run(&mut storage, &period(), &snapshot).unwrap();
        assert_eq!(second.ledgers_written, 0);
        assert!(second.changes.is_empty());
    }

    #[test]
    fn unrelated_tasks_survive_a_partial_snapshot() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo");

        let full = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+", "QQS": "+"}]"#,
        )
        .unwrap();
        run(&mut storage, &period(), &full).unwrap();

        // Later snapshot only carries the 1C column.
        let partial = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "kartoteka"}]"#,
        )
        .unwrap();
        let report = run(&mut storage, &period(), &partial).unwrap();

        // Exactly the changed task is in the write-set; qqs is untouched.
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].template_key, "one_c");
        assert_eq!(report.changes[0].status, TaskStatus::Blocked);

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("qqs").unwrap().status, TaskStatus::Approved);
    }

    #[test]
    fn snapshot_flips_blocked_to_approved_end_to_end() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo");

        let blocked = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "kartoteka"}]"#,
        )
        .unwrap();
        run(&mut storage, &period(), &blocked).unwrap();
        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::Blocked);

        let approved = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+"}]"#,
        )
        .unwrap();
        let report = run(&mut storage, &period(), &approved).unwrap();

        assert_eq!(report.changes.len(), 1);
        assert_eq!(
            report.changes[0],
            TaskChange {
                company_id: company.id,
                template_key: "one_c".into(),
                status: TaskStatus::Approved,
            }
        );
    }

    #[test]
    fn repeated_records_fold_into_one_ledger() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo");
        let snapshot = parse_snapshot(
            r#"[
                {"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "ariza"},
                {"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+"}
            ]"#,
        )
        .unwrap();

        let report = run(&mut storage, &period(), &snapshot).unwrap();

        // Both records hit the same ledger; the later one wins.
        assert_eq!(report.ledgers_written, 1);
        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::Approved);
    }

    #[test]
    fn disabled_template_is_pinned_to_not_required() {
        let (_dir, mut storage) = test_storage();
        let mut company = seed_company(&storage, "123456789", "Bravo");
        company.enabled_templates = Some(["qqs".to_string()].into());
        storage.upsert_company(&company).unwrap();

        let snapshot = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+", "QQS": "+"}]"#,
        )
        .unwrap();
        run(&mut storage, &period(), &snapshot).unwrap();

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::NotRequired);
        assert_eq!(ledger.task("qqs").unwrap().status, TaskStatus::Approved);
    }

    #[test]
    fn manual_status_override_wins() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo");
        let snapshot = parse_snapshot(
            r#"[{"STIR": "123456789", "Korxona nomi": "Bravo", "1C": "+"}]"#,
        )
        .unwrap();
        run(&mut storage, &period(), &snapshot).unwrap();

        set_task_status(
            &mut storage,
            company.id,
            &period(),
            "one_c",
            TaskStatus::Overdue,
        )
        .unwrap();

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        let task = ledger.task("one_c").unwrap();
        assert_eq!(task.status, TaskStatus::Overdue);
        // The raw value from the snapshot is kept for audit.
        assert_eq!(task.raw_value.as_deref(), Some("+"));
    }

    #[test]
    fn disable_then_enable_resets_status() {
        let (_dir, mut storage) = test_storage();
        let company = seed_company(&storage, "123456789", "Bravo");

        let updated =
            set_template_enabled(&mut storage, company.id, &period(), "one_c", false).unwrap();
        assert!(!updated.template_enabled("one_c"));
        assert!(updated.template_enabled("qqs"), "other templates stay enabled");

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::NotRequired);

        let updated =
            set_template_enabled(&mut storage, company.id, &period(), "one_c", true).unwrap();
        assert!(updated.template_enabled("one_c"));

        let ledger = storage.load_ledger(company.id, &period()).unwrap();
        assert_eq!(ledger.task("one_c").unwrap().status, TaskStatus::New);
    }
}
