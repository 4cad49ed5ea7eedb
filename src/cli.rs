//! CLI interface for taskbook.
//!
//! Non-interactive subcommands: arguments in, structured output out.
//! Primary output goes to stdout, human summaries and diagnostics to stderr.
//!
//! Companies are referenced by full UUID, an unambiguous UUID prefix, or
//! their exact tax-id.

mod format;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{
    Company, KpiSet, Period, Role, RoleShare, Staff, TaskStatus, template, template_catalog,
};
use crate::payout::{self, default_rules};
use crate::reconcile;
use crate::snapshot::load_snapshot;
use crate::storage::Storage;

use format::{format_amount, format_payout_lines, format_task_changes};

/// taskbook — filing obligations and staff compensation for an accounting firm.
#[derive(Debug, Parser)]
#[command(name = "taskbook", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: a monthly cycle
  1. taskbook company import companies.json     # once, or on roster changes
  2. taskbook reconcile snapshot.json --period "2026 Yanvar"
  3. taskbook kpi import kpi.json --period "2026 Yanvar"
  4. taskbook payout --period "2026 Yanvar"

Manual corrections:
  taskbook task set --company a3b --period "2026 Yanvar" qqs approved
  taskbook template disable --company a3b --period "2026 Yanvar" one_c"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the company directory.
    Company {
        #[command(subcommand)]
        command: CompanyCommand,
    },

    /// Manage the staff roster.
    Staff {
        #[command(subcommand)]
        command: StaffCommand,
    },

    /// Record KPI checklists for a period.
    Kpi {
        #[command(subcommand)]
        command: KpiCommand,
    },

    /// Merge an external roster snapshot into the task ledgers.
    ///
    /// Unmatched records are skipped and counted, not fatal. Re-running an
    /// unchanged snapshot writes nothing.
    Reconcile {
        /// Snapshot file: a JSON array of column-label → cell objects.
        snapshot: PathBuf,

        /// The period the snapshot covers (e.g. "2026-01", "2026 Yanvar").
        #[arg(long)]
        period: String,
    },

    /// Manually adjust a single task.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Enable or disable a task template for one company.
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Compute the pay ledger for a period. Read-only.
    Payout {
        /// The period to compute for.
        #[arg(long)]
        period: String,

        /// Restrict to one company (UUID, prefix, or tax-id).
        #[arg(long)]
        company: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CompanyCommand {
    /// Import (upsert) companies from a JSON file.
    Import {
        /// JSON array of company records; ids are generated when absent.
        file: PathBuf,
    },

    /// List all companies.
    List,
}

#[derive(Debug, Subcommand)]
pub enum StaffCommand {
    /// Import (upsert) staff members from a JSON file.
    Import {
        /// JSON array of staff records; ids are generated when absent.
        file: PathBuf,
    },

    /// List the staff roster.
    List,
}

#[derive(Debug, Subcommand)]
pub enum KpiCommand {
    /// Import KPI checklists from a JSON file for one period.
    Import {
        /// JSON array of { company, indicators } rows.
        file: PathBuf,

        /// The period the checklists cover.
        #[arg(long)]
        period: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Set a task's status by hand. Last writer wins.
    Set {
        /// Company reference (UUID, prefix, or tax-id).
        #[arg(long)]
        company: String,

        /// The period the task belongs to.
        #[arg(long)]
        period: String,

        /// Template key (e.g. "qqs", "one_c").
        template: String,

        /// Target status (e.g. "approved", "overdue").
        status: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// List the template catalog.
    List,

    /// Enable a template for a company; its task resets to `new`.
    Enable {
        #[arg(long)]
        company: String,

        #[arg(long)]
        period: String,

        /// Template key.
        key: String,
    },

    /// Disable a template for a company; its task becomes `not_required`.
    Disable {
        #[arg(long)]
        company: String,

        #[arg(long)]
        period: String,

        /// Template key.
        key: String,
    },
}

/// CLI-facing company import record, mapped to the domain `Company`.
/// The id is optional on import; one is generated for new records.
#[derive(Debug, Deserialize)]
struct CompanyImport {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    tax_id: Option<String>,
    name: String,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    contract_amount: f64,
    #[serde(default)]
    shares: BTreeMap<Role, RoleShare>,
    #[serde(default)]
    assignments: BTreeMap<Role, Uuid>,
    #[serde(default)]
    enabled_templates: Option<BTreeSet<String>>,
}

impl CompanyImport {
    fn into_domain(self) -> Company {
        Company {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            tax_id: self.tax_id,
            name: self.name,
            active: self.active,
            contract_amount: self.contract_amount,
            shares: self.shares,
            assignments: self.assignments,
            enabled_templates: self.enabled_templates,
        }
    }
}

/// CLI-facing staff import record.
#[derive(Debug, Deserialize)]
struct StaffImport {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
}

/// One row of a KPI import file.
#[derive(Debug, Deserialize)]
struct KpiImport {
    /// Company reference: UUID, prefix, or tax-id.
    company: String,
    indicators: BTreeMap<String, bool>,
}

fn default_true() -> bool {
    true
}

/// Run the CLI, returning an error message on failure.
pub fn run(storage: &mut Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Company { command } => match command {
            CompanyCommand::Import { file } => cmd_company_import(storage, &file),
            CompanyCommand::List => cmd_company_list(storage),
        },
        Command::Staff { command } => match command {
            StaffCommand::Import { file } => cmd_staff_import(storage, &file),
            StaffCommand::List => cmd_staff_list(storage),
        },
        Command::Kpi { command } => match command {
            KpiCommand::Import { file, period } => {
                cmd_kpi_import(storage, &file, &Period::new(period))
            }
        },
        Command::Reconcile { snapshot, period } => {
            cmd_reconcile(storage, &snapshot, &Period::new(period))
        }
        Command::Task { command } => match command {
            TaskCommand::Set {
                company,
                period,
                template,
                status,
            } => cmd_task_set(storage, &company, &Period::new(period), &template, &status),
        },
        Command::Template { command } => match command {
            TemplateCommand::List => cmd_template_list(),
            TemplateCommand::Enable {
                company,
                period,
                key,
            } => cmd_template_toggle(storage, &company, &Period::new(period), &key, true),
            TemplateCommand::Disable {
                company,
                period,
                key,
            } => cmd_template_toggle(storage, &company, &Period::new(period), &key, false),
        },
        Command::Payout { period, company } => {
            cmd_payout(storage, &Period::new(period), company.as_deref())
        }
    }
}

fn cmd_company_import(storage: &Storage, file: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let imports: Vec<CompanyImport> = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid company file {}: {e}", file.display()))?;

    let count = imports.len();
    for import in imports {
        let company = import.into_domain();
        storage
            .upsert_company(&company)
            .map_err(|e| format!("failed to store company '{}': {e}", company.name))?;
    }
    eprintln!("Imported {count} company record(s)");
    Ok(())
}

fn cmd_company_list(storage: &Storage) -> Result<(), String> {
    let companies = storage
        .list_companies()
        .map_err(|e| format!("failed to list companies: {e}"))?;

    if companies.is_empty() {
        println!("No companies");
        return Ok(());
    }

    for c in &companies {
        let short_id = &c.id.to_string()[..8];
        let tax_id = c.tax_id().unwrap_or("-");
        let active = if c.active { "active" } else { "inactive" };
        println!(
            "{short_id}  [{active}] [{tax_id}]  {}  {}",
            c.name,
            format_amount(c.contract_amount)
        );
    }
    Ok(())
}

fn cmd_staff_import(storage: &Storage, file: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let imports: Vec<StaffImport> = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid staff file {}: {e}", file.display()))?;

    let count = imports.len();
    for import in imports {
        let staff = Staff {
            id: import.id.unwrap_or_else(Uuid::new_v4),
            name: import.name,
        };
        storage
            .upsert_staff(&staff)
            .map_err(|e| format!("failed to store staff '{}': {e}", staff.name))?;
    }
    eprintln!("Imported {count} staff record(s)");
    Ok(())
}

fn cmd_staff_list(storage: &Storage) -> Result<(), String> {
    let roster = storage
        .list_staff()
        .map_err(|e| format!("failed to list staff: {e}"))?;

    if roster.is_empty() {
        println!("No staff");
        return Ok(());
    }
    for s in &roster {
        println!("{}  {}", &s.id.to_string()[..8], s.name);
    }
    Ok(())
}

fn cmd_kpi_import(storage: &mut Storage, file: &Path, period: &Period) -> Result<(), String> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let imports: Vec<KpiImport> = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid KPI file {}: {e}", file.display()))?;

    let count = imports.len();
    for import in imports {
        let company = resolve_company(storage, &import.company)?;
        let set = KpiSet {
            company_id: company.id,
            period: period.clone(),
            indicators: import.indicators,
        };
        storage
            .store_kpi_set(&set)
            .map_err(|e| format!("failed to store KPI set for '{}': {e}", company.name))?;
    }
    eprintln!("Imported {count} KPI checklist(s) for {period}");
    Ok(())
}

fn cmd_reconcile(storage: &mut Storage, snapshot_path: &Path, period: &Period) -> Result<(), String> {
    let records = load_snapshot(snapshot_path)
        .map_err(|e| format!("failed to load {}: {e}", snapshot_path.display()))?;

    let report = reconcile::run(storage, period, &records)
        .map_err(|e| format!("reconciliation failed: {e}"))?;

    for line in format_task_changes(&report.changes) {
        println!("{line}");
    }
    eprintln!(
        "Reconciled {period}: {} record(s), {} skipped, {} ledger(s) written",
        report.records, report.skipped, report.ledgers_written
    );
    if report.skipped > 0 {
        eprintln!("Warning: {} record(s) matched no company", report.skipped);
    }
    Ok(())
}

fn cmd_task_set(
    storage: &mut Storage,
    company_ref: &str,
    period: &Period,
    template_key: &str,
    status: &str,
) -> Result<(), String> {
    let company = resolve_company(storage, company_ref)?;
    if template(template_key).is_none() {
        return Err(format!("unknown template '{template_key}'"));
    }
    let status = TaskStatus::parse(status).ok_or_else(|| {
        let names: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown status '{status}' — expected one of: {}", names.join(", "))
    })?;

    reconcile::set_task_status(storage, company.id, period, template_key, status)
        .map_err(|e| format!("failed to set task: {e}"))?;
    eprintln!(
        "{} / {period} / {template_key} → {}",
        company.name,
        status.as_str()
    );
    Ok(())
}

fn cmd_template_list() -> Result<(), String> {
    for t in template_catalog() {
        println!(
            "{:<8} {:<24} {:<16} due day {:>2}  {}",
            t.key,
            t.name,
            t.role.as_str(),
            t.due_day,
            t.frequency.as_str()
        );
    }
    Ok(())
}

fn cmd_template_toggle(
    storage: &mut Storage,
    company_ref: &str,
    period: &Period,
    key: &str,
    enabled: bool,
) -> Result<(), String> {
    let company = resolve_company(storage, company_ref)?;
    if template(key).is_none() {
        return Err(format!("unknown template '{key}'"));
    }

    reconcile::set_template_enabled(storage, company.id, period, key, enabled)
        .map_err(|e| format!("failed to toggle template: {e}"))?;
    let verb = if enabled { "enabled" } else { "disabled" };
    eprintln!("{verb} {key} for {}", company.name);
    Ok(())
}

fn cmd_payout(
    storage: &Storage,
    period: &Period,
    company_ref: Option<&str>,
) -> Result<(), String> {
    let companies = match company_ref {
        Some(reference) => vec![resolve_company(storage, reference)?],
        None => storage
            .list_companies()
            .map_err(|e| format!("failed to list companies: {e}"))?,
    };
    let roster = storage
        .list_staff()
        .map_err(|e| format!("failed to list staff: {e}"))?;

    let mut entries = Vec::new();
    for company in companies.iter().filter(|c| c.active) {
        let kpi = storage
            .load_kpi_set(company.id, period)
            .map_err(|e| format!("failed to load KPI set for '{}': {e}", company.name))?;
        entries.extend(payout::compute_company(company, kpi.as_ref(), default_rules));
    }

    if entries.is_empty() {
        println!("No payout entries for {period}");
        return Ok(());
    }

    for line in format_payout_lines(&entries, &companies, &roster) {
        println!("{line}");
    }

    println!();
    let totals = payout::totals_by_staff(&entries);
    for (staff_id, total) in &totals {
        println!(
            "TOTAL  {}  {}",
            staff_name(&roster, *staff_id),
            format_amount(*total)
        );
    }
    Ok(())
}

fn staff_name(roster: &[Staff], id: Uuid) -> String {
    roster
        .iter()
        .find(|s| s.id == id)
        .map_or_else(|| id.to_string()[..8].to_string(), |s| s.name.clone())
}

/// Resolve a company reference: full UUID, exact tax-id, or an unambiguous
/// UUID prefix.
fn resolve_company(storage: &Storage, reference: &str) -> Result<Company, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_company(id)
            .map_err(|e| format!("company not found: {e}"));
    }

    let companies = storage
        .list_companies()
        .map_err(|e| format!("failed to list companies: {e}"))?;

    // Exact tax-id.
    if let Some(company) = companies.iter().find(|c| c.tax_id() == Some(reference)) {
        return Ok(company.clone());
    }

    // UUID prefix.
    let matches: Vec<&Company> = companies
        .iter()
        .filter(|c| c.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no company matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches
                .iter()
                .map(|c| c.id.to_string()[..8].to_string())
                .collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} companies: {}",
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("data")).unwrap();
        (dir, storage)
    }

    fn seed(storage: &Storage, tax_id: &str, name: &str) -> Company {
        let company = CompanyImport {
            id: None,
            tax_id: Some(tax_id.into()),
            name: name.into(),
            active: true,
            contract_amount: 0.0,
            shares: BTreeMap::new(),
            assignments: BTreeMap::new(),
            enabled_templates: None,
        }
        .into_domain();
        storage.upsert_company(&company).unwrap();
        company
    }

    #[test]
    fn resolves_by_uuid_prefix_and_tax_id() {
        let (_dir, storage) = test_storage();
        let company = seed(&storage, "123456789", "Bravo");

        let by_id = resolve_company(&storage, &company.id.to_string()).unwrap();
        assert_eq!(by_id.id, company.id);

        let by_prefix = resolve_company(&storage, &company.id.to_string()[..6]).unwrap();
        assert_eq!(by_prefix.id, company.id);

        let by_tax_id = resolve_company(&storage, "123456789").unwrap();
        assert_eq!(by_tax_id.id, company.id);
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let (_dir, storage) = test_storage();
        seed(&storage, "123456789", "Bravo");

        let err = resolve_company(&storage, "zzz").unwrap_err();
        assert!(err.contains("no company matching"));
    }

    #[test]
    fn company_import_accepts_minimal_records() {
        let imports: Vec<CompanyImport> =
            serde_json::from_str(r#"[{"name": "Bravo", "tax_id": "123"}]"#).unwrap();
        let company = imports.into_iter().next().unwrap().into_domain();
        assert!(company.active);
        assert_eq!(company.contract_amount, 0.0);
        assert!(company.enabled_templates.is_none());
    }
}
