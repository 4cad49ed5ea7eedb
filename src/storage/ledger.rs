//! Task ledger storage: whole-ledger reads and writes.
//!
//! The ledger is the unit of truth for one (company, period): it is loaded
//! whole, merged in memory, and written back whole. `store_ledger` rewrites
//! the partition's rows inside one transaction, so readers never see a
//! half-replaced ledger. Storage takes `&mut self` on the write path — one
//! writer per ledger per call cycle is a hard constraint, not a style choice.

use uuid::Uuid;

use crate::model::{OperationTask, Period, TaskLedger, TaskStatus};

use super::{Result, Storage, StorageError, parse_timestamp};

impl Storage {
    /// Loads the ledger for a (company, period) pair.
    ///
    /// Returns the empty ledger when no tasks have been recorded yet.
    pub fn load_ledger(&self, company_id: Uuid, period: &Period) -> Result<TaskLedger> {
        let mut stmt = self.conn().prepare(
            "SELECT template_key, status, raw_value, created_at, updated_at
             FROM task
             WHERE company_id = ?1 AND period = ?2
             ORDER BY template_key",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![company_id.to_string(), period.key()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let mut ledger = TaskLedger::empty(company_id, period.clone());
        for row in rows {
            let (template_key, status, raw_value, created_at, updated_at) = row?;
            let status = TaskStatus::parse(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("invalid task status: {status}")))?;
            ledger.tasks.push(OperationTask {
                template_key,
                status,
                raw_value,
                created_at: parse_timestamp(&created_at, "created_at")?,
                updated_at: parse_timestamp(&updated_at, "updated_at")?,
            });
        }
        Ok(ledger)
    }

    /// Replaces the stored ledger with the given one, as a single unit.
    pub fn store_ledger(&mut self, ledger: &TaskLedger) -> Result<()> {
        let company_id = ledger.company_id.to_string();
        let period = ledger.period.key();

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM task WHERE company_id = ?1 AND period = ?2",
            rusqlite::params![company_id, period],
        )?;
        for task in &ledger.tasks {
            tx.execute(
                "INSERT INTO task
                     (company_id, period, template_key, status, raw_value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    company_id,
                    period,
                    &task.template_key,
                    task.status.as_str(),
                    task.raw_value,
                    task.created_at.to_string(),
                    task.updated_at.to_string(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
