//! Company and staff storage: upsert, load, and list.
//!
//! Both record families are externally managed (onboarding, contracts), so
//! writes are plain upserts with no merge logic. Structured fields — role
//! shares, assignments, the enabled-template set — are JSON columns.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::model::{Company, Role, RoleShare, Staff};

use super::{Result, Storage, StorageError, parse_uuid};

impl Storage {
    /// Inserts or replaces a company record.
    pub fn upsert_company(&self, company: &Company) -> Result<()> {
        let enabled = company
            .enabled_templates
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn().execute(
            "INSERT OR REPLACE INTO company
                 (id, tax_id, name, active, contract_amount, shares, assignments, enabled_templates)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                company.id.to_string(),
                company.tax_id,
                &company.name,
                company.active,
                company.contract_amount,
                serde_json::to_string(&company.shares)?,
                serde_json::to_string(&company.assignments)?,
                enabled,
            ],
        )?;
        Ok(())
    }

    /// Loads a single company.
    pub fn load_company(&self, id: Uuid) -> Result<Company> {
        self.conn()
            .query_row(
                "SELECT id, tax_id, name, active, contract_amount, shares, assignments,
                        enabled_templates
                 FROM company WHERE id = ?1",
                [id.to_string()],
                company_from_row,
            )
            .optional()?
            .ok_or(StorageError::CompanyNotFound(id))?
    }

    /// Lists all companies, ordered by name.
    pub fn list_companies(&self) -> Result<Vec<Company>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, tax_id, name, active, contract_amount, shares, assignments,
                    enabled_templates
             FROM company ORDER BY name",
        )?;
        let rows = stmt.query_map([], company_from_row)?;
        let mut companies = Vec::new();
        for row in rows {
            companies.push(row??);
        }
        Ok(companies)
    }

    /// Inserts or replaces a staff record.
    pub fn upsert_staff(&self, staff: &Staff) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO staff (id, name) VALUES (?1, ?2)",
            rusqlite::params![staff.id.to_string(), &staff.name],
        )?;
        Ok(())
    }

    /// Lists the staff roster, ordered by name.
    pub fn list_staff(&self) -> Result<Vec<Staff>> {
        let mut stmt = self.conn().prepare("SELECT id, name FROM staff ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut staff = Vec::new();
        for row in rows {
            let (id, name) = row?;
            staff.push(Staff {
                id: parse_uuid(&id, "staff id")?,
                name,
            });
        }
        Ok(staff)
    }
}

type CompanyRow = (
    String,
    Option<String>,
    String,
    bool,
    f64,
    String,
    String,
    Option<String>,
);

/// Maps a company row; JSON-column decoding happens after the rusqlite
/// layer, so decode failures surface as `Corrupt`, not `Sqlite`.
fn company_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Company>> {
    let raw: CompanyRow = (
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    );
    Ok(decode_company(raw))
}

fn decode_company(raw: CompanyRow) -> Result<Company> {
    let (id, tax_id, name, active, contract_amount, shares, assignments, enabled) = raw;

    let shares: BTreeMap<Role, RoleShare> = serde_json::from_str(&shares)
        .map_err(|e| StorageError::Corrupt(format!("invalid shares: {e}")))?;
    let assignments: BTreeMap<Role, Uuid> = serde_json::from_str(&assignments)
        .map_err(|e| StorageError::Corrupt(format!("invalid assignments: {e}")))?;
    let enabled_templates: Option<BTreeSet<String>> = enabled
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| StorageError::Corrupt(format!("invalid enabled_templates: {e}")))?;

    Ok(Company {
        id: parse_uuid(&id, "company id")?,
        tax_id,
        name,
        active,
        contract_amount,
        shares,
        assignments,
        enabled_templates,
    })
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

    fn sample_company() -> Company {
        let staff_id = Uuid::new_v4();
        Company {
            id: Uuid::new_v4(),
            tax_id: Some("123456789".into()),
            name: "Bravo Savdo MChJ".into(),
            active: true,
            contract_amount: 1_000_000.0,
            shares: [(
                Role::Accountant,
                RoleShare {
                    fixed_sum: None,
                    percent: Some(20.0),
                },
            )]
            .into(),
            assignments: [(Role::Accountant, staff_id)].into(),
            enabled_templates: Some(["one_c".to_string(), "qqs".to_string()].into()),
        }
    }

    #[test]
    fn upsert_and_load_company() {
        let (_dir, storage) = test_storage();
        let company = sample_company();

        storage.upsert_company(&company).unwrap();
        let loaded = storage.load_company(company.id).unwrap();

        assert_eq!(loaded.name, company.name);
        assert_eq!(loaded.tax_id, company.tax_id);
        assert_eq!(loaded.contract_amount, company.contract_amount);
        assert_eq!(
            loaded.shares[&Role::Accountant].percent,
            Some(20.0)
        );
        assert_eq!(loaded.assignments, company.assignments);
        assert_eq!(loaded.enabled_templates, company.enabled_templates);
    }

    #[test]
    fn upsert_replaces_existing() {
        let (_dir, storage) = test_storage();
        let mut company = sample_company();

        storage.upsert_company(&company).unwrap();
        company.contract_amount = 2_000_000.0;
        storage.upsert_company(&company).unwrap();

        let loaded = storage.load_company(company.id).unwrap();
        assert_eq!(loaded.contract_amount, 2_000_000.0);
        assert_eq!(storage.list_companies().unwrap().len(), 1);
    }

    #[test]
    fn load_nonexistent_company_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_company(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::CompanyNotFound(_)));
    }

    #[test]
    fn list_companies_sorted_by_name() {
        let (_dir, storage) = test_storage();

        let mut b = sample_company();
        b.name = "Bravo".into();
        let mut a = sample_company();
        a.id = Uuid::new_v4();
        a.tax_id = None;
        a.name = "Alpha".into();

        storage.upsert_company(&b).unwrap();
        storage.upsert_company(&a).unwrap();

        let names: Vec<String> = storage
            .list_companies()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Alpha", "Bravo"]);
    }

    #[test]
    fn staff_round_trip() {
        let (_dir, storage) = test_storage();
        let staff = Staff {
            id: Uuid::new_v4(),
            name: "Dilnoza K.".into(),
        };

        storage.upsert_staff(&staff).unwrap();
        let roster = storage.list_staff().unwrap();

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, staff.id);
        assert_eq!(roster[0].name, staff.name);
    }
}
