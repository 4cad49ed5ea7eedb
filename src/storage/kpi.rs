//! KPI metric storage: one row per (company, period, indicator).

use uuid::Uuid;

use crate::model::{KpiSet, Period};

use super::{Result, Storage};

impl Storage {
    /// Replaces the stored indicator set for the KPI set's (company, period).
    pub fn store_kpi_set(&mut self, set: &KpiSet) -> Result<()> {
        let company_id = set.company_id.to_string();
        let period = set.period.key();

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM kpi WHERE company_id = ?1 AND period = ?2",
            rusqlite::params![company_id, period],
        )?;
        for (indicator, satisfied) in &set.indicators {
            tx.execute(
                "INSERT INTO kpi (company_id, period, indicator, satisfied)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![company_id, period, indicator, satisfied],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the KPI set for a (company, period), if any was recorded.
    pub fn load_kpi_set(&self, company_id: Uuid, period: &Period) -> Result<Option<KpiSet>> {
        let mut stmt = self.conn().prepare(
            "SELECT indicator, satisfied FROM kpi
             WHERE company_id = ?1 AND period = ?2",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![company_id.to_string(), period.key()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
        )?;

        let mut indicators = std::collections::BTreeMap::new();
        for row in rows {
            let (indicator, satisfied) = row?;
            indicators.insert(indicator, satisfied);
        }

        // No rows means no checklist was filed for this period.
        if indicators.is_empty() {
            return Ok(None);
        }

        Ok(Some(KpiSet {
            company_id,
            period: period.clone(),
            indicators,
        }))
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

    #[test]
    fn missing_set_is_none() {
        let (_dir, storage) = test_storage();
        let set = storage
            .load_kpi_set(Uuid::new_v4(), &Period::new("2026-01"))
            .unwrap();
        assert!(set.is_none());
    }

    #[test]
    fn round_trip() {
        let (_dir, mut storage) = test_storage();
        let company_id = Uuid::new_v4();
        let set = KpiSet {
            company_id,
            period: Period::new("2026 Yanvar"),
            indicators: [
                ("attendance".to_string(), true),
                ("punctuality".to_string(), false),
            ]
            .into(),
        };

        storage.store_kpi_set(&set).unwrap();
        let loaded = storage
            .load_kpi_set(company_id, &Period::new("2026-01"))
            .unwrap()
            .unwrap();

        assert!(loaded.satisfied("attendance"));
        assert!(!loaded.satisfied("punctuality"));
    }

    #[test]
    fn store_replaces_prior_set() {
        let (_dir, mut storage) = test_storage();
        let company_id = Uuid::new_v4();
        let period = Period::new("2026-01");

        let mut set = KpiSet {
            company_id,
            period: period.clone(),
            indicators: [("attendance".to_string(), false)].into(),
        };
        storage.store_kpi_set(&set).unwrap();

        set.indicators = [("one_c_entry".to_string(), true)].into();
        storage.store_kpi_set(&set).unwrap();

        let loaded = storage.load_kpi_set(company_id, &period).unwrap().unwrap();
        assert_eq!(loaded.indicators.len(), 1);
        assert!(loaded.satisfied("one_c_entry"));
    }
}
