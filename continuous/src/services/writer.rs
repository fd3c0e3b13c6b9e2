use crate::contract::ContractCode;
use crate::database::continuous::ContinuousStore;
use crate::error::{Error, Result};
use crate::tables::{ContinuousSeriesRow, ContinuousTable};
use std::sync::Arc;
use tracing::{debug, info};

/// Melts a wide role or rank table into continuous series rows.
///
/// The product and exchange of the continuous codes are learned from the
/// first cell that parses as a contract code. Absent cells are dropped. An
/// empty table yields no rows.
pub fn to_continuous_rows<T: ContinuousTable + ?Sized>(
    table: &T,
) -> Result<Vec<ContinuousSeriesRow>> {
    let cells = table.cells();
    let Some(&(first_date, _, first_code)) = cells.first() else {
        return Ok(Vec::new());
    };

    let sample = cells
        .iter()
        .find_map(|(_, _, code)| ContractCode::parse(code))
        .ok_or_else(|| Error::MalformedCode {
            code: first_code.to_string(),
            date: first_date,
        })?;

    let rows = cells
        .into_iter()
        .map(|(date, key, code)| ContinuousSeriesRow {
            date,
            continuous_code: sample.continuous_code(key),
            contract_code: code.to_string(),
        })
        .collect();

    Ok(rows)
}

/// Persists wide tables through an injected store.
pub struct ContinuousSeriesWriter<S: ContinuousStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ContinuousStore + ?Sized> ContinuousSeriesWriter<S> {
    pub fn new(store: Arc<S>) -> Self {
        ContinuousSeriesWriter { store }
    }

    /// Upserts every present cell of `table`, returning the number of rows
    /// handed to the store. An empty table is a no-op.
    pub async fn write<T: ContinuousTable + Sync + ?Sized>(&self, table: &T) -> Result<usize> {
        let rows = to_continuous_rows(table).inspect_err(|e| {
            tracing::error!("Unable to derive continuous codes: {}", e);
        })?;

        if rows.is_empty() {
            debug!("No continuous rows to write");
            return Ok(0);
        }

        let changed = self.store.upsert_continuous_series(&rows).await?;
        info!(
            "Wrote {} continuous rows ({} changed) for {}",
            rows.len(),
            changed,
            rows[0].continuous_code
        );

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RoleKey;
    use crate::database::memory::MemoryStore;
    use crate::tables::{RankRow, RankTable, RoleRow, RoleTable};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn role_table(rows: &[(u32, Option<&str>, Option<&str>)]) -> RoleTable {
        RoleTable {
            rows: rows
                .iter()
                .map(|(d, dominant, subdominant)| {
                    (
                        day(*d),
                        RoleRow {
                            dominant: dominant.map(str::to_string),
                            subdominant: subdominant.map(str::to_string),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_role_rows() {
        let table = role_table(&[
            (1, None, None),
            (2, Some("AG2401.SHF"), Some("AG2402.SHF")),
            (3, Some("AG2402.SHF"), Some("AG2401.SHF")),
        ]);

        // Test
        let rows = to_continuous_rows(&table).unwrap();

        // Validate
        let keys: Vec<(NaiveDate, &str, &str)> = rows
            .iter()
            .map(|r| (r.date, r.continuous_code.as_str(), r.contract_code.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (day(2), "AG.SHF", "AG2401.SHF"),
                (day(3), "AG.SHF", "AG2402.SHF"),
                (day(2), "AG_S.SHF", "AG2402.SHF"),
                (day(3), "AG_S.SHF", "AG2401.SHF"),
            ]
        );
    }

    #[test]
    fn test_rank_rows() {
        let mut row = RankRow::default();
        row.consecutive[0] = Some("AG2401.SHF".to_string());
        row.consecutive[1] = Some("AG2402.SHF".to_string());
        row.monthly[1] = Some("AG2402.SHF".to_string());
        let mut table = RankTable::default();
        table.rows.insert(day(1), row);

        // Test
        let rows = to_continuous_rows(&table).unwrap();

        // Validate
        let codes: Vec<&str> = rows.iter().map(|r| r.continuous_code.as_str()).collect();
        assert_eq!(codes, vec!["AG00.SHF", "AG01.SHF", "AG02M.SHF"]);
        assert_eq!(rows[2].contract_code, "AG2402.SHF");
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let table = role_table(&[(1, None, None), (2, None, None)]);

        // Validate
        assert!(to_continuous_rows(&table).unwrap().is_empty());
        assert!(to_continuous_rows(&RoleTable::default()).unwrap().is_empty());
    }

    #[test]
    fn test_sample_skips_malformed_cells() {
        let table = role_table(&[
            (2, Some("ag2401"), None),
            (3, Some("AG2402.SHF"), None),
        ]);

        // Test
        let rows = to_continuous_rows(&table).unwrap();

        // Validate
        assert_eq!(rows[0].continuous_code, "AG.SHF");
        assert_eq!(rows[0].contract_code, "ag2401");
    }

    #[test]
    fn test_malformed_codes() {
        let table = role_table(&[(2, Some("ag2401"), Some("ag2402"))]);

        // Test
        let result = to_continuous_rows(&table);

        // Validate
        match result {
            Err(Error::MalformedCode { code, date }) => {
                assert_eq!(code, "ag2401");
                assert_eq!(date, day(2));
            }
            other => panic!("Expected malformed code, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_to_store() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let writer = ContinuousSeriesWriter::new(store.clone());
        let table = role_table(&[(1, None, None), (2, Some("AG2401.SHF"), None)]);

        // Test
        let written = writer.write(&table).await?;
        let empty = writer.write(&RoleTable::default()).await?;

        // Validate
        assert_eq!(written, 1);
        assert_eq!(empty, 0);
        let rows = store.fetch_continuous_series("AG.SHF", None, None).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(2));
        assert!(store
            .fetch_continuous_series(&format!("AG{}.SHF", RoleKey::Subdominant.suffix()), None, None)
            .await?
            .is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_untouched() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let writer = ContinuousSeriesWriter::new(store.clone());
        let table = role_table(&[(2, Some("bad"), Some("worse"))]);

        // Test
        let result = writer.write(&table).await;

        // Validate
        assert!(matches!(result, Err(Error::MalformedCode { .. })));
        assert!(store.is_empty().await);

        Ok(())
    }
}
