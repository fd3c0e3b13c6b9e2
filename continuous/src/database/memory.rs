use crate::database::continuous::ContinuousStore;
use crate::tables::ContinuousSeriesRow;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Continuous series kept in process, with the same keyed overwrite semantics
/// as the database table. Backs dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<(NaiveDate, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, ordered by date then continuous code.
    pub async fn snapshot(&self) -> Vec<ContinuousSeriesRow> {
        let rows = self.rows.lock().await;
        rows.iter()
            .map(|((date, continuous_code), contract_code)| ContinuousSeriesRow {
                date: *date,
                continuous_code: continuous_code.clone(),
                contract_code: contract_code.clone(),
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl ContinuousStore for MemoryStore {
    async fn upsert_continuous_series(&self, rows: &[ContinuousSeriesRow]) -> Result<u64> {
        let mut stored = self.rows.lock().await;
        let mut changed = 0;

        for row in rows {
            let key = (row.date, row.continuous_code.clone());
            match stored.insert(key, row.contract_code.clone()) {
                Some(previous) if previous == row.contract_code => {}
                _ => changed += 1,
            }
        }

        Ok(changed)
    }

    async fn fetch_continuous_series(
        &self,
        continuous_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ContinuousSeriesRow>> {
        let stored = self.rows.lock().await;
        let rows = stored
            .iter()
            .filter(|((date, code), _)| {
                code == continuous_code
                    && start.is_none_or(|start| *date >= start)
                    && end.is_none_or(|end| *date <= end)
            })
            .map(|((date, code), contract_code)| ContinuousSeriesRow {
                date: *date,
                continuous_code: code.clone(),
                contract_code: contract_code.clone(),
            })
            .collect();

        Ok(rows)
    }
}
