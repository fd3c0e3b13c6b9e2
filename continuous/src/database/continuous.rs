use crate::tables::ContinuousSeriesRow;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

/// Rows per statement inside one upsert transaction.
const UPSERT_CHUNK_SIZE: usize = 10_000;

#[async_trait]
pub trait ContinuousStore: Send + Sync {
    /// Inserts new `(date, continuous_code)` keys and overwrites the contract of
    /// existing ones, all or nothing. Returns the number of rows that changed.
    async fn upsert_continuous_series(&self, rows: &[ContinuousSeriesRow]) -> Result<u64>;

    async fn fetch_continuous_series(
        &self,
        continuous_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ContinuousSeriesRow>>;
}

#[async_trait]
impl ContinuousStore for PgPool {
    async fn upsert_continuous_series(&self, rows: &[ContinuousSeriesRow]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.begin().await?;
        let mut changed = 0;

        for chunk in rows.chunks(UPSERT_CHUNK_SIZE) {
            let mut dates = Vec::with_capacity(chunk.len());
            let mut continuous_codes = Vec::with_capacity(chunk.len());
            let mut contract_codes = Vec::with_capacity(chunk.len());

            for row in chunk {
                dates.push(row.date);
                continuous_codes.push(row.continuous_code.as_str());
                contract_codes.push(row.contract_code.as_str());
            }

            let result = sqlx::query(
                r#"
                INSERT INTO futures_continuous_contract (date, continuous_code, contract_code)
                SELECT * FROM UNNEST($1::date[], $2::text[], $3::text[])
                ON CONFLICT (date, continuous_code) DO UPDATE
                SET contract_code = EXCLUDED.contract_code
                WHERE futures_continuous_contract.contract_code IS DISTINCT FROM EXCLUDED.contract_code
                "#,
            )
            .bind(&dates)
            .bind(&continuous_codes)
            .bind(&contract_codes)
            .execute(&mut *tx)
            .await?;

            changed += result.rows_affected();
        }

        tx.commit().await?;

        info!(
            "Upserted {} continuous rows, {} changed",
            rows.len(),
            changed
        );
        Ok(changed)
    }

    async fn fetch_continuous_series(
        &self,
        continuous_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ContinuousSeriesRow>> {
        info!("Fetching continuous series {}", continuous_code);
        let rows: Vec<ContinuousSeriesRow> = sqlx::query_as(
            r#"
            SELECT date, continuous_code, contract_code
            FROM futures_continuous_contract
            WHERE continuous_code = $1
            AND ($2::date IS NULL OR date >= $2)
            AND ($3::date IS NULL OR date <= $3)
            ORDER BY date
            "#,
        )
        .bind(continuous_code)
        .bind(start)
        .bind(end)
        .fetch_all(self)
        .await?;

        Ok(rows)
    }
}
