use crate::error::{Error, Result};
use crate::error;
use crate::tables::RawObservation;
use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use sqlx::{PgPool, Row};
use tracing::info;

/// Range of trading history to derive continuous contracts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    /// Rows dated within the last `n` calendar days.
    LastDays(u32),
}

impl Window {
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Window::All => None,
            Window::LastDays(days) => today.checked_sub_days(Days::new(*days as u64)),
        }
    }
}

#[async_trait]
pub trait OpenInterestSource: Send + Sync {
    /// Product symbols, e.g. `AG`, `CU`, `IF`.
    async fn list_products(&self) -> Result<Vec<String>>;

    /// Unsorted open interest rows of every contract of `product` within `window`.
    async fn fetch_open_interest(
        &self,
        product: &str,
        window: Window,
    ) -> Result<Vec<RawObservation>>;
}

fn validate_product(product: &str) -> Result<()> {
    if product.is_empty() || !product.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(error!(CustomError, "Invalid product symbol: {}", product));
    }
    Ok(())
}

#[async_trait]
impl OpenInterestSource for PgPool {
    async fn list_products(&self) -> Result<Vec<String>> {
        info!("Fetching list of futures products");
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT substring(code from '^[A-Z]+') AS product
            FROM futures_info
            WHERE code ~ '^[A-Z]+[0-9]{4}\.[A-Z]+$'
            ORDER BY product
            "#,
        )
        .fetch_all(self)
        .await?;

        let products = rows
            .iter()
            .map(|row| row.try_get::<String, _>("product"))
            .collect::<std::result::Result<Vec<String>, sqlx::Error>>()?;

        info!("Successfully fetched {} products", products.len());
        Ok(products)
    }

    async fn fetch_open_interest(
        &self,
        product: &str,
        window: Window,
    ) -> Result<Vec<RawObservation>> {
        validate_product(product)?;
        let since = window.since(Local::now().date_naive());
        info!(
            "Fetching open interest for {} since {:?}",
            product, since
        );

        let rows: Vec<RawObservation> = sqlx::query_as(
            r#"
            SELECT date, code, open_interest::float8 AS open_interest
            FROM futures_daily_bar
            WHERE code ~ $1
            AND ($2::date IS NULL OR date >= $2)
            "#,
        )
        .bind(format!("^{}[0-9]", product))
        .bind(since)
        .fetch_all(self)
        .await?;

        info!("Fetched {} open interest rows for {}", rows.len(), product);
        Ok(rows)
    }
}
