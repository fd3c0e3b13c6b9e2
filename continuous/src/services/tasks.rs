use crate::contract::belongs_to;
use crate::database::continuous::ContinuousStore;
use crate::database::open_interest::{OpenInterestSource, Window};
use crate::services::consecutive::get_consecutive_contracts;
use crate::services::dominant::get_dominant_contracts;
use crate::services::writer::ContinuousSeriesWriter;
use crate::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOutcome {
    Written { rows: usize },
    /// No open interest in the window.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub written: usize,
    pub skipped: usize,
    pub rows: usize,
    /// Products whose derivation or write failed, sorted.
    pub failed: Vec<String>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Derives and persists the continuous series of every known product.
pub struct ContinuousTask<S: OpenInterestSource + ?Sized, W: ContinuousStore + ?Sized> {
    source: Arc<S>,
    writer: ContinuousSeriesWriter<W>,
    workers: usize,
}

impl<S: OpenInterestSource + ?Sized, W: ContinuousStore + ?Sized> ContinuousTask<S, W> {
    pub fn new(source: Arc<S>, store: Arc<W>, workers: usize) -> Self {
        ContinuousTask {
            source,
            writer: ContinuousSeriesWriter::new(store),
            workers: workers.max(1),
        }
    }

    /// Processes all products concurrently. A failing product is logged and
    /// reported without stopping the others.
    pub async fn run(&self, window: Window) -> Result<TaskReport> {
        let products = self.source.list_products().await?;
        info!(
            "Processing {} products over {:?} with {} workers",
            products.len(),
            window,
            self.workers
        );

        let mut outcomes: Vec<(String, Result<ProductOutcome>)> = stream::iter(products)
            .map(|product| async move {
                let outcome = self.process_product(&product, window).await;
                (product, outcome)
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));

        let mut report = TaskReport::default();
        for (product, outcome) in outcomes {
            match outcome {
                Ok(ProductOutcome::Written { rows }) => {
                    report.written += 1;
                    report.rows += rows;
                }
                Ok(ProductOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", product, e);
                    report.failed.push(product);
                }
            }
        }

        info!(
            "Finished: {} written, {} skipped, {} failed, {} rows",
            report.written,
            report.skipped,
            report.failed.len(),
            report.rows
        );
        Ok(report)
    }

    /// Derives the role and rank tables of one product and writes both. A
    /// malformed code in one table does not stop the other from being written.
    #[instrument(skip(self))]
    pub async fn process_product(&self, product: &str, window: Window) -> Result<ProductOutcome> {
        let mut observations = self.source.fetch_open_interest(product, window).await?;

        let fetched = observations.len();
        observations.retain(|obs| belongs_to(&obs.code, product));
        if observations.len() < fetched {
            warn!(
                "Dropped {} rows not belonging to {}",
                fetched - observations.len(),
                product
            );
        }

        if observations.is_empty() {
            info!("No open interest for {}, skipping", product);
            return Ok(ProductOutcome::Skipped);
        }

        let roles = get_dominant_contracts(&observations);
        let ranks = get_consecutive_contracts(&observations);

        let role_result = self.writer.write(&roles).await;
        let rank_result = self.writer.write(&ranks).await;
        let rows = role_result? + rank_result?;

        Ok(ProductOutcome::Written { rows })
    }
}
