use crate::contract::{RoleKey, CONSECUTIVE_SLOTS, MONTH_SLOTS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily open interest snapshot of one contract.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub code: String,
    pub open_interest: Option<f64>,
}

impl RawObservation {
    pub fn new(date: NaiveDate, code: &str, open_interest: Option<f64>) -> Self {
        RawObservation {
            date,
            code: code.to_string(),
            open_interest,
        }
    }
}

/// Persisted unit of a continuous series, keyed by `(date, continuous_code)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContinuousSeriesRow {
    pub date: NaiveDate,
    pub continuous_code: String,
    pub contract_code: String,
}

/// A wide, date indexed table whose columns are role keys.
pub trait ContinuousTable {
    fn dates(&self) -> Vec<NaiveDate>;

    /// Present cells in column-major order: every date of the first column,
    /// then every date of the next one.
    fn cells(&self) -> Vec<(NaiveDate, RoleKey, &str)>;

    fn is_empty(&self) -> bool {
        self.dates().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRow {
    pub dominant: Option<String>,
    pub subdominant: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    pub rows: BTreeMap<NaiveDate, RoleRow>,
}

impl RoleTable {
    pub fn get(&self, date: &NaiveDate) -> Option<&RoleRow> {
        self.rows.get(date)
    }

    pub fn dominant(&self, date: &NaiveDate) -> Option<&str> {
        self.rows.get(date).and_then(|row| row.dominant.as_deref())
    }

    pub fn subdominant(&self, date: &NaiveDate) -> Option<&str> {
        self.rows.get(date).and_then(|row| row.subdominant.as_deref())
    }
}

impl ContinuousTable for RoleTable {
    fn dates(&self) -> Vec<NaiveDate> {
        self.rows.keys().copied().collect()
    }

    fn cells(&self) -> Vec<(NaiveDate, RoleKey, &str)> {
        let dominant = self
            .rows
            .iter()
            .filter_map(|(date, row)| Some((*date, RoleKey::Dominant, row.dominant.as_deref()?)));
        let subdominant = self.rows.iter().filter_map(|(date, row)| {
            Some((*date, RoleKey::Subdominant, row.subdominant.as_deref()?))
        });
        dominant.chain(subdominant).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankRow {
    pub consecutive: [Option<String>; CONSECUTIVE_SLOTS],
    /// Index 0 holds `01M`, index 11 holds `12M`.
    pub monthly: [Option<String>; MONTH_SLOTS],
}

impl RankRow {
    pub fn get(&self, key: RoleKey) -> Option<&str> {
        match key {
            RoleKey::Consecutive(rank) => self.consecutive.get(rank as usize)?.as_deref(),
            RoleKey::Month(month) => self
                .monthly
                .get((month as usize).checked_sub(1)?)?
                .as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    pub rows: BTreeMap<NaiveDate, RankRow>,
}

impl RankTable {
    pub fn get(&self, date: &NaiveDate, key: RoleKey) -> Option<&str> {
        self.rows.get(date).and_then(|row| row.get(key))
    }

    pub fn columns() -> Vec<RoleKey> {
        (0..CONSECUTIVE_SLOTS as u8)
            .map(RoleKey::Consecutive)
            .chain((1..=MONTH_SLOTS as u8).map(RoleKey::Month))
            .collect()
    }
}

impl ContinuousTable for RankTable {
    fn dates(&self) -> Vec<NaiveDate> {
        self.rows.keys().copied().collect()
    }

    fn cells(&self) -> Vec<(NaiveDate, RoleKey, &str)> {
        let mut cells = Vec::new();
        for key in RankTable::columns() {
            for (date, row) in &self.rows {
                if let Some(code) = row.get(key) {
                    cells.push((*date, key, code));
                }
            }
        }
        cells
    }
}
