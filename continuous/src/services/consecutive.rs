use crate::contract::month_of;
use crate::tables::{RankRow, RankTable, RawObservation};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Ranks the contracts listed on every date of the input.
///
/// Codes embed `YYMM`, so ascending code order is ascending expiry: rank `00`
/// is the nearest contract. Month column `k` holds the first listed code
/// whose month token is `k`, whatever its year. Unlike the dominant roles the
/// ranks are not lagged; expiry order is known in advance.
pub fn get_consecutive_contracts(observations: &[RawObservation]) -> RankTable {
    let mut listings: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for obs in observations {
        listings
            .entry(obs.date)
            .or_default()
            .insert(obs.code.as_str());
    }

    let rows = listings
        .into_iter()
        .map(|(date, codes)| (date, rank_listing(&codes)))
        .collect();

    RankTable { rows }
}

fn rank_listing(codes: &BTreeSet<&str>) -> RankRow {
    let mut row = RankRow::default();

    for (slot, code) in row.consecutive.iter_mut().zip(codes.iter()) {
        *slot = Some(code.to_string());
    }

    for code in codes {
        let Some(month) = month_of(code) else {
            continue;
        };
        if let Some(slot) = (month as usize)
            .checked_sub(1)
            .and_then(|idx| row.monthly.get_mut(idx))
        {
            // Keep the first, nearest, match.
            if slot.is_none() {
                *slot = Some(code.to_string());
            }
        }
    }

    row
}
