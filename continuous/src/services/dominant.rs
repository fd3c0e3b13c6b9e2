use crate::tables::{RawObservation, RoleRow, RoleTable};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Top,
    Second,
}

/// One appearance of a contract in the listing, with the pick it earned that day.
#[derive(Debug, Clone, Copy)]
struct Step {
    date: NaiveDate,
    pick: Option<Pick>,
}

/// Derives the dominant and sub-dominant contract of every date in the input.
///
/// The dominant contract of a date is the one with the largest open interest
/// on the previous trading date, the sub-dominant the second largest. The lag
/// runs along each contract's own listing timeline, so a contract that skips
/// a date carries its pick to its next appearance. Equal open interest
/// resolves to the smaller code. No hysteresis is applied: the dominant may
/// switch back and forth.
pub fn get_dominant_contracts(observations: &[RawObservation]) -> RoleTable {
    let listings = group_by_date(observations);

    // Per contract chronological timeline of picks.
    let mut timelines: BTreeMap<&str, Vec<Step>> = BTreeMap::new();
    for (date, listing) in &listings {
        let top = max_open_interest(listing, None);
        let second = max_open_interest(listing, top);

        for code in listing.keys() {
            let pick = if Some(*code) == top {
                Some(Pick::Top)
            } else if Some(*code) == second {
                Some(Pick::Second)
            } else {
                None
            };
            timelines
                .entry(*code)
                .or_default()
                .push(Step { date: *date, pick });
        }
    }

    // Shift each timeline forward one appearance. Candidates remember the
    // date the pick was earned so collisions resolve to the latest one.
    let mut dominant: BTreeMap<NaiveDate, (NaiveDate, &str)> = BTreeMap::new();
    let mut subdominant: BTreeMap<NaiveDate, (NaiveDate, &str)> = BTreeMap::new();
    for (code, steps) in &timelines {
        for pair in steps.windows(2) {
            let (earned, target) = (pair[0], pair[1]);
            let slot = match earned.pick {
                Some(Pick::Top) => &mut dominant,
                Some(Pick::Second) => &mut subdominant,
                None => continue,
            };
            let candidate = (earned.date, *code);
            slot.entry(target.date)
                .and_modify(|current| {
                    if candidate.0 > current.0 {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }
    }

    let rows = listings
        .keys()
        .map(|date| {
            let row = RoleRow {
                dominant: dominant.get(date).map(|(_, code)| code.to_string()),
                subdominant: subdominant.get(date).map(|(_, code)| code.to_string()),
            };
            (*date, row)
        })
        .collect();

    RoleTable { rows }
}

/// Listing of each date, codes ascending. A repeated `(date, code)` keeps the
/// last value.
fn group_by_date(
    observations: &[RawObservation],
) -> BTreeMap<NaiveDate, BTreeMap<&str, Option<f64>>> {
    let mut listings: BTreeMap<NaiveDate, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    for obs in observations {
        listings
            .entry(obs.date)
            .or_default()
            .insert(obs.code.as_str(), obs.open_interest);
    }
    listings
}

/// Code with the largest present open interest, skipping `exclude`. Scans in
/// ascending code order and only replaces on a strictly larger value, so ties
/// go to the smallest code.
fn max_open_interest<'a>(
    listing: &BTreeMap<&'a str, Option<f64>>,
    exclude: Option<&str>,
) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for (code, open_interest) in listing {
        if Some(*code) == exclude {
            continue;
        }
        let Some(value) = open_interest.filter(|v| !v.is_nan()) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((*code, value)),
        }
    }
    best.map(|(code, _)| code)
}
