//! Record aggregation - merge latest provider records into one row per day

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::health::{BodyFatRecord, HeightRecord, LatestRecords, TimestampedRecord, WeightRecord};

/// Length of the `YYYY-MM-DD` prefix
pub const DATE_KEY_LEN: usize = 10;

/// Records that fall on the same calendar date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_data: Option<HeightRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_data: Option<WeightRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_data: Option<BodyFatRecord>,
}

impl DailyAggregate {
    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }

    pub fn populated_fields(&self) -> usize {
        [
            self.height_data.is_some(),
            self.weight_data.is_some(),
            self.body_fat_data.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Fold another aggregate into this one; fields present in `other` win
    pub fn merge(&mut self, other: DailyAggregate) {
        if other.height_data.is_some() {
            self.height_data = other.height_data;
        }
        if other.weight_data.is_some() {
            self.weight_data = other.weight_data;
        }
        if other.body_fat_data.is_some() {
            self.body_fat_data = other.body_fat_data;
        }
    }
}

/// Calendar-date key of an ISO-8601 timestamp.
///
/// The first ten characters, taken as-is: no parsing and no timezone
/// conversion. Shorter strings are returned whole.
pub fn date_key(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(DATE_KEY_LEN) {
        Some((end, _)) => &timestamp[..end],
        None => timestamp,
    }
}

fn entry_for<'a, R: TimestampedRecord>(
    by_date: &'a mut BTreeMap<String, DailyAggregate>,
    record: &R,
) -> &'a mut DailyAggregate {
    by_date
        .entry(date_key(record.timestamp()).to_string())
        .or_default()
}

/// Group the latest height, weight and body fat records by calendar date.
///
/// Records sharing a date end up in the same entry. Every entry has at least
/// one field set, and the result is empty only when all inputs are `None`.
pub fn aggregate_records_by_date(
    height: Option<&HeightRecord>,
    weight: Option<&WeightRecord>,
    body_fat: Option<&BodyFatRecord>,
) -> BTreeMap<String, DailyAggregate> {
    let mut by_date = BTreeMap::new();

    if let Some(record) = height {
        entry_for(&mut by_date, record).height_data = Some(record.clone());
    }
    if let Some(record) = weight {
        entry_for(&mut by_date, record).weight_data = Some(record.clone());
    }
    if let Some(record) = body_fat {
        entry_for(&mut by_date, record).body_fat_data = Some(record.clone());
    }

    by_date
}

pub fn aggregate_latest(latest: &LatestRecords) -> BTreeMap<String, DailyAggregate> {
    aggregate_records_by_date(
        latest.height.as_ref(),
        latest.weight.as_ref(),
        latest.body_fat.as_ref(),
    )
}
