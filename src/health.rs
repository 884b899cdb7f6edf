//! Health records - latest measurements from a health-data provider

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything carrying an ISO-8601 timestamp
pub trait TimestampedRecord {
    fn timestamp(&self) -> &str;
}

/// Height measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightRecord {
    pub measurement_meters: f64,
    pub record_id: String,
    pub timestamp: String,
}

/// Weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub measurement_kilograms: f64,
    pub record_id: String,
    pub timestamp: String,
}

/// Body fat measurement (percent, 0-100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyFatRecord {
    pub percentage: f64,
    pub record_id: String,
    pub timestamp: String,
}

impl TimestampedRecord for HeightRecord {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl TimestampedRecord for WeightRecord {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl TimestampedRecord for BodyFatRecord {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// The single latest record of each kind, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRecords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<HeightRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<WeightRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<BodyFatRecord>,
}

impl LatestRecords {
    pub fn is_empty(&self) -> bool {
        self.height.is_none() && self.weight.is_none() && self.body_fat.is_none()
    }
}

/// Full series export from a provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthExport {
    #[serde(default)]
    pub heights: Vec<HeightRecord>,
    #[serde(default)]
    pub weights: Vec<WeightRecord>,
    #[serde(default)]
    pub body_fats: Vec<BodyFatRecord>,
}

impl HealthExport {
    /// Reduce each series to its most recent record
    pub fn latest(&self) -> LatestRecords {
        LatestRecords {
            height: latest_of(&self.heights).cloned(),
            weight: latest_of(&self.weights).cloned(),
            body_fat: latest_of(&self.body_fats).cloned(),
        }
    }
}

/// Compare timestamps as instants when both parse, as strings otherwise
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Most recent record in a series; the first one wins on ties
pub fn latest_of<T: TimestampedRecord>(records: &[T]) -> Option<&T> {
    records.iter().fold(None, |best: Option<&T>, record| match best {
        Some(b) if compare_timestamps(record.timestamp(), b.timestamp()) != Ordering::Greater => {
            Some(b)
        }
        _ => Some(record),
    })
}

/// Load provider records from a JSON file.
///
/// Accepts either a `LatestRecords` document (`height`/`weight`/`bodyFat`)
/// or a `HealthExport` with full series.
pub fn load_records(path: impl AsRef<Path>) -> Result<LatestRecords> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    let is_export = ["heights", "weights", "bodyFats"]
        .iter()
        .any(|key| value.get(key).is_some());

    if is_export {
        let export: HealthExport = serde_json::from_value(value)
            .with_context(|| format!("invalid health export in {}", path.display()))?;
        debug!(
            heights = export.heights.len(),
            weights = export.weights.len(),
            body_fats = export.body_fats.len(),
            "loaded health export"
        );
        return Ok(export.latest());
    }

    let latest: LatestRecords = serde_json::from_value(value)
        .with_context(|| format!("invalid latest records in {}", path.display()))?;
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn weight(id: &str, kg: f64, timestamp: &str) -> WeightRecord {
        WeightRecord {
            measurement_kilograms: kg,
            record_id: id.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_latest_of_empty() {
        let records: Vec<WeightRecord> = vec![];
        assert!(latest_of(&records).is_none());
    }

    #[test]
    fn test_latest_of_picks_newest() {
        let records = vec![
            weight("w1", 80.0, "2023-07-10T08:00:00Z"),
            weight("w2", 79.5, "2023-07-12T08:00:00Z"),
            weight("w3", 81.0, "2023-07-11T08:00:00Z"),
        ];
        assert_eq!(latest_of(&records).unwrap().record_id, "w2");
    }

    #[test]
    fn test_latest_of_respects_offsets() {
        // 01:00+03:00 is 22:00Z the previous day
        let records = vec![
            weight("w1", 80.0, "2023-07-12T01:00:00+03:00"),
            weight("w2", 79.5, "2023-07-11T23:00:00Z"),
        ];
        assert_eq!(latest_of(&records).unwrap().record_id, "w2");
    }

    #[test]
    fn test_latest_of_tie_keeps_first() {
        let records = vec![
            weight("w1", 80.0, "2023-07-12T08:00:00Z"),
            weight("w2", 79.5, "2023-07-12T08:00:00Z"),
        ];
        assert_eq!(latest_of(&records).unwrap().record_id, "w1");
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{"measurementMeters":1.8,"recordId":"height1","timestamp":"2023-07-12T12:00:00Z"}"#;
        let record: HeightRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.measurement_meters, 1.8);
        assert_eq!(record.record_id, "height1");
    }

    #[test]
    fn test_load_latest_records_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"weight":{{"measurementKilograms":80.5,"recordId":"weight1","timestamp":"2023-07-12T12:00:00Z"}}}}"#
        )
        .unwrap();

        let latest = load_records(file.path()).unwrap();
        assert!(latest.height.is_none());
        assert!(latest.body_fat.is_none());
        assert_eq!(latest.weight.unwrap().measurement_kilograms, 80.5);
    }

    #[test]
    fn test_load_export_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bodyFats":[
                {{"percentage":20.0,"recordId":"fat1","timestamp":"2023-07-01T07:00:00Z"}},
                {{"percentage":19.0,"recordId":"fat2","timestamp":"2023-07-09T07:00:00Z"}}
            ]}}"#
        )
        .unwrap();

        let latest = load_records(file.path()).unwrap();
        assert_eq!(latest.body_fat.unwrap().record_id, "fat2");
        assert!(latest.weight.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records("/nonexistent/records.json").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
