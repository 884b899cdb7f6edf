//! Database module - SQLite storage for daily body metrics

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::DailyAggregate;
use crate::timer::RestTimer;

const REST_TIMER_KEY: &str = "rest_timer";

/// One stored row per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    pub date: String,
    pub height: Option<f64>,         // meters
    pub weight: Option<f64>,         // kilograms
    pub fat_percentage: Option<f64>,
    pub height_record_id: Option<String>,
    pub weight_record_id: Option<String>,
    pub body_fat_record_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS user_metrics (
                date TEXT PRIMARY KEY,
                height REAL,
                weight REAL,
                fat_percentage REAL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        // Migration: record ids arrived after the first schema
        let has_record_ids: bool = self.conn
            .prepare("SELECT weight_record_id FROM user_metrics LIMIT 1")
            .is_ok();
        if !has_record_ids {
            for column in ["height_record_id", "weight_record_id", "body_fat_record_id"] {
                self.conn.execute(
                    &format!("ALTER TABLE user_metrics ADD COLUMN {} TEXT", column),
                    [],
                )?;
            }
        }

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Write one aggregate under its date; fields the aggregate lacks keep their stored value
    pub fn upsert_daily_aggregate(&self, date: &str, aggregate: &DailyAggregate) -> Result<()> {
        upsert(&self.conn, date, aggregate)
    }

    /// Write every aggregate in a single transaction, returns rows written
    pub fn upsert_all(&mut self, aggregates: &BTreeMap<String, DailyAggregate>) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        for (date, aggregate) in aggregates {
            if aggregate.is_empty() {
                continue;
            }
            upsert(&tx, date, aggregate)?;
            written += 1;
        }
        tx.commit()?;
        Ok(written)
    }

    /// All metrics, newest first
    pub fn get_metrics(&self) -> Result<Vec<DailyMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, height, weight, fat_percentage, height_record_id, weight_record_id, body_fat_record_id, updated_at
             FROM user_metrics ORDER BY date DESC"
        )?;

        let metrics = stmt.query_map([], row_to_metric)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(metrics)
    }

    pub fn get_metric(&self, date: &str) -> Result<Option<DailyMetric>> {
        let metric = self.conn
            .query_row(
                "SELECT date, height, weight, fat_percentage, height_record_id, weight_record_id, body_fat_record_id, updated_at
                 FROM user_metrics WHERE date = ?1",
                params![date],
                row_to_metric,
            )
            .optional()?;
        Ok(metric)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self.conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn save_rest_timer(&self, timer: &RestTimer) -> Result<()> {
        let json = serde_json::to_string(timer)?;
        self.set_setting(REST_TIMER_KEY, &json)
    }

    pub fn load_rest_timer(&self) -> Result<Option<RestTimer>> {
        match self.get_setting(REST_TIMER_KEY)? {
            Some(json) => {
                let timer = serde_json::from_str(&json).context("corrupt rest timer state")?;
                Ok(Some(timer))
            }
            None => Ok(None),
        }
    }

    pub fn clear_rest_timer(&self) -> Result<()> {
        self.delete_setting(REST_TIMER_KEY)
    }
}

fn upsert(conn: &Connection, date: &str, aggregate: &DailyAggregate) -> Result<()> {
    let height = aggregate.height_data.as_ref();
    let weight = aggregate.weight_data.as_ref();
    let body_fat = aggregate.body_fat_data.as_ref();

    conn.execute(
        "INSERT INTO user_metrics (date, height, weight, fat_percentage, height_record_id, weight_record_id, body_fat_record_id, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(date) DO UPDATE SET
            height = COALESCE(excluded.height, height),
            weight = COALESCE(excluded.weight, weight),
            fat_percentage = COALESCE(excluded.fat_percentage, fat_percentage),
            height_record_id = COALESCE(excluded.height_record_id, height_record_id),
            weight_record_id = COALESCE(excluded.weight_record_id, weight_record_id),
            body_fat_record_id = COALESCE(excluded.body_fat_record_id, body_fat_record_id),
            updated_at = excluded.updated_at",
        params![
            date,
            height.map(|r| r.measurement_meters),
            weight.map(|r| r.measurement_kilograms),
            body_fat.map(|r| r.percentage),
            height.map(|r| r.record_id.as_str()),
            weight.map(|r| r.record_id.as_str()),
            body_fat.map(|r| r.record_id.as_str()),
            Utc::now().to_rfc3339(),
        ],
    )?;
    debug!(date, fields = aggregate.populated_fields(), "upserted daily metrics");
    Ok(())
}

fn row_to_metric(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailyMetric> {
    let updated_str: String = row.get(7)?;
    Ok(DailyMetric {
        date: row.get(0)?,
        height: row.get(1)?,
        weight: row.get(2)?,
        fat_percentage: row.get(3)?,
        height_record_id: row.get(4)?,
        weight_record_id: row.get(5)?,
        body_fat_record_id: row.get(6)?,
        updated_at: DateTime::parse_from_rfc3339(&updated_str)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_records_by_date;
    use crate::health::{BodyFatRecord, HeightRecord, WeightRecord};

    fn memory_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    fn weight(id: &str, kg: f64, timestamp: &str) -> WeightRecord {
        WeightRecord {
            measurement_kilograms: kg,
            record_id: id.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    fn height(id: &str, meters: f64, timestamp: &str) -> HeightRecord {
        HeightRecord {
            measurement_meters: meters,
            record_id: id.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_empty_database() {
        let db = memory_db();
        assert!(db.get_metrics().unwrap().is_empty());
        assert!(db.get_metric("2023-07-12").unwrap().is_none());
    }

    #[test]
    fn test_upsert_all_one_row_per_date() {
        let mut db = memory_db();
        let h = height("h1", 1.8, "2023-07-10T12:00:00Z");
        let w = weight("w1", 80.0, "2023-07-12T12:00:00Z");
        let f = BodyFatRecord {
            percentage: 18.0,
            record_id: "f1".to_string(),
            timestamp: "2023-07-12T13:00:00Z".to_string(),
        };

        let written = db
            .upsert_all(&aggregate_records_by_date(Some(&h), Some(&w), Some(&f)))
            .unwrap();
        assert_eq!(written, 2);

        let metrics = db.get_metrics().unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].date, "2023-07-12"); // newest first
        assert_eq!(metrics[0].weight, Some(80.0));
        assert_eq!(metrics[0].fat_percentage, Some(18.0));
        assert_eq!(metrics[0].height, None);
        assert_eq!(metrics[1].height, Some(1.8));
        assert_eq!(metrics[1].height_record_id.as_deref(), Some("h1"));
    }

    #[test]
    fn test_upsert_keeps_existing_fields() {
        let db = memory_db();
        let first = aggregate_records_by_date(
            Some(&height("h1", 1.8, "2023-07-12T06:00:00Z")),
            Some(&weight("w1", 80.0, "2023-07-12T06:00:00Z")),
            None,
        );
        db.upsert_daily_aggregate("2023-07-12", &first["2023-07-12"]).unwrap();

        let second = aggregate_records_by_date(None, Some(&weight("w2", 79.4, "2023-07-12T20:00:00Z")), None);
        db.upsert_daily_aggregate("2023-07-12", &second["2023-07-12"]).unwrap();

        let metric = db.get_metric("2023-07-12").unwrap().unwrap();
        assert_eq!(metric.height, Some(1.8));
        assert_eq!(metric.weight, Some(79.4));
        assert_eq!(metric.weight_record_id.as_deref(), Some("w2"));
        assert_eq!(db.get_metrics().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_all_skips_empty() {
        let mut db = memory_db();
        let mut aggregates = BTreeMap::new();
        aggregates.insert("2023-07-12".to_string(), DailyAggregate::default());
        assert_eq!(db.upsert_all(&aggregates).unwrap(), 0);
        assert!(db.get_metrics().unwrap().is_empty());
    }

    #[test]
    fn test_rest_timer_persistence() {
        let db = memory_db();
        assert!(db.load_rest_timer().unwrap().is_none());

        let timer = RestTimer::start(Utc::now(), 90);
        db.save_rest_timer(&timer).unwrap();
        assert_eq!(db.load_rest_timer().unwrap(), Some(timer));

        db.clear_rest_timer().unwrap();
        assert!(db.load_rest_timer().unwrap().is_none());
    }
}
