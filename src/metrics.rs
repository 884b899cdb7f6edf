//! Body metrics analytics over stored daily history

use crate::db::DailyMetric;

/// Body mass index, `None` for a non-positive height
pub fn bmi(weight_kg: f64, height_m: f64) -> Option<f64> {
    if height_m <= 0.0 {
        return None;
    }
    Some(weight_kg / (height_m * height_m))
}

/// Summary statistics over daily metrics
pub struct MetricsHistory {
    metrics: Vec<DailyMetric>,
}

impl MetricsHistory {
    /// Rows may arrive in any order; they are kept newest first
    pub fn new(mut metrics: Vec<DailyMetric>) -> Self {
        metrics.sort_by(|a, b| b.date.cmp(&a.date));
        Self { metrics }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn latest_weight(&self) -> Option<f64> {
        self.metrics.iter().find_map(|m| m.weight)
    }

    pub fn latest_height(&self) -> Option<f64> {
        self.metrics.iter().find_map(|m| m.height)
    }

    /// Newest weight minus oldest weight
    pub fn weight_change(&self) -> Option<f64> {
        let newest = self.latest_weight()?;
        let oldest = self.metrics.iter().rev().find_map(|m| m.weight)?;
        Some(newest - oldest)
    }

    pub fn average_body_fat(&self) -> Option<f64> {
        let values: Vec<f64> = self.metrics.iter().filter_map(|m| m.fat_percentage).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn current_bmi(&self) -> Option<f64> {
        bmi(self.latest_weight()?, self.latest_height()?)
    }
}
