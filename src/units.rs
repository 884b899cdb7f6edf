//! Unit conversions between metric and imperial for weight and height

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const KG_TO_LBS: f64 = 2.20462;
pub const METERS_PER_INCH: f64 = 0.0254;
pub const INCHES_PER_FOOT: u32 = 12;
pub const CM_PER_METER: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// Round half away from zero to the given number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * KG_TO_LBS
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / KG_TO_LBS
}

pub fn meters_to_cm(meters: f64) -> f64 {
    meters * CM_PER_METER
}

pub fn cm_to_meters(cm: f64) -> f64 {
    cm / CM_PER_METER
}

pub fn meters_to_inches(meters: f64) -> f64 {
    meters / METERS_PER_INCH
}

pub fn inches_to_meters(inches: f64) -> f64 {
    inches * METERS_PER_INCH
}

pub fn feet_to_meters(feet: f64) -> f64 {
    inches_to_meters(feet * f64::from(INCHES_PER_FOOT))
}

/// Split a height into whole feet and inches rounded to `decimals`.
/// Rounding happens before the split, so 5'11.96" at one decimal is 6'0"
/// and 5'11.5" at zero decimals is 6'0", never 5'12".
pub fn meters_to_feet_inches(meters: f64, decimals: u32) -> (u32, f64) {
    // Clear conversion noise first: 71.5" can come back as 71.49999999999999
    let total_inches = round_to(round_to(meters_to_inches(meters.max(0.0)), 6), decimals);
    let per_foot = f64::from(INCHES_PER_FOOT);
    let mut feet = (total_inches / per_foot).floor() as u32;
    let mut inches = round_to(total_inches - f64::from(feet) * per_foot, decimals);
    if inches >= per_foot {
        feet += 1;
        inches -= per_foot;
    }
    (feet, inches)
}

pub fn feet_inches_to_meters(feet: u32, inches: f64) -> f64 {
    inches_to_meters(f64::from(feet) * f64::from(INCHES_PER_FOOT) + inches)
}

/// A height typed in any accepted unit (`cm`, `in`, `ft`, `metric`,
/// `imperial`) as meters. Imperial means inches.
pub fn parse_height_to_meters(value: f64, unit: &str) -> Result<f64, UnitError> {
    match unit.trim().to_lowercase().as_str() {
        "ft" | "feet" => Ok(feet_to_meters(value)),
        other => Ok(other.parse::<HeightUnit>()?.convert_to_meters(value)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Metric,
    Imperial,
}

impl WeightUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Metric => "kg",
            WeightUnit::Imperial => "lbs",
        }
    }

    /// Kilograms into this unit
    pub fn convert_from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Metric => kg,
            WeightUnit::Imperial => kg_to_lbs(kg),
        }
    }

    /// A value in this unit back into kilograms
    pub fn convert_to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Metric => value,
            WeightUnit::Imperial => lbs_to_kg(value),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WeightUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "kg" | "kgs" => Ok(WeightUnit::Metric),
            "imperial" | "lb" | "lbs" => Ok(WeightUnit::Imperial),
            other => Err(UnitError::UnknownUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Metric,
    Imperial,
}

impl HeightUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            HeightUnit::Metric => "cm",
            HeightUnit::Imperial => "ft",
        }
    }

    /// Meters into this unit: centimeters or total inches
    pub fn convert_from_meters(&self, meters: f64) -> f64 {
        match self {
            HeightUnit::Metric => meters_to_cm(meters),
            HeightUnit::Imperial => meters_to_inches(meters),
        }
    }

    pub fn convert_to_meters(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Metric => cm_to_meters(value),
            HeightUnit::Imperial => inches_to_meters(value),
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for HeightUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "cm" => Ok(HeightUnit::Metric),
            "imperial" | "in" | "inches" => Ok(HeightUnit::Imperial),
            other => Err(UnitError::UnknownUnit(other.to_string())),
        }
    }
}
