//! Display formatting for measurements

use crate::units::{HeightUnit, WeightUnit, meters_to_feet_inches, round_to};

/// Round and drop trailing zeros: 80.50 -> "80.5", 80.0 -> "80"
pub fn format_number(value: f64, max_decimals: u32) -> String {
    let rounded = round_to(value, max_decimals);
    let text = format!("{:.*}", max_decimals as usize, rounded);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };

    if text == "-0" { "0".to_string() } else { text }
}

pub fn format_weight(kg: f64, unit: WeightUnit) -> String {
    format!("{} {}", format_number(unit.convert_from_kg(kg), 2), unit.symbol())
}

pub fn format_height(meters: f64, unit: HeightUnit) -> String {
    match unit {
        HeightUnit::Metric => format!("{} cm", format_number(unit.convert_from_meters(meters), 1)),
        HeightUnit::Imperial => {
            let (feet, inches) = meters_to_feet_inches(meters, 0);
            format!("{}'{}\"", feet, format_number(inches, 0))
        }
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

/// Seconds as "45s", "1m 30s" or "1h 5m"
pub fn format_duration(secs: u32) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::inches_to_meters;

    #[test]
    fn test_format_number_trims() {
        assert_eq!(format_number(80.5, 2), "80.5");
        assert_eq!(format_number(80.0, 2), "80");
        assert_eq!(format_number(80.456, 2), "80.46");
        assert_eq!(format_number(1234.0, 0), "1234");
        assert_eq!(format_number(100.0, 0), "100");
    }

    #[test]
    fn test_format_number_negative_zero() {
        assert_eq!(format_number(-0.001, 1), "0");
        assert_eq!(format_number(-1.5, 1), "-1.5");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(80.5, WeightUnit::Metric), "80.5 kg");
        assert_eq!(format_weight(80.5, WeightUnit::Imperial), "177.47 lbs");
    }

    #[test]
    fn test_format_height() {
        assert_eq!(format_height(1.8, HeightUnit::Metric), "180 cm");
        assert_eq!(format_height(1.8034, HeightUnit::Imperial), "5'11\"");
    }

    #[test]
    fn test_format_height_carries_to_next_foot() {
        assert_eq!(format_height(inches_to_meters(71.5), HeightUnit::Imperial), "6'0\"");
        assert_eq!(format_height(inches_to_meters(59.6), HeightUnit::Imperial), "5'0\"");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(18.54), "18.5%");
        assert_eq!(format_percentage(20.0), "20%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3900), "1h 5m");
    }
}
