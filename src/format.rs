//! Display helpers for report values.

use serde::Serialize;

use crate::raster::DepthStats;

/// Square meters to square kilometers.
#[inline]
pub fn square_meter_to_kilometer(value: f64) -> f64 { value / 1_000_000.0 }

/// Round to a whole number with thousands separators. Values between zero
/// and `lower` show as "< lower" instead of rounding down to zero.
pub fn round_lower(value: f64, lower: f64) -> String {
    if value.is_nan() { return "N/A".into() }
    if value > 0.0 && value < lower { return format!("< {lower}") }
    group_thousands(value.round() as i64)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 { out.push('-') }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(',') }
        out.push(c);
    }
    out
}

/// Fraction as a percent string with one decimal at most, clamping the edges:
/// "0%", "< 0.1%", "> 99.9%". Absent values show as "N/A".
pub fn percent_with_edge(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| !v.is_nan()) else { return "N/A".into() };

    if value == 0.0 { return "0%".into() }
    if value > 0.0 && value < 0.001 { return "< 0.1%".into() }
    if value > 0.999 && value < 1.0 { return "> 99.9%".into() }

    let text = format!("{:.1}", value * 100.0);
    format!("{}%", text.strip_suffix(".0").unwrap_or(&text))
}

/// Elevation as a depth label: "-12m" below sea level, "0m" otherwise.
pub fn format_depth(elevation: f64) -> String {
    let depth = elevation.round();
    if depth.is_nan() || depth >= 0.0 { return "0m".into() }
    format!("-{}m", depth.abs())
}

/// Depth labels for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthRange {
    /// Shallowest depth.
    pub min: String,
    pub mean: Option<String>,
    /// Deepest depth.
    pub max: String,
}

impl DepthStats {
    /// Labels for the depth range. The shallowest point is the highest
    /// elevation, so the displayed minimum comes from `max` and vice versa.
    pub fn display_range(&self) -> DepthRange {
        let label = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), format_depth);
        DepthRange {
            min: label(self.max),
            mean: self.mean.filter(|m| *m != 0.0).map(format_depth),
            max: label(self.min),
        }
    }
}
