//! Synthetic temperature trend for dashboard charts.
//!
//! Deterministic per (temperature, city name) pair so repeated reads
//! draw the same line. This is a visualization aid, not a forecast.

/// Number of days in a trend sequence.
pub const TREND_DAYS: usize = 7;

/// Lower bound for trend values, in °C.
const TREND_MIN_C: f64 = -10.0;
/// Upper bound for trend values, in °C.
const TREND_MAX_C: f64 = 45.0;

/// Generate a 7-day synthetic temperature sequence around the current
/// temperature, seeded by the city name.
pub fn temperature_trend(current_temp_c: f64, city_name: &str) -> Vec<f64> {
    let seed = name_seed(city_name);

    (0..TREND_DAYS)
        .map(|day| {
            let i = day as f64;

            // Sine wave for weekly variation
            let base_pattern = (i * 0.8).sin() * 3.0;

            // City-specific drift derived from the name seed
            let city_variation = (seed * 0.01 * i) % 4.0 - 2.0;

            // Day-to-day fluctuation, still a pure function of the seed
            let daily_fluctuation = (seed + i).sin() * 1.5;

            let raw = current_temp_c + base_pattern + city_variation + daily_fluctuation;
            round_one_decimal(raw.clamp(TREND_MIN_C, TREND_MAX_C))
        })
        .collect()
}

/// Sum of the name's UTF-16 code units, mod 100.
fn name_seed(city_name: &str) -> f64 {
    let hash: u32 = city_name.encode_utf16().map(u32::from).sum();
    f64::from(hash % 100)
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
