//! Comfort index formula.
//!
//! Weighted blend of temperature (50%), humidity (30%), and visibility
//! (20%) sub-scores. Ideal conditions: 22°C, 45% humidity, visibility
//! of 10 km or more.

/// Compute a comfort score in `[0, 100]` from current conditions.
///
/// Each sub-score is clamped into `[0, 100]` and the weights sum to
/// 1.0, so the rounded blend stays within bounds.
pub fn comfort_score(temp_c: f64, humidity_pct: f64, visibility_m: f64) -> u8 {
    // 22°C is perfect (100); ±10°C gives 70, ±20°C gives 40
    let t_score = (100.0 - (22.0 - temp_c).abs() * 3.0).max(0.0);

    // 45% is ideal (100); ±30% gives 55
    let h_score = (100.0 - (45.0 - humidity_pct).abs() * 1.5).max(0.0);

    // >10km is perfect (100); <1km gives 10
    let v_score = ((visibility_m / 1000.0) * 10.0).min(100.0);

    let blended = t_score * 0.5 + h_score * 0.3 + v_score * 0.2;
    blended.round() as u8
}
