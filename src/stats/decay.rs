//! Exponential temporal decay: an observation's weight halves every `half_life`.

use chrono::{DateTime, Utc};

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `0.5 ^ (age / half_life)`
///
/// - age 0 -> 1.0, age == half_life -> 0.5, age == 2 * half_life -> 0.25
/// - negative age (future timestamp, clock skew) is clamped to 0 and gives 1.0
/// - a non-positive or non-finite half-life disables decay (1.0)
pub fn temporal_decay(age: f64, half_life: f64) -> f64 {
    if !(half_life.is_finite() && half_life > 0.0) || age.is_nan() {
        return 1.0;
    }
    let age = age.max(0.0);
    0.5f64.powf(age / half_life)
}

/// `value * temporal_decay(age_days, half_life)`
pub fn weighted_score(value: f64, age_days: f64, half_life: f64) -> f64 {
    value * temporal_decay(age_days, half_life)
}

/// Fractional days from `then` to `now`; negative when `then` is in the future
pub fn age_in_days(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(then);
    elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}
