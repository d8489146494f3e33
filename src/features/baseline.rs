/// Calendar factors behind the expected-demand baseline

use chrono::{Datelike, NaiveDate};

use crate::config::BaselineRules;
use crate::core::Observation;

/// Mean quantity per weekday divided by the overall mean, Monday first.
///
/// A weekday with no samples, or an all-zero history, gets a neutral 1.0.
pub fn day_of_week_factors(history: &[Observation], overall_mean: f64) -> [f64; 7] {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for obs in history {
        let day = obs.date.weekday().num_days_from_monday() as usize;
        sums[day] += obs.quantity;
        counts[day] += 1;
    }

    let mut factors = [1.0f64; 7];
    if overall_mean <= 0.0 {
        return factors;
    }
    for day in 0..7 {
        if counts[day] > 0 {
            factors[day] = (sums[day] / counts[day] as f64) / overall_mean;
        }
    }
    factors
}

/// Late-month payday window: quantities there get a fixed boost.
pub fn is_payday_window(date: NaiveDate, rules: &BaselineRules) -> bool {
    let day = date.day();
    day >= rules.payday_start_day || day <= rules.payday_end_day
}

/// Mid-month soft patch between paydays.
pub fn is_midmonth_dip(date: NaiveDate, rules: &BaselineRules) -> bool {
    let day = date.day();
    day >= rules.midmonth_dip_start && day <= rules.midmonth_dip_end
}
