//! Formatting helpers for presenting weights and scores.

/// Fraction in `[0, 1]` rendered as a percentage with two decimals.
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return "—".to_string();
    }
    format!("{:.2}%", fraction * 100.0)
}

/// Value that is already a percentage (e.g. an acceptance rate).
pub fn format_rate(percent: f64) -> String {
    if !percent.is_finite() {
        return "—".to_string();
    }
    format!("{percent:.2}%")
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    format!("{value:.decimals$}")
}

pub fn format_seconds(ms: u64) -> String {
    let seconds = ms as f64 / 1000.0;
    if ms % 1000 == 0 {
        format!("{seconds:.0} s")
    } else {
        format!("{seconds:.1} s")
    }
}
