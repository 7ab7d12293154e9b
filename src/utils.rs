/// Renders decimal hours as "{h}h {m}min", rounding to the nearest whole
/// minute first. Format only final aggregates: summing formatted values
/// compounds the per-call rounding.
pub fn format_hours_minutes(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    let h = total_minutes / 60;
    let min = total_minutes % 60;
    format!("{}h {}min", h, min)
}

/// Placeholder for a time field that has not been filled in.
pub fn display_time(value: &str) -> &str {
    if value.is_empty() {
        "--:--"
    } else {
        value
    }
}

pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
