//! Completion accuracy.

/// Percentage of fired opportunities that were confirmed, rounded to the
/// nearest whole percent and clamped to `[0, 100]`.
///
/// Zero opportunities means 0, not a division error. The clamp guards
/// against historical data where completions outran opportunities.
pub fn accuracy(total_completions: u64, total_opportunities: u64) -> u8 {
    if total_opportunities == 0 {
        return 0;
    }
    let pct = (100.0 * total_completions as f64 / total_opportunities as f64).round();
    pct.clamp(0.0, 100.0) as u8
}
