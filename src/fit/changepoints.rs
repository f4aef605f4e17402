//! Changepoint placement.
//!
//! Potential changepoints sit on observed timestamps, evenly spaced by index
//! across the first `changepoint_range` share of the history. The first
//! observation is never a changepoint. Short histories get fewer of them; a
//! history too short to hold one gets none.

/// Place up to `max_changepoints` changepoints over scaled history times `t`.
///
/// `t` must be sorted ascending.
pub fn place_changepoints(t: &[f64], max_changepoints: usize, changepoint_range: f64) -> Vec<f64> {
    let range = changepoint_range.clamp(0.0, 1.0);
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let n = max_changepoints.min(hist_size.saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    (1..=n)
        .map(|i| {
            let idx = (last * i as f64 / n as f64).round() as usize;
            t[idx]
        })
        .collect()
}
