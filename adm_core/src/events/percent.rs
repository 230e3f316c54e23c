/// Denominator offset for the unknown-total estimate. At 1 MiB received the
/// estimate reads 50%, approaching (never reaching) 100% as bytes grow.
const UNKNOWN_TOTAL_SCALE: f64 = 1024.0 * 1024.0;

/// Map received bytes to a completion percent.
///
/// With a known nonzero total this is the exact ratio, clamped to [0,100].
/// Without one (or with a zero total) it falls back to a saturating estimate
/// so progress still advances visibly: monotonic in `loaded`, bounded below
/// 100.
pub fn percent_complete(loaded: u64, total: Option<u64>) -> f64 {
    match total {
        Some(total) if total > 0 => ((loaded as f64 / total as f64) * 100.0).clamp(0.0, 100.0),
        _ => {
            let loaded = loaded as f64;
            (loaded / (loaded + UNKNOWN_TOTAL_SCALE)) * 100.0
        }
    }
}
