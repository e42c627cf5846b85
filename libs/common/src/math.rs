//! Integer window and accrual helpers used by the estimation engine.

use alloy_primitives::U256;

/// Seconds two half-open windows `[start, end)` overlap, zero when disjoint.
pub fn window_overlap_secs(start_a: u64, end_a: u64, start_b: u64, end_b: u64) -> u64 {
    let start = start_a.max(start_b);
    let end = end_a.min(end_b);
    end.saturating_sub(start)
}

/// Amount accrued by a fixed-point per-second rate over whole seconds.
///
/// Saturates at `U256::MAX`; real stream rates never get close.
pub fn accrued(amount_per_sec: U256, secs: u64) -> U256 {
    amount_per_sec
        .checked_mul(U256::from(secs))
        .unwrap_or(U256::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_overlap() {
        assert_eq!(window_overlap_secs(0, 100, 40, 60), 20);
        assert_eq!(window_overlap_secs(40, 60, 0, 100), 20);
        assert_eq!(window_overlap_secs(0, 50, 50, 100), 0);
        assert_eq!(window_overlap_secs(0, 50, 60, 100), 0);
        assert_eq!(window_overlap_secs(10, 20, 10, 20), 10);
    }

    #[test]
    fn test_window_overlap_inverted_bounds() {
        assert_eq!(window_overlap_secs(100, 0, 0, 100), 0);
    }

    #[test]
    fn test_accrued() {
        assert_eq!(accrued(U256::from(3u64), 100), U256::from(300u64));
        assert_eq!(accrued(U256::ZERO, 100), U256::ZERO);
        assert_eq!(accrued(U256::from(5u64), 0), U256::ZERO);
    }

    #[test]
    fn test_accrued_saturates() {
        assert_eq!(accrued(U256::MAX, 2), U256::MAX);
    }
}
