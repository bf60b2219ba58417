//! Linear backoff between retry attempts.

use std::time::Duration;

/// Calculate the delay inserted after failed attempt `attempt` (1-based).
///
/// The delay grows linearly in the attempt number: `base_ms * attempt`.
/// Only timeouts and transport errors back off; HTTP-status failures
/// retry immediately, so callers never consult this for those.
pub fn linear_backoff(attempt: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(attempt as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_linearly_with_attempt() {
        assert_eq!(linear_backoff(1, 1000), Duration::from_millis(1000));
        assert_eq!(linear_backoff(2, 1000), Duration::from_millis(2000));
        assert_eq!(linear_backoff(3, 250), Duration::from_millis(750));
    }

    #[test]
    fn zero_base_means_no_delay() {
        assert_eq!(linear_backoff(5, 0), Duration::ZERO);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let d = linear_backoff(u32::MAX, u64::MAX);
        assert_eq!(d, Duration::from_millis(u64::MAX));
    }
}
