//! First-hop delay measurement.
//!
//! The clamp-to-zero guard clauses are carried over verbatim from the
//! original `CalculatorService::calculateTimeDelta`: checking
//! `original <= 0 || current <= 0` before `current <= original` gives the
//! same externally observable answer as a saturating subtraction in every
//! case except `original <= 0`, where a saturating subtraction would
//! happily compute a (meaningless) positive delta against a non-positive
//! reference point.

use crate::record::{DelayTrack, ExtrapTrack};
use crate::time::now_micros;

/// Computes `current - original`, clamped to zero whenever either
/// timestamp is non-positive or the delta itself would be negative.
pub fn time_delta(original: i64, current: i64) -> i64 {
    if original <= 0 || current <= 0 {
        return 0;
    }
    if current <= original {
        return 0;
    }
    current - original
}

/// Fans an accepted `ExtrapTrack` out into a `DelayTrack`, stamping the
/// A→B hop delay against `recv_time` (the timestamp the receiver captured
/// at the moment the datagram actually arrived, not when it was dequeued
/// by the domain worker) and the B→C hop send time. Rejects invalid
/// input by returning `None`; the caller logs and drops it.
pub fn delay_calculate(input: &ExtrapTrack, recv_time: i64) -> Option<DelayTrack> {
    if !input.valid() {
        return None;
    }
    let first_hop_delay_time = time_delta(input.first_hop_sent_time, recv_time);
    let second_hop_sent_time = now_micros();
    Some(DelayTrack::from_extrap(input, first_hop_delay_time, second_hop_sent_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtrapTrack {
        ExtrapTrack {
            track_id: 7,
            vx: 1.0,
            vy: 2.0,
            vz: 3.0,
            px: 10.0,
            py: 20.0,
            pz: 30.0,
            original_update_time: 1_000,
            update_time: 1_000_000,
            first_hop_sent_time: now_micros() - 500,
        }
    }

    #[test]
    fn non_positive_sent_time_clamps_to_zero() {
        assert_eq!(time_delta(0, 1_000), 0);
        assert_eq!(time_delta(-5, 1_000), 0);
    }

    #[test]
    fn current_before_or_equal_original_clamps_to_zero() {
        assert_eq!(time_delta(1_000, 1_000), 0);
        assert_eq!(time_delta(1_000, 500), 0);
    }

    #[test]
    fn current_non_positive_clamps_to_zero_even_if_original_is_positive() {
        assert_eq!(time_delta(1_000, 0), 0);
        assert_eq!(time_delta(1_000, -1), 0);
    }

    #[test]
    fn ordinary_case_subtracts() {
        assert_eq!(time_delta(1_000, 1_500), 500);
    }

    #[test]
    fn delay_calculate_preserves_fields_and_computes_positive_delay() {
        let input = sample();
        let result = delay_calculate(&input, now_micros()).expect("valid input must produce a DelayTrack");
        assert_eq!(result.as_extrap_track(), input);
        assert!(result.first_hop_delay_time >= 0);
        assert!(result.second_hop_sent_time >= result.first_hop_sent_time);
    }

    #[test]
    fn delay_calculate_rejects_invalid_input() {
        let mut input = sample();
        input.track_id = -1;
        assert!(delay_calculate(&input, now_micros()).is_none());
    }
}
