//! Constant-velocity extrapolation from `Track`: fans one 8 Hz
//! input out to `N = floor(T_in/T_out)` 100 Hz outputs, pacing emissions
//! with `spin_sleep` so no single burst saturates the outbound queue.

use std::time::Duration;

use spin_sleep::SpinSleeper;

use crate::record::{ExtrapTrack, Track};
use crate::time::now_micros;

/// A quality-of-service pacing delay between successive emissions of the
/// same input track. Never allowed to exceed `T_out`.
const PACE: Duration = Duration::from_millis(10);

pub struct Extrapolator {
    t_in: f64,
    t_out: f64,
    outputs_per_input: usize,
    sleeper: SpinSleeper,
}

impl Extrapolator {
    pub fn new(f_in: f64, f_out: f64) -> Self {
        let t_in = 1.0 / f_in;
        let t_out = 1.0 / f_out;
        let outputs_per_input = ((t_in / t_out).floor() as usize).max(1);
        Self {
            t_in,
            t_out,
            outputs_per_input,
            sleeper: SpinSleeper::default(),
        }
    }

    /// Produces the `N` `ExtrapTrack`s this input yields and calls `emit`
    /// for each, pacing the calls by up to [`PACE`] (capped at `T_out`, which
    /// the pacing delay must never exceed).
    pub fn extrapolate<F: FnMut(ExtrapTrack)>(&self, input: &Track, mut emit: F) {
        let pace = PACE.min(Duration::from_secs_f64(self.t_out));

        for k in 0..self.outputs_per_input {
            let dt = k as f64 * self.t_out;
            let track = ExtrapTrack {
                track_id: input.track_id,
                vx: input.vx,
                vy: input.vy,
                vz: input.vz,
                px: input.px + input.vx * dt,
                py: input.py + input.vy * dt,
                pz: input.pz + input.vz * dt,
                original_update_time: input.original_update_time,
                update_time: input.original_update_time * 1000 + (dt * 1e6).round() as i64,
                first_hop_sent_time: now_micros(),
            };
            emit(track);

            if k + 1 < self.outputs_per_input {
                self.sleeper.sleep(pace);
            }
        }
    }

    /// `N` for the configured rate pair; exposed for tests and for sizing
    /// the inbound queue's expected burst.
    pub fn outputs_per_input(&self) -> usize {
        self.outputs_per_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Track {
        Track {
            track_id: 1234,
            vx: 1.0,
            vy: -2.0,
            vz: 0.5,
            px: 100.0,
            py: 200.0,
            pz: 300.0,
            original_update_time: 1_700_000_000_000,
        }
    }

    #[test]
    fn default_rates_yield_twelve_outputs() {
        let extrap = Extrapolator::new(8.0, 100.0);
        assert_eq!(extrap.outputs_per_input(), 12);
    }

    #[test]
    fn positions_propagate_at_constant_velocity() {
        let extrap = Extrapolator::new(8.0, 100.0);
        let input = sample_track();
        let mut outputs = Vec::new();
        extrap.extrapolate(&input, |t| outputs.push(t));

        assert_eq!(outputs.len(), 12);
        assert_eq!(outputs[0].px, input.px);
        let last = outputs.last().unwrap();
        let dt = 11.0 / 100.0;
        assert!((last.px - (input.px + input.vx * dt)).abs() < 1e-9);
        assert!((last.py - (input.py + input.vy * dt)).abs() < 1e-9);
    }

    #[test]
    fn velocity_and_track_id_carry_unchanged() {
        let extrap = Extrapolator::new(8.0, 100.0);
        let input = sample_track();
        let mut outputs = Vec::new();
        extrap.extrapolate(&input, |t| outputs.push(t));
        for out in &outputs {
            assert_eq!(out.track_id, input.track_id);
            assert_eq!(out.vx, input.vx);
            assert_eq!(out.vy, input.vy);
            assert_eq!(out.vz, input.vz);
        }
    }

    #[test]
    fn zero_velocity_yields_identical_positions() {
        let extrap = Extrapolator::new(8.0, 100.0);
        let mut input = sample_track();
        input.vx = 0.0;
        input.vy = 0.0;
        input.vz = 0.0;
        let mut outputs = Vec::new();
        extrap.extrapolate(&input, |t| outputs.push(t));
        for out in &outputs {
            assert_eq!(out.px, input.px);
            assert_eq!(out.py, input.py);
            assert_eq!(out.pz, input.pz);
        }
    }

    #[test]
    fn output_rate_not_exceeding_input_rate_yields_one_output() {
        let extrap = Extrapolator::new(8.0, 4.0);
        let input = sample_track();
        let mut outputs = Vec::new();
        extrap.extrapolate(&input, |t| outputs.push(t));
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].px, input.px);
    }

    #[test]
    fn update_time_promotes_milliseconds_to_microseconds() {
        let extrap = Extrapolator::new(8.0, 100.0);
        let input = sample_track();
        let mut outputs = Vec::new();
        extrap.extrapolate(&input, |t| outputs.push(t));
        assert_eq!(outputs[0].update_time, input.original_update_time * 1000);
        let dt = 1.0 / 100.0;
        assert_eq!(
            outputs[1].update_time,
            input.original_update_time * 1000 + (dt * 1e6).round() as i64
        );
    }
}
