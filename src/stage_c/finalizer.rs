//! Second-hop delay, total delay, and the moving-average feed.

use std::sync::Arc;

use crate::record::{DelayTrack, FinalTrack};
use crate::stage_b::delay_calculator::time_delta;
use crate::stage_c::moving_average::MovingAverage;
use crate::time::now_micros;

pub struct Finalizer {
    moving_average: Arc<MovingAverage>,
}

impl Finalizer {
    pub fn new(moving_average: Arc<MovingAverage>) -> Self {
        Self { moving_average }
    }

    /// Fans an accepted `DelayTrack` out into a `FinalTrack`, computing the
    /// B→C hop delay and the end-to-end total, and folds the A→B delay
    /// into the moving-average window. Rejects invalid
    /// input by returning `None`.
    pub fn finalize(&self, input: &DelayTrack) -> Option<FinalTrack> {
        if !input.valid() {
            return None;
        }
        let now = now_micros();
        let second_hop_delay_time = time_delta(input.second_hop_sent_time, now);
        let total_delay_time = input.first_hop_delay_time + second_hop_delay_time;

        self.moving_average.push(input.first_hop_delay_time);

        Some(FinalTrack::from_delay(input, second_hop_delay_time, total_delay_time, now))
    }

    pub fn average_first_hop_delay(&self) -> f64 {
        self.moving_average.average()
    }
}
