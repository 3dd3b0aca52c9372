//! Thread-safe moving-average window over first-hop delay samples.
//!
//! Exposed as its own type rather than inlined into the finaliser: the
//! original keeps its analogous statistic behind synchronisation separate
//! from the worker that updates it, since external observers poll
//! `average()` from outside the worker's own thread.

use std::collections::VecDeque;

use parking_lot::Mutex;

struct State {
    samples: VecDeque<i64>,
    sum: i64,
}

/// Fixed-size FIFO window of `i64` samples with a running sum, so
/// `average()` is O(1) rather than re-summing on every read.
pub struct MovingAverage {
    window: usize,
    state: Mutex<State>,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "moving average window must be positive");
        Self {
            window,
            state: Mutex::new(State {
                samples: VecDeque::with_capacity(window),
                sum: 0,
            }),
        }
    }

    /// Appends `sample`, evicting the oldest if the window is full.
    pub fn push(&self, sample: i64) {
        let mut state = self.state.lock();
        state.samples.push_back(sample);
        state.sum += sample;
        if state.samples.len() > self.window {
            if let Some(evicted) = state.samples.pop_front() {
                state.sum -= evicted;
            }
        }
    }

    /// Current running average, or `0.0` on an empty window.
    pub fn average(&self) -> f64 {
        let state = self.state.lock();
        if state.samples.is_empty() {
            return 0.0;
        }
        state.sum as f64 / state.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.state.lock().samples.len()
    }
}
