//! Wall-clock time spent in each build phase

use crate::Phase;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PhaseTiming {
    total: Duration,
    runs: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PhaseProfiler {
    timings: [PhaseTiming; Phase::ALL.len()],
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, adding its duration to `phase`.
    pub fn time_phase<F, R>(&mut self, phase: Phase, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();

        let timing = &mut self.timings[phase as usize];
        timing.total += start.elapsed();
        timing.runs += 1;
        result
    }

    pub fn total(&self, phase: Phase) -> Duration {
        self.timings[phase as usize].total
    }

    /// How often `phase` has been entered.
    pub fn runs(&self, phase: Phase) -> usize {
        self.timings[phase as usize].runs
    }

    pub fn reset(&mut self) {
        self.timings = Default::default();
    }
}
