//! Seedbed Metrics - instrumentation for build sessions
//!
//! Counts what a build did and how long its phases took. Everything here
//! vanishes when the `metrics` feature is disabled.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use seed_metrics::{BuildEvent, Counter, Phase, PhaseProfiler};
//!
//! let mut counter = Counter::new();
//! let mut profiler = PhaseProfiler::new();
//! profiler.time_phase(Phase::Evaluate, || { /* ... */ });
//! counter.increment(BuildEvent::EntitiesCreated, 1);
//! ```

mod events;
#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod phase_profiler;

pub use events::{BuildEvent, Phase};
#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Time a scope under a [`Phase`] (zero-cost when metrics disabled)
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $phase:expr, $body:block) => {{
        #[cfg(feature = "metrics")]
        let result = $profiler.time_phase($phase, || $body);
        #[cfg(not(feature = "metrics"))]
        let result = $body;
        result
    }};
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _event: BuildEvent, _by: usize) {}
    pub fn get(&self, _event: BuildEvent) -> usize { 0 }
    pub fn reset_all(&mut self) {}
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self { Self }
    pub fn time_phase<F, R>(&mut self, _phase: Phase, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn total(&self, _phase: Phase) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn runs(&self, _phase: Phase) -> usize { 0 }
    pub fn reset(&mut self) {}
}
