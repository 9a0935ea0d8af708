//! Per-event tallies of a build session

use crate::BuildEvent;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    tallies: [usize; BuildEvent::ALL.len()],
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, event: BuildEvent, by: usize) {
        self.tallies[event as usize] += by;
    }

    pub fn get(&self, event: BuildEvent) -> usize {
        self.tallies[event as usize]
    }

    pub fn reset_all(&mut self) {
        self.tallies = Default::default();
    }
}
