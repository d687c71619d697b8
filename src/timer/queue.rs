//! FIFO queue of phases for the current run

use std::collections::VecDeque;

use super::PhaseSpec;

/// Ordered phases; insertion order is processing order
#[derive(Debug, Clone, Default)]
pub struct PhaseQueue {
    phases: VecDeque<PhaseSpec>,
}

impl PhaseQueue {
    pub fn new() -> Self {
        Self {
            phases: VecDeque::new(),
        }
    }

    /// Append a phase to the tail
    pub fn push(&mut self, phase: PhaseSpec) {
        self.phases.push_back(phase);
    }

    /// Remove and return the head, `None` when empty
    pub fn pop(&mut self) -> Option<PhaseSpec> {
        self.phases.pop_front()
    }

    /// Return the head without removing it
    pub fn peek(&self) -> Option<&PhaseSpec> {
        self.phases.front()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn count(&self) -> usize {
        self.phases.len()
    }

    pub fn clear(&mut self) {
        self.phases.clear();
    }

    /// Clear and refill from a template sequence, preserving its order
    pub fn refill(&mut self, template: &[PhaseSpec]) {
        self.clear();
        for phase in template {
            self.push(phase.clone());
        }
    }
}
