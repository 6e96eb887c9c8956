//! Temporal debouncing of per-frame gesture observations
//!
//! A gesture is confirmed once it has been observed on `threshold`
//! consecutive frames. The confirmation latches: holding the gesture longer
//! produces nothing further until the observation changes or the hand is lost.

use std::num::NonZeroU32;
use std::sync::Arc;

use super::fingers::FingerVector;
use super::table::{GestureDefinition, GestureTable};

/// Result of feeding one observation to the [`Debouncer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Debounced {
    /// Nothing to act on this frame
    Idle,
    /// The gesture just reached the threshold for this streak
    Confirmed(GestureDefinition),
}

/// Streak tracker for a single hand
///
/// All transitions go through [`Debouncer::observe`].
#[derive(Debug, Clone)]
pub struct Debouncer {
    table: Arc<GestureTable>,
    threshold: NonZeroU32,
    /// Key of the current streak, `None` after a reset
    last: Option<FingerVector>,
    /// Consecutive frames in the current streak
    count: u32,
    /// Whether the current streak already produced a confirmation
    fired: bool,
}

impl Debouncer {
    pub fn new(table: Arc<GestureTable>, threshold: NonZeroU32) -> Self {
        Self {
            table,
            threshold,
            last: None,
            count: 0,
            fired: false,
        }
    }

    /// Advance the state machine by one frame
    ///
    /// `None` means no usable hand this frame and resets the streak.
    pub fn observe(&mut self, observation: Option<FingerVector>) -> Debounced {
        let Some(fingers) = observation else {
            self.last = None;
            self.count = 0;
            self.fired = false;
            return Debounced::Idle;
        };

        if self.last == Some(fingers) {
            self.count = self.count.saturating_add(1);
        } else {
            self.last = Some(fingers);
            self.count = 1;
            self.fired = false;
        }

        if self.fired || self.count != self.threshold.get() {
            return Debounced::Idle;
        }

        match self.table.classify(fingers) {
            Some(gesture) => {
                self.fired = true;
                Debounced::Confirmed(gesture.clone())
            }
            None => Debounced::Idle,
        }
    }

    /// Finger vector of the current streak
    pub fn current(&self) -> Option<FingerVector> {
        self.last
    }

    /// Length of the current streak
    pub fn streak(&self) -> u32 {
        self.count
    }

    /// Whether the current streak has already fired
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn threshold(&self) -> NonZeroU32 {
        self.threshold
    }

    pub fn table(&self) -> &GestureTable {
        &self.table
    }
}
