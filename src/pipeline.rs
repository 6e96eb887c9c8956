//! Frame-driven control loop
//!
//! Each frame runs extraction, debouncing and, on confirmation, dispatch to
//! completion before the next frame is requested. Sink calls block the loop.

use crate::actuators::{ActionDispatcher, DispatchReport};
use crate::gesture::{Debounced, Debouncer, FingerVector, GestureDefinition};
use crate::landmarks::{CaptureError, HandObservation, LandmarkSource};

/// What a single frame produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No usable hand; the streak was reset
    NoHand,
    /// A hand was seen but nothing fired
    Observed(FingerVector),
    /// A gesture was confirmed and dispatched
    Dispatched {
        gesture: GestureDefinition,
        report: DispatchReport,
    },
}

/// Totals for one run of the control loop
#[derive(Debug)]
pub struct RunSummary {
    pub frames: u64,
    pub confirmations: u64,
    /// Individual sink deliveries that failed
    pub failed_sends: u64,
    /// Capture condition that ended the loop
    pub ended_by: CaptureError,
}

/// Debouncer plus actuators, owned by the control loop
pub struct GesturePipeline {
    debouncer: Debouncer,
    dispatcher: ActionDispatcher,
}

impl GesturePipeline {
    pub fn new(debouncer: Debouncer, dispatcher: ActionDispatcher) -> Self {
        Self { debouncer, dispatcher }
    }

    /// Process one frame's observation
    pub fn process(&mut self, observation: Option<&HandObservation>) -> FrameOutcome {
        let fingers = observation.and_then(|hand| FingerVector::from_keypoints(hand.keypoints()));
        if let Some(hand) = observation {
            if fingers.is_none() {
                tracing::debug!(landmarks = hand.keypoints().len(), "Malformed hand observation");
            }
        }

        match self.debouncer.observe(fingers) {
            Debounced::Confirmed(gesture) => {
                tracing::info!("Gesture: {}", gesture.name);
                tracing::info!("Action: {}", gesture.action);
                let report = self.dispatcher.dispatch(&gesture.action);
                FrameOutcome::Dispatched { gesture, report }
            }
            Debounced::Idle => match fingers {
                Some(v) => FrameOutcome::Observed(v),
                None => FrameOutcome::NoHand,
            },
        }
    }

    /// Pull frames until the source fails or runs dry
    pub fn run<S: LandmarkSource + ?Sized>(&mut self, source: &mut S) -> RunSummary {
        let mut frames = 0u64;
        let mut confirmations = 0u64;
        let mut failed_sends = 0u64;

        let ended_by = loop {
            let observation = match source.next_frame() {
                Ok(observation) => observation,
                Err(e) => break e,
            };
            frames += 1;

            if let FrameOutcome::Dispatched { report, .. } = self.process(observation.as_ref()) {
                confirmations += 1;
                failed_sends += report.failures() as u64;
            }
        };

        match &ended_by {
            CaptureError::Exhausted => tracing::info!(frames, confirmations, "Landmark stream ended"),
            CaptureError::Io(e) => tracing::error!(frames, confirmations, "Failed to capture frame: {}. Exiting...", e),
        }

        RunSummary {
            frames,
            confirmations,
            failed_sends,
            ended_by,
        }
    }

    /// Show a status message on the display
    pub fn announce(&mut self, text: &str) {
        self.dispatcher.announce(text);
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}
