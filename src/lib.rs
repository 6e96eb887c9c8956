//! Gesture Relay - debounced hand gestures driving physical actuators
//!
//! Consumes a stream of per-frame hand landmarks, turns each frame into a
//! finger-extension vector, and fires a gesture's action exactly once after it
//! has been held steady for a configured number of frames. Confirmed actions
//! are relayed to a text display, a speech synthesizer and a serial-attached
//! microcontroller.

pub mod actuators;
pub mod gesture;
pub mod landmarks;
pub mod pipeline;
pub mod settings;
pub mod telemetry;

pub use actuators::{ActionDispatcher, DispatchReport, Sink, SinkError, SinkKind, SinkOutcome};
pub use gesture::{Debounced, Debouncer, FingerVector, GestureDefinition, GestureTable};
pub use landmarks::{CaptureError, HandObservation, JsonLinesSource, Keypoint, LandmarkSource};
pub use pipeline::{FrameOutcome, GesturePipeline, RunSummary};
pub use settings::{Settings, SettingsError};
