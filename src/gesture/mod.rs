//! Gesture recognition
//!
//! Finger extraction, table lookup and temporal debouncing.

pub mod debounce;
pub mod fingers;
pub mod table;

pub use debounce::{Debounced, Debouncer};
pub use fingers::{Finger, FingerVector, FingerVectorParseError};
pub use table::{GestureDefinition, GestureTable, GestureTableError};
