//! Gesture table
//!
//! Exact-match lookup from finger vectors to named gestures. The table is
//! built once at startup and shared read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fingers::FingerVector;

/// A recognizable gesture and the action it triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureDefinition {
    /// Finger pattern that identifies the gesture
    pub fingers: FingerVector,
    /// Human readable gesture name
    pub name: String,
    /// Label relayed to the actuators when the gesture is confirmed
    pub action: String,
}

impl GestureDefinition {
    pub fn new(fingers: FingerVector, name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            fingers,
            name: name.into(),
            action: action.into(),
        }
    }

    /// Canonical gestures recognized out of the box
    pub fn canonical() -> Vec<GestureDefinition> {
        [
            ([true, true, true, true, true], "Open Palm"),
            ([false, false, false, false, false], "Closed Fist"),
            ([true, false, false, false, false], "Thumbs Up"),
            ([false, true, false, false, false], "Pointing"),
            ([false, true, true, false, false], "Peace Sign"),
        ]
        .into_iter()
        .map(|(bits, name)| GestureDefinition::new(FingerVector::new(bits), name, name))
        .collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GestureTableError {
    #[error("finger pattern {fingers} is mapped to both {first:?} and {second:?}")]
    DuplicateKey {
        fingers: FingerVector,
        first: String,
        second: String,
    },
}

/// Immutable finger-vector to gesture mapping
#[derive(Debug, Clone)]
pub struct GestureTable {
    gestures: HashMap<FingerVector, GestureDefinition>,
}

impl GestureTable {
    /// Build a table, rejecting two definitions for the same finger vector
    pub fn new(definitions: impl IntoIterator<Item = GestureDefinition>) -> Result<Self, GestureTableError> {
        let mut gestures: HashMap<FingerVector, GestureDefinition> = HashMap::new();
        for def in definitions {
            if let Some(existing) = gestures.get(&def.fingers) {
                return Err(GestureTableError::DuplicateKey {
                    fingers: def.fingers,
                    first: existing.name.clone(),
                    second: def.name,
                });
            }
            gestures.insert(def.fingers, def);
        }
        Ok(Self { gestures })
    }

    /// Look up the gesture for an exact finger vector
    pub fn classify(&self, fingers: FingerVector) -> Option<&GestureDefinition> {
        self.gestures.get(&fingers)
    }

    pub fn contains(&self, fingers: FingerVector) -> bool {
        self.gestures.contains_key(&fingers)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }
}

impl Default for GestureTable {
    fn default() -> Self {
        Self {
            gestures: GestureDefinition::canonical()
                .into_iter()
                .map(|def| (def.fingers, def))
                .collect(),
        }
    }
}
