//! Finger extension state

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::{index, Keypoint, LANDMARK_COUNT};

/// Digits in vector order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Tip landmark and the joint two below it, for the vertical rule
    fn tip_and_pip(self) -> Option<(usize, usize)> {
        match self {
            Finger::Thumb => None,
            Finger::Index => Some((index::INDEX_TIP, index::INDEX_PIP)),
            Finger::Middle => Some((index::MIDDLE_TIP, index::MIDDLE_PIP)),
            Finger::Ring => Some((index::RING_TIP, index::RING_PIP)),
            Finger::Pinky => Some((index::PINKY_TIP, index::PINKY_PIP)),
        }
    }
}

/// Which digits are extended, ordered thumb, index, middle, ring, pinky
///
/// Written as a five character bit string, e.g. `"01100"` for a peace sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FingerVector([bool; 5]);

impl FingerVector {
    pub const fn new(extended: [bool; 5]) -> Self {
        Self(extended)
    }

    /// Derive the vector from one frame's landmarks
    ///
    /// Returns `None` unless exactly 21 keypoints are supplied. The thumb
    /// counts as extended when its tip lies left of the index knuckle; other
    /// fingers when the tip lies above the joint two below it.
    pub fn from_keypoints(keypoints: &[Keypoint]) -> Option<Self> {
        if keypoints.len() != LANDMARK_COUNT {
            return None;
        }

        let mut extended = [false; 5];
        for (slot, finger) in extended.iter_mut().zip(Finger::ALL) {
            *slot = match finger.tip_and_pip() {
                None => keypoints[index::THUMB_TIP].x < keypoints[index::INDEX_MCP].x,
                Some((tip, pip)) => keypoints[tip].y < keypoints[pip].y,
            };
        }
        Some(Self(extended))
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|&&e| e).count()
    }
}

impl fmt::Display for FingerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &e in &self.0 {
            f.write_str(if e { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerVectorParseError {
    #[error("finger vector must have 5 digits, got {0}")]
    Length(usize),
    #[error("finger vector digit must be 0 or 1, got {0:?}")]
    Digit(char),
}

impl FromStr for FingerVector {
    type Err = FingerVectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != 5 {
            return Err(FingerVectorParseError::Length(count));
        }
        let mut extended = [false; 5];
        for (slot, c) in extended.iter_mut().zip(s.chars()) {
            *slot = match c {
                '1' => true,
                '0' => false,
                other => return Err(FingerVectorParseError::Digit(other)),
            };
        }
        Ok(Self(extended))
    }
}

impl TryFrom<String> for FingerVector {
    type Error = FingerVectorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FingerVector> for String {
    fn from(v: FingerVector) -> Self {
        v.to_string()
    }
}
