//! Hand landmark input
//!
//! The landmark extractor runs out of process. It emits one JSON document per
//! camera frame describing the detected hand as 21 pixel-space keypoints, or
//! nothing when no hand is visible. This module decodes that stream.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks produced per detected hand
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical landmark indices used by the finger extractor
pub mod index {
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// Single hand landmark in pixel coordinates (y grows downwards)
///
/// Serialized as a compact `[id, x, y]` triple. Fractional coordinates are
/// accepted on input and truncated towards zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u8, f64, f64)", into = "(u8, i32, i32)")]
pub struct Keypoint {
    /// Landmark identifier (0-20)
    pub id: u8,
    pub x: i32,
    pub y: i32,
}

impl Keypoint {
    pub fn new(id: u8, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }
}

impl From<(u8, f64, f64)> for Keypoint {
    fn from((id, x, y): (u8, f64, f64)) -> Self {
        Self {
            id,
            x: x as i32,
            y: y as i32,
        }
    }
}

impl From<Keypoint> for (u8, i32, i32) {
    fn from(k: Keypoint) -> Self {
        (k.id, k.x, k.y)
    }
}

/// Ordered landmarks of one detected hand
///
/// Well-formed observations hold exactly [`LANDMARK_COUNT`] keypoints. Other
/// lengths are kept as-is so the extractor can treat them as a reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandObservation {
    keypoints: Vec<Keypoint>,
}

impl HandObservation {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Whether the observation has the full landmark set
    pub fn is_well_formed(&self) -> bool {
        self.keypoints.len() == LANDMARK_COUNT
    }
}

/// Errors that end frame acquisition
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("landmark stream ended")]
    Exhausted,
    #[error("failed to read landmark stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-frame supplier of hand observations
pub trait LandmarkSource {
    /// Block until the next frame is available
    ///
    /// `Ok(None)` means the frame contained no hand.
    fn next_frame(&mut self) -> Result<Option<HandObservation>, CaptureError>;
}

/// One line of the landmark stream; other fields such as `frame` are ignored
#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    keypoints: Option<HandObservation>,
}

/// Landmark source reading newline-delimited JSON frames
///
/// A line that is not valid JSON (or not valid UTF-8) is logged and yields a
/// frame without a hand. Only failures of the underlying reader end the stream.
///
/// ```text
/// {"frame": 17, "keypoints": [[0, 312, 401], [1, 290, 380], ...]}
/// {"frame": 18, "keypoints": null}
/// ```
pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
    line_number: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<HandObservation>, CaptureError> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Err(CaptureError::Exhausted);
            }
            self.line_number += 1;

            if self.line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return match serde_json::from_slice::<FrameRecord>(&self.line) {
                Ok(record) => Ok(record.keypoints.filter(|hand| !hand.keypoints.is_empty())),
                Err(e) => {
                    tracing::warn!(line = self.line_number, "Undecodable landmark frame: {}", e);
                    Ok(None)
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(text: &str) -> JsonLinesSource<Cursor<Vec<u8>>> {
        JsonLinesSource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_keypoint_triple_format() {
        let k: Keypoint = serde_json::from_str("[4, 120, -3]").unwrap();
        assert_eq!(k, Keypoint::new(4, 120, -3));
        assert_eq!(serde_json::to_string(&k).unwrap(), "[4,120,-3]");
    }

    #[test]
    fn test_fractional_coordinates_truncated() {
        let k: Keypoint = serde_json::from_str("[4, 120.5, 300.0]").unwrap();
        assert_eq!(k, Keypoint::new(4, 120, 300));
        let k: Keypoint = serde_json::from_str("[8, -3.7, 99.99]").unwrap();
        assert_eq!(k, Keypoint::new(8, -3, 99));
    }

    #[test]
    fn test_float_frame_yields_hand() {
        let points: Vec<String> = (0..21).map(|i| format!("[{},{}.5,{}.25]", i, i * 10, i * 5)).collect();
        let mut src = source(&format!("{{\"keypoints\":[{}]}}\n", points.join(",")));
        let hand = src.next_frame().unwrap().unwrap();
        assert!(hand.is_well_formed());
        assert_eq!(hand.keypoints()[20], Keypoint::new(20, 200, 100));
    }

    #[test]
    fn test_reads_hand_and_empty_frames() {
        let points: Vec<String> = (0..21).map(|i| format!("[{},{},{}]", i, i * 10, i * 5)).collect();
        let text = format!(
            "{{\"frame\":1,\"keypoints\":[{}]}}\n{{\"frame\":2,\"keypoints\":null}}\n{{}}\n",
            points.join(",")
        );
        let mut src = source(&text);

        let hand = src.next_frame().unwrap().unwrap();
        assert!(hand.is_well_formed());
        assert_eq!(hand.keypoints()[20], Keypoint::new(20, 200, 100));

        assert!(src.next_frame().unwrap().is_none());
        assert!(src.next_frame().unwrap().is_none());
        assert!(matches!(src.next_frame(), Err(CaptureError::Exhausted)));
    }

    #[test]
    fn test_short_hand_is_passed_through() {
        let mut src = source("{\"keypoints\":[[0,1,2],[1,3,4]]}\n");
        let hand = src.next_frame().unwrap().unwrap();
        assert_eq!(hand.keypoints().len(), 2);
        assert!(!hand.is_well_formed());
    }

    #[test]
    fn test_blank_lines_skipped_and_garbage_is_no_hand() {
        let mut src = source("\n\n   \nnot json\n");
        assert!(src.next_frame().unwrap().is_none());
        assert_eq!(src.line_number(), 4);
        assert!(matches!(src.next_frame(), Err(CaptureError::Exhausted)));
    }

    #[test]
    fn test_invalid_utf8_line_is_no_hand() {
        let mut bytes = b"{\"keypoints\":null}\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe garbage\n");
        bytes.extend_from_slice(b"{\"keypoints\":null}\n");
        let mut src = JsonLinesSource::new(Cursor::new(bytes));

        assert!(src.next_frame().unwrap().is_none());
        assert!(src.next_frame().unwrap().is_none());
        assert!(src.next_frame().unwrap().is_none());
        assert_eq!(src.line_number(), 3);
        assert!(matches!(src.next_frame(), Err(CaptureError::Exhausted)));
    }

    #[test]
    fn test_empty_keypoint_list_is_no_hand() {
        let mut src = source("{\"keypoints\":[]}\n");
        assert!(src.next_frame().unwrap().is_none());
    }
}
