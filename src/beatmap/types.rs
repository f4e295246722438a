// Beatmap timeline types
// Note events, timing points, and the parsed timeline that owns them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind code for a hit circle
pub const KIND_CIRCLE: i32 = 1;

/// Kind code for a slider
pub const KIND_SLIDER: i32 = 2;

/// A single timed note placement from the `[HitObjects]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Playfield x coordinate
    pub x: i32,

    /// Playfield y coordinate
    pub y: i32,

    /// Hit time in milliseconds from the start of the audio
    pub time: i32,

    /// Opaque object kind code, kept exactly as written in the map
    pub kind: i32,

    /// Raw hitsound field
    pub hitsound: String,

    /// Raw sixth field (slider path or hit sample), when present
    pub extras: Option<String>,

    /// Raw seventh field, when present
    pub slider_kind: Option<String>,
}

impl NoteEvent {
    /// Create an event with no optional fields
    pub fn new(x: i32, y: i32, time: i32, kind: i32) -> Self {
        NoteEvent {
            x,
            y,
            time,
            kind,
            hitsound: "0".to_string(),
            extras: None,
            slider_kind: None,
        }
    }

    /// Whether this event carries a real playfield position.
    /// Only the two literal codes count; this is not a bitmask test.
    pub fn has_position(&self) -> bool {
        self.kind == KIND_CIRCLE || self.kind == KIND_SLIDER
    }

    /// Coordinates used for spacing calculations.
    /// Events without a real position sit at the origin.
    pub fn position(&self) -> (f64, f64) {
        if self.has_position() {
            (self.x as f64, self.y as f64)
        } else {
            (0.0, 0.0)
        }
    }

    /// Planar distance to another event using `position()` for both ends
    pub fn distance_to(&self, other: &NoteEvent) -> f64 {
        let (x1, y1) = self.position();
        let (x2, y2) = other.position();
        ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
    }
}

/// Raw timing point record from the `[TimingPoints]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub offset: String,
    pub millis_per_beat: String,
    pub meter: Option<String>,
}

/// Parsed beatmap: section maps plus the ordered note timeline.
/// Events stay in source order and are never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub metadata: HashMap<String, String>,
    pub difficulty: HashMap<String, String>,
    pub timing_points: Vec<TimingPoint>,
    pub events: Vec<NoteEvent>,
}

impl Timeline {
    /// Number of note events in the timeline
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Look up a metadata value by key
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Look up a difficulty value by key
    pub fn difficulty_value(&self, key: &str) -> Option<&str> {
        self.difficulty.get(key).map(String::as_str)
    }
}
