// Pattern profiles
// Jump and stream configurations over the shared run detector

use serde::{Deserialize, Serialize};

use super::runs::{RunDetectorConfig, SpatialGate};

/// Pattern style a profile describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Half-beat notes with large spacing between them
    Jump,

    /// Quarter-beat notes regardless of spacing
    Stream,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Jump => "jump",
            PatternKind::Stream => "stream",
        }
    }
}

/// Lower bounds of the short, medium and long run buckets.
/// Short is `[short_min, medium_min)`, medium is `[medium_min, long_min)`,
/// long is `>= long_min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunBuckets {
    pub short_min: usize,
    pub medium_min: usize,
    pub long_min: usize,
}

/// Weights of the confidence formula terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub density: f64,
    pub consistency: f64,
    pub variety: f64,
    pub long_ratio: f64,
    pub run_length: f64,

    /// Average run length that saturates the run length term
    pub run_length_norm: f64,
}

/// Complete configuration for one pattern style
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
    pub kind: PatternKind,

    /// Notes per beat: the expected interval is one beat divided by this
    pub beat_divisor: f64,

    /// Allowed relative deviation from the expected interval
    pub tolerance_ratio: f64,

    /// Optional minimum spacing between the notes of a pair
    pub spatial_gate: Option<SpatialGate>,

    pub buckets: RunBuckets,

    /// Shortest run that counts toward note totals and the longest run
    pub counted_min: usize,

    pub weights: ScoreWeights,
}

/// Milliseconds per beat at the given tempo
pub fn beat_length(bpm: f64) -> f64 {
    60000.0 / bpm
}

impl PatternProfile {
    /// Half-beat runs with at least 120 units between notes
    pub fn jump() -> Self {
        PatternProfile {
            kind: PatternKind::Jump,
            beat_divisor: 2.0,
            tolerance_ratio: 0.1,
            spatial_gate: Some(SpatialGate { min_distance: 120.0 }),
            buckets: RunBuckets {
                short_min: 4,
                medium_min: 7,
                long_min: 12,
            },
            counted_min: 2,
            weights: ScoreWeights {
                density: 0.4,
                consistency: 0.2,
                variety: 0.35,
                long_ratio: 0.45,
                run_length: 0.3,
                run_length_norm: 3.0,
            },
        }
    }

    /// Quarter-beat runs; anything shorter than six pairs is a burst
    pub fn stream() -> Self {
        PatternProfile {
            kind: PatternKind::Stream,
            beat_divisor: 4.0,
            tolerance_ratio: 0.1,
            spatial_gate: None,
            buckets: RunBuckets {
                short_min: 6,
                medium_min: 10,
                long_min: 20,
            },
            counted_min: 6,
            weights: ScoreWeights {
                density: 0.3,
                consistency: 0.2,
                variety: 0.2,
                long_ratio: 0.2,
                run_length: 0.2,
                run_length_norm: 5.0,
            },
        }
    }

    /// Built-in profile for a pattern kind
    pub fn for_kind(kind: PatternKind) -> Self {
        match kind {
            PatternKind::Jump => Self::jump(),
            PatternKind::Stream => Self::stream(),
        }
    }

    /// Expected interval between notes in milliseconds. `bpm` must be positive.
    pub fn expected_interval(&self, bpm: f64) -> f64 {
        beat_length(bpm) / self.beat_divisor
    }

    /// Run detector configuration at the given tempo
    pub fn detector_config(&self, bpm: f64) -> RunDetectorConfig {
        RunDetectorConfig {
            expected_interval: self.expected_interval(bpm),
            tolerance_ratio: self.tolerance_ratio,
            spatial_gate: self.spatial_gate,
        }
    }
}
