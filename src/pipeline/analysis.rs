// Map analysis
// Parses a map once and runs both pattern classifiers on it

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::beatmap::{parse_map, MapError, Timeline};
use crate::patterns::{PatternClassifier, PatternResult};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("BPM must be a positive number, got {0}")]
    InvalidBpm(f64),

    #[error("Map parse failed: {0}")]
    Map(#[from] MapError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Jump and stream results for one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAnalysis {
    pub jump: PatternResult,
    pub stream: PatternResult,
}

/// Reject tempos the classifiers cannot divide by
pub fn validate_bpm(bpm: f64) -> AnalysisResult<f64> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(AnalysisError::InvalidBpm(bpm))
    }
}

/// Classify an already parsed timeline
pub fn analyze_timeline(timeline: &Timeline, bpm: f64) -> AnalysisResult<MapAnalysis> {
    let bpm = validate_bpm(bpm)?;

    Ok(MapAnalysis {
        jump: PatternClassifier::jump().classify(timeline, bpm),
        stream: PatternClassifier::stream().classify(timeline, bpm),
    })
}

/// Parse raw map text and classify it
pub fn analyze_map(text: &str, bpm: f64) -> AnalysisResult<MapAnalysis> {
    let bpm = validate_bpm(bpm)?;
    let timeline = parse_map(text)?;
    analyze_timeline(&timeline, bpm)
}
