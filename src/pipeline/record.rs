// Analysis records
// Row-shaped output handed to whatever stores or trains on the scores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::MapAnalysis;
use crate::source::calculate_sha256;

/// Official per-map attributes supplied by the caller alongside the map text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAttributes {
    /// Total drain length in seconds
    pub length: f64,

    /// Star rating
    pub stars: f64,

    /// Overall difficulty
    pub od: f64,

    /// Approach rate
    pub ar: f64,

    /// Circle size
    pub cs: f64,

    /// HP drain
    pub hp: f64,

    /// Beats per minute, used for classification
    pub bpm: f64,
}

/// One analyzed map, ready to be written as a row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub map_id: u64,

    /// SHA256 of the raw map text the scores were computed from
    pub map_sha256: String,

    #[serde(flatten)]
    pub attributes: MapAttributes,

    /// Overall jump confidence
    pub jump: f64,

    /// Overall stream confidence
    pub stream: f64,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Build a record from a finished analysis
    pub fn new(
        map_id: u64,
        raw_text: &str,
        attributes: MapAttributes,
        analysis: &MapAnalysis,
    ) -> Self {
        AnalysisRecord {
            map_id,
            map_sha256: calculate_sha256(raw_text.as_bytes()),
            attributes,
            jump: analysis.jump.overall_confidence,
            stream: analysis.stream.overall_confidence,
            analyzed_at: Utc::now(),
        }
    }

    /// Numeric features in training column order:
    /// length, stars, od, ar, cs, hp, bpm, jump, stream
    pub fn feature_row(&self) -> [f64; 9] {
        let a = &self.attributes;
        [a.length, a.stars, a.od, a.ar, a.cs, a.hp, a.bpm, self.jump, self.stream]
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternKind, PatternResult};

    fn attributes() -> MapAttributes {
        MapAttributes {
            length: 95.0,
            stars: 5.2,
            od: 8.0,
            ar: 9.3,
            cs: 4.0,
            hp: 6.0,
            bpm: 180.0,
        }
    }

    fn result(kind: PatternKind, confidence: f64) -> PatternResult {
        PatternResult {
            kind,
            overall_confidence: confidence,
            density: 0.0,
            bpm_consistency: 0.0,
            short_runs: 0,
            medium_runs: 0,
            long_runs: 0,
            max_run_length: 0,
        }
    }

    fn analysis() -> MapAnalysis {
        MapAnalysis {
            jump: result(PatternKind::Jump, 0.25),
            stream: result(PatternKind::Stream, 0.75),
        }
    }

    #[test]
    fn test_record_creation() {
        let record = AnalysisRecord::new(129891, "hello world", attributes(), &analysis());

        assert_eq!(record.map_id, 129891);
        assert_eq!(
            record.map_sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(record.jump, 0.25);
        assert_eq!(record.stream, 0.75);
    }

    #[test]
    fn test_feature_row_order() {
        let record = AnalysisRecord::new(1, "", attributes(), &analysis());
        assert_eq!(
            record.feature_row(),
            [95.0, 5.2, 8.0, 9.3, 4.0, 6.0, 180.0, 0.25, 0.75]
        );
    }

    #[test]
    fn test_json_line_is_flat() {
        let record = AnalysisRecord::new(1, "", attributes(), &analysis());
        let json_line = record.to_json_line().unwrap();

        assert!(json_line.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(json_line.trim()).unwrap();
        assert_eq!(value["map_id"], 1);
        assert_eq!(value["bpm"], 180.0);
        assert_eq!(value["stream"], 0.75);
        assert!(value.get("attributes").is_none());

        let parsed: AnalysisRecord = serde_json::from_str(json_line.trim()).unwrap();
        assert_eq!(parsed.map_id, 1);
        assert_eq!(parsed.attributes.cs, 4.0);
    }
}
