// Pattern detection module
// Run detection, jump/stream profiles, and confidence scoring

pub mod classifier;
pub mod profile;
pub mod runs;

pub use classifier::{classify_jump, classify_stream, PatternClassifier, PatternResult};
pub use profile::{beat_length, PatternKind, PatternProfile, RunBuckets, ScoreWeights};
pub use runs::{detect_runs, RunDetectorConfig, RunStatistics, SpatialGate};
