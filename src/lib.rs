// Mapscan - Jump and stream pattern analysis for osu! beatmaps
// Module declarations

pub mod beatmap;
pub mod patterns;
pub mod pipeline;
pub mod source;

pub use beatmap::{parse_map, MapError, NoteEvent, Timeline, TimingPoint};
pub use patterns::{
    classify_jump, classify_stream, PatternClassifier, PatternKind, PatternProfile, PatternResult,
};
pub use pipeline::{
    analyze_batch, analyze_map, analyze_timeline, AnalysisError, AnalysisRecord, MapAnalysis,
};
pub use source::{DirectorySource, MapSource, MemorySource, SourceError};
