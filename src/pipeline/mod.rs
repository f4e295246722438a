// Analysis pipeline module
// Per-map analysis, row records, batch execution, and progress tracing

pub mod analysis;
pub mod batch;
pub mod record;
pub mod trace;

pub use analysis::{
    analyze_map, analyze_timeline, validate_bpm, AnalysisError, AnalysisResult, MapAnalysis,
};
pub use batch::{analyze_batch, BatchConfig, BatchOutcome, MapRequest};
pub use record::{AnalysisRecord, MapAttributes};
pub use trace::{read_trace_file, TraceBuilder, TraceEntry, TraceError, TraceStage, TraceWriter};
