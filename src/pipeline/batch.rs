// Batch analysis
// Fetches, parses, and classifies many maps concurrently

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::analysis::{analyze_map, AnalysisError};
use super::record::{AnalysisRecord, MapAttributes};
use super::trace::{TraceBuilder, TraceEntry, TraceStage, TraceWriter};
use crate::source::MapSource;

/// Settings for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of maps analyzed at the same time
    pub max_concurrency: usize,

    /// JSONL trace file; no trace is written when unset
    pub trace_path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_concurrency: 4,
            trace_path: None,
        }
    }
}

/// A map to analyze along with its caller-supplied attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRequest {
    pub map_id: u64,
    pub attributes: MapAttributes,
}

/// Result of one map in a batch
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Analyzed(AnalysisRecord),
    Skipped {
        map_id: u64,
        stage: TraceStage,
        reason: String,
    },
}

impl BatchOutcome {
    pub fn map_id(&self) -> u64 {
        match self {
            BatchOutcome::Analyzed(record) => record.map_id,
            BatchOutcome::Skipped { map_id, .. } => *map_id,
        }
    }

    /// The record, if the map was analyzed
    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            BatchOutcome::Analyzed(record) => Some(record),
            BatchOutcome::Skipped { .. } => None,
        }
    }

    fn trace_entry(&self, progress: f32) -> TraceEntry {
        match self {
            BatchOutcome::Analyzed(record) => TraceBuilder::stage(TraceStage::Classify)
                .map(record.map_id)
                .progress(progress, "Analyzed")
                .with_data(serde_json::json!({
                    "jump": record.jump,
                    "stream": record.stream,
                })),
            BatchOutcome::Skipped {
                map_id,
                stage,
                reason,
            } => TraceBuilder::stage(*stage)
                .map(*map_id)
                .progress(progress, "Skipped")
                .with_data(serde_json::json!({ "reason": reason })),
        }
    }
}

/// Fetch, parse and classify a single map. Never fails; problems become `Skipped`.
fn process_map(source: &dyn MapSource, request: MapRequest) -> BatchOutcome {
    let map_id = request.map_id;

    let text = match source.fetch(map_id) {
        Ok(text) => text,
        Err(e) => {
            return BatchOutcome::Skipped {
                map_id,
                stage: TraceStage::Fetch,
                reason: e.to_string(),
            }
        }
    };

    match analyze_map(&text, request.attributes.bpm) {
        Ok(analysis) => BatchOutcome::Analyzed(AnalysisRecord::new(
            map_id,
            &text,
            request.attributes,
            &analysis,
        )),
        Err(e) => {
            let stage = match &e {
                AnalysisError::Map(_) => TraceStage::Parse,
                AnalysisError::InvalidBpm(_) => TraceStage::Classify,
            };
            BatchOutcome::Skipped {
                map_id,
                stage,
                reason: e.to_string(),
            }
        }
    }
}

fn write_trace(writer: Option<&TraceWriter>, entry: TraceEntry) {
    if let Some(writer) = writer {
        if let Err(e) = writer.write(&entry) {
            log::warn!("Failed to write trace to {}: {}", writer.path().display(), e);
        }
    }
}

/// Analyze a batch of maps from a source
///
/// At most `max_concurrency` maps are in flight at once, each on a blocking
/// worker thread. A finished map frees its slot for the next request right
/// away, so one slow map does not hold up the rest. Outcomes come back in
/// request order. A map that cannot be
/// fetched, parsed or classified is reported as `Skipped` and the batch
/// moves on.
pub async fn analyze_batch(
    source: Arc<dyn MapSource>,
    requests: Vec<MapRequest>,
    config: &BatchConfig,
) -> Vec<BatchOutcome> {
    let total = requests.len();
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let trace = config.trace_path.clone().map(TraceWriter::new);

    write_trace(
        trace.as_ref(),
        TraceBuilder::stage(TraceStage::Batch).start(format!("Analyzing {} maps", total)),
    );

    // Every map gets a task up front; the permit keeps the blocking work bounded
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let source = Arc::clone(&source);
            let semaphore = Arc::clone(&semaphore);
            let map_id = request.map_id;
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| e.to_string())?;
                tokio::task::spawn_blocking(move || process_map(source.as_ref(), request))
                    .await
                    .map_err(|e| e.to_string())
            });
            (map_id, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(total);

    for (map_id, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(e.to_string()),
        };

        // The failing stage is unknown once a task dies, so it is charged to the batch
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(reason) => {
                log::error!("Analysis task for {} failed: {}", map_id, reason);
                BatchOutcome::Skipped {
                    map_id,
                    stage: TraceStage::Batch,
                    reason: format!("analysis task failed: {}", reason),
                }
            }
        };

        if let BatchOutcome::Skipped { stage, reason, .. } = &outcome {
            log::warn!("Skipped {} at {:?}: {}", map_id, stage, reason);
        }

        outcomes.push(outcome);
        let done = outcomes.len();
        log::info!("Processed {}; {}/{}", map_id, done, total);

        let progress = done as f32 / total as f32;
        if let Some(outcome) = outcomes.last() {
            write_trace(trace.as_ref(), outcome.trace_entry(progress));
        }
    }

    let analyzed = outcomes.iter().filter(|o| o.record().is_some()).count();
    write_trace(
        trace.as_ref(),
        TraceBuilder::stage(TraceStage::Batch)
            .complete(format!("Analyzed {} of {} maps", analyzed, total)),
    );

    outcomes
}
