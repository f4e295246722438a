// Run detection
// Sliding-window scan for consecutive note pairs that match a timing/spacing rule

use serde::{Deserialize, Serialize};

use crate::beatmap::NoteEvent;

/// Minimum spacing a pair must reach to qualify
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialGate {
    /// Minimum planar distance between the two notes of a pair
    pub min_distance: f64,
}

/// Milliseconds from `first` to `second`, widened so extreme times cannot overflow
fn time_delta(first: &NoteEvent, second: &NoteEvent) -> f64 {
    f64::from(second.time) - f64::from(first.time)
}

/// Configuration for run detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunDetectorConfig {
    /// Expected time between consecutive notes in milliseconds
    pub expected_interval: f64,

    /// Allowed relative deviation from `expected_interval` (0.1 = 10%)
    pub tolerance_ratio: f64,

    /// Optional spacing requirement; `None` disables spatial filtering
    pub spatial_gate: Option<SpatialGate>,
}

impl Default for RunDetectorConfig {
    fn default() -> Self {
        RunDetectorConfig {
            expected_interval: 125.0, // 1/4 beat at 120 BPM
            tolerance_ratio: 0.1,
            spatial_gate: None,
        }
    }
}

impl RunDetectorConfig {
    /// Whether a single pair satisfies the timing and spacing rules
    pub fn qualifies(&self, first: &NoteEvent, second: &NoteEvent) -> bool {
        let time_delta = time_delta(first, second);
        let deviation = (time_delta - self.expected_interval).abs() / self.expected_interval;

        if deviation > self.tolerance_ratio {
            return false;
        }

        match self.spatial_gate {
            Some(gate) => first.distance_to(second) >= gate.min_distance,
            None => true,
        }
    }
}

/// Output of a run detection pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Number of qualifying pairs in each detected run, in scan order
    pub run_lengths: Vec<usize>,

    /// Absolute differences between successive deltas inside runs
    pub interval_variations: Vec<f64>,
}

impl RunStatistics {
    /// Mean interval variation, or `None` when no run extended past one pair
    pub fn mean_variation(&self) -> Option<f64> {
        if self.interval_variations.is_empty() {
            None
        } else {
            let sum: f64 = self.interval_variations.iter().sum();
            Some(sum / self.interval_variations.len() as f64)
        }
    }
}

/// State of the run currently being extended
#[derive(Debug, Clone, Copy)]
struct OpenRun {
    length: usize,
    last_delta: f64,
}

/// Scan note events for runs of qualifying consecutive pairs
///
/// Window starts cover indices `0..=n-4`, so the last three events never
/// open a window of their own and sequences of three or fewer events yield
/// no runs.
pub fn detect_runs(events: &[NoteEvent], config: &RunDetectorConfig) -> RunStatistics {
    let mut stats = RunStatistics::default();
    let mut open: Option<OpenRun> = None;

    let window_count = events.len().saturating_sub(3);

    for i in 0..window_count {
        let first = &events[i];
        let second = &events[i + 1];

        if config.qualifies(first, second) {
            let time_delta = time_delta(first, second);
            open = Some(match open {
                Some(run) => {
                    stats.interval_variations.push((time_delta - run.last_delta).abs());
                    OpenRun {
                        length: run.length + 1,
                        last_delta: time_delta,
                    }
                }
                None => OpenRun {
                    length: 1,
                    last_delta: time_delta,
                },
            });
        } else if let Some(run) = open.take() {
            stats.run_lengths.push(run.length);
        }
    }

    if let Some(run) = open {
        stats.run_lengths.push(run.length);
    }

    stats
}
