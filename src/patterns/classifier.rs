// Pattern classifier
// Buckets detected runs and folds them into a single confidence score

use serde::{Deserialize, Serialize};

use super::profile::{PatternKind, PatternProfile};
use super::runs::{detect_runs, RunStatistics};
use crate::beatmap::Timeline;

/// Confidence that a map is dominated by one pattern style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    /// Which profile produced this result
    pub kind: PatternKind,

    /// Weighted score, clamped above at 1.0
    pub overall_confidence: f64,

    /// Share of the map's notes that sit inside counted runs
    pub density: f64,

    /// Mean interval variation relative to the expected interval
    pub bpm_consistency: f64,

    pub short_runs: usize,
    pub medium_runs: usize,
    pub long_runs: usize,

    /// Longest counted run, or 0 if none
    pub max_run_length: usize,
}

/// Classifier for a single pattern style.
/// Holds only its profile, so one instance can score any number of maps.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    profile: PatternProfile,
}

impl PatternClassifier {
    /// Create a classifier from a profile
    pub fn new(profile: PatternProfile) -> Self {
        PatternClassifier { profile }
    }

    /// Jump classifier with the built-in profile
    pub fn jump() -> Self {
        Self::new(PatternProfile::jump())
    }

    /// Stream classifier with the built-in profile
    pub fn stream() -> Self {
        Self::new(PatternProfile::stream())
    }

    pub fn profile(&self) -> &PatternProfile {
        &self.profile
    }

    /// Score a timeline at the given tempo.
    /// `bpm` must be positive; callers validate it first.
    pub fn classify(&self, timeline: &Timeline, bpm: f64) -> PatternResult {
        let config = self.profile.detector_config(bpm);
        let stats = detect_runs(&timeline.events, &config);

        log::debug!(
            "{} runs at {:.2} ms: {:?}",
            self.profile.kind.as_str(),
            config.expected_interval,
            stats.run_lengths
        );

        self.score(&stats, timeline.event_count(), config.expected_interval)
    }

    /// Fold run statistics into a result
    fn score(
        &self,
        stats: &RunStatistics,
        event_count: usize,
        expected_interval: f64,
    ) -> PatternResult {
        let buckets = &self.profile.buckets;
        let weights = &self.profile.weights;

        let count_in = |min: usize, max: Option<usize>| {
            stats
                .run_lengths
                .iter()
                .filter(|&&len| len >= min && max.map_or(true, |max| len < max))
                .count()
        };

        let short_runs = count_in(buckets.short_min, Some(buckets.medium_min));
        let medium_runs = count_in(buckets.medium_min, Some(buckets.long_min));
        let long_runs = count_in(buckets.long_min, None);
        let total_bucketed = short_runs + medium_runs + long_runs;

        let counted: Vec<usize> = stats
            .run_lengths
            .iter()
            .copied()
            .filter(|&len| len >= self.profile.counted_min)
            .collect();
        let total_notes: usize = counted.iter().sum();
        let max_run_length = counted.iter().copied().max().unwrap_or(0);

        let density = if event_count > 0 {
            total_notes as f64 / event_count as f64
        } else {
            0.0
        };

        let bpm_consistency = stats
            .mean_variation()
            .map(|mean| mean / expected_interval)
            .unwrap_or(0.0);

        let average_run_length = if total_bucketed > 0 {
            total_notes as f64 / total_bucketed as f64
        } else {
            0.0
        };

        // Only the long term is divided by the bucket total
        let bucket_divisor = total_bucketed.max(1) as f64;
        let variety = medium_runs as f64 * 2.0 + (long_runs as f64 * 3.0) / bucket_divisor;
        let long_ratio = long_runs as f64 / bucket_divisor;

        let weighted = density * weights.density
            + bpm_consistency * weights.consistency
            + variety * weights.variety
            + long_ratio * weights.long_ratio
            + (average_run_length / weights.run_length_norm).min(1.0) * weights.run_length;

        PatternResult {
            kind: self.profile.kind,
            overall_confidence: weighted.min(1.0),
            density,
            bpm_consistency,
            short_runs,
            medium_runs,
            long_runs,
            max_run_length,
        }
    }
}

/// Jump confidence for a timeline with the built-in profile
pub fn classify_jump(timeline: &Timeline, bpm: f64) -> PatternResult {
    PatternClassifier::jump().classify(timeline, bpm)
}

/// Stream confidence for a timeline with the built-in profile
pub fn classify_stream(timeline: &Timeline, bpm: f64) -> PatternResult {
    PatternClassifier::stream().classify(timeline, bpm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::NoteEvent;

    fn timeline_from(events: Vec<NoteEvent>) -> Timeline {
        Timeline {
            events,
            ..Timeline::default()
        }
    }

    /// Notes alternating between two corners of the playfield
    fn jump_pattern(count: usize, interval: i32) -> Vec<NoteEvent> {
        (0..count)
            .map(|i| {
                let (x, y) = if i % 2 == 0 { (64, 64) } else { (448, 320) };
                NoteEvent::new(x, y, i as i32 * interval, 1)
            })
            .collect()
    }

    /// Notes stacked on one spot
    fn stacked_pattern(count: usize, interval: i32) -> Vec<NoteEvent> {
        (0..count)
            .map(|i| NoteEvent::new(256, 192, i as i32 * interval, 1))
            .collect()
    }

    fn stats_with(run_lengths: Vec<usize>) -> RunStatistics {
        RunStatistics {
            run_lengths,
            interval_variations: Vec::new(),
        }
    }

    #[test]
    fn test_jump_ten_notes_at_120_bpm() {
        let timeline = timeline_from(jump_pattern(10, 250));
        let result = classify_jump(&timeline, 120.0);

        assert_eq!(result.kind, PatternKind::Jump);
        assert_eq!(result.short_runs, 0);
        assert_eq!(result.medium_runs, 1);
        assert_eq!(result.long_runs, 0);
        assert_eq!(result.max_run_length, 7);
        assert!((result.density - 0.7).abs() < 1e-12);
        assert_eq!(result.bpm_consistency, 0.0);

        // density 0.7*0.4 + variety 2*0.35 + min(7/3, 1)*0.3 exceeds 1
        assert_eq!(result.overall_confidence, 1.0);
    }

    #[test]
    fn test_empty_timeline_scores_zero() {
        let timeline = Timeline::default();

        for result in [classify_jump(&timeline, 180.0), classify_stream(&timeline, 180.0)] {
            assert_eq!(result.overall_confidence, 0.0);
            assert_eq!(result.density, 0.0);
            assert_eq!(result.bpm_consistency, 0.0);
            assert_eq!(result.max_run_length, 0);
            assert!(!result.overall_confidence.is_nan());
        }
    }

    #[test]
    fn test_no_counted_runs_scores_zero() {
        // Stream runs of five pairs sit below the counted floor of six
        let classifier = PatternClassifier::stream();
        let result = classifier.score(&stats_with(vec![5, 3, 1]), 100, 125.0);

        assert_eq!(result.overall_confidence, 0.0);
        assert_eq!(result.max_run_length, 0);
        assert_eq!(result.short_runs + result.medium_runs + result.long_runs, 0);
    }

    #[test]
    fn test_jump_counted_floor_below_buckets() {
        // Runs of 2 and 3 count toward totals but fall in no bucket
        let classifier = PatternClassifier::jump();
        let result = classifier.score(&stats_with(vec![2, 3, 1]), 50, 250.0);

        assert_eq!(result.short_runs, 0);
        assert_eq!(result.max_run_length, 3);
        assert!((result.density - 0.1).abs() < 1e-12);
        // No bucketed runs, so the average run length term is zero
        assert!((result.overall_confidence - 0.1 * 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_stream_buckets() {
        let classifier = PatternClassifier::stream();
        let result = classifier.score(&stats_with(vec![6, 9, 10, 19, 20, 45, 5]), 1000, 125.0);

        assert_eq!(result.short_runs, 2);
        assert_eq!(result.medium_runs, 2);
        assert_eq!(result.long_runs, 2);
        assert_eq!(result.max_run_length, 45);
    }

    #[test]
    fn test_variety_divides_only_long_term() {
        // Four short, one medium, one long run over 10,000 notes
        let classifier = PatternClassifier::stream();
        let result = classifier.score(&stats_with(vec![10, 20, 6, 6, 6, 6]), 10_000, 125.0);

        let density = 54.0 / 10_000.0;
        let variety = 1.0 * 2.0 + (1.0 * 3.0) / 6.0;
        let long_ratio = 1.0 / 6.0;
        let average = (54.0_f64 / 6.0 / 5.0).min(1.0);
        let expected = density * 0.3 + variety * 0.2 + long_ratio * 0.2 + average * 0.2;

        assert!(expected < 1.0);
        assert!((result.overall_confidence - expected).abs() < 1e-12);

        // Dividing the whole sum would give a visibly lower score
        let symmetric = density * 0.3 + (5.0 / 6.0) * 0.2 + long_ratio * 0.2 + average * 0.2;
        assert!(result.overall_confidence - symmetric > 0.3);
    }

    #[test]
    fn test_bpm_consistency_from_variations() {
        let classifier = PatternClassifier::stream();
        let stats = RunStatistics {
            run_lengths: vec![3],
            interval_variations: vec![10.0, 5.0],
        };

        let result = classifier.score(&stats, 1000, 125.0);
        assert!((result.bpm_consistency - 7.5 / 125.0).abs() < 1e-12);
        assert!((result.overall_confidence - result.bpm_consistency * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_stacked_notes_are_streams_not_jumps() {
        // 180 BPM quarter notes: 83.33 ms, written as 83 ms gaps
        let timeline = timeline_from(stacked_pattern(40, 83));

        let jump = classify_jump(&timeline, 180.0);
        let stream = classify_stream(&timeline, 180.0);

        assert_eq!(jump.overall_confidence, 0.0);
        assert_eq!(stream.long_runs, 1);
        assert_eq!(stream.max_run_length, 37);
        assert!(stream.overall_confidence > 0.0);
        assert!(stream.overall_confidence <= 1.0);
    }

    #[test]
    fn test_confidence_never_exceeds_one() {
        let timeline = timeline_from(jump_pattern(200, 250));
        assert!(classify_jump(&timeline, 120.0).overall_confidence <= 1.0);

        let timeline = timeline_from(stacked_pattern(200, 125));
        assert!(classify_stream(&timeline, 120.0).overall_confidence <= 1.0);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let mut events = jump_pattern(30, 250);
        events.extend(stacked_pattern(30, 125).into_iter().map(|mut e| {
            e.time += 10_000;
            e
        }));
        let timeline = timeline_from(events);

        let classifier = PatternClassifier::stream();
        let first = classifier.classify(&timeline, 120.0);
        let second = classifier.classify(&timeline, 120.0);
        assert_eq!(first, second);
        assert_eq!(first.overall_confidence.to_bits(), second.overall_confidence.to_bits());

        assert_eq!(classify_jump(&timeline, 120.0), classify_jump(&timeline, 120.0));
    }
}
