// Beatmap parser
// Splits raw .osu text into sections and builds a Timeline

use std::collections::HashMap;
use std::ops::Range;
use thiserror::Error;

use super::types::{NoteEvent, Timeline, TimingPoint};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("Not a map: no section markers found")]
    NotAMap,

    #[error("Invalid {field} on line {line}: {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Missing {field} on line {line}")]
    MissingField { line: usize, field: &'static str },
}

pub type MapResult<T> = Result<T, MapError>;

const EVENTS_MARKER: &str = "[Events]";
const METADATA_MARKER: &str = "[Metadata]";
const DIFFICULTY_MARKER: &str = "[Difficulty]";
const TIMING_MARKER: &str = "[TimingPoints]";
const HIT_OBJECTS_MARKER: &str = "[HitObjects]";

/// Slider curve letters. Compared against the whole split line, never
/// against a single field.
const SLIDER_MARKERS: [&str; 4] = ["C", "L", "P", "B"];

const HIT_OBJECT_FIELDS: [&str; 5] = ["x", "y", "time", "kind", "hitsound"];

/// Line index of the first occurrence of each section marker
#[derive(Debug, Clone, Copy, Default)]
struct SectionMarkers {
    events: Option<usize>,
    metadata: Option<usize>,
    difficulty: Option<usize>,
    timing: Option<usize>,
    hit_objects: Option<usize>,
}

impl SectionMarkers {
    fn locate(lines: &[&str]) -> Self {
        let find = |marker: &str| lines.iter().position(|line| line.contains(marker));

        SectionMarkers {
            events: find(EVENTS_MARKER),
            metadata: find(METADATA_MARKER),
            difficulty: find(DIFFICULTY_MARKER),
            timing: find(TIMING_MARKER),
            hit_objects: find(HIT_OBJECTS_MARKER),
        }
    }

    fn is_empty(&self) -> bool {
        self.events.is_none()
            && self.metadata.is_none()
            && self.difficulty.is_none()
            && self.timing.is_none()
            && self.hit_objects.is_none()
    }
}

/// Range from a section's marker line up to (not including) the line
/// before the next marker. Missing boundaries give an empty range.
fn section_range(name: &str, start: Option<usize>, next: Option<usize>) -> Range<usize> {
    match (start, next) {
        (Some(start), Some(next)) => {
            let end = next.saturating_sub(1);
            if end > start {
                start..end
            } else {
                0..0
            }
        }
        _ => {
            log::warn!("Section {} has no boundary, treating it as empty", name);
            0..0
        }
    }
}

/// Parse raw beatmap text into a Timeline
///
/// Sections are located by the first line containing each marker. A
/// section whose boundaries are missing comes back empty; only a text with
/// no markers at all is rejected. A hit object with a non-integer
/// coordinate, time or kind aborts the whole parse.
pub fn parse_map(text: &str) -> MapResult<Timeline> {
    let lines: Vec<&str> = text.lines().collect();
    let markers = SectionMarkers::locate(&lines);

    if markers.is_empty() {
        return Err(MapError::NotAMap);
    }

    log::debug!("Section markers: {:?}", markers);

    let metadata_range = section_range("Metadata", markers.metadata, markers.difficulty);
    let difficulty_range = section_range("Difficulty", markers.difficulty, markers.events);
    let timing_range = section_range("TimingPoints", markers.timing, markers.hit_objects);
    let hit_range = match markers.hit_objects {
        Some(start) => start..lines.len(),
        None => {
            log::warn!("Section HitObjects has no boundary, treating it as empty");
            0..0
        }
    };

    let mut events = Vec::new();
    for (index, line) in lines[hit_range.clone()].iter().enumerate() {
        if line.contains(',') {
            events.push(parse_hit_object(line, hit_range.start + index + 1)?);
        }
    }

    Ok(Timeline {
        metadata: parse_key_values(&lines[metadata_range]),
        difficulty: parse_key_values(&lines[difficulty_range]),
        timing_points: parse_timing_points(&lines[timing_range]),
        events,
    })
}

/// Collect `key:value` lines; the value keeps everything after the first colon
fn parse_key_values(lines: &[&str]) -> HashMap<String, String> {
    lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn parse_timing_points(lines: &[&str]) -> Vec<TimingPoint> {
    lines
        .iter()
        .filter(|line| line.contains(','))
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            TimingPoint {
                offset: fields[0].to_string(),
                millis_per_beat: fields[1].to_string(),
                meter: fields.get(2).map(|s| s.to_string()),
            }
        })
        .collect()
}

/// Parse one comma-separated hit object line. `line_number` is 1-based.
fn parse_hit_object(line: &str, line_number: usize) -> MapResult<NoteEvent> {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < HIT_OBJECT_FIELDS.len() {
        return Err(MapError::MissingField {
            line: line_number,
            field: HIT_OBJECT_FIELDS[fields.len()],
        });
    }

    let int_field = |index: usize| -> MapResult<i32> {
        let raw = fields[index];
        raw.trim().parse::<i32>().map_err(|_| MapError::InvalidField {
            line: line_number,
            field: HIT_OBJECT_FIELDS[index],
            value: raw.to_string(),
        })
    };

    let extras = if fields.len() > 5 && fields.as_slice() != SLIDER_MARKERS.as_slice() {
        Some(fields[5].to_string())
    } else {
        None
    };

    Ok(NoteEvent {
        x: int_field(0)?,
        y: int_field(1)?,
        time: int_field(2)?,
        kind: int_field(3)?,
        hitsound: fields[4].to_string(),
        extras,
        slider_kind: fields.get(6).map(|s| s.to_string()),
    })
}
