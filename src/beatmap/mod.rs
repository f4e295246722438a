// Beatmap module
// Parses .osu text into an ordered note timeline

pub mod parser;
pub mod types;

pub use parser::{parse_map, MapError, MapResult};
pub use types::{NoteEvent, Timeline, TimingPoint};
