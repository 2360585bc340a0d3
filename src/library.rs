//! Track records and metadata extraction.
//!
//! A [`Track`] is built once by [`probe_track`] and never mutated afterwards;
//! it carries display metadata plus the timing constants the playback engine
//! needs for frame-accurate positioning.

mod display;
mod model;
mod probe;
mod scan;

pub use display::format_mmss;
pub use model::Track;
pub use probe::probe_track;
pub use scan::scan;

#[cfg(test)]
mod tests;
