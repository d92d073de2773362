//! MusicXML export module
//!
//! Provides MusicXML 3.1 export for decoded staff symbols.
//!
//! # Module Structure
//!
//! - **converter**: Entry points (`to_musicxml()`, `tokens_to_musicxml()`) and export settings
//! - **measure**: Measure driver, one pass over the chords of a part
//! - **emitter**: Notes, chord notes and backups for one vertical slice
//! - **timing**: Division and time-signature inference
//! - **beaming**: Beam runs per staff position
//! - **tuplets**: Tuplet bracket start/stop marks
//! - **numbering**: Slur, tie, volta and tremolo numbering state
//! - **types**: Typed document tree
//! - **builder**: MusicXML text rendering
//! - **pitch**: Accidental to alter conversion
//! - **duration**: Base value to note type conversion
//! - **helpers**: Utility functions (GCD/LCM, median, ticks)
//! - **errors**: Conversion errors

pub mod duration;
pub mod pitch;
pub mod builder;
pub mod converter;
pub mod measure;
pub mod helpers;
pub mod emitter;
pub mod errors;
pub mod types;
pub mod timing;
pub mod numbering;
pub mod beaming;
pub mod tuplets;

pub use duration::*;
pub use pitch::*;
pub use builder::MusicXmlWriter;
pub use converter::{generate_document, save_musicxml, to_musicxml, tokens_to_musicxml, ExportSettings};
pub use errors::{ConversionError, Result};
pub use measure::build_measures;
pub use types::ScorePartwise;
