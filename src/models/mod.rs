//! Models module for the symbol-stream exporter
//!
//! This module contains the data model handed over by the recognition
//! stage: decoded symbols, their exact durations and the vertical slices
//! (chords) they are grouped into.

pub mod duration;
pub mod symbol;
pub mod chord;

// Re-export commonly used types
pub use duration::{Duration, Rational};
pub use symbol::*;
pub use chord::{group_into_chords, Chord, ChordMember, SymbolId, TupletMark};
