//! MusicXML generator
//!
//! Compiles per-staff streams of decoded music symbols (notes, rests, clefs,
//! key and time signatures, barlines, repeats, voltas) into a MusicXML 3.1
//! partwise score.
//!
//! ```
//! use musicxml_generator::{tokens_to_musicxml, ExportSettings};
//!
//! let xml = tokens_to_musicxml(&ExportSettings::default(), &["clef_G2\nnote_4 C4\nbarline"]).unwrap();
//! assert!(xml.contains("<step>C</step>"));
//! ```

pub mod models;
pub mod parse;
pub mod renderers;

// Re-export commonly used types
pub use models::{Chord, Duration, Rational, Symbol, SymbolKind};
pub use parse::{read_token_lines, read_tokens};
pub use renderers::musicxml::{
    generate_document, save_musicxml, to_musicxml, tokens_to_musicxml, ConversionError, ExportSettings, Result,
};
