//! Decoded music symbols
//!
//! A [`Symbol`] is one token handed over by the recognition stage. The kind
//! is decoded once into [`SymbolKind`] so later passes never look at the raw
//! rhythm text again.

use serde::{Deserialize, Serialize};

use super::duration::Duration;

/// Which of the two staves of a part a symbol belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaffPosition {
    #[default]
    Upper,
    Lower,
}

impl StaffPosition {
    pub const ALL: [StaffPosition; 2] = [StaffPosition::Upper, StaffPosition::Lower];

    /// MusicXML staff number (1 = upper, 2 = lower)
    pub fn staff(&self) -> u8 {
        match self {
            StaffPosition::Upper => 1,
            StaffPosition::Lower => 2,
        }
    }
}

/// A field the recognizer may leave empty or fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Decoded<T> {
    /// Nothing there (e.g. the pitch of a rest)
    #[default]
    Empty,
    /// The recognizer produced something unusable
    Invalid,
    Value(T),
}

impl<T> Decoded<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Decoded::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Letter name plus octave, C4 = middle C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: char,
    pub octave: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Natural,
    Sharp,
    DoubleSharp,
    Flat,
    DoubleFlat,
}

/// Styled barlines; a plain barline carries no style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineKind {
    Regular,
    Double,
    BoldDouble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatKind {
    Start,
    End,
    /// Closes one repeated section and opens the next at the same boundary
    EndStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltaKind {
    Start,
    Stop,
    Discontinue,
}

/// Transient beam marker assigned by the beaming pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamState {
    Begin,
    Continue,
    End,
}

impl BeamState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeamState::Begin => "begin",
            BeamState::Continue => "continue",
            BeamState::End => "end",
        }
    }
}

/// What a symbol is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolKind {
    Note { duration: Duration, grace: bool },
    Rest { duration: Duration },
    /// Rest spanning `measures` full measures
    MultiMeasureRest { measures: u32 },
    Clef { sign: char, line: u8 },
    KeySignature { fifths: i8 },
    /// Only the denominator is guaranteed; the numerator is inferred when absent
    TimeSignature { numerator: Option<u32>, denominator: u32 },
    Barline(BarlineKind),
    Repeat(RepeatKind),
    Volta(VoltaKind),
    Newline,
    /// Anything the exporter does not know how to place
    Unsupported(String),
}

/// Modifier tags attached to notes and rests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Articulation {
    Fermata,
    Arpeggiate,
    Accent,
    Staccato,
    Staccatissimo,
    Tenuto,
    Tremolo,
    Trill,
    BreathMark,
    Turn,
    Caesura,
    Doit,
    SlurStart,
    SlurStop,
    TieStart,
    TieStop,
}

impl Articulation {
    /// Decode a recognizer tag (`slurStart`, `breathMark`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let articulation = match tag {
            "fermata" => Articulation::Fermata,
            "arpeggiate" => Articulation::Arpeggiate,
            "accent" => Articulation::Accent,
            "staccato" => Articulation::Staccato,
            "staccatissimo" => Articulation::Staccatissimo,
            "tenuto" => Articulation::Tenuto,
            "tremolo" => Articulation::Tremolo,
            "trill" => Articulation::Trill,
            "breathMark" => Articulation::BreathMark,
            "turn" => Articulation::Turn,
            "caesura" => Articulation::Caesura,
            "doit" => Articulation::Doit,
            "slurStart" => Articulation::SlurStart,
            "slurStop" => Articulation::SlurStop,
            "tieStart" => Articulation::TieStart,
            "tieStop" => Articulation::TieStop,
            _ => return None,
        };
        Some(articulation)
    }

    /// Slur and tie tags pair up across notes and are numbered separately
    pub fn is_slur_or_tie(tag: &str) -> bool {
        matches!(tag, "slurStart" | "slurStop" | "tieStart" | "tieStop")
    }
}

/// Tag the recognizer writes when it could not decode an articulation
pub const INVALID_TAG: &str = ".";

/// One decoded token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,

    #[serde(default)]
    pub pitch: Decoded<Pitch>,

    #[serde(default)]
    pub accidental: Decoded<Accidental>,

    /// Raw articulation tags in recognizer order, resolved at export time
    #[serde(default)]
    pub articulations: Vec<String>,

    #[serde(default)]
    pub position: StaffPosition,

    /// Sounds together with the preceding symbol (same vertical slice)
    #[serde(default)]
    pub joined: bool,
}

impl Symbol {
    pub fn new(kind: SymbolKind) -> Self {
        Self {
            kind,
            pitch: Decoded::Empty,
            accidental: Decoded::Empty,
            articulations: Vec::new(),
            position: StaffPosition::Upper,
            joined: false,
        }
    }

    pub fn note(duration: Duration, step: char, octave: i8) -> Self {
        let mut symbol = Self::new(SymbolKind::Note { duration, grace: false });
        symbol.pitch = Decoded::Value(Pitch { step, octave });
        symbol
    }

    pub fn rest(duration: Duration) -> Self {
        Self::new(SymbolKind::Rest { duration })
    }

    pub fn at(mut self, position: StaffPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.articulations.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn joined(mut self) -> Self {
        self.joined = true;
        self
    }

    /// Duration of a note or rest
    pub fn duration(&self) -> Option<Duration> {
        match &self.kind {
            SymbolKind::Note { duration, .. } | SymbolKind::Rest { duration } => Some(*duration),
            _ => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, SymbolKind::Note { .. })
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, SymbolKind::Rest { .. })
    }

    pub fn is_note_or_rest(&self) -> bool {
        self.is_note() || self.is_rest()
    }

    pub fn is_grace(&self) -> bool {
        matches!(self.kind, SymbolKind::Note { grace: true, .. })
    }

    /// Short enough to share a beam: a non-grace note shorter than a quarter
    pub fn is_beamable(&self) -> bool {
        match &self.kind {
            SymbolKind::Note { duration, grace: false } => {
                let fraction = duration.fraction;
                *fraction.numer() > 0 && fraction < super::duration::Rational::new(1, 4)
            }
            _ => false,
        }
    }

    /// Remove the given articulation tags, returning them in their original order
    pub fn strip_tags(&self, strip: impl Fn(&str) -> bool) -> (Vec<String>, Symbol) {
        let (stripped, kept): (Vec<String>, Vec<String>) =
            self.articulations.iter().cloned().partition(|tag| strip(tag));
        let mut symbol = self.clone();
        symbol.articulations = kept;
        (stripped, symbol)
    }
}
