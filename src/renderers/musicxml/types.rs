//! MusicXML document tree
//!
//! A small typed model of the partwise score this crate produces. Only the
//! elements the generator emits are modelled. Children keep the order in
//! which the driver appended them; [`super::builder`] renders the tree.

use serde::{Deserialize, Serialize};

use crate::models::{BeamState, TupletMark};

/// Root of the generated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePartwise {
    pub work_title: String,
    /// `None` renders as an empty `<defaults/>`
    pub defaults: Option<PageLayout>,
    pub part_list: Vec<ScorePart>,
    pub parts: Vec<Part>,
}

/// Page size in tenths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_height: u32,
    pub page_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePart {
    pub id: String,
    pub name: String,
    pub instrument: Instrument,
}

/// Score instrument plus its MIDI playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub sound: String,
    pub midi_channel: u8,
    pub midi_program: u8,
    pub volume: u8,
    pub pan: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub number: u32,
    pub elements: Vec<MeasureElement>,
}

impl Measure {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: MeasureElement) {
        self.elements.push(element);
    }

    /// True once a note, backup or forward has been emitted
    pub fn has_musical_content(&self) -> bool {
        self.elements.iter().any(|e| {
            matches!(
                e,
                MeasureElement::Note(_) | MeasureElement::Backup(_) | MeasureElement::Forward(_)
            )
        })
    }

    /// Append an empty attributes block and return its index
    pub fn add_attributes(&mut self) -> usize {
        self.elements.push(MeasureElement::Attributes(Attributes::default()));
        self.elements.len() - 1
    }

    pub fn attributes_mut(&mut self, index: usize) -> Option<&mut Attributes> {
        match self.elements.get_mut(index) {
            Some(MeasureElement::Attributes(attributes)) => Some(attributes),
            _ => None,
        }
    }

    /// Barline at `location`, appended if the measure has none there yet
    pub fn barline_mut(&mut self, location: BarlineLocation) -> &mut Barline {
        let existing = self
            .elements
            .iter()
            .position(|e| matches!(e, MeasureElement::Barline(b) if b.location == location));
        let index = match existing {
            Some(index) => index,
            None => {
                self.elements.push(MeasureElement::Barline(Barline::new(location)));
                self.elements.len() - 1
            }
        };
        match &mut self.elements[index] {
            MeasureElement::Barline(barline) => barline,
            _ => unreachable!("index points at a barline"),
        }
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.elements.iter().filter_map(|e| match e {
            MeasureElement::Note(note) => Some(note),
            _ => None,
        })
    }

    pub fn barlines(&self) -> impl Iterator<Item = &Barline> {
        self.elements.iter().filter_map(|e| match e {
            MeasureElement::Barline(barline) => Some(barline),
            _ => None,
        })
    }
}

/// Children of a measure, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasureElement {
    /// `<print new-system="yes"/>`
    NewSystem,
    Attributes(Attributes),
    Direction(Direction),
    Note(Note),
    /// Move the cursor back by this many ticks
    Backup(u64),
    /// Move the cursor forward by this many ticks without sounding
    Forward(u64),
    Barline(Barline),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub divisions: Option<u64>,
    pub keys: Vec<i8>,
    pub times: Vec<Time>,
    pub staves: Option<u8>,
    pub clefs: Vec<Clef>,
    /// Measure count of a multi-measure rest
    pub multiple_rest: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    pub beats: u32,
    pub beat_type: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clef {
    pub number: u8,
    pub sign: char,
    pub line: u8,
}

/// Metronome mark with playback tempo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub per_minute: u32,
    pub tempo: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineLocation {
    Left,
    Right,
}

impl BarlineLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarlineLocation::Left => "left",
            BarlineLocation::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatDirection {
    Forward,
    Backward,
}

impl RepeatDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatDirection::Forward => "forward",
            RepeatDirection::Backward => "backward",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingType {
    Start,
    Stop,
    Discontinue,
}

impl EndingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndingType::Start => "start",
            EndingType::Stop => "stop",
            EndingType::Discontinue => "discontinue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    pub ending_type: EndingType,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barline {
    pub location: BarlineLocation,
    /// `light-light`, `heavy-heavy`, ...
    pub bar_style: Option<String>,
    pub endings: Vec<Ending>,
    pub repeat: Option<RepeatDirection>,
}

impl Barline {
    pub fn new(location: BarlineLocation) -> Self {
        Self {
            location,
            bar_style: None,
            endings: Vec::new(),
            repeat: None,
        }
    }
}

/// Sounding part of a note: a pitch or a rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteContent {
    Pitch { step: char, octave: i8, alter: Option<i8> },
    /// `measure` marks a whole-measure rest
    Rest { measure: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub grace: bool,
    /// Stacked on the previous note without advancing time
    pub chord: bool,
    pub content: NoteContent,
    /// Ticks; grace notes have none
    pub duration: Option<u64>,
    pub voice: u32,
    pub note_type: Option<String>,
    pub dots: u8,
    /// (actual-notes, normal-notes)
    pub time_modification: Option<(u32, u32)>,
    pub staff: u8,
    pub beam: Option<BeamState>,
    pub notations: Notations,
}

impl Note {
    pub fn pitch(&self) -> Option<(char, i8, Option<i8>)> {
        match self.content {
            NoteContent::Pitch { step, octave, alter } => Some((step, octave, alter)),
            NoteContent::Rest { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartStop {
    Start,
    Stop,
}

impl StartStop {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartStop::Start => "start",
            StartStop::Stop => "stop",
        }
    }
}

/// Marks placed directly under `<notations>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotationMark {
    Fermata,
    Arpeggiate,
    Slur { kind: StartStop, number: u32 },
    /// Ties on notes without a pitch carry no number
    Tied { kind: StartStop, number: Option<u32> },
}

/// Children of `<articulations>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticulationMark {
    Accent,
    Staccato,
    Staccatissimo,
    Tenuto,
    BreathMark,
    Caesura,
    Doit,
}

impl ArticulationMark {
    /// Get the MusicXML element name for this articulation
    pub fn xml_name(&self) -> &'static str {
        match self {
            ArticulationMark::Accent => "accent",
            ArticulationMark::Staccato => "staccato",
            ArticulationMark::Staccatissimo => "staccatissimo",
            ArticulationMark::Tenuto => "tenuto",
            ArticulationMark::BreathMark => "breath-mark",
            ArticulationMark::Caesura => "caesura",
            ArticulationMark::Doit => "doit",
        }
    }
}

/// Children of `<ornaments>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ornament {
    Tremolo(StartStop),
    TrillMark,
    InvertedTurn,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notations {
    pub marks: Vec<NotationMark>,
    pub tuplet: Option<TupletMark>,
    pub articulations: Vec<ArticulationMark>,
    pub ornaments: Vec<Ornament>,
}

impl Notations {
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty() && self.tuplet.is_none() && self.articulations.is_empty() && self.ornaments.is_empty()
    }
}
