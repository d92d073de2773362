//! Measure driver
//!
//! Walks the chords of one part in order and distributes their output over
//! measures. Barlines and repeats close the current measure; clefs, keys,
//! time signatures and multi-measure rests land in an attributes block that
//! consecutive attribute symbols share; everything with a duration goes
//! through [`super::emitter`].

use crate::models::{
    group_into_chords, BarlineKind, Chord, Rational, RepeatKind, StaffPosition, Symbol, SymbolKind, VoltaKind,
};
use super::beaming::{apply_beaming, BeamMap};
use super::converter::ExportSettings;
use super::emitter::{build_note_chord, slice_duration};
use super::errors::Result;
use super::numbering::ConversionState;
use super::timing::find_division_and_time_signature_numerator;
use super::tuplets::add_tuplet_start_stop;
use super::types::{
    BarlineLocation, Clef, Ending, EndingType, Measure, MeasureElement, RepeatDirection, Time,
};

/// Convert the symbols of one part into numbered measures.
///
/// Only the first part carries the metronome direction.
pub fn build_measures(settings: &ExportSettings, symbols: &[Symbol], is_first_part: bool) -> Result<Vec<Measure>> {
    let mut chords = group_into_chords(symbols);
    add_tuplet_start_stop(&mut chords);
    let beams = apply_beaming(&chords);
    let timing = find_division_and_time_signature_numerator(&chords)?;

    let mut driver = MeasureDriver::new(ConversionState::new(timing.division, timing.numerator));
    let first = driver.current.add_attributes();
    if let Some(attributes) = driver.current.attributes_mut(first) {
        attributes.divisions = Some(driver.state.divisions_per_quarter());
        if symbols.iter().any(|s| s.position == StaffPosition::Lower) {
            attributes.staves = Some(2);
        }
    }
    if is_first_part {
        if let Some(direction) = settings.metronome_direction() {
            driver.current.push(MeasureElement::Direction(direction));
        }
    }
    driver.attributes = Some(first);

    let last = chords.len().saturating_sub(1);
    for (index, chord) in chords.iter().enumerate() {
        driver.process(chord, index == last, &beams)?;
    }

    let measures = driver.finish();
    log::debug!("Built {} measures at division {}", measures.len(), timing.division);
    Ok(measures)
}

struct MeasureDriver {
    state: ConversionState,
    measures: Vec<Measure>,
    current: Measure,
    /// Attributes block the previous chord wrote into, if any
    attributes: Option<usize>,
}

impl MeasureDriver {
    fn new(state: ConversionState) -> Self {
        Self {
            state,
            measures: Vec::new(),
            current: Measure::new(1),
            attributes: None,
        }
    }

    fn process(&mut self, chord: &Chord, is_last: bool, beams: &BeamMap) -> Result<()> {
        let Some(first) = chord.first() else {
            return Ok(());
        };
        let last_attributes = self.attributes.take();

        match &first.kind {
            SymbolKind::MultiMeasureRest { measures } if chord.len() == 1 => {
                let index = self.open_attributes(last_attributes, false);
                if let Some(attributes) = self.current.attributes_mut(index) {
                    if attributes.multiple_rest.is_some() {
                        log::warn!("Measure {} already has a multi rest", self.current.number);
                    } else {
                        attributes.multiple_rest = Some(*measures);
                    }
                }
            }
            SymbolKind::Note { .. } | SymbolKind::Rest { .. } | SymbolKind::MultiMeasureRest { .. } => {
                self.emit_notes(chord, beams)?;
            }
            SymbolKind::Newline => {
                if !is_last {
                    self.current.push(MeasureElement::NewSystem);
                }
            }
            SymbolKind::Clef { .. } => {
                let index = self.open_attributes(last_attributes, true);
                if let Some(attributes) = self.current.attributes_mut(index) {
                    for member in &chord.members {
                        if let SymbolKind::Clef { sign, line } = member.kind {
                            attributes.clefs.push(Clef {
                                number: member.position.staff(),
                                sign,
                                line,
                            });
                        }
                    }
                }
            }
            SymbolKind::KeySignature { fifths } => {
                let index = self.open_attributes(last_attributes, false);
                if let Some(attributes) = self.current.attributes_mut(index) {
                    attributes.keys.push(*fifths);
                }
            }
            SymbolKind::TimeSignature { numerator, denominator } => {
                let beats = self.state.apply_time_signature(*numerator, *denominator);
                let index = self.open_attributes(last_attributes, false);
                if let Some(attributes) = self.current.attributes_mut(index) {
                    attributes.times.push(Time {
                        beats,
                        beat_type: *denominator,
                    });
                }
            }
            SymbolKind::Barline(kind) => {
                let style = match kind {
                    BarlineKind::Regular => None,
                    BarlineKind::Double => Some("light-light"),
                    BarlineKind::BoldDouble => Some("heavy-heavy"),
                };
                if let Some(style) = style {
                    self.current.barline_mut(BarlineLocation::Right).bar_style = Some(style.to_string());
                }
                self.close_measure();
            }
            SymbolKind::Repeat(RepeatKind::Start) => {
                // The forward mark sits on the right barline of the new measure,
                // so a repeatEnd closing that same measure is dropped as a duplicate.
                self.close_measure();
                self.add_repeat(RepeatDirection::Forward);
            }
            SymbolKind::Repeat(RepeatKind::End) => {
                self.add_repeat(RepeatDirection::Backward);
                self.close_measure();
            }
            SymbolKind::Repeat(RepeatKind::EndStart) => {
                self.add_repeat(RepeatDirection::Backward);
                self.close_measure();
                self.add_repeat(RepeatDirection::Forward);
            }
            SymbolKind::Volta(kind) => {
                let measure = self.current.number;
                let (location, ending_type, number) = match kind {
                    VoltaKind::Start => (BarlineLocation::Left, EndingType::Start, self.state.start_volta(measure)),
                    VoltaKind::Stop => (BarlineLocation::Right, EndingType::Stop, self.state.stop_volta(measure)),
                    VoltaKind::Discontinue => {
                        (BarlineLocation::Right, EndingType::Discontinue, self.state.stop_volta(measure))
                    }
                };
                self.current
                    .barline_mut(location)
                    .endings
                    .push(Ending { ending_type, number });
            }
            SymbolKind::Unsupported(raw) => {
                log::warn!("Symbol isn't supported yet: {}", raw);
            }
        }
        Ok(())
    }

    /// Emit every staff position of a slice.
    ///
    /// All positions but the last rewind to the onset; the last one ends at
    /// the slice duration so the cursor stays aligned across staves.
    fn emit_notes(&mut self, chord: &Chord, beams: &BeamMap) -> Result<()> {
        let positions = chord.into_positions();
        let duration = slice_duration(chord, self.state.measure_length());
        let count = positions.len();
        for (i, position) in positions.iter().enumerate() {
            let chord_duration = if i + 1 == count {
                duration
            } else {
                Rational::from_integer(0)
            };
            for element in build_note_chord(position, &mut self.state, beams, chord_duration)? {
                self.current.push(element);
            }
        }
        Ok(())
    }

    /// Reuse the previous chord's attributes block unless a new one is
    /// forced after notes were already written in this measure.
    fn open_attributes(&mut self, last: Option<usize>, force_new: bool) -> usize {
        let index = match last {
            Some(index) if !force_new || !self.current.has_musical_content() => index,
            _ => self.current.add_attributes(),
        };
        self.attributes = Some(index);
        index
    }

    fn add_repeat(&mut self, direction: RepeatDirection) {
        let number = self.current.number;
        let barline = self.current.barline_mut(BarlineLocation::Right);
        if barline.repeat.is_some() {
            log::warn!("Barline of measure {} already has a repeat", number);
            return;
        }
        barline.repeat = Some(direction);
    }

    fn close_measure(&mut self) {
        let next = Measure::new(self.current.number + 1);
        self.measures.push(std::mem::replace(&mut self.current, next));
    }

    /// The trailing measure is kept only if something sounds in it
    fn finish(mut self) -> Vec<Measure> {
        if self.current.has_musical_content() {
            self.measures.push(self.current);
        }
        self.measures
    }
}
