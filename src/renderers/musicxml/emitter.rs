//! Note and chord emission
//!
//! Turns one staff-position sub-chord into `<note>` and `<backup>` elements.
//!
//! Members of a slice rarely share one duration: a dotted quarter may start
//! together with a sixteenth. Members are therefore split into duration
//! classes, shortest first. Each class becomes its own voice; the first
//! member advances time and the rest are stacked on it as chord notes.
//! Between classes a backup rewinds to the shared onset, and after the last
//! class one more backup realigns the cursor with the end of the slice.

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Articulation, Chord, ChordMember, Decoded, Rational, StaffPosition, Symbol, SymbolId, TupletMark, INVALID_TAG,
};
use super::beaming::BeamMap;
use super::duration::note_type_from_base;
use super::errors::{ConversionError, Result};
use super::numbering::ConversionState;
use super::pitch::pitch_to_step_alter;
use super::types::{ArticulationMark, MeasureElement, NotationMark, Notations, Note, NoteContent, Ornament, StartStop};

/// Emit one staff-position sub-chord.
///
/// `chord_duration` is where the cursor must end up relative to the onset;
/// pass zero for every sub-chord but the last one of a slice so the last
/// one's closing backup or forward realigns all positions at once.
pub fn build_note_chord(
    chord: &Chord,
    state: &mut ConversionState,
    beams: &BeamMap,
    chord_duration: Rational,
) -> Result<Vec<MeasureElement>> {
    let (slur_tie_groups, chord) = chord.strip_slur_ties();
    let slur_tie_map: HashMap<SymbolId, Vec<String>> = chord
        .members
        .iter()
        .map(|m| m.id)
        .zip(slur_tie_groups)
        .collect();

    let by_duration = group_notes(&chord.members, state.measure_length());

    // Lower staff starts at voice 2 so beams never group across staves
    let voice_offset = match chord.position() {
        Some(StaffPosition::Lower) => 1,
        _ => 0,
    };

    let zero = Rational::from_integer(0);
    let mut result = Vec::new();
    let mut final_duration = zero;
    let class_count = by_duration.len();
    for (i, (class_duration, members)) in by_duration.into_iter().enumerate() {
        let voice = (i + voice_offset) as u32 + 1;
        for (j, member) in members.into_iter().enumerate() {
            let mut symbol = member.symbol.clone();
            if let Some(tags) = slur_tie_map.get(&member.id) {
                symbol.articulations.extend(tags.iter().cloned());
            }
            let note = build_note_or_rest(
                &symbol,
                member.id,
                class_duration,
                voice,
                j > 0,
                state,
                beams,
                chord.tuplet_mark,
            )?;
            result.push(MeasureElement::Note(note));
        }
        if i + 1 != class_count && class_duration > zero {
            result.push(MeasureElement::Backup(state.ticks(class_duration)));
        }
        final_duration = class_duration;
    }

    if chord_duration < final_duration {
        result.push(MeasureElement::Backup(state.ticks(final_duration - chord_duration)));
    } else if chord_duration > final_duration {
        // only grace notes in the last position: skip over the slice
        result.push(MeasureElement::Forward(state.ticks(chord_duration - final_duration)));
    }
    Ok(result)
}

/// Time a slice occupies: its shortest class with a real duration.
///
/// Grace notes take no time. A slice holding only a whole-measure rest lasts
/// the measure length.
pub fn slice_duration(chord: &Chord, measure_length: Rational) -> Rational {
    let zero = Rational::from_integer(0);
    group_notes(&chord.members, measure_length)
        .into_keys()
        .find(|d| *d > zero)
        .unwrap_or(zero)
}

/// Partition notes and rests into duration classes, sorted by duration.
///
/// Grace notes share the zero class. A whole-measure rest joins the class of
/// the longest real duration present, or the measure length without one.
fn group_notes(members: &[ChordMember], measure_length: Rational) -> BTreeMap<Rational, Vec<&ChordMember>> {
    let zero = Rational::from_integer(0);
    let max_duration = members
        .iter()
        .filter_map(|m| m.duration())
        .map(|d| d.fraction)
        .filter(|f| *f > zero)
        .max()
        .unwrap_or(measure_length);

    let mut groups: BTreeMap<Rational, Vec<&ChordMember>> = BTreeMap::new();
    for member in members {
        let Some(duration) = member.duration() else {
            continue;
        };
        let fraction = if member.is_grace() {
            zero
        } else if duration.is_whole_measure() {
            max_duration
        } else {
            duration.fraction
        };
        groups.entry(fraction).or_default().push(member);
    }
    groups
}

/// Build a single `<note>`
#[allow(clippy::too_many_arguments)]
fn build_note_or_rest(
    symbol: &Symbol,
    id: SymbolId,
    class_duration: Rational,
    voice: u32,
    is_chord: bool,
    state: &mut ConversionState,
    beams: &BeamMap,
    tuplet_mark: Option<TupletMark>,
) -> Result<Note> {
    let duration = symbol.duration().unwrap_or_else(crate::models::Duration::whole_measure);

    let content = match symbol.pitch {
        Decoded::Empty => NoteContent::Rest { measure: duration.is_whole_measure() },
        Decoded::Invalid => {
            log::warn!("Note without pitch: {:?}", symbol.kind);
            NoteContent::Rest { measure: false }
        }
        Decoded::Value(_) => match pitch_to_step_alter(&symbol.pitch, &symbol.accidental) {
            Some((step, octave, alter)) => NoteContent::Pitch { step, octave, alter },
            None => NoteContent::Rest { measure: false },
        },
    };

    let note_type = note_type_from_base(duration.base);
    if note_type.is_none() {
        log::warn!("No note type for base value {}", duration.base);
    }
    let grace = symbol.is_grace();
    let ticks = if grace {
        None
    } else if duration.is_whole_measure() {
        Some(state.ticks(class_duration))
    } else {
        Some(state.ticks(duration.fraction))
    };

    let beam = if !is_chord && symbol.is_beamable() {
        beams.get(&id).copied()
    } else {
        None
    };

    let staff = symbol.position.staff();
    let mut note = Note {
        grace,
        chord: is_chord,
        content,
        duration: ticks,
        voice,
        note_type: note_type.map(str::to_string),
        dots: duration.dots,
        time_modification: None,
        staff,
        beam,
        notations: Notations::default(),
    };

    let bracket = if duration.is_tuplet() {
        note.time_modification = Some((duration.actual_notes, duration.normal_notes));
        tuplet_mark
    } else {
        None
    };
    note.notations = build_articulations(&note, &symbol.articulations, bracket, state, staff, voice)?;
    Ok(note)
}

/// Resolve articulation tags into notations.
///
/// Slur and tie stops without a matching start are dropped. An unknown tag
/// means the producer broke its vocabulary and aborts the conversion.
fn build_articulations(
    note: &Note,
    tags: &[String],
    tuplet_mark: Option<TupletMark>,
    state: &mut ConversionState,
    staff: u8,
    voice: u32,
) -> Result<Notations> {
    let mut notations = Notations {
        tuplet: tuplet_mark,
        ..Notations::default()
    };

    for tag in tags {
        if tag.is_empty() {
            continue;
        }
        if tag == INVALID_TAG {
            log::warn!("Note without valid articulation: {:?}", tags);
            continue;
        }
        let articulation =
            Articulation::from_tag(tag).ok_or_else(|| ConversionError::UnsupportedArticulation(tag.clone()))?;
        match articulation {
            Articulation::Fermata => notations.marks.push(NotationMark::Fermata),
            Articulation::Arpeggiate => notations.marks.push(NotationMark::Arpeggiate),
            Articulation::Accent => notations.articulations.push(ArticulationMark::Accent),
            Articulation::Staccato => notations.articulations.push(ArticulationMark::Staccato),
            Articulation::Staccatissimo => notations.articulations.push(ArticulationMark::Staccatissimo),
            Articulation::Tenuto => notations.articulations.push(ArticulationMark::Tenuto),
            Articulation::BreathMark => notations.articulations.push(ArticulationMark::BreathMark),
            Articulation::Caesura => notations.articulations.push(ArticulationMark::Caesura),
            Articulation::Doit => notations.articulations.push(ArticulationMark::Doit),
            Articulation::Tremolo => notations.ornaments.push(Ornament::Tremolo(state.toggle_tremolo())),
            Articulation::Trill => notations.ornaments.push(Ornament::TrillMark),
            Articulation::Turn => notations.ornaments.push(Ornament::InvertedTurn),
            Articulation::SlurStart => {
                let number = state.start_slur(staff, voice);
                notations.marks.push(NotationMark::Slur { kind: StartStop::Start, number });
            }
            Articulation::SlurStop => {
                if let Some(number) = state.stop_slur(staff, voice) {
                    notations.marks.push(NotationMark::Slur { kind: StartStop::Stop, number });
                }
            }
            Articulation::TieStart => {
                let number = tie_key(note).map(|(pitch, alter)| state.start_tie(staff, &pitch, &alter));
                notations.marks.push(NotationMark::Tied { kind: StartStop::Start, number });
            }
            Articulation::TieStop => {
                let number = tie_key(note).and_then(|(pitch, alter)| state.stop_tie(staff, &pitch, &alter));
                if let Some(number) = number {
                    notations.marks.push(NotationMark::Tied { kind: StartStop::Stop, number: Some(number) });
                }
            }
        }
    }
    Ok(notations)
}

/// Pitch and alter text identifying the tie a note belongs to
fn tie_key(note: &Note) -> Option<(String, String)> {
    let (step, octave, alter) = note.pitch()?;
    Some((format!("{}{}", step, octave), alter.unwrap_or(0).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group_into_chords;
    use crate::parse::read_tokens;

    fn first_chord(text: &str) -> Chord {
        group_into_chords(&read_tokens(text).unwrap()).remove(0)
    }

    fn emit(text: &str, division: u64) -> Vec<MeasureElement> {
        let chord = first_chord(text);
        let mut state = ConversionState::new(division, Rational::from_integer(1));
        let duration = slice_duration(&chord, state.measure_length());
        build_note_chord(&chord, &mut state, &BeamMap::new(), duration).unwrap()
    }

    fn notes(elements: &[MeasureElement]) -> Vec<&Note> {
        elements
            .iter()
            .filter_map(|e| match e {
                MeasureElement::Note(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dotted_chord_with_sixteenth() {
        let elements = emit("note_4. G3 # _ upper&note_4. C4 # _ upper&note_16 E4 # _ upper", 16);
        assert_eq!(elements.len(), 5);

        let first = notes(&elements)[0];
        assert_eq!(first.pitch(), Some(('E', 4, Some(1))));
        assert_eq!(first.duration, Some(1));
        assert_eq!(first.voice, 1);
        assert_eq!(elements[1], MeasureElement::Backup(1));

        let dotted = notes(&elements);
        assert_eq!(dotted[1].duration, Some(6));
        assert_eq!(dotted[1].voice, 2);
        assert_eq!(dotted[1].dots, 1);
        assert!(!dotted[1].chord);
        assert!(dotted[2].chord);
        assert_eq!(dotted[2].dots, 1);
        assert_eq!(elements[4], MeasureElement::Backup(5));
    }

    #[test]
    fn test_single_note_has_no_backup() {
        let elements = emit("note_4 C4 _ _ upper", 4);
        assert_eq!(elements.len(), 1);
        let note = notes(&elements)[0];
        assert_eq!(note.note_type.as_deref(), Some("quarter"));
        assert_eq!(note.staff, 1);
        assert_eq!(note.pitch(), Some(('C', 4, None)));
    }

    #[test]
    fn test_lower_staff_voice_offset() {
        let elements = emit("note_4 C3 _ _ lower", 4);
        let note = notes(&elements)[0];
        assert_eq!(note.voice, 2);
        assert_eq!(note.staff, 2);
    }

    #[test]
    fn test_zero_chord_duration_rewinds_fully() {
        let chord = first_chord("note_2 E4 _ _ upper");
        let mut state = ConversionState::new(4, Rational::from_integer(1));
        let elements = build_note_chord(&chord, &mut state, &BeamMap::new(), Rational::from_integer(0)).unwrap();
        assert_eq!(elements.last(), Some(&MeasureElement::Backup(2)));
    }

    #[test]
    fn test_whole_measure_rest_alone_fills_measure() {
        let chord = first_chord("rest_0 _ _ _ upper");
        let mut state = ConversionState::new(8, Rational::new(3, 4));
        let duration = slice_duration(&chord, state.measure_length());
        let elements = build_note_chord(&chord, &mut state, &BeamMap::new(), duration).unwrap();
        let rest = notes(&elements)[0];
        assert_eq!(rest.content, NoteContent::Rest { measure: true });
        assert_eq!(rest.duration, Some(6));
        assert_eq!(rest.note_type.as_deref(), Some("breve"));
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_slice_duration() {
        let measure = Rational::new(3, 4);
        assert_eq!(slice_duration(&first_chord("rest_0 _ _ _ upper"), measure), measure);
        assert_eq!(
            slice_duration(&first_chord("note_8G D5 _ _ upper&note_4 C5 _ _ upper"), measure),
            Rational::new(1, 4)
        );
        assert_eq!(slice_duration(&first_chord("note_8G D5 _ _ upper"), measure), Rational::from_integer(0));
        assert_eq!(slice_duration(&first_chord("clef_G2 _ _ _ upper"), measure), Rational::from_integer(0));
    }

    #[test]
    fn test_whole_measure_rest_joins_longest_class() {
        let elements = emit("note_4 C4 _ _ upper&rest_0 _ _ _ upper&note_2 E4 _ _ upper", 4);
        let all = notes(&elements);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].content, NoteContent::Rest { measure: true });
        assert!(!all[1].chord);
        assert_eq!(all[1].duration, Some(2));
        assert_eq!(all[2].pitch(), Some(('E', 4, None)));
        assert!(all[2].chord);
    }

    #[test]
    fn test_grace_only_position_moves_forward() {
        let chord = first_chord("note_8G D3 _ _ lower");
        let mut state = ConversionState::new(8, Rational::from_integer(1));
        let elements = build_note_chord(&chord, &mut state, &BeamMap::new(), Rational::new(1, 4)).unwrap();
        assert_eq!(notes(&elements).len(), 1);
        assert_eq!(elements.last(), Some(&MeasureElement::Forward(2)));
        assert!(!elements.iter().any(|e| matches!(e, MeasureElement::Backup(_))));
    }

    #[test]
    fn test_grace_note_has_no_duration() {
        let elements = emit("note_8G D5 _ _ upper&note_4 C5 _ _ upper", 4);
        let all = notes(&elements);
        assert!(all[0].grace);
        assert_eq!(all[0].duration, None);
        assert_eq!(all[0].note_type.as_deref(), Some("eighth"));
        assert_eq!(all[1].voice, 2);
        assert!(!elements.iter().any(|e| matches!(e, MeasureElement::Backup(_))));
    }

    #[test]
    fn test_tuplet_bracket_only_on_tuplet_notes() {
        let mut chord = first_chord("note_12 C4 _ _ upper");
        chord.tuplet_mark = Some(TupletMark::Start);
        let mut state = ConversionState::new(12, Rational::from_integer(1));
        let duration = slice_duration(&chord, state.measure_length());
        let elements = build_note_chord(&chord, &mut state, &BeamMap::new(), duration).unwrap();
        let note = notes(&elements)[0];
        assert_eq!(note.time_modification, Some((3, 2)));
        assert_eq!(note.notations.tuplet, Some(TupletMark::Start));
        assert_eq!(note.duration, Some(1));

        let mut plain = first_chord("note_4 C4 _ _ upper");
        plain.tuplet_mark = Some(TupletMark::Stop);
        let elements = build_note_chord(&plain, &mut state, &BeamMap::new(), Rational::new(1, 4)).unwrap();
        assert_eq!(notes(&elements)[0].notations.tuplet, None);
    }

    #[test]
    fn test_articulations_resolve() {
        let elements = emit("note_4 C4 _ staccato_fermata_trill_breathMark upper", 4);
        let notations = &notes(&elements)[0].notations;
        assert_eq!(notations.marks, vec![NotationMark::Fermata]);
        assert_eq!(
            notations.articulations,
            vec![ArticulationMark::Staccato, ArticulationMark::BreathMark]
        );
        assert_eq!(notations.ornaments, vec![Ornament::TrillMark]);
    }

    #[test]
    fn test_unknown_articulation_is_fatal() {
        let chord = first_chord("note_4 C4 _ wiggle upper");
        let mut state = ConversionState::new(4, Rational::from_integer(1));
        let duration = slice_duration(&chord, state.measure_length());
        let err = build_note_chord(&chord, &mut state, &BeamMap::new(), duration).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedArticulation(tag) if tag == "wiggle"));
    }

    #[test]
    fn test_invalid_articulation_marker_is_skipped() {
        let elements = emit("note_4 C4 _ . upper", 4);
        assert!(notes(&elements)[0].notations.is_empty());
    }

    #[test]
    fn test_unmatched_stops_are_dropped() {
        let elements = emit("note_4 C4 _ slurStop_tieStop upper", 4);
        assert!(notes(&elements)[0].notations.marks.is_empty());
    }

    #[test]
    fn test_slur_and_tie_tags_follow_other_marks() {
        let elements = emit("note_4 C4 # slurStart_fermata upper", 4);
        let marks = &notes(&elements)[0].notations.marks;
        assert_eq!(
            marks,
            &vec![
                NotationMark::Fermata,
                NotationMark::Slur { kind: StartStop::Start, number: 1 },
            ]
        );
    }

    #[test]
    fn test_invalid_pitch_becomes_rest() {
        let elements = emit("note_4 . _ _ upper", 4);
        assert_eq!(notes(&elements)[0].content, NoteContent::Rest { measure: false });
    }

    #[test]
    fn test_beam_only_on_primary_note() {
        let chord = first_chord("note_8 C4 _ _ upper&note_8 E4 _ _ upper");
        let mut beams = BeamMap::new();
        beams.insert(0, crate::models::BeamState::Begin);
        beams.insert(1, crate::models::BeamState::Begin);
        let mut state = ConversionState::new(8, Rational::from_integer(1));
        let elements = build_note_chord(&chord, &mut state, &beams, Rational::new(1, 8)).unwrap();
        let all = notes(&elements);
        assert_eq!(all[0].beam, Some(crate::models::BeamState::Begin));
        assert_eq!(all[1].beam, None);
    }
}
