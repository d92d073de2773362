// Pitch mapping for MusicXML export

use crate::models::{Accidental, Decoded, Pitch};

/// MusicXML `<alter>` value for an accidental
pub fn accidental_to_alter(accidental: Accidental) -> i8 {
    match accidental {
        Accidental::Natural => 0,
        Accidental::Sharp => 1,
        Accidental::DoubleSharp => 2,
        Accidental::Flat => -1,
        Accidental::DoubleFlat => -2,
    }
}

/// Convert a decoded pitch and accidental to (step, octave, alter).
///
/// Returns `None` when the pitch is empty or invalid. An invalid accidental
/// is logged and the bare pitch is kept.
pub fn pitch_to_step_alter(pitch: &Decoded<Pitch>, accidental: &Decoded<Accidental>) -> Option<(char, i8, Option<i8>)> {
    let pitch = pitch.value()?;
    let alter = match accidental {
        Decoded::Value(accidental) => Some(accidental_to_alter(*accidental)),
        Decoded::Invalid => {
            log::warn!("Note {}{} with invalid accidental", pitch.step, pitch.octave);
            None
        }
        Decoded::Empty => None,
    };
    Some((pitch.step, pitch.octave, alter))
}
