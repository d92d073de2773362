//! Tuplet bracket annotation

use crate::models::{Chord, TupletMark};

/// Stamp tuplet bracket boundaries on the chords of a part.
///
/// The first chord of every run of tuplet chords gets `Start`; the first
/// non-tuplet chord after such a run gets `Stop`. Other chords are left alone.
pub fn add_tuplet_start_stop(chords: &mut [Chord]) {
    let mut in_tuplet = false;
    for chord in chords.iter_mut() {
        let is_tuplet = chord.is_tuplet();
        if is_tuplet != in_tuplet {
            chord.tuplet_mark = Some(if in_tuplet { TupletMark::Stop } else { TupletMark::Start });
            in_tuplet = is_tuplet;
        }
    }
}
