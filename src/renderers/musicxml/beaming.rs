//! Beam detection
//!
//! Runs of consecutive beamable notes on the same staff position are joined
//! by a beam. The pass walks the whole part per staff position (beams are not
//! reset at measure starts unless a barline chord intervenes) and writes its
//! result into a fresh side table keyed by symbol id.

use std::collections::HashMap;

use crate::models::{BeamState, Chord, StaffPosition, SymbolId};

/// Beam marker per symbol, for symbols that got one
pub type BeamMap = HashMap<SymbolId, BeamState>;

/// Pending run on one staff position
#[derive(Default)]
struct BeamRun {
    pending: Option<SymbolId>,
    length: usize,
}

impl BeamRun {
    /// Close the run; only runs of two or more get an `end`
    fn flush(&mut self, beams: &mut BeamMap) {
        if let Some(pending) = self.pending.take() {
            if self.length >= 2 {
                beams.insert(pending, BeamState::End);
            }
        }
        self.length = 0;
    }

    fn extend(&mut self, candidate: SymbolId, beams: &mut BeamMap) {
        match self.pending {
            None => self.length = 1,
            Some(previous) => {
                let state = if self.length == 1 { BeamState::Begin } else { BeamState::Continue };
                beams.insert(previous, state);
                self.length += 1;
            }
        }
        self.pending = Some(candidate);
    }
}

/// Compute beam markers for every staff position of a part
pub fn apply_beaming(chords: &[Chord]) -> BeamMap {
    let mut beams = BeamMap::new();
    for position in StaffPosition::ALL {
        let mut run = BeamRun::default();
        for chord in chords {
            if chord.is_barline() {
                run.flush(&mut beams);
                continue;
            }

            let Some(staff_chord) = chord.at_position(position) else {
                run.flush(&mut beams);
                continue;
            };

            // A rest always breaks the beam, even next to chord notes
            let has_rest = staff_chord.members.iter().any(|m| m.is_rest());
            let candidate = staff_chord.members.iter().find(|m| m.is_beamable());
            match candidate {
                Some(member) if !has_rest => run.extend(member.id, &mut beams),
                _ => run.flush(&mut beams),
            }
        }
        run.flush(&mut beams);
    }
    beams
}
