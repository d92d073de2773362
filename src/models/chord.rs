//! Vertical slices of symbols
//!
//! A [`Chord`] holds every symbol that starts at the same time position.
//! Members keep the index of their symbol in the part so that per-symbol
//! annotations (beams, stripped slur/tie tags) can live in side tables.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::duration::Rational;
use super::symbol::{Articulation, StaffPosition, Symbol, SymbolKind};

/// Index of a symbol within its part
pub type SymbolId = usize;

/// Tuplet bracket boundary stamped by the tuplet annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TupletMark {
    Start,
    Stop,
}

impl TupletMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            TupletMark::Start => "start",
            TupletMark::Stop => "stop",
        }
    }
}

/// A symbol together with its identity in the part
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMember {
    pub id: SymbolId,
    pub symbol: Symbol,
}

impl Deref for ChordMember {
    type Target = Symbol;

    fn deref(&self) -> &Symbol {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chord {
    pub members: Vec<ChordMember>,
    pub tuplet_mark: Option<TupletMark>,
}

impl Chord {
    pub fn new(members: Vec<ChordMember>) -> Self {
        Self {
            members,
            tuplet_mark: None,
        }
    }

    pub fn first(&self) -> Option<&ChordMember> {
        self.members.first()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the slice marks a measure boundary (barline or repeat)
    pub fn is_barline(&self) -> bool {
        self.first()
            .map(|m| matches!(m.kind, SymbolKind::Barline(_) | SymbolKind::Repeat(_)))
            .unwrap_or(false)
    }

    /// Shortest note or rest duration in the slice, zero without any
    pub fn get_duration(&self) -> Rational {
        self.members
            .iter()
            .filter_map(|m| m.duration())
            .map(|d| d.fraction)
            .min()
            .unwrap_or_else(|| Rational::from_integer(0))
    }

    /// True when any note or rest is part of a tuplet
    pub fn is_tuplet(&self) -> bool {
        self.members
            .iter()
            .filter_map(|m| m.duration())
            .any(|d| d.is_tuplet())
    }

    /// Staff position of the slice, taken from its first member
    pub fn position(&self) -> Option<StaffPosition> {
        self.first().map(|m| m.position)
    }

    /// Split into per-staff sub-chords.
    ///
    /// Upper comes first unless the lower part holds nothing but rests: a
    /// standalone lower rest then opens the time position so that a tuplet
    /// in the upper staff does not need a leading backup.
    pub fn into_positions(&self) -> Vec<Chord> {
        let mut upper = Vec::new();
        let mut lower = Vec::new();
        let mut lower_is_only_rest = true;
        for member in &self.members {
            match member.position {
                StaffPosition::Upper => upper.push(member.clone()),
                StaffPosition::Lower => {
                    lower_is_only_rest = lower_is_only_rest && member.is_rest();
                    lower.push(member.clone());
                }
            }
        }

        let upper = Chord { members: upper, tuplet_mark: self.tuplet_mark };
        let lower = Chord { members: lower, tuplet_mark: self.tuplet_mark };
        let ordered = if lower_is_only_rest { [lower, upper] } else { [upper, lower] };
        ordered.into_iter().filter(|c| !c.is_empty()).collect()
    }

    /// Sub-chord for one staff position, if the slice has any symbol there
    pub fn at_position(&self, position: StaffPosition) -> Option<Chord> {
        self.into_positions()
            .into_iter()
            .find(|c| c.position() == Some(position))
    }

    /// Remove slur and tie tags from every member.
    ///
    /// Returns the removed tags per member (same order as `members`) and the
    /// chord without them.
    pub fn strip_slur_ties(&self) -> (Vec<Vec<String>>, Chord) {
        let mut stripped_per_symbol = Vec::with_capacity(self.members.len());
        let mut members = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let (stripped, symbol) = member.symbol.strip_tags(Articulation::is_slur_or_tie);
            stripped_per_symbol.push(stripped);
            members.push(ChordMember { id: member.id, symbol });
        }
        (stripped_per_symbol, Chord { members, tuplet_mark: self.tuplet_mark })
    }
}

/// Group a flat symbol sequence into vertical slices.
///
/// A symbol marked `joined` belongs to the slice of the symbol before it;
/// every other symbol opens a new slice. Input order is preserved.
pub fn group_into_chords(symbols: &[Symbol]) -> Vec<Chord> {
    let mut chords: Vec<Chord> = Vec::new();
    for (id, symbol) in symbols.iter().enumerate() {
        let member = ChordMember { id, symbol: symbol.clone() };
        match chords.last_mut() {
            Some(chord) if symbol.joined => chord.members.push(member),
            _ => chords.push(Chord::new(vec![member])),
        }
    }
    chords
}
