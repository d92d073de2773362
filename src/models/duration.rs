//! Exact note durations
//!
//! Durations are stored as exact fractions of a whole note so that tick
//! counts derived from them never drift. The notated shape (base value,
//! augmentation dots, tuplet ratio) is kept next to the fraction because the
//! exporter needs it to pick a note type and a time-modification block.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};

/// Exact rational used for every duration calculation
pub type Rational = Rational64;

/// Duration of a note or rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// Length in whole notes, dots and tuplet ratio already applied.
    /// Zero means "fills the whole measure".
    pub fraction: Rational,

    /// Number of augmentation dots
    pub dots: u8,

    /// Tuplet ratio: `actual_notes` in the time of `normal_notes`
    pub actual_notes: u32,
    pub normal_notes: u32,

    /// Power-of-two note value (1 = whole, 4 = quarter, ...); 0 = breve
    pub base: u32,
}

impl Duration {
    /// Build a duration from its notated shape.
    ///
    /// `base` 0 is a breve (two whole notes).
    pub fn new(base: u32, dots: u8, actual_notes: u32, normal_notes: u32) -> Self {
        let plain = if base == 0 {
            Rational::from_integer(2)
        } else {
            Rational::new(1, i64::from(base))
        };
        let fraction = plain * dot_factor(dots) * Rational::new(i64::from(normal_notes), i64::from(actual_notes));
        Self {
            fraction,
            dots,
            actual_notes,
            normal_notes,
            base,
        }
    }

    /// Plain (undotted, non-tuplet) note value
    pub fn plain(base: u32) -> Self {
        Self::new(base, 0, 1, 1)
    }

    /// Zero-length duration of a rest that fills the whole measure
    pub fn whole_measure() -> Self {
        Self {
            fraction: Rational::from_integer(0),
            dots: 0,
            actual_notes: 1,
            normal_notes: 1,
            base: 0,
        }
    }

    /// Decode a note-value denominator such as `4`, `12` or `breve`.
    ///
    /// Powers of two are plain values. Any other positive integer is a tuplet
    /// value whose base is the largest power of two below it, so `12` is an
    /// eighth note in a 3:2 triplet and `20` a sixteenth in a 5:4 quintuplet.
    pub fn from_denominator(value: &str, dots: u8) -> Option<Self> {
        if value == "breve" {
            return Some(Self::new(0, dots, 1, 1));
        }
        let denominator: u32 = value.parse().ok()?;
        if denominator == 0 {
            return Some(Self::whole_measure());
        }
        if denominator.is_power_of_two() {
            return Some(Self::new(denominator, dots, 1, 1));
        }
        let base = 1u32 << (31 - denominator.leading_zeros());
        let g = crate::renderers::musicxml::helpers::gcd(denominator as u64, base as u64) as u32;
        Some(Self::new(base, dots, denominator / g, base / g))
    }

    /// True for the zero-length whole-measure duration
    pub fn is_whole_measure(&self) -> bool {
        *self.fraction.numer() == 0
    }

    pub fn is_tuplet(&self) -> bool {
        self.actual_notes != self.normal_notes
    }
}

/// Length multiplier for `dots` augmentation dots: 1, 3/2, 7/4, ...
fn dot_factor(dots: u8) -> Rational {
    let power = 1i64 << dots;
    Rational::new(2 * power - 1, power)
}
