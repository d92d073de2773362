//! Per-part conversion state
//!
//! Slurs, ties and voltas pair up across notes and measures, so the
//! generator has to hand out numbers for them and take them back when the
//! pair closes. One [`ConversionState`] lives for the conversion of a single
//! part and is threaded explicitly through every call that needs it.
//!
//! ## Number pools
//!
//! Every slur key `(staff, voice)` and every tie key `(staff, pitch, alter)`
//! owns its own pool of the numbers 1..=15. Starting takes the smallest free
//! number; stopping puts it back in sorted position so the lowest number is
//! always reused first. An exhausted pool is not an error: the most recently
//! opened number of that key (or 6) is reused and a warning is logged.

use std::collections::HashMap;

use crate::models::Rational;
use super::helpers::to_ticks;
use super::timing::time_signature_beats;
use super::types::StartStop;

const FIRST_NUMBER: u32 = 1;
const LAST_NUMBER: u32 = 15;
const EXHAUSTED_FALLBACK: u32 = 6;

/// Sorted pool of free numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPool {
    available: Vec<u32>,
}

impl NumberPool {
    pub fn new() -> Self {
        Self {
            available: (FIRST_NUMBER..=LAST_NUMBER).collect(),
        }
    }

    /// Take the smallest free number
    pub fn take(&mut self) -> Option<u32> {
        if self.available.is_empty() {
            None
        } else {
            Some(self.available.remove(0))
        }
    }

    /// Return a number, keeping the pool sorted and free of duplicates
    pub fn release(&mut self, number: u32) {
        if !(FIRST_NUMBER..=LAST_NUMBER).contains(&number) {
            return;
        }
        if let Err(index) = self.available.binary_search(&number) {
            self.available.insert(index, number);
        }
    }
}

impl Default for NumberPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Tie key: staff, pitch text (`C5`) and alter text (`1`, `0` when absent)
pub type TieKey = (u8, String, String);

/// Open numbers of one key plus the pool they were taken from
#[derive(Debug, Clone, Default)]
struct Numbering {
    open: Vec<u32>,
    pool: NumberPool,
}

impl Numbering {
    fn start(&mut self, what: &str) -> u32 {
        let number = match self.pool.take() {
            Some(number) => number,
            None => {
                log::warn!("Exceeded {} numbering limits; {}s may overlap incorrectly", what, what);
                self.open.last().copied().unwrap_or(EXHAUSTED_FALLBACK)
            }
        };
        self.open.push(number);
        number
    }

    fn stop(&mut self) -> Option<u32> {
        let number = self.open.pop()?;
        self.pool.release(number);
        Some(number)
    }
}

/// Mutable state for converting one part
#[derive(Debug, Clone)]
pub struct ConversionState {
    /// Ticks per whole note
    pub division: u64,
    /// Inferred measure length in whole notes
    pub numerator: Rational,
    /// Length used for whole-measure rests, in whole notes
    measure_length: Rational,
    tremolo: StartStop,
    volta_number: u32,
    last_volta_measure: Option<u32>,
    slurs: HashMap<(u8, u32), Numbering>,
    ties: HashMap<TieKey, Numbering>,
}

impl ConversionState {
    pub fn new(division: u64, numerator: Rational) -> Self {
        Self {
            division,
            numerator,
            measure_length: numerator,
            tremolo: StartStop::Stop,
            volta_number: 1,
            last_volta_measure: None,
            slurs: HashMap::new(),
            ties: HashMap::new(),
        }
    }

    /// Ticks for a whole-note fraction at this part's division
    pub fn ticks(&self, fraction: Rational) -> u64 {
        to_ticks(fraction, self.division)
    }

    /// Exported `<divisions>`: ticks per quarter note
    pub fn divisions_per_quarter(&self) -> u64 {
        self.division / 4
    }

    pub fn measure_length(&self) -> Rational {
        self.measure_length
    }

    /// Record a time signature and return its beat count.
    ///
    /// Without an explicit numerator the beat count is the inferred measure
    /// length times the denominator, at least 1.
    pub fn apply_time_signature(&mut self, numerator: Option<u32>, denominator: u32) -> u32 {
        let beats = time_signature_beats(self.numerator, numerator, denominator);
        self.measure_length = Rational::new(i64::from(beats), i64::from(denominator));
        beats
    }

    /// Number for a volta starting in `measure`.
    ///
    /// Directly after the previous volta closed the count goes up (ending 1,
    /// ending 2, ...); anywhere else it starts again at 1.
    pub fn start_volta(&mut self, measure: u32) -> u32 {
        if self.last_volta_measure.map(|last| last + 1) == Some(measure) {
            self.volta_number += 1;
        } else {
            self.volta_number = 1;
        }
        self.volta_number
    }

    pub fn stop_volta(&mut self, measure: u32) -> u32 {
        self.last_volta_measure = Some(measure);
        self.volta_number
    }

    /// Alternate between tremolo start and stop, piece-wide
    pub fn toggle_tremolo(&mut self) -> StartStop {
        self.tremolo = match self.tremolo {
            StartStop::Start => StartStop::Stop,
            StartStop::Stop => StartStop::Start,
        };
        self.tremolo
    }

    pub fn start_slur(&mut self, staff: u8, voice: u32) -> u32 {
        self.slurs.entry((staff, voice)).or_default().start("slur")
    }

    /// Close the most recent slur of this staff and voice; `None` if none is open
    pub fn stop_slur(&mut self, staff: u8, voice: u32) -> Option<u32> {
        self.slurs.get_mut(&(staff, voice))?.stop()
    }

    pub fn start_tie(&mut self, staff: u8, pitch: &str, alter: &str) -> u32 {
        self.ties
            .entry((staff, pitch.to_string(), alter.to_string()))
            .or_default()
            .start("tie")
    }

    /// Close the most recent tie on this staff and pitch; `None` if none is open
    pub fn stop_tie(&mut self, staff: u8, pitch: &str, alter: &str) -> Option<u32> {
        self.ties
            .get_mut(&(staff, pitch.to_string(), alter.to_string()))?
            .stop()
    }
}
