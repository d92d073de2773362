//! Timing analysis
//!
//! One pass over the chords of a part picks the tick resolution and guesses
//! the time-signature numerator, which the recognizer does not reliably
//! provide.

use std::collections::BTreeSet;

use crate::models::{Chord, Rational, SymbolKind};
use super::errors::{ConversionError, Result};
use super::helpers::{lcm, median};

/// Result of analysing one part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingAnalysis {
    /// Ticks per whole note; every observed duration is a whole number of ticks
    pub division: u64,
    /// Median measure length in whole notes (3/4 for a 6/8 or 3/4 measure)
    pub numerator: Rational,
}

/// Smallest tick count per whole note that expresses every duration exactly.
///
/// `None` when that count does not fit in an `i64`.
pub fn find_common_division<'a, I>(durations: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a Rational>,
{
    durations
        .into_iter()
        .filter(|d| **d > Rational::from_integer(0))
        .map(|d| *d.denom() as u64)
        .try_fold(1, lcm)
        .filter(|division| i64::try_from(*division).is_ok())
}

fn common_division(durations: &BTreeSet<Rational>) -> Result<u64> {
    find_common_division(durations).ok_or_else(|| {
        let values: Vec<String> = durations.iter().map(ToString::to_string).collect();
        ConversionError::DivisionOverflow(values.join(", "))
    })
}

/// Beat count of a time signature.
///
/// Without an explicit numerator the beat count is the inferred measure
/// length times the denominator, at least 1.
pub fn time_signature_beats(numerator: Rational, explicit: Option<u32>, denominator: u32) -> u32 {
    explicit.unwrap_or_else(|| {
        let inferred = numerator * Rational::from_integer(i64::from(denominator));
        inferred.to_integer().clamp(1, i64::from(u32::MAX)) as u32
    })
}

/// Infer division and time-signature numerator for a part.
///
/// Every distinct positive note/rest duration contributes its denominator to
/// the division, seeded with a quarter note so the exported per-quarter value
/// is never fractional. Measure lengths are the sums of chord durations
/// between barlines; their median is robust against a few broken measures.
/// Whole-measure rests last a full measure, so when a part has any, the
/// measure lengths they can take contribute to the division as well.
pub fn find_division_and_time_signature_numerator(chords: &[Chord]) -> Result<TimingAnalysis> {
    let zero = Rational::from_integer(0);
    let mut durations: BTreeSet<Rational> = BTreeSet::new();
    durations.insert(Rational::new(1, 4));

    let mut time_signatures = Vec::new();
    let mut has_whole_measure_rest = false;
    for member in chords.iter().flat_map(|chord| chord.members.iter()) {
        if let SymbolKind::TimeSignature { numerator, denominator } = member.kind {
            time_signatures.push((numerator, denominator));
        }
        match member.duration() {
            Some(duration) if duration.is_whole_measure() => has_whole_measure_rest = true,
            Some(duration) => {
                durations.insert(duration.fraction);
            }
            None => {}
        }
    }
    let mut division = common_division(&durations)?;

    let mut measure_durations = Vec::new();
    let mut duration_in_measure = zero;
    for chord in chords {
        if chord.is_barline() {
            if duration_in_measure > zero {
                measure_durations.push(duration_in_measure);
                duration_in_measure = zero;
            }
            continue;
        }
        duration_in_measure += chord.get_duration();
    }
    if duration_in_measure > zero {
        measure_durations.push(duration_in_measure);
    }
    let numerator = median(&measure_durations).unwrap_or_else(|| Rational::from_integer(1));

    if has_whole_measure_rest {
        durations.insert(numerator);
        for (explicit, denominator) in time_signatures {
            let beats = time_signature_beats(numerator, explicit, denominator);
            durations.insert(Rational::new(i64::from(beats), i64::from(denominator)));
        }
        division = common_division(&durations)?;
    }

    log::debug!(
        "Timing analysis: division {} per whole note, numerator {} over {} measures",
        division,
        numerator,
        measure_durations.len()
    );
    Ok(TimingAnalysis { division, numerator })
}
