//! Token-line decoding
//!
//! The recognition stage writes one line per vertical slice. Symbols that
//! sound together are joined with `&`, and each symbol has up to five
//! whitespace-separated fields:
//!
//! ```text
//! rhythm pitch accidental articulation position
//! note_4. G3 # _ upper&note_16 E4 # slurStart upper
//! ```
//!
//! `_` marks an empty field and `.` a field the recognizer could not decode.
//! Trailing fields may be left out; they read as empty.

use crate::models::{
    Accidental, BarlineKind, Decoded, Duration, Pitch, RepeatKind, StaffPosition, Symbol, SymbolKind,
    VoltaKind,
};
use crate::renderers::musicxml::errors::{ConversionError, Result};

const EMPTY: &str = "_";

/// Largest note value (and time-signature denominator) accepted, 128 = 128th
pub const MAX_NOTE_VALUE: u32 = 128;
/// Most augmentation dots accepted on one note
pub const MAX_DOTS: usize = 4;

/// Decode a whole staff given as text, one slice per line
pub fn read_tokens(text: &str) -> Result<Vec<Symbol>> {
    read_token_lines(text.lines())
}

/// Decode token lines into a flat symbol sequence.
///
/// Blank lines are skipped. Every symbol after the first on a line is marked
/// as joined to its predecessor.
pub fn read_token_lines<'a, I>(lines: I) -> Result<Vec<Symbol>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut symbols = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for (i, token) in line.split('&').enumerate() {
            let mut symbol = parse_symbol(line_no, token.trim())?;
            symbol.joined = i > 0;
            symbols.push(symbol);
        }
    }
    Ok(symbols)
}

/// Decode a single `rhythm pitch accidental articulation position` token
pub fn parse_symbol(line_no: usize, token: &str) -> Result<Symbol> {
    let mut fields = token.split_whitespace();
    let rhythm = fields.next().ok_or_else(|| invalid(line_no, token, "empty symbol"))?;
    let pitch = fields.next().unwrap_or(EMPTY);
    let accidental = fields.next().unwrap_or(EMPTY);
    let articulation = fields.next().unwrap_or(EMPTY);
    let position = fields.next().unwrap_or(EMPTY);

    let mut symbol = Symbol::new(parse_rhythm(line_no, rhythm)?);
    symbol.pitch = parse_pitch(pitch);
    symbol.accidental = parse_accidental(accidental);
    symbol.articulations = articulation
        .split('_')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    symbol.position = if position == "lower" {
        StaffPosition::Lower
    } else {
        StaffPosition::Upper
    };
    Ok(symbol)
}

fn parse_rhythm(line_no: usize, rhythm: &str) -> Result<SymbolKind> {
    let kind = match rhythm {
        "newline" => SymbolKind::Newline,
        "barline" => SymbolKind::Barline(BarlineKind::Regular),
        "doublebarline" => SymbolKind::Barline(BarlineKind::Double),
        "bolddoublebarline" => SymbolKind::Barline(BarlineKind::BoldDouble),
        "repeatStart" => SymbolKind::Repeat(RepeatKind::Start),
        "repeatEnd" => SymbolKind::Repeat(RepeatKind::End),
        "repeatEndStart" => SymbolKind::Repeat(RepeatKind::EndStart),
        _ if rhythm.starts_with("volta") => SymbolKind::Volta(parse_volta(rhythm)?),
        _ if rhythm.starts_with("clef_") => parse_clef(line_no, rhythm)?,
        _ if rhythm.starts_with("keySignature_") => {
            let fifths = rhythm["keySignature_".len()..]
                .parse()
                .map_err(|_| invalid(line_no, rhythm, "key signature needs a circle-of-fifths position"))?;
            SymbolKind::KeySignature { fifths }
        }
        _ if rhythm.starts_with("timeSignature") => parse_time_signature(line_no, rhythm)?,
        _ if rhythm.starts_with("note_") || rhythm.starts_with("rest_") => {
            parse_note_or_rest(line_no, rhythm)?
        }
        _ => SymbolKind::Unsupported(rhythm.to_string()),
    };
    Ok(kind)
}

fn parse_volta(rhythm: &str) -> Result<VoltaKind> {
    if rhythm.starts_with("voltaStart") {
        Ok(VoltaKind::Start)
    } else if rhythm.starts_with("voltaStop") {
        Ok(VoltaKind::Stop)
    } else if rhythm.starts_with("voltaDiscontinue") {
        Ok(VoltaKind::Discontinue)
    } else {
        Err(ConversionError::UnknownEnding(rhythm.to_string()))
    }
}

fn parse_clef(line_no: usize, rhythm: &str) -> Result<SymbolKind> {
    let mut chars = rhythm["clef_".len()..].chars();
    let sign = chars.next().filter(|c| c.is_ascii_uppercase());
    let line = chars.next().and_then(|c| c.to_digit(10));
    match (sign, line, chars.next()) {
        (Some(sign), Some(line), None) => Ok(SymbolKind::Clef { sign, line: line as u8 }),
        _ => Err(invalid(line_no, rhythm, "clef needs a sign and a staff line, e.g. clef_G2")),
    }
}

fn parse_time_signature(line_no: usize, rhythm: &str) -> Result<SymbolKind> {
    let rest = rhythm["timeSignature".len()..].trim_start_matches('_');
    let (numerator, denominator) = rest
        .split_once('/')
        .ok_or_else(|| invalid(line_no, rhythm, "time signature needs a denominator, e.g. timeSignature/4"))?;
    let denominator: u32 = denominator
        .parse()
        .ok()
        .filter(|d| (1..=MAX_NOTE_VALUE).contains(d))
        .ok_or_else(|| invalid(line_no, rhythm, "time signature denominator must be between 1 and 128"))?;
    let numerator = if numerator.is_empty() {
        None
    } else {
        Some(
            numerator
                .parse()
                .map_err(|_| invalid(line_no, rhythm, "time signature numerator must be an integer"))?,
        )
    };
    Ok(SymbolKind::TimeSignature { numerator, denominator })
}

fn parse_note_or_rest(line_no: usize, rhythm: &str) -> Result<SymbolKind> {
    let is_rest = rhythm.starts_with("rest_");
    let value = &rhythm["note_".len()..];

    if is_rest {
        if let Some(count) = value.strip_suffix('m') {
            let measures = count
                .parse()
                .map_err(|_| invalid(line_no, rhythm, "multi-measure rest needs a measure count"))?;
            return Ok(SymbolKind::MultiMeasureRest { measures });
        }
    }

    let grace = value.contains('G');
    let value = value.replace('G', "");
    let dots = value.chars().rev().take_while(|c| *c == '.').count();
    if dots > MAX_DOTS {
        return Err(invalid(line_no, rhythm, "too many augmentation dots"));
    }
    let denominator = value.trim_end_matches('.');
    if denominator.parse::<u32>().map_or(false, |d| d > MAX_NOTE_VALUE) {
        return Err(invalid(line_no, rhythm, "note value too short"));
    }
    let duration = Duration::from_denominator(denominator, dots as u8)
        .ok_or_else(|| invalid(line_no, rhythm, "unknown note value"))?;

    if is_rest {
        Ok(SymbolKind::Rest { duration })
    } else {
        Ok(SymbolKind::Note { duration, grace })
    }
}

fn parse_pitch(field: &str) -> Decoded<Pitch> {
    if field == EMPTY {
        return Decoded::Empty;
    }
    let mut chars = field.chars();
    let step = chars.next().filter(|c| ('A'..='G').contains(c));
    let octave = chars.as_str().parse::<i8>().ok();
    match (step, octave) {
        (Some(step), Some(octave)) => Decoded::Value(Pitch { step, octave }),
        _ => Decoded::Invalid,
    }
}

fn parse_accidental(field: &str) -> Decoded<Accidental> {
    match field {
        EMPTY => Decoded::Empty,
        "N" => Decoded::Value(Accidental::Natural),
        "#" => Decoded::Value(Accidental::Sharp),
        "##" => Decoded::Value(Accidental::DoubleSharp),
        "b" => Decoded::Value(Accidental::Flat),
        "bb" => Decoded::Value(Accidental::DoubleFlat),
        _ => Decoded::Invalid,
    }
}

fn invalid(line: usize, token: &str, reason: &str) -> ConversionError {
    ConversionError::InvalidToken {
        line,
        token: token.to_string(),
        reason: reason.to_string(),
    }
}
