// Duration helpers for MusicXML export

/// MusicXML note type for a power-of-two base value.
///
/// Base 0 is a breve. Returns `None` for values without a note type.
///
/// # Examples
/// ```
/// use musicxml_generator::renderers::musicxml::duration::note_type_from_base;
///
/// assert_eq!(note_type_from_base(4), Some("quarter"));
/// assert_eq!(note_type_from_base(0), Some("breve"));
/// ```
pub fn note_type_from_base(base: u32) -> Option<&'static str> {
    let name = match base {
        0 => "breve",
        1 => "whole",
        2 => "half",
        4 => "quarter",
        8 => "eighth",
        16 => "16th",
        32 => "32nd",
        64 => "64th",
        128 => "128th",
        _ => return None,
    };
    Some(name)
}
