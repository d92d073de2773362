//! Helper utilities for MusicXML export
//!
//! Integer and rational arithmetic shared by the timing analysis and the
//! note emitter.

use crate::models::Rational;

/// Calculate least common multiple
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Calculate greatest common divisor
pub fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Exact median; the mean of the two middle values for an even count
pub fn median(values: &[Rational]) -> Option<Rational> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / Rational::from_integer(2))
    }
}

/// Convert a whole-note fraction into ticks at `division` ticks per whole note
pub fn to_ticks(fraction: Rational, division: u64) -> u64 {
    let ticks = fraction * Rational::from_integer(division as i64);
    ticks.to_integer().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(100, 50), 50);
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(12, 8), Some(24));
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(3, 5), Some(15));
        assert_eq!(lcm(0, 5), Some(0));
        assert_eq!(lcm(4 * 4_294_967_291, 4_294_967_279), None);
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = [Rational::new(3, 4), Rational::new(1, 4), Rational::new(3, 4)];
        assert_eq!(median(&odd), Some(Rational::new(3, 4)));

        let even = [Rational::new(1, 2), Rational::new(1, 1)];
        assert_eq!(median(&even), Some(Rational::new(3, 4)));

        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_to_ticks() {
        assert_eq!(to_ticks(Rational::new(3, 8), 16), 6);
        assert_eq!(to_ticks(Rational::new(1, 16), 16), 1);
    }
}
