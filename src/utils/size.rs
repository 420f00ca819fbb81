//! Inverse of decimal byte formatting.
//!
//! Build tools print sizes the way `humansize`'s `DECIMAL` style does: a
//! rounded magnitude followed by a unit such as `kB` or `MB`. This module turns
//! such a pair back into a byte count. Only the metric prefix letter of the
//! unit is significant, and anything outside the `k`/`M`/`G`/`T`/`P` vocabulary
//! is rejected.

use crate::error::{Result, SnapshotError};

/// Number of fractional digits kept when parsing a magnitude.
const FRACTION_DIGITS: u32 = 9;

/// Convert a displayed size back into bytes.
///
/// The magnitude is parsed with exact integer arithmetic, so `"2.3"` with
/// `"kB"` is exactly `2300`. Sub-byte remainders are truncated.
///
/// # Errors
///
/// - [`SnapshotError::InvalidUnit`] if the unit prefix is not recognized
/// - [`SnapshotError::InvalidMagnitude`] if the magnitude is not a plain
///   non-negative decimal with at most nine fractional digits
/// - [`SnapshotError::SizeOverflow`] if the result does not fit in a `u64`
///
/// # Examples
///
/// ```
/// # use size_snapshot::utils::invert_size;
/// assert_eq!(invert_size("2.3", "kB").unwrap(), 2_300);
/// assert_eq!(invert_size("500", "B").unwrap(), 500);
/// assert!(invert_size("1", "Qb").is_err());
/// ```
pub fn invert_size(magnitude: &str, unit: &str) -> Result<u64> {
    let multiplier = unit_multiplier(unit)?;
    let overflow = || SnapshotError::SizeOverflow {
        magnitude: magnitude.to_string(),
        unit: unit.to_string(),
    };

    let (integer_str, fractional_str) = magnitude.split_once('.').unwrap_or((magnitude, ""));
    if integer_str.is_empty() && fractional_str.is_empty() {
        return Err(SnapshotError::InvalidMagnitude(magnitude.to_string()));
    }

    let integer_part = parse_digits(integer_str, magnitude)?;
    let nanos = parse_fractional_part(fractional_str, magnitude)?;

    let integer_bytes = integer_part.checked_mul(multiplier).ok_or_else(overflow)?;
    let fractional_bytes = u64::try_from(
        u128::from(nanos) * u128::from(multiplier) / 10u128.pow(FRACTION_DIGITS),
    )
    .map_err(|_| overflow())?;

    integer_bytes
        .checked_add(fractional_bytes)
        .ok_or_else(overflow)
}

/// Convert a numeric magnitude in the given unit into bytes.
///
/// # Errors
///
/// Fails with [`SnapshotError::InvalidUnit`] for an unrecognized prefix and
/// [`SnapshotError::SizeOverflow`] when the product overflows.
pub fn invert_bytes(magnitude: u64, unit: &str) -> Result<u64> {
    magnitude
        .checked_mul(unit_multiplier(unit)?)
        .ok_or_else(|| SnapshotError::SizeOverflow {
            magnitude: magnitude.to_string(),
            unit: unit.to_string(),
        })
}

/// Power of 1000 designated by the unit's prefix letter.
///
/// Units shorter than two characters (`"B"`) carry no prefix.
fn unit_power(unit: &str) -> Result<u32> {
    let mut chars = unit.chars();
    let prefix = match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => Some(first),
        _ => None,
    };

    match prefix {
        None => Ok(0),
        Some('k') => Ok(1),
        Some('M') => Ok(2),
        Some('G') => Ok(3),
        Some('T') => Ok(4),
        Some('P') => Ok(5),
        Some(_) => Err(SnapshotError::InvalidUnit(unit.to_string())),
    }
}

fn unit_multiplier(unit: &str) -> Result<u64> {
    Ok(1000u64.pow(unit_power(unit)?))
}

/// Parse an ASCII digit run; an empty run is zero.
fn parse_digits(digits: &str, magnitude: &str) -> Result<u64> {
    if digits.is_empty() {
        return Ok(0);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SnapshotError::InvalidMagnitude(magnitude.to_string()));
    }

    digits
        .parse()
        .map_err(|_| SnapshotError::InvalidMagnitude(magnitude.to_string()))
}

/// Parse the fractional digits into billionths.
fn parse_fractional_part(fractional_str: &str, magnitude: &str) -> Result<u64> {
    let digits = u32::try_from(fractional_str.len())
        .map_err(|_| SnapshotError::InvalidMagnitude(magnitude.to_string()))?;
    if digits > FRACTION_DIGITS {
        return Err(SnapshotError::InvalidMagnitude(magnitude.to_string()));
    }

    Ok(parse_digits(fractional_str, magnitude)? * 10u64.pow(FRACTION_DIGITS - digits))
}
