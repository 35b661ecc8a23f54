//! Bit string encoding of IEEE-754 single precision values.
//!
//! A value is encoded as the 32 bits of its big-endian representation, most
//! significant bit first, so `1.0` becomes `00111111100000000000000000000000`.
//! The encoding is exact: signed zeros, subnormals and NaN payloads survive a
//! round trip.

/// Width of an encoded `f32`.
pub const F32_BITS: usize = 32;

/// Errors that can occur when encoding or decoding values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum EncodingError {
    #[error("bit string has {actual} bits, expected {expected}")]
    BitWidthMismatch { expected: usize, actual: usize },
    #[error("invalid binary digit {0:?}")]
    InvalidDigit(char),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Returns the bits of `value`, most significant first.
pub fn to_bits(value: u32) -> Vec<bool> {
    (0..F32_BITS).rev().map(|i| (value >> i) & 1 == 1).collect()
}

/// Renders bits as a string of `0` and `1`.
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|bit| if *bit { '1' } else { '0' }).collect()
}

/// Parses a string of `0` and `1`.
///
/// Any other character, including whitespace, is rejected.
pub fn parse_bits(s: &str) -> Result<Vec<bool>, EncodingError> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            c => Err(EncodingError::InvalidDigit(c)),
        })
        .collect()
}

/// Encodes an `f32` as its 32-bit string.
pub fn encode_f32(value: f32) -> String {
    bits_to_string(&to_bits(value.to_bits()))
}

/// Decodes a 32-bit string into an `f32`.
pub fn decode_f32(s: &str) -> Result<f32, EncodingError> {
    let bits = parse_bits(s)?;
    if bits.len() != F32_BITS {
        return Err(EncodingError::BitWidthMismatch {
            expected: F32_BITS,
            actual: bits.len(),
        });
    }

    Ok(f32::from_bits(from_bits(&bits)))
}

pub(crate) fn from_bits(bits: &[bool]) -> u32 {
    bits.iter()
        .fold(0u32, |acc, bit| (acc << 1) | u32::from(*bit))
}

/// Parses a comma separated list of numbers, e.g. `1.0, 2.5,3`.
///
/// Empty input yields an empty set. Elements with the same bit pattern are
/// kept once, in order of first appearance.
pub fn parse_set(s: &str) -> Result<Vec<f32>, EncodingError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let values = s
        .split(',')
        .map(|item| {
            let item = item.trim();
            item.parse::<f32>()
                .map_err(|_| EncodingError::InvalidNumber(item.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(dedup_by_bits(values))
}

/// Removes elements whose bit pattern appeared earlier.
pub fn dedup_by_bits(values: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.to_bits()))
        .collect()
}
