//! The quadkey value type.
//!
//! A quadkey is a sequence of base-4 digits, most significant first. Reading
//! the digits as a base-4 number gives the key's numeric value, which is what
//! storage sorts and shifts; a prefix of a key is one of its ancestors.

use crate::error::{GeoError, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Most digits a key can hold while its numeric value fits in a `u64`.
pub const MAX_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadKey {
    digits: SmallVec<[u8; MAX_KEY_LEN]>,
}

impl QuadKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from digit values `0..=3`.
    pub fn from_digits(digits: &[u8]) -> Result<Self> {
        if digits.len() > MAX_KEY_LEN {
            return Err(GeoError::KeyTooLong {
                len: digits.len(),
                max: MAX_KEY_LEN,
            });
        }
        if let Some(position) = digits.iter().position(|d| *d > 3) {
            return Err(GeoError::InvalidKeyDigit {
                key: digits.iter().map(|d| d.to_string()).collect(),
                position,
                digit: char::from_digit(u32::from(digits[position]), 10).unwrap_or('?'),
            });
        }
        Ok(Self {
            digits: SmallVec::from_slice(digits),
        })
    }

    /// Decode a numeric value into a key of exactly `len` digits.
    ///
    /// The value is left-padded with `'0'` digits; a value needing more than
    /// `len` digits keeps all of them.
    pub fn from_u64(value: u64, len: usize) -> Self {
        let mut key = Self::from_u64_minimal(value);
        let len = len.min(MAX_KEY_LEN);
        if key.len() < len {
            let pad = len - key.len();
            key.digits.insert_many(0, std::iter::repeat_n(0u8, pad));
        }
        key
    }

    /// Shortest base-4 rendering of `value`; `0` becomes the key `"0"`.
    pub fn from_u64_minimal(value: u64) -> Self {
        let mut digits: SmallVec<[u8; MAX_KEY_LEN]> = SmallVec::new();
        let mut rest = value;
        loop {
            digits.push((rest & 3) as u8);
            rest >>= 2;
            if rest == 0 {
                break;
            }
        }
        digits.reverse();
        Self { digits }
    }

    /// Numeric value of the digits read in base 4.
    pub fn to_u64(&self) -> u64 {
        self.digits
            .iter()
            .fold(0u64, |acc, d| (acc << 2) | u64::from(*d))
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub(crate) fn push(&mut self, digit: u8) {
        debug_assert!(digit <= 3);
        self.digits.push(digit);
    }

    /// Copy extended by `count` repetitions of `digit`, capped at [`MAX_KEY_LEN`].
    pub fn padded(&self, digit: u8, count: usize) -> Self {
        let mut key = self.clone();
        let count = count.min(MAX_KEY_LEN.saturating_sub(key.len()));
        key.digits.extend(std::iter::repeat_n(digit & 3, count));
        key
    }

    /// The ancestor made of the first `len` digits.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            digits: SmallVec::from_slice(&self.digits[..len.min(self.len())]),
        }
    }

    pub fn is_prefix_of(&self, other: &QuadKey) -> bool {
        other.digits.starts_with(&self.digits)
    }

    /// Binary rendering of the numeric value.
    pub fn bits(&self) -> String {
        format!("{:b}", self.to_u64())
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.digits {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

impl FromStr for QuadKey {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let mut digits: SmallVec<[u8; MAX_KEY_LEN]> = SmallVec::new();
        for (position, ch) in s.chars().enumerate() {
            let digit = match ch {
                '0'..='3' => ch as u8 - b'0',
                _ => {
                    return Err(GeoError::InvalidKeyDigit {
                        key: s.to_string(),
                        position,
                        digit: ch,
                    });
                }
            };
            if digits.len() == MAX_KEY_LEN {
                return Err(GeoError::KeyTooLong {
                    len: s.chars().count(),
                    max: MAX_KEY_LEN,
                });
            }
            digits.push(digit);
        }
        Ok(Self { digits })
    }
}

impl TryFrom<&str> for QuadKey {
    type Error = GeoError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}
