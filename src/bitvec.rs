//! Append-only bit buffer with typed extractors.
//!
//! The buffer is built once from an armored payload, fill bits are trimmed
//! from the tail, and the decoders then read fixed-offset fields out of it.
//! Bits are packed into bytes MSB-first; widths never exceed 64.

use tracing::debug;

use crate::errors::DecodeError;
use crate::sixbit;

/// Packed bit buffer over a decoded AIVDM payload.
#[derive(Debug, Clone)]
pub struct BitVector {
    bytes: Vec<u8>,
    len: usize,
}

impl BitVector {
    /// Build a bit buffer from an armored payload string.
    ///
    /// Each character contributes six bits, MSB first. `fill_bits` trailing
    /// bits (0..=5, counted at encode time to pad to a character boundary)
    /// are dropped from the tail afterwards.
    ///
    /// An invalid armor character fails the whole payload when `strict` is
    /// set; otherwise it contributes six zero bits so later field offsets
    /// stay aligned, and is reported at debug level.
    pub fn from_armored(payload: &str, fill_bits: u8, strict: bool) -> Result<Self, DecodeError> {
        let mut bits = BitVector {
            bytes: Vec::with_capacity(payload.len() * 6 / 8 + 1),
            len: 0,
        };

        for c in payload.chars() {
            match sixbit::decode_armor_char(c) {
                Some(v) => bits.push_group(v),
                None if strict => return Err(DecodeError::InvalidArmor(c)),
                None => {
                    debug!("invalid armor character {:?}, substituting zero bits", c);
                    bits.push_group(0);
                }
            }
        }

        if fill_bits > 0 && bits.len >= usize::from(fill_bits) {
            bits.len -= usize::from(fill_bits);
        }

        Ok(bits)
    }

    /// Number of bits in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push_group(&mut self, v: u8) {
        for i in (0..6).rev() {
            let bit = (v >> i) & 1;
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            if bit != 0 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (7 - self.len % 8);
            }
            self.len += 1;
        }
    }

    fn bit(&self, index: usize) -> u64 {
        u64::from((self.bytes[index / 8] >> (7 - index % 8)) & 1)
    }

    fn check_range(&self, start: usize, width: usize) -> Result<(), DecodeError> {
        if width > 64 || start + width > self.len {
            return Err(DecodeError::Truncated {
                start,
                width,
                available: self.len,
            });
        }
        Ok(())
    }

    /// Read `width` bits at `start` as an unsigned integer, MSB first.
    ///
    /// `width == 0` reads the empty field and returns 0.
    pub fn uint(&self, start: usize, width: usize) -> Result<u64, DecodeError> {
        self.check_range(start, width)?;
        let mut val = 0u64;
        for i in 0..width {
            val = (val << 1) | self.bit(start + i);
        }
        Ok(val)
    }

    /// Read `width` bits at `start` as a two's-complement signed integer.
    pub fn int(&self, start: usize, width: usize) -> Result<i64, DecodeError> {
        let raw = self.uint(start, width)?;
        if width == 0 || width == 64 {
            return Ok(raw as i64);
        }
        if raw >> (width - 1) & 1 == 1 {
            // Sign-extend by filling everything above the field
            Ok((raw | (!0u64 << width)) as i64)
        } else {
            Ok(raw as i64)
        }
    }

    /// Read `n_chars` six-bit groups at `start` as a string in the AIS
    /// alphabet, then trim trailing `'@'` fill characters and trailing
    /// spaces. The result may be empty.
    pub fn armored_string(&self, start: usize, n_chars: usize) -> Result<String, DecodeError> {
        self.check_range(start, n_chars * 6)?;
        let mut s = String::with_capacity(n_chars);
        for i in 0..n_chars {
            let v = self.uint(start + i * 6, 6)? as u8;
            s.push(sixbit::string_char(v));
        }
        let trimmed = s.trim_end_matches('@').trim_end_matches(' ');
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_six_bits_per_character() {
        // 'w' = 63 = 0b111111, '0' = 0
        let bits = BitVector::from_armored("w0", 0, true).unwrap();
        assert_eq!(bits.len(), 12);
        assert_eq!(bits.uint(0, 6).unwrap(), 63);
        assert_eq!(bits.uint(6, 6).unwrap(), 0);
        assert_eq!(bits.uint(0, 12).unwrap(), 0b111111000000);
    }

    #[test]
    fn fill_bits_trim_the_tail() {
        let bits = BitVector::from_armored("w0", 4, true).unwrap();
        assert_eq!(bits.len(), 8);
        // The remaining bits are unchanged
        assert_eq!(bits.uint(0, 8).unwrap(), 0b11111100);
    }

    #[test]
    fn zero_fill_bits_leave_everything() {
        let bits = BitVector::from_armored("1", 0, true).unwrap();
        assert_eq!(bits.len(), 6);
    }

    #[test]
    fn zero_width_reads_zero() {
        let bits = BitVector::from_armored("w", 0, true).unwrap();
        assert_eq!(bits.uint(6, 0).unwrap(), 0);
        assert_eq!(bits.int(6, 0).unwrap(), 0);
    }

    #[test]
    fn uint_is_msb_first() {
        // '1' = 1 = 0b000001, 'P' = 32 = 0b100000
        let bits = BitVector::from_armored("1P", 0, true).unwrap();
        assert_eq!(bits.uint(0, 6).unwrap(), 1);
        assert_eq!(bits.uint(5, 2).unwrap(), 0b11);
        assert_eq!(bits.uint(0, 12).unwrap(), (1 << 6) | 32);
    }

    #[test]
    fn int_reinterprets_twos_complement() {
        // 8 bits 0b11111111 = -1; 0b10000000 = -128
        let bits = BitVector::from_armored("ww0", 0, true).unwrap();
        assert_eq!(bits.int(0, 8).unwrap(), -1);
        let bits = BitVector::from_armored("`00", 0, true).unwrap();
        // '`' = 40 = 0b101000 -> first 8 bits 0b10100000
        assert_eq!(bits.uint(0, 8).unwrap(), 0b10100000);
        assert_eq!(bits.int(0, 8).unwrap(), 0b10100000 - 256);
    }

    #[test]
    fn int_positive_equals_uint() {
        let bits = BitVector::from_armored("1P", 0, true).unwrap();
        for width in [1usize, 4, 7, 12] {
            let u = bits.uint(0, width).unwrap();
            let i = bits.int(0, width).unwrap();
            if u & (1 << (width - 1)) != 0 {
                assert_eq!(i + (1i64 << width), u as i64);
            } else {
                assert_eq!(i, u as i64);
            }
        }
    }

    #[test]
    fn out_of_range_reads_fail() {
        let bits = BitVector::from_armored("w", 0, true).unwrap();
        assert!(matches!(
            bits.uint(0, 7),
            Err(DecodeError::Truncated {
                start: 0,
                width: 7,
                available: 6
            })
        ));
        assert!(bits.uint(6, 1).is_err());
        assert!(bits.armored_string(0, 2).is_err());
    }

    #[test]
    fn width_over_64_fails() {
        let bits = BitVector::from_armored("wwwwwwwwwwww", 0, true).unwrap();
        assert!(bits.uint(0, 65).is_err());
        assert_eq!(bits.uint(0, 64).unwrap(), u64::MAX);
    }

    #[test]
    fn strict_rejects_invalid_armor() {
        assert!(matches!(
            BitVector::from_armored("1X1", 0, true),
            Err(DecodeError::InvalidArmor('X'))
        ));
    }

    #[test]
    fn lenient_substitutes_zero_bits() {
        let bits = BitVector::from_armored("wXw", 0, false).unwrap();
        assert_eq!(bits.len(), 18);
        assert_eq!(bits.uint(0, 6).unwrap(), 63);
        assert_eq!(bits.uint(6, 6).unwrap(), 0);
        assert_eq!(bits.uint(12, 6).unwrap(), 63);
    }

    #[test]
    fn armored_string_trims_fill_then_spaces() {
        // "EVER GIVEN@@@@@@@@@@" packed as 6-bit values
        let values: Vec<u8> = "EVER GIVEN@@@@@@@@@@"
            .chars()
            .map(|c| {
                let v = c as u8;
                if v >= 64 {
                    v - 64
                } else {
                    v
                }
            })
            .collect();
        let armored: String = values
            .iter()
            .map(|&v| {
                let c = if v > 39 { v + 48 + 8 } else { v + 48 };
                char::from(c)
            })
            .collect();
        let bits = BitVector::from_armored(&armored, 0, true).unwrap();
        assert_eq!(bits.armored_string(0, 20).unwrap(), "EVER GIVEN");
    }

    #[test]
    fn armored_string_trimming_is_idempotent() {
        // All-fill and all-space fields trim to empty
        let bits = BitVector::from_armored("0000", 0, true).unwrap();
        assert_eq!(bits.armored_string(0, 4).unwrap(), "");
        // ' ' is value 32 -> armor char 'h'
        let bits = BitVector::from_armored("hhhh", 0, true).unwrap();
        assert_eq!(bits.armored_string(0, 4).unwrap(), "");
    }
}
