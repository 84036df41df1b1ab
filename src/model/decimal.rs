// Fixed-point decimal
// CQL DECIMAL is an arbitrary-precision integer ("unscaled value") plus a
// scale: the number is unscaled * 10^-scale. Budgets fit comfortably in an
// i128, so that's what we keep.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("invalid decimal literal: '{0}'")]
    Invalid(String),
    #[error("decimal of {0} bytes does not fit in 128 bits")]
    TooWide(usize),
    #[error("decimal scale {0} is outside -{max}..={max}", max = MAX_SCALE)]
    ScaleOutOfRange(i32),
}

/// Largest scale (either sign) accepted from the wire
/// An i128 has at most 39 digits, so anything past this is padding
pub const MAX_SCALE: u32 = 100;

/// An exact decimal number: `unscaled * 10^-scale`
///
/// The scale is kept as given, so "1500.00" displays as "1500.00" and not
/// "1500". Equality is scale-sensitive: 1.0 and 1.00 are different values
/// of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal {
    unscaled: i128,
    scale: i32,
}

impl Decimal {
    pub fn new(unscaled: i128, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// Build a decimal from the wire representation: a big-endian two's
    /// complement integer of any length plus the scale
    pub fn from_signed_be_bytes(bytes: &[u8], scale: i32) -> Result<Self, DecimalError> {
        if bytes.len() > 16 {
            return Err(DecimalError::TooWide(bytes.len()));
        }
        if scale.unsigned_abs() > MAX_SCALE {
            return Err(DecimalError::ScaleOutOfRange(scale));
        }

        // Sign-extend into a 16 byte buffer
        let negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
        let mut buf = if negative { [0xff; 16] } else { [0x00; 16] };
        buf[16 - bytes.len()..].copy_from_slice(bytes);

        Ok(Self::new(i128::from_be_bytes(buf), scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let digits = self.unscaled.unsigned_abs().to_string();

        if self.scale <= 0 {
            if self.unscaled == 0 {
                return write!(f, "0");
            }
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return write!(f, "{sign}{digits}{zeros}");
        }

        let scale = self.scale as usize;
        if digits.len() <= scale {
            let padding = "0".repeat(scale - digits.len());
            write!(f, "{sign}0.{padding}{digits}")
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalError::Invalid(s.to_string());
        let trimmed = s.trim();

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let scale = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
        if scale.unsigned_abs() > MAX_SCALE {
            return Err(DecimalError::ScaleOutOfRange(scale));
        }
        let magnitude: i128 = format!("{int_part}{frac_part}")
            .parse()
            .map_err(|_| invalid())?;

        let unscaled = if negative { -magnitude } else { magnitude };
        Ok(Self::new(unscaled, scale))
    }
}

impl TryFrom<String> for Decimal {
    type Error = DecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(Decimal::new(150000, 2).to_string(), "1500.00");
        assert_eq!(Decimal::new(-5, 3).to_string(), "-0.005");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
        assert_eq!(Decimal::new(12, -3).to_string(), "12000");
        assert_eq!(Decimal::new(0, 2).to_string(), "0.00");
    }

    #[test]
    fn test_from_signed_be_bytes() {
        assert_eq!(Decimal::from_signed_be_bytes(&[0xff], 0).unwrap(), Decimal::new(-1, 0));
        assert_eq!(Decimal::from_signed_be_bytes(&[0x00, 0x80], 1).unwrap(), Decimal::new(128, 1));
        // 150000 = 0x0249F0
        assert_eq!(
            Decimal::from_signed_be_bytes(&[0x02, 0x49, 0xf0], 2).unwrap().to_string(),
            "1500.00"
        );
        assert_eq!(Decimal::from_signed_be_bytes(&[], 0).unwrap(), Decimal::new(0, 0));
        assert_eq!(
            Decimal::from_signed_be_bytes(&[0u8; 17], 0),
            Err(DecimalError::TooWide(17))
        );
    }

    #[test]
    fn test_wire_scale_is_bounded() {
        assert_eq!(
            Decimal::from_signed_be_bytes(&[0x01], i32::MAX),
            Err(DecimalError::ScaleOutOfRange(i32::MAX))
        );
        assert_eq!(
            Decimal::from_signed_be_bytes(&[0x01], i32::MIN),
            Err(DecimalError::ScaleOutOfRange(i32::MIN))
        );
        assert_eq!(
            Decimal::from_signed_be_bytes(&[0x01], 100).unwrap().to_string().len(),
            "0.".len() + 100
        );
        let long_fraction = format!("0.{}", "1".repeat(101));
        assert_eq!(
            long_fraction.parse::<Decimal>(),
            Err(DecimalError::ScaleOutOfRange(101))
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("1234.50".parse::<Decimal>().unwrap(), Decimal::new(123450, 2));
        assert_eq!("-0.25".parse::<Decimal>().unwrap(), Decimal::new(-25, 2));
        assert_eq!("7".parse::<Decimal>().unwrap(), Decimal::new(7, 0));
        assert!("12a".parse::<Decimal>().is_err());
        assert!(".".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_equality_includes_scale() {
        let one: Decimal = "1.0".parse().unwrap();
        let one_hundredths: Decimal = "1.00".parse().unwrap();
        assert_ne!(one, one_hundredths);
        assert_eq!(one_hundredths.to_string(), "1.00");
    }

    #[test]
    fn test_json_uses_string_form() {
        let budget: Decimal = serde_json::from_str("\"2500.75\"").unwrap();
        assert_eq!(budget, Decimal::new(250075, 2));
        assert_eq!(serde_json::to_string(&budget).unwrap(), "\"2500.75\"");
    }
}
