use crate::config::{COIN_DECIMALS, COIN_VALUE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsParseError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Too many decimals in {0}, maximum is {max}", max = COIN_DECIMALS)]
    TooManyDecimals(String),

    #[error("Amount overflow: {0}")]
    Overflow(String),
}

/// Convert a decimal coin amount ("1", "0.2", "1_000") to nano units
pub fn to_nano(value: &str) -> Result<u128, CoinsParseError> {
    let value = value.trim().replace('_', "");
    if value.is_empty() {
        return Err(CoinsParseError::Empty);
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value.as_str(), ""),
    };

    if fraction.len() > COIN_DECIMALS as usize {
        return Err(CoinsParseError::TooManyDecimals(value.clone()));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(CoinsParseError::Invalid(value.clone()));
    }
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(CoinsParseError::Invalid(value.clone()));
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| CoinsParseError::Overflow(value.clone()))?
    };
    let padded = format!("{:0<width$}", fraction, width = COIN_DECIMALS as usize);
    let fraction: u128 = padded
        .parse()
        .map_err(|_| CoinsParseError::Invalid(value.clone()))?;

    whole
        .checked_mul(COIN_VALUE)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(CoinsParseError::Overflow(value))
}

/// Format nano units as a decimal coin amount, trimming trailing zeros
pub fn from_nano(value: u128) -> String {
    let whole = value / COIN_VALUE;
    let fraction = value % COIN_VALUE;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = COIN_DECIMALS as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_nano() {
        assert_eq!(to_nano("1").unwrap(), 1_000_000_000);
        assert_eq!(to_nano("0.2").unwrap(), 200_000_000);
        assert_eq!(to_nano(".5").unwrap(), 500_000_000);
        assert_eq!(to_nano("1_000").unwrap(), 1_000_000_000_000);
        assert_eq!(to_nano("0.000000001").unwrap(), 1);
    }

    #[test]
    fn test_to_nano_errors() {
        assert_eq!(to_nano(""), Err(CoinsParseError::Empty));
        assert!(matches!(to_nano("abc"), Err(CoinsParseError::Invalid(_))));
        assert!(matches!(to_nano("-1"), Err(CoinsParseError::Invalid(_))));
        assert!(matches!(to_nano("."), Err(CoinsParseError::Invalid(_))));
        assert!(matches!(
            to_nano("0.0000000001"),
            Err(CoinsParseError::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_from_nano() {
        assert_eq!(from_nano(1_000_000_000), "1");
        assert_eq!(from_nano(200_000_000), "0.2");
        assert_eq!(from_nano(1), "0.000000001");
        assert_eq!(from_nano(0), "0");
    }
}
