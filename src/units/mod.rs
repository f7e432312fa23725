use ethers::types::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    NotANumber(String),
    #[error("amount must not be negative")]
    Negative,
    #[error("'{0}' does not fit into a uint256")]
    Overflow(String),
}

/// Converts a decimal string such as `"12.5"` into the token's smallest unit,
/// `round(amount * 10^decimals)`, rounding half up on the first dropped digit.
pub fn to_base_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = input.trim().replace('_', "");

    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount.as_str(), ""),
    };

    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::NotANumber(input.trim().to_owned()));
    }

    let decimals = decimals as usize;
    let overflow = || AmountError::Overflow(input.trim().to_owned());

    // whole digits followed by exactly `decimals` fraction digits
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    if fraction.len() > decimals {
        digits.push_str(&fraction[..decimals]);
    } else {
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));
    }

    let digits = digits.trim_start_matches('0');
    let mut scaled = if digits.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(digits).map_err(|_| overflow())?
    };

    let round_up = fraction
        .as_bytes()
        .get(decimals)
        .map_or(false, |digit| *digit >= b'5');
    if round_up {
        scaled = scaled.checked_add(U256::one()).ok_or_else(overflow)?;
    }

    Ok(scaled)
}

/// Formats a smallest-unit amount back into a decimal string, dropping
/// trailing zeros of the fractional part. Works for any `u8` precision.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = amount.to_string();

    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Native currency balances are always 18 decimals.
pub fn format_native(amount: U256) -> String {
    format_amount(amount, 18)
}
