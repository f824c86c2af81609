//! Argument checks applied before any instruction bytes are produced

use std::{convert::TryFrom, str::FromStr};

use solana_program::pubkey::{Pubkey, PUBKEY_BYTES};

use crate::error::TokenLockError;

// 2^64, the first float that no longer fits in a u64
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// assert the value is a finite number
pub fn assert_finite(value: f64, name: &str) -> Result<(), TokenLockError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TokenLockError::invalid_argument(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

/// assert the value is not below zero
pub fn assert_non_negative(value: f64, name: &str) -> Result<(), TokenLockError> {
    if value < 0.0 {
        Err(TokenLockError::invalid_argument(format!(
            "{} must not be negative, got {}",
            name, value
        )))
    } else {
        Ok(())
    }
}

/// assert the value has no fractional part
pub fn assert_integral(value: f64, name: &str) -> Result<(), TokenLockError> {
    if value.fract() != 0.0 {
        Err(TokenLockError::invalid_argument(format!(
            "{} must be a whole number of smallest units, got {}",
            name, value
        )))
    } else {
        Ok(())
    }
}

/// Converts a display-denomination amount into smallest units.
///
/// Fails if the result is non-finite, negative, fractional or does not fit
/// in a `u64`.
pub fn display_to_base_units(amount: f64, denomination: u64) -> Result<u64, TokenLockError> {
    assert_finite(amount, "amount")?;
    assert_non_negative(amount, "amount")?;

    let base_units = amount * denomination as f64;
    assert_finite(base_units, "amount in smallest units")?;
    assert_integral(base_units, "amount in smallest units")?;

    if base_units >= U64_LIMIT {
        return Err(TokenLockError::invalid_argument(format!(
            "amount {} exceeds the u64 range in smallest units",
            amount
        )));
    }

    Ok(base_units as u64)
}

/// assert a duration in seconds fits the u32 wire field
pub fn assert_duration(seconds: i64) -> Result<u32, TokenLockError> {
    u32::try_from(seconds).map_err(|_| {
        TokenLockError::invalid_argument(format!(
            "duration must be between 0 and {} seconds, got {}",
            u32::MAX,
            seconds
        ))
    })
}

/// Builds an address from raw bytes, which must be exactly 32 long
pub fn address_from_bytes(bytes: &[u8]) -> Result<Pubkey, TokenLockError> {
    <[u8; PUBKEY_BYTES]>::try_from(bytes)
        .map(Pubkey::new_from_array)
        .map_err(|_| {
            TokenLockError::invalid_argument(format!(
                "address must be {} bytes, got {}",
                PUBKEY_BYTES,
                bytes.len()
            ))
        })
}

/// Parses a base58 address
pub fn parse_address(address: &str) -> Result<Pubkey, TokenLockError> {
    Pubkey::from_str(address.trim()).map_err(|err| {
        TokenLockError::invalid_argument(format!("invalid address {:?}: {}", address, err))
    })
}
