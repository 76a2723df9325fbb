//! Arithmetic over the Galois field GF(2^8).
//!
//! Secrets are shared byte by byte, so every coefficient, share value and
//! index lives in this 256-element field. Addition and subtraction are both
//! XOR; multiplication, inversion and division are carried out by the
//! `gf256` type, whose checked variants reject zero divisors.

use gf256::gf256;

use crate::constants::FIELD_SIZE;
use crate::error::{Result, TssError};

/// Adds two field elements.
pub fn add(a: gf256, b: gf256) -> gf256 {
    a + b
}

/// Subtracts `b` from `a`. In characteristic 2 this is the same as addition.
pub fn sub(a: gf256, b: gf256) -> gf256 {
    a + b
}

/// Multiplies two field elements.
pub fn mul(a: gf256, b: gf256) -> gf256 {
    a * b
}

/// Multiplicative inverse.
///
/// # Errors
///
/// Returns [`TssError::InvalidOperation`] for zero.
pub fn inv(a: gf256) -> Result<gf256> {
    a.checked_recip()
        .ok_or(TssError::InvalidOperation("inverse of zero"))
}

/// Divides `a` by `b`.
///
/// # Errors
///
/// Returns [`TssError::InvalidOperation`] if `b` is zero.
pub fn div(a: gf256, b: gf256) -> Result<gf256> {
    a.checked_div(b)
        .ok_or(TssError::InvalidOperation("division by zero"))
}

/// Maps a share index onto a nonzero field element.
///
/// # Errors
///
/// Returns [`TssError::FieldViolation`] if the index is zero or does not fit
/// in the field.
pub fn element_for_index(index: u32) -> Result<gf256> {
    if index == 0 || index >= FIELD_SIZE {
        return Err(TssError::FieldViolation { index });
    }
    Ok(gf256::new(index as u8))
}
