//! Base-256 arbitrary-length digit arithmetic.
//!
//! Positions are fractional indices: a digit vector is read as the digits of
//! a number in `[0, 1)`, most significant first. Vectors may have any length
//! and trailing digits that are absent read as zero, so `[1]` and `[1, 0]`
//! denote the same value. [`increment`] never produces a trailing zero,
//! keeping minted positions in canonical form.

use crate::error::{EngineError, Result};

/// Digit base. Identifier digits range over `0..BASE`; the end-of-document
/// sentinel uses `BASE` itself as an out-of-band maximum.
pub const BASE: u32 = 256;

/// Digit-wise `n1 - n2`, assuming `n1 > n2` as fractions.
///
/// Missing trailing digits read as 0 and the result has
/// `max(n1.len(), n2.len())` digits; borrows propagate leftward.
pub fn subtract_greater_than(n1: &[u32], n2: &[u32]) -> Vec<u32> {
    let len = n1.len().max(n2.len());
    let mut diff = vec![0; len];
    let mut borrow: i64 = 0;
    for index in (0..len).rev() {
        let d1 = n1.get(index).copied().unwrap_or(0) as i64 - borrow;
        let d2 = n2.get(index).copied().unwrap_or(0) as i64;
        if d1 < d2 {
            borrow = 1;
            diff[index] = (d1 + BASE as i64 - d2) as u32;
        } else {
            borrow = 0;
            diff[index] = (d1 - d2) as u32;
        }
    }
    diff
}

/// Digit-wise `n1 + n2` with carry.
///
/// Missing trailing digits read as 0. A carry escaping the most significant
/// digit means the sum is not representable at this length; callers guarantee
/// it cannot happen, so it is reported as [`EngineError::DigitOverflow`].
pub fn add(n1: &[u32], n2: &[u32]) -> Result<Vec<u32>> {
    let len = n1.len().max(n2.len());
    let mut sum = vec![0; len];
    let mut carry = 0;
    for index in (0..len).rev() {
        let d1 = n1.get(index).copied().unwrap_or(0);
        let d2 = n2.get(index).copied().unwrap_or(0);
        let digit = d1 + d2 + carry;
        carry = digit / BASE;
        sum[index] = digit % BASE;
    }
    if carry != 0 {
        return Err(EngineError::DigitOverflow);
    }
    Ok(sum)
}

/// Pad the shorter vector with trailing zeros so both have equal length.
pub fn match_digits(n1: &[u32], n2: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let len = n1.len().max(n2.len());
    let mut m1 = n1.to_vec();
    let mut m2 = n2.to_vec();
    m1.resize(len, 0);
    m2.resize(len, 0);
    (m1, m2)
}

/// Return `n1' > n1` with `n1' - n1 < delta` and a nonzero final digit.
///
/// The nonzero final digit rules out ambiguous trailing-zero forms (0.10
/// versus 0.1). Construction: take delta's leading zeros, append `[0, 1]`,
/// and add that to `n1`; if the last digit lands on 0, add it once more.
pub fn increment(n1: &[u32], delta: &[u32]) -> Result<Vec<u32>> {
    let first_nonzero = delta
        .iter()
        .position(|&digit| digit != 0)
        .unwrap_or(delta.len().saturating_sub(1));
    let mut inc = delta[..first_nonzero].to_vec();
    inc.extend_from_slice(&[0, 1]);

    let (v0, inc) = match_digits(n1, &inc);
    let v1 = add(&v0, &inc)?;
    if v1.last() == Some(&0) {
        add(&v1, &inc)
    } else {
        Ok(v1)
    }
}
