use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{panic_with_error, Env, I256};

use crate::errors::PoolError;

/// Calculate `x * y / denominator`, rounding down
///
/// Uses 256 bit intermediate math if `x * y` does not fit in an i128.
///
/// ### Panics
/// If the denominator is zero or the result does not fit in an i128
pub fn mul_div_floor(e: &Env, x: i128, y: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        panic_with_error!(e, PoolError::DivByZeroError);
    }
    match x.fixed_mul_floor(y, denominator) {
        Some(result) => result,
        None => mul_div_wide(e, x, y, denominator, false),
    }
}

/// Calculate `x * y / denominator`, rounding up
///
/// Uses 256 bit intermediate math if `x * y` does not fit in an i128.
///
/// ### Panics
/// If the denominator is zero or the result does not fit in an i128
pub fn mul_div_ceil(e: &Env, x: i128, y: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        panic_with_error!(e, PoolError::DivByZeroError);
    }
    match x.fixed_mul_ceil(y, denominator) {
        Some(result) => result,
        None => mul_div_wide(e, x, y, denominator, true),
    }
}

fn mul_div_wide(e: &Env, x: i128, y: i128, denominator: i128, round_up: bool) -> i128 {
    let denominator = I256::from_i128(e, denominator);
    let product = I256::from_i128(e, x).mul(&I256::from_i128(e, y));
    let mut result = product.div(&denominator);
    if round_up && result.mul(&denominator) != product {
        result = result.add(&I256::from_i128(e, 1));
    }
    match result.to_i128() {
        Some(result) => result,
        None => panic_with_error!(e, PoolError::OverflowError),
    }
}

/// Add two amounts
///
/// ### Panics
/// If the result overflows
pub fn checked_add(e: &Env, a: i128, b: i128) -> i128 {
    match a.checked_add(b) {
        Some(result) => result,
        None => panic_with_error!(e, PoolError::OverflowError),
    }
}

/// Subtract `b` from `a` for non-negative quantities
///
/// ### Panics
/// If the result is negative
pub fn checked_sub(e: &Env, a: i128, b: i128) -> i128 {
    match a.checked_sub(b) {
        Some(result) if result >= 0 => result,
        _ => panic_with_error!(e, PoolError::UnderflowError),
    }
}

/// Multiply two amounts
///
/// ### Panics
/// If the result overflows
pub fn checked_mul(e: &Env, a: i128, b: i128) -> i128 {
    match a.checked_mul(b) {
        Some(result) => result,
        None => panic_with_error!(e, PoolError::OverflowError),
    }
}

/// Fetch `10^decimals` as an i128
///
/// ### Panics
/// If the result overflows
pub fn pow10(e: &Env, decimals: u32) -> i128 {
    match 10i128.checked_pow(decimals) {
        Some(result) => result,
        None => panic_with_error!(e, PoolError::OverflowError),
    }
}
