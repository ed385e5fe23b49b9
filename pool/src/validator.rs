use soroban_sdk::{panic_with_error, Env};

use crate::errors::PoolError;

/// Require that an incoming amount is greater than zero
///
/// ### Arguments
/// * `amount` - The amount to check
///
/// ### Panics
/// If the number is zero or negative
pub fn require_positive(e: &Env, amount: i128) {
    if amount <= 0 {
        panic_with_error!(e, PoolError::AmountNotGreaterThanZero);
    }
}
