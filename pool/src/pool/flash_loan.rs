use cast::i128;
use sep_41_token::TokenClient;
use soroban_sdk::{map, panic_with_error, vec, Address, Bytes, Env, Symbol, Vec};

use crate::{
    constants::{FLASH_BORROWER_FEE_DIVISOR, ROLE_FLASH_BORROWER, SCALAR_6},
    dependencies::FlashLoanReceiverClient,
    errors::PoolError,
    math::{checked_add, mul_div_ceil, mul_div_floor},
    validator::require_positive,
};

use super::pool::Pool;

/// Calculate the flash loan fee rate charged to a caller, expressed in 6 decimals
pub fn calc_flash_loan_fee_rate(e: &Env, pool: &Pool, caller: &Address) -> i128 {
    let mut fee_e6 = i128(pool.config.flash_loan_fee_e6);
    if pool.has_role(e, ROLE_FLASH_BORROWER, caller) {
        fee_e6 /= FLASH_BORROWER_FEE_DIVISOR;
    }
    let reduction = i128(pool.load_flash_loan_fee_reduction(e, caller));
    mul_div_floor(e, fee_e6, SCALAR_6 - reduction, SCALAR_6)
}

/// Quote the flash loan fee for an amount of an asset
///
/// ### Panics
/// If the asset is not registered
pub fn execute_view_flash_loan_fee(e: &Env, caller: &Address, asset: &Address, amount: i128) -> i128 {
    let pool = Pool::load(e);
    pool.load_reserve(e, asset);
    let fee_e6 = calc_flash_loan_fee_rate(e, &pool, caller);
    mul_div_ceil(e, amount, fee_e6, SCALAR_6)
}

/// Lend assets to a receiver for the duration of its `exec_op` callback. The receiver must
/// return each amount plus its fee before the callback ends.
///
/// ### Arguments
/// * caller - The address initiating the flash loan
/// * receiver - The contract receiving the assets and the callback
/// * assets - The assets to lend
/// * amounts - The amount of each asset to lend
/// * data - Opaque data passed to the receiver
///
/// ### Returns
/// The fee charged for each asset
///
/// ### Panics
/// If the request is invalid or the pool is not repaid with fees
pub fn execute_flash_loan(
    e: &Env,
    caller: &Address,
    receiver: &Address,
    assets: &Vec<Address>,
    amounts: &Vec<i128>,
    data: &Bytes,
) -> Vec<i128> {
    if assets.is_empty() || assets.len() != amounts.len() {
        panic_with_error!(e, PoolError::BadRequest);
    }
    let pool_address = e.current_contract_address();
    if *receiver == pool_address {
        panic_with_error!(e, PoolError::InvalidCaller);
    }

    let mut pool = Pool::load(e);
    let fee_e6 = calc_flash_loan_fee_rate(e, &pool, caller);

    let mut seen = map![e];
    let mut fees: Vec<i128> = vec![e];
    let mut expected_balances: Vec<i128> = vec![e];
    for (asset, amount) in assets.iter().zip(amounts.iter()) {
        if seen.contains_key(asset.clone()) {
            panic_with_error!(e, PoolError::BadRequest);
        }
        seen.set(asset.clone(), true);
        require_positive(e, amount);

        let reserve = pool.load_reserve(e, &asset);
        reserve.require_active(e);
        reserve.require_not_frozen(e);
        if amount > reserve.available_liquidity() {
            panic_with_error!(e, PoolError::InvalidUtilRate);
        }
        pool.cache_reserve(reserve, true);

        let fee = mul_div_ceil(e, amount, fee_e6, SCALAR_6);
        let balance = TokenClient::new(e, &asset).balance(&pool_address);
        fees.push_back(fee);
        expected_balances.push_back(checked_add(e, balance, fee));
    }

    for (asset, amount) in assets.iter().zip(amounts.iter()) {
        TokenClient::new(e, &asset).transfer(&pool_address, receiver, &amount);
    }

    FlashLoanReceiverClient::new(e, receiver).exec_op(caller, assets, amounts, &fees, data);

    for (index, asset) in assets.iter().enumerate() {
        let index = index as u32;
        let balance = TokenClient::new(e, &asset).balance(&pool_address);
        if balance < expected_balances.get_unchecked(index) {
            panic_with_error!(e, PoolError::BalanceError);
        }

        let mut reserve = pool.load_reserve(e, &asset);
        reserve.add_earned_fee(e, fees.get_unchecked(index));
        pool.cache_reserve(reserve, true);
    }
    pool.store_cached_reserves(e);

    e.events().publish(
        (Symbol::new(e, "flash_loan"), caller.clone(), receiver.clone()),
        (assets.clone(), amounts.clone(), fees.clone()),
    );
    fees
}
