use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    constants::{SCALAR_18, SCALAR_6},
    errors::PoolError,
    math::{mul_div_ceil, mul_div_floor},
    validator::require_positive,
};

use super::{
    market_rules::{get_asset_rules, load_market_rule},
    pool::Pool,
    solvency::load_price_e18,
    Account, AccountPosition,
};

/// Liquidate an insolvent account by repaying part of its debt in exchange for its
/// collateral plus a penalty
///
/// ### Arguments
/// * liquidator - The address repaying the debt and receiving the collateral as a deposit
/// * liquidated - The insolvent account
/// * asset_to_repay - The debt asset being repaid
/// * asset_to_take - The collateral asset being taken
/// * amount_to_repay - The maximum amount of debt to repay
/// * minimum_received_e18 - The minimum amount taken per unit repaid (18 decimals)
///
/// ### Returns
/// The (amount repaid, amount taken)
///
/// ### Panics
/// If the account is solvent, holds nothing to repay or take, or the exchange is worse
/// than `minimum_received_e18`
pub fn execute_liquidate(
    e: &Env,
    liquidator: &Address,
    liquidated: &Address,
    asset_to_repay: &Address,
    asset_to_take: &Address,
    amount_to_repay: i128,
    minimum_received_e18: i128,
) -> (i128, i128) {
    if liquidator == liquidated {
        panic_with_error!(e, PoolError::InvalidCaller);
    }
    require_positive(e, amount_to_repay);

    let mut pool = Pool::load(e);
    let mut liquidated_account = Account::load(e, liquidated);
    let mut liquidator_account = Account::load(e, liquidator);

    let position = AccountPosition::calculate(e, &mut pool, &mut liquidated_account);
    if position.is_solvent() {
        panic_with_error!(e, PoolError::Collaterized);
    }

    let mut repay_reserve = pool.load_reserve(e, asset_to_repay);
    repay_reserve.require_active(e);
    let take_reserve = pool.load_reserve(e, asset_to_take);
    take_reserve.require_active(e);

    let debt = liquidated_account
        .accrue(e, &mut pool, &mut repay_reserve)
        .debt;
    if debt == 0 {
        panic_with_error!(e, PoolError::NothingToRepay);
    }
    if !liquidated_account.is_collateral(take_reserve.config.index) {
        panic_with_error!(e, PoolError::TakingNotACollateral);
    }
    let collateral = liquidated_account.get_entry(e, &take_reserve).deposit;

    let rule = load_market_rule(e, liquidated_account.config.market_rule_id);
    let penalty_scalar = SCALAR_6
        + get_asset_rules(&rule, asset_to_repay).penalty()
        + get_asset_rules(&rule, asset_to_take).penalty();
    let repay_price = load_price_e18(e, &mut pool, asset_to_repay);
    let take_price = load_price_e18(e, &mut pool, asset_to_take);

    let mut repaid = amount_to_repay.min(debt);
    let repaid_value = mul_div_floor(e, repaid, repay_price, repay_reserve.scalar);
    let mut taken = mul_div_floor(
        e,
        mul_div_floor(e, repaid_value, take_reserve.scalar, take_price),
        penalty_scalar,
        SCALAR_6,
    );
    if taken > collateral {
        // take the whole collateral and repay only what it covers
        taken = collateral;
        let taken_value = mul_div_ceil(
            e,
            mul_div_ceil(e, taken, SCALAR_6, penalty_scalar),
            take_price,
            take_reserve.scalar,
        );
        repaid = mul_div_ceil(e, taken_value, repay_reserve.scalar, repay_price).min(debt);
    }
    if taken == 0 || repaid == 0 {
        panic_with_error!(e, PoolError::NothingToCompensateWith);
    }
    if mul_div_floor(e, taken, SCALAR_18, repaid) < minimum_received_e18 {
        panic_with_error!(e, PoolError::MinimumRecieved);
    }

    liquidated_account.remove_debt(e, &mut repay_reserve, repaid);
    pool.cache_reserve(repay_reserve, true);

    let mut take_reserve = pool.load_reserve(e, asset_to_take);
    liquidator_account.accrue(e, &mut pool, &mut take_reserve);
    liquidated_account.transfer_deposit(e, &mut liquidator_account, &take_reserve, taken);
    pool.cache_reserve(take_reserve, true);

    TokenClient::new(e, asset_to_repay).transfer(
        liquidator,
        &e.current_contract_address(),
        &repaid,
    );

    pool.store_cached_reserves(e);
    liquidated_account.store(e);
    liquidator_account.store(e);

    e.events().publish(
        (
            Symbol::new(e, "liquidation"),
            liquidated.clone(),
            liquidator.clone(),
        ),
        (
            asset_to_repay.clone(),
            asset_to_take.clone(),
            repaid,
            taken,
        ),
    );
    (repaid, taken)
}
