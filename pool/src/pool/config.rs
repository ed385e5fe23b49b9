use soroban_sdk::{map, panic_with_error, Address, Env};

use crate::{
    constants::{MAX_TW_CAPACITY, SCALAR_18, SCALAR_6},
    errors::PoolError,
    storage::{self, PoolConfig, ReserveConfig, ReserveData, ReserveFees, ReserveRestrictions},
};

use super::{
    interest::{InterestRateModel, InterestRateModelParams, RateModel},
    market_rules::load_market_rule,
    pool::Pool,
    twur::UtilizationRing,
    AssetRules, Reserve,
};

/// Initialize the pool
///
/// Panics if the pool is already initialized or the arguments are invalid
pub fn execute_initialize(
    e: &Env,
    access_control: &Address,
    oracle: &Address,
    fee_reduction_provider: &Option<Address>,
    flash_loan_fee_e6: u32,
    tw_capacity: u32,
) {
    if storage::has_pool_config(e) {
        panic_with_error!(e, PoolError::AlreadyInitializedError);
    }
    if flash_loan_fee_e6 > SCALAR_6 as u32 || !(2..=MAX_TW_CAPACITY).contains(&tw_capacity) {
        panic_with_error!(e, PoolError::InvalidPoolInitArgs);
    }

    storage::set_pool_config(
        e,
        &PoolConfig {
            oracle: oracle.clone(),
            access_control: access_control.clone(),
            fee_reduction_provider: fee_reduction_provider.clone(),
            flash_loan_fee_e6,
            tw_capacity,
        },
    );
    storage::set_market_rule(e, 0, &map![e]);
    storage::set_market_rule_count(e, 1);
}

/// Register an asset with an adaptive interest rate model
///
/// ### Returns
/// The index of the new reserve
///
/// ### Panics
/// If the asset is already registered or any of the parameters are invalid
#[allow(clippy::too_many_arguments)]
pub fn execute_register_asset(
    e: &Env,
    asset: &Address,
    decimals: u32,
    default_rules: &AssetRules,
    restrictions: &ReserveRestrictions,
    fees: &ReserveFees,
    irm_params: &InterestRateModelParams,
) -> u32 {
    irm_params.require_valid(e);
    let model = RateModel::Adaptive(InterestRateModel::new(irm_params, e.ledger().timestamp()));
    register_reserve(e, asset, decimals, default_rules, restrictions, fees, model)
}

/// Register an asset with a debt rate set by the stablecoin rate admin
///
/// ### Returns
/// The index of the new reserve
///
/// ### Panics
/// If the asset is already registered or any of the parameters are invalid
#[allow(clippy::too_many_arguments)]
pub fn execute_register_stablecoin(
    e: &Env,
    asset: &Address,
    decimals: u32,
    default_rules: &AssetRules,
    restrictions: &ReserveRestrictions,
    fees: &ReserveFees,
    debt_rate: i128,
) -> u32 {
    require_valid_debt_rate(e, debt_rate);
    let model = RateModel::Stable(debt_rate);
    register_reserve(e, asset, decimals, default_rules, restrictions, fees, model)
}

fn register_reserve(
    e: &Env,
    asset: &Address,
    decimals: u32,
    default_rules: &AssetRules,
    restrictions: &ReserveRestrictions,
    fees: &ReserveFees,
    model: RateModel,
) -> u32 {
    if storage::has_res(e, asset) {
        panic_with_error!(e, PoolError::AlreadyRegistered);
    }
    if decimals > 18 {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
    require_valid_restrictions(e, restrictions);
    require_valid_fees(e, fees);
    default_rules.require_valid(e);

    let pool_config = storage::get_pool_config(e);
    let now = e.ledger().timestamp();
    let index = storage::push_res_list(e, asset);
    storage::set_res_config(
        e,
        asset,
        &ReserveConfig {
            index,
            decimals,
            fees: fees.clone(),
            restrictions: restrictions.clone(),
        },
    );
    storage::set_res_data(
        e,
        asset,
        &ReserveData {
            activated: true,
            frozen: false,
            total_deposit: 0,
            total_debt: 0,
            deposit_index: SCALAR_18,
            debt_index: SCALAR_18,
            deposit_rate: 0,
            debt_rate: model.debt_rate(e, 0),
            earned_fee: 0,
            last_time: now,
        },
    );
    storage::set_res_model(e, asset, &model);
    UtilizationRing::initialize(e, index, pool_config.tw_capacity, now);

    let mut default_rule = load_market_rule(e, 0);
    default_rule.set(asset.clone(), default_rules.clone());
    storage::set_market_rule(e, 0, &default_rule);
    index
}

/// Activate or deactivate a reserve
///
/// ### Panics
/// If the reserve already has the requested state
pub fn execute_set_reserve_is_active(e: &Env, asset: &Address, activated: bool) {
    let pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    if reserve.data.activated == activated {
        panic_with_error!(e, PoolError::AlreadySet);
    }
    reserve.data.activated = activated;
    reserve.store(e, pool.config.tw_capacity);
}

/// Freeze or unfreeze a reserve
///
/// ### Panics
/// If the reserve already has the requested state
pub fn execute_set_reserve_is_frozen(e: &Env, asset: &Address, frozen: bool) {
    let pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    if reserve.data.frozen == frozen {
        panic_with_error!(e, PoolError::AlreadySet);
    }
    reserve.data.frozen = frozen;
    reserve.store(e, pool.config.tw_capacity);
}

/// Update the restrictions of a reserve
pub fn execute_set_reserve_restrictions(
    e: &Env,
    asset: &Address,
    restrictions: &ReserveRestrictions,
) {
    require_valid_restrictions(e, restrictions);
    let pool = Pool::load(e);
    let reserve = pool.load_reserve(e, asset);
    reserve.store(e, pool.config.tw_capacity);

    let mut reserve_config = reserve.config;
    reserve_config.restrictions = restrictions.clone();
    storage::set_res_config(e, asset, &reserve_config);
}

/// Update the deposit and debt fees of a reserve
pub fn execute_set_reserve_fees(e: &Env, asset: &Address, fees: &ReserveFees) {
    require_valid_fees(e, fees);
    let pool = Pool::load(e);
    let reserve = pool.load_reserve(e, asset);
    reserve.store(e, pool.config.tw_capacity);

    let mut reserve_config = reserve.config;
    reserve_config.fees = fees.clone();
    storage::set_res_config(e, asset, &reserve_config);
}

/// Replace the interest rate model parameters of an adaptive reserve. Interest up to now
/// accrues at the previous rates and the time of the last adjustment is kept.
///
/// ### Panics
/// If the reserve uses a stable rate or the parameters are invalid
pub fn execute_set_interest_rate_model(
    e: &Env,
    asset: &Address,
    irm_params: &InterestRateModelParams,
) {
    irm_params.require_valid(e);
    let pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    let last_adjustment = match &reserve.model {
        RateModel::Adaptive(model) => model.last_adjustment,
        RateModel::Stable(_) => panic_with_error!(e, PoolError::BadRequest),
    };

    reserve.model = RateModel::Adaptive(InterestRateModel::new(irm_params, last_adjustment));
    storage::set_res_model(e, asset, &reserve.model);
    reserve.store(e, pool.config.tw_capacity);
}

/// Set the debt rate of a stable reserve. Interest up to now accrues at the previous rate.
///
/// ### Panics
/// If the reserve uses an adaptive rate or the rate is negative
pub fn execute_set_stablecoin_debt_rate(e: &Env, asset: &Address, debt_rate: i128) {
    require_valid_debt_rate(e, debt_rate);
    let pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    if let RateModel::Adaptive(_) = reserve.model {
        panic_with_error!(e, PoolError::BadRequest);
    }

    reserve.model = RateModel::Stable(debt_rate);
    storage::set_res_model(e, asset, &reserve.model);
    reserve.store(e, pool.config.tw_capacity);
}

/// Set the base flash loan fee of the pool
pub fn execute_set_flash_loan_fee(e: &Env, flash_loan_fee_e6: u32) {
    if flash_loan_fee_e6 > SCALAR_6 as u32 {
        panic_with_error!(e, PoolError::BadRequest);
    }
    let mut pool_config = storage::get_pool_config(e);
    pool_config.flash_loan_fee_e6 = flash_loan_fee_e6;
    storage::set_pool_config(e, &pool_config);
}

/// Set or remove the fee reduction provider of the pool
pub fn execute_set_fee_reduction_provider(e: &Env, provider: &Option<Address>) {
    let mut pool_config = storage::get_pool_config(e);
    pool_config.fee_reduction_provider = provider.clone();
    storage::set_pool_config(e, &pool_config);
}

/// Set the price feed of the pool
pub fn execute_set_price_feed_provider(e: &Env, oracle: &Address) {
    let mut pool_config = storage::get_pool_config(e);
    pool_config.oracle = oracle.clone();
    storage::set_pool_config(e, &pool_config);
}

/// Accrue a reserve to the current ledger timestamp and store it
///
/// ### Returns
/// The reserve after accrual
///
/// ### Panics
/// If the reserve is not registered or inactive
pub fn execute_accumulate_interest(e: &Env, asset: &Address) -> Reserve {
    let pool = Pool::load(e);
    let reserve = pool.load_reserve(e, asset);
    reserve.require_active(e);
    reserve.store(e, pool.config.tw_capacity);
    reserve
}

fn require_valid_restrictions(e: &Env, restrictions: &ReserveRestrictions) {
    if restrictions.minimal_collateral < 0
        || restrictions.minimal_debt < 0
        || restrictions.maximal_total_deposit.unwrap_or(0) < 0
        || restrictions.maximal_total_debt.unwrap_or(0) < 0
    {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
}

fn require_valid_fees(e: &Env, fees: &ReserveFees) {
    if fees.deposit_fee_e6 > SCALAR_6 as u32 || fees.debt_fee_e6 > SCALAR_6 as u32 {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
}

fn require_valid_debt_rate(e: &Env, debt_rate: i128) {
    if debt_rate < 0 {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
}
