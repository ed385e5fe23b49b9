use cast::i128;
use soroban_sdk::{contracttype, panic_with_error, Address, Env, Symbol};

use crate::{
    constants::{RATE_ADJUSTMENT_PERIOD, SCALAR_6},
    errors::PoolError,
    math::{checked_add, checked_sub, mul_div_ceil, mul_div_floor},
    storage,
};

use super::{pool::Pool, twur::UtilizationRing};

/// The parameters of an adaptive interest rate model
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct InterestRateModelParams {
    pub target_ur_e6: u32,          // the target utilization expressed in 6 decimals
    pub min_rate_at_target: i128,   // the lowest the rate at target can be adjusted to, 18 decimals
    pub max_rate_at_target: i128,   // the highest the rate at target can be adjusted to, 18 decimals
    pub rate_at_target: i128,       // the debt APR at target utilization expressed in 18 decimals
    pub rate_at_max_ur: i128,       // the debt APR at full utilization expressed in 18 decimals
    pub min_time_between_adjustments: u64,
}

/// An adaptive interest rate model. The debt rate is piecewise linear in utilization, pivoting
/// through `rate_at_target` at the target utilization. `rate_at_target` is moved within its
/// bounds based on the time weighted utilization since the last adjustment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct InterestRateModel {
    pub target_ur_e6: u32,
    pub min_rate_at_target: i128,
    pub max_rate_at_target: i128,
    pub rate_at_target: i128,
    pub rate_at_max_ur: i128,
    pub min_time_between_adjustments: u64,
    pub last_adjustment: u64, // the timestamp of the last adjustment of the rate at target
}

/// The source of a reserve's debt rate
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum RateModel {
    Adaptive(InterestRateModel),
    Stable(i128), // a fixed debt APR expressed in 18 decimals
}

impl InterestRateModelParams {
    /// Require the parameters describe a valid model, or panic.
    ///
    /// ### Panics
    /// If the target utilization is not strictly between 0 and 100%, or the rates are not
    /// ordered as `min <= rate_at_target <= max <= rate_at_max_ur`
    pub fn require_valid(&self, e: &Env) {
        if self.target_ur_e6 == 0
            || i128(self.target_ur_e6) >= SCALAR_6
            || self.min_rate_at_target < 0
            || self.rate_at_target < self.min_rate_at_target
            || self.max_rate_at_target < self.rate_at_target
            || self.rate_at_max_ur < self.max_rate_at_target
        {
            panic_with_error!(e, PoolError::InvalidReserveMetadata);
        }
    }
}

impl InterestRateModel {
    /// Create a model from its parameters
    ///
    /// ### Arguments
    /// * `params` - The model parameters
    /// * `last_adjustment` - The time the window for the next adjustment starts from
    pub fn new(params: &InterestRateModelParams, last_adjustment: u64) -> Self {
        InterestRateModel {
            target_ur_e6: params.target_ur_e6,
            min_rate_at_target: params.min_rate_at_target,
            max_rate_at_target: params.max_rate_at_target,
            rate_at_target: params.rate_at_target,
            rate_at_max_ur: params.rate_at_max_ur,
            min_time_between_adjustments: params.min_time_between_adjustments,
            last_adjustment,
        }
    }

    /// Calculate the debt rate for a utilization
    ///
    /// ### Arguments
    /// * `utilization` - The utilization of the reserve (6 decimals)
    pub fn debt_rate(&self, e: &Env, utilization: i128) -> i128 {
        let target = i128(self.target_ur_e6);
        let utilization = utilization.min(SCALAR_6);
        if utilization <= target {
            mul_div_ceil(e, self.rate_at_target, utilization, target)
        } else {
            let extra_rate = mul_div_ceil(
                e,
                self.rate_at_max_ur - self.rate_at_target,
                utilization - target,
                SCALAR_6 - target,
            );
            checked_add(e, self.rate_at_target, extra_rate)
        }
    }

    /// Raise the rate at target based on the average utilization over a window. A full
    /// utilization error sustained for `RATE_ADJUSTMENT_PERIOD` moves the rate across its
    /// entire band. A window at or below the target leaves the rate unchanged.
    ///
    /// ### Arguments
    /// * `average_utilization` - The time weighted utilization over the window (6 decimals)
    /// * `window` - The length of the window in seconds
    /// * `now` - The current timestamp
    pub fn adjust(&mut self, e: &Env, average_utilization: i128, window: u64, now: u64) {
        let target = i128(self.target_ur_e6);
        let band = self.max_rate_at_target - self.min_rate_at_target;
        if average_utilization > target {
            let error = mul_div_floor(e, average_utilization - target, SCALAR_6, SCALAR_6 - target);
            let delta = mul_div_floor(
                e,
                mul_div_floor(e, band, error, SCALAR_6),
                i128(window),
                RATE_ADJUSTMENT_PERIOD,
            );
            self.rate_at_target =
                checked_add(e, self.rate_at_target, delta).min(self.max_rate_at_target);
        }
        self.last_adjustment = now;
    }
}

impl RateModel {
    /// Calculate the debt rate for a utilization
    ///
    /// ### Arguments
    /// * `utilization` - The utilization of the reserve (6 decimals)
    pub fn debt_rate(&self, e: &Env, utilization: i128) -> i128 {
        match self {
            RateModel::Adaptive(model) => model.debt_rate(e, utilization),
            RateModel::Stable(rate) => *rate,
        }
    }
}

/// Adjust the rate at target of a reserve based on the time weighted utilization since the
/// last adjustment
///
/// ### Arguments
/// * `asset` - The underlying asset of the reserve
/// * `guessed_index` - The logical ring index of the first entry at or after the last adjustment,
///                     or None to search for it
///
/// ### Returns
/// The new rate at target
///
/// ### Panics
/// If the reserve uses a stable rate, the minimum time between adjustments has not elapsed,
/// or the guessed index does not start the window
pub fn execute_adjust_rate_at_target(
    e: &Env,
    asset: &Address,
    guessed_index: Option<u32>,
) -> i128 {
    let pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    reserve.require_active(e);
    let mut model = match reserve.model.clone() {
        RateModel::Adaptive(model) => model,
        RateModel::Stable(_) => panic_with_error!(e, PoolError::BadRequest),
    };

    let now = e.ledger().timestamp();
    if checked_sub(e, i128(now), i128(model.last_adjustment))
        < i128(model.min_time_between_adjustments)
    {
        panic_with_error!(e, PoolError::WrongIndex);
    }

    // sample the utilization up to now before measuring the window
    reserve.store(e, pool.config.tw_capacity);
    reserve.pending_utilization = None;

    let ring = UtilizationRing::load(e, reserve.config.index, pool.config.tw_capacity);
    let start = match guessed_index {
        Some(index) => {
            ring.require_first_at_or_after(e, index, model.last_adjustment);
            index
        }
        None => ring.find_first_at_or_after(e, model.last_adjustment),
    };
    let (average_utilization, window) =
        ring.time_weighted_average(e, start, ring.latest_index());

    model.adjust(e, average_utilization, window, now);
    let new_rate = model.rate_at_target;
    reserve.model = RateModel::Adaptive(model);
    storage::set_res_model(e, asset, &reserve.model);
    reserve.store(e, pool.config.tw_capacity);

    e.events().publish(
        (Symbol::new(e, "rate_at_target"), asset.clone()),
        (new_rate, average_utilization),
    );
    new_rate
}
