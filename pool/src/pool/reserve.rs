use cast::i128;
use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::{
    constants::{SCALAR_18, SCALAR_6, SECONDS_PER_YEAR},
    errors::PoolError,
    math::{checked_add, checked_sub, mul_div_ceil, mul_div_floor, pow10},
    storage::{self, ReserveConfig, ReserveData},
};

use super::{interest::RateModel, twur::UtilizationRing};

#[derive(Clone)]
#[contracttype]
pub struct Reserve {
    pub asset: Address,         // the underlying asset address
    pub config: ReserveConfig,  // the reserve configuration
    pub data: ReserveData,      // the reserve data, accrued to the current ledger timestamp
    pub model: RateModel,       // the source of the reserve's debt rate
    pub scalar: i128,           // scalar used for balances
    pub pending_utilization: Option<i128>, // the utilization that held until the accrual, not yet sampled
}

impl Reserve {
    /// Load a Reserve from the ledger and update to the current ledger timestamp.
    ///
    /// **NOTE**: This function is not cached, and should be called from the Pool.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// Panics if the asset is not supported or if the reserve cannot be updated to the
    /// current ledger timestamp.
    pub fn load(e: &Env, asset: &Address) -> Reserve {
        let config = storage::get_res_config(e, asset);
        let mut reserve = Reserve {
            asset: asset.clone(),
            scalar: pow10(e, config.decimals),
            config,
            data: storage::get_res_data(e, asset),
            model: storage::get_res_model(e, asset),
            pending_utilization: None,
        };
        reserve.accrue(e);
        reserve
    }

    /// Grow the indices and totals by the interest accrued since the last update
    fn accrue(&mut self, e: &Env) {
        let now = e.ledger().timestamp();
        if now <= self.data.last_time {
            return;
        }
        let elapsed = i128(now - self.data.last_time);
        self.pending_utilization = Some(self.utilization(e));

        let debt_growth = mul_div_ceil(e, self.data.debt_rate, elapsed, SECONDS_PER_YEAR);
        let new_debt_index = mul_div_ceil(
            e,
            self.data.debt_index,
            checked_add(e, SCALAR_18, debt_growth),
            SCALAR_18,
        );
        let deposit_growth = mul_div_floor(e, self.data.deposit_rate, elapsed, SECONDS_PER_YEAR);
        let new_deposit_index = mul_div_floor(
            e,
            self.data.deposit_index,
            checked_add(e, SCALAR_18, deposit_growth),
            SCALAR_18,
        );

        self.data.total_debt = mul_div_ceil(
            e,
            self.data.total_debt,
            new_debt_index,
            self.data.debt_index,
        );
        self.data.total_deposit = mul_div_ceil(
            e,
            self.data.total_deposit,
            new_deposit_index,
            self.data.deposit_index,
        );
        self.data.debt_index = new_debt_index;
        self.data.deposit_index = new_deposit_index;
        self.data.last_time = now;
    }

    /// Store the updated reserve to the ledger. Rates are recomputed from the stored totals
    /// and the utilization held since the previous update is sampled.
    ///
    /// ### Arguments
    /// * tw_capacity - The capacity of the pool's utilization rings
    pub fn store(&self, e: &Env, tw_capacity: u32) {
        let mut data = self.data.clone();
        let (deposit_rate, debt_rate) = self.current_rates(e);
        data.deposit_rate = deposit_rate;
        data.debt_rate = debt_rate;
        storage::set_res_data(e, &self.asset, &data);

        if let Some(utilization) = self.pending_utilization {
            UtilizationRing::load(e, self.config.index, tw_capacity).record(
                e,
                self.data.last_time,
                utilization,
            );
        }
    }

    /// Fetch the current utilization rate for the reserve normalized to 6 decimals
    pub fn utilization(&self, e: &Env) -> i128 {
        if self.data.total_deposit == 0 {
            return if self.data.total_debt > 0 { SCALAR_6 } else { 0 };
        }
        mul_div_floor(e, self.data.total_debt, SCALAR_6, self.data.total_deposit).min(SCALAR_6)
    }

    /// Calculate the (deposit rate, debt rate) for the current totals
    pub fn current_rates(&self, e: &Env) -> (i128, i128) {
        let debt_rate = self.model.debt_rate(e, self.utilization(e));
        if self.data.total_deposit == 0 {
            return (0, debt_rate);
        }
        let deposit_rate = mul_div_floor(
            e,
            debt_rate,
            self.data.total_debt.min(self.data.total_deposit),
            self.data.total_deposit,
        );
        (deposit_rate, debt_rate)
    }

    /// Fetch the amount of underlying not lent out
    pub fn available_liquidity(&self) -> i128 {
        (self.data.total_deposit - self.data.total_debt).max(0)
    }

    /********** Checks **********/

    /// Require that the reserve is active, or panic.
    pub fn require_active(&self, e: &Env) {
        if !self.data.activated {
            panic_with_error!(e, PoolError::Inactive);
        }
    }

    /// Require that the reserve is not frozen, or panic.
    pub fn require_not_frozen(&self, e: &Env) {
        if self.data.frozen {
            panic_with_error!(e, PoolError::Frozen);
        }
    }

    /// Require that the total debt does not exceed the total deposit, or panic.
    pub fn require_utilization_valid(&self, e: &Env) {
        if self.data.total_debt > self.data.total_deposit {
            panic_with_error!(e, PoolError::InvalidUtilRate);
        }
    }

    /// Require that the total deposit is within the reserve's cap, or panic.
    pub fn require_deposit_cap(&self, e: &Env) {
        if let Some(max) = self.config.restrictions.maximal_total_deposit {
            if self.data.total_deposit > max {
                panic_with_error!(e, PoolError::MaxDepositReached);
            }
        }
    }

    /// Require that the total debt is within the reserve's cap, or panic.
    pub fn require_debt_cap(&self, e: &Env) {
        if let Some(max) = self.config.restrictions.maximal_total_debt {
            if self.data.total_debt > max {
                panic_with_error!(e, PoolError::MaxDebtReached);
            }
        }
    }

    /// Require that a collateral balance is either empty or above the reserve minimum, or panic.
    pub fn require_minimal_collateral(&self, e: &Env, collateral: i128) {
        if collateral > 0 && collateral < self.config.restrictions.minimal_collateral {
            panic_with_error!(e, PoolError::MinimalCollateral);
        }
    }

    /// Require that a debt balance is either empty or above the reserve minimum, or panic.
    pub fn require_minimal_debt(&self, e: &Env, debt: i128) {
        if debt > 0 && debt < self.config.restrictions.minimal_debt {
            panic_with_error!(e, PoolError::MinimalDebt);
        }
    }

    /********** Totals **********/

    pub fn add_deposit(&mut self, e: &Env, amount: i128) {
        self.data.total_deposit = checked_add(e, self.data.total_deposit, amount);
    }

    pub fn remove_deposit(&mut self, e: &Env, amount: i128) {
        self.data.total_deposit = checked_sub(e, self.data.total_deposit, amount);
    }

    pub fn add_debt(&mut self, e: &Env, amount: i128) {
        self.data.total_debt = checked_add(e, self.data.total_debt, amount);
    }

    pub fn remove_debt(&mut self, e: &Env, amount: i128) {
        self.data.total_debt = checked_sub(e, self.data.total_debt, amount);
    }

    /// Credit protocol income to the reserve
    pub fn add_earned_fee(&mut self, e: &Env, amount: i128) {
        self.data.earned_fee = checked_add(e, self.data.earned_fee, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{ONE_PERCENT_APR_E18, SECONDS_PER_YEAR},
        storage::TwUrEntry,
        testutils,
    };
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_load_reserve_accrues() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve_data = storage::get_res_data(&e, &underlying);
            reserve_data.total_deposit = 100_000_000;
            reserve_data.total_debt = 50_000_000;
            reserve_data.debt_rate = 10 * ONE_PERCENT_APR_E18;
            reserve_data.deposit_rate = 5 * ONE_PERCENT_APR_E18;
            storage::set_res_data(&e, &underlying, &reserve_data);
        });

        testutils::set_timestamp(&e, 1000 + SECONDS_PER_YEAR as u64);
        e.as_contract(&pool, || {
            let reserve = Reserve::load(&e, &underlying);

            assert_eq!(reserve.data.debt_index, 1_100_000_000_000_000_000);
            assert_eq!(reserve.data.deposit_index, 1_050_000_000_000_000_000);
            assert_eq!(reserve.data.total_debt, 55_000_000);
            assert_eq!(reserve.data.total_deposit, 105_000_000);
            assert_eq!(reserve.data.last_time, 1000 + SECONDS_PER_YEAR as u64);
            assert_eq!(reserve.pending_utilization, Some(500_000));
            assert_eq!(reserve.scalar, 1_000_000);
        });
    }

    #[test]
    fn test_load_reserve_same_timestamp_is_noop() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve_data = storage::get_res_data(&e, &underlying);
            reserve_data.total_deposit = 100_000_000;
            reserve_data.total_debt = 50_000_000;
            reserve_data.debt_rate = 10 * ONE_PERCENT_APR_E18;
            storage::set_res_data(&e, &underlying, &reserve_data);

            let reserve = Reserve::load(&e, &underlying);
            assert_eq!(reserve.data, reserve_data);
            assert_eq!(reserve.pending_utilization, None);
        });
    }

    #[test]
    fn test_debt_index_rounds_up() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve_data = storage::get_res_data(&e, &underlying);
            reserve_data.total_deposit = 100_000_000;
            reserve_data.total_debt = 50_000_000;
            reserve_data.debt_rate = 1;
            reserve_data.deposit_rate = 1;
            storage::set_res_data(&e, &underlying, &reserve_data);
        });

        testutils::set_timestamp(&e, 1001);
        e.as_contract(&pool, || {
            let reserve = Reserve::load(&e, &underlying);

            assert_eq!(reserve.data.debt_index, SCALAR_18 + 1);
            assert_eq!(reserve.data.deposit_index, SCALAR_18);
            assert_eq!(reserve.data.total_debt, 50_000_001);
            assert_eq!(reserve.data.total_deposit, 100_000_000);
        });
    }

    #[test]
    fn test_store_recomputes_rates_and_samples_utilization() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve_data = storage::get_res_data(&e, &underlying);
            reserve_data.total_deposit = 100_000_000;
            reserve_data.total_debt = 45_000_000;
            storage::set_res_data(&e, &underlying, &reserve_data);
        });

        testutils::set_timestamp(&e, 1100);
        e.as_contract(&pool, || {
            let reserve = Reserve::load(&e, &underlying);
            reserve.store(&e, 60);

            // 45% utilization is half the target, so half the 2% rate at target
            let reserve_data = storage::get_res_data(&e, &underlying);
            assert_eq!(reserve_data.debt_rate, ONE_PERCENT_APR_E18);
            assert_eq!(reserve_data.deposit_rate, 4_500_000_000_000_000);

            let ring = UtilizationRing::load(&e, 0, 60);
            assert_eq!(ring.next_index(), 2);
            assert_eq!(
                ring.get(&e, 1),
                Some(TwUrEntry {
                    timestamp: 1100,
                    accumulator: 450_000 * 100,
                })
            );
        });
    }

    #[test]
    fn test_utilization() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            assert_eq!(reserve.utilization(&e), 0);

            reserve.data.total_deposit = 3_000_000;
            reserve.data.total_debt = 1_000_000;
            assert_eq!(reserve.utilization(&e), 333_333);

            reserve.data.total_debt = 3_000_001;
            assert_eq!(reserve.utilization(&e), 1_000_000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1223)")]
    fn test_require_utilization_valid() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            reserve.data.total_deposit = 100;
            reserve.data.total_debt = 101;
            reserve.require_utilization_valid(&e);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1241)")]
    fn test_require_deposit_cap() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            reserve.config.restrictions.maximal_total_deposit = Some(1_000);
            reserve.data.total_deposit = 1_000;
            reserve.require_deposit_cap(&e);

            reserve.data.total_deposit = 1_001;
            reserve.require_deposit_cap(&e);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1240)")]
    fn test_require_debt_cap() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            reserve.config.restrictions.maximal_total_debt = Some(500);
            reserve.data.total_debt = 500;
            reserve.require_debt_cap(&e);

            reserve.data.total_debt = 501;
            reserve.require_debt_cap(&e);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1242)")]
    fn test_require_minimal_debt() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            reserve.config.restrictions.minimal_debt = 1_000;
            reserve.require_minimal_debt(&e, 0);
            reserve.require_minimal_debt(&e, 1_000);
            reserve.require_minimal_debt(&e, 999);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1221)")]
    fn test_require_active() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let mut reserve = Reserve::load(&e, &underlying);
            reserve.require_active(&e);
            reserve.data.activated = false;
            reserve.require_active(&e);
        });
    }
}
