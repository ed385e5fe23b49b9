use cast::i128;
use soroban_sdk::{panic_with_error, Address, Env, Map};

use crate::{
    constants::{SCALAR_18, SCALAR_6},
    errors::PoolError,
    math::{checked_add, mul_div_ceil, mul_div_floor, pow10},
    storage,
};

use super::{
    market_rules::{get_asset_rules, load_market_rule},
    pool::Pool,
    Account, AssetRules,
};

/// The weighted value of an account's collateral and debt in the oracle's base asset
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountPosition {
    /// The collateral value weighted by the collateral coefficients (18 decimals)
    pub collateral_value: i128,
    /// The debt value weighted by the borrow coefficients (18 decimals)
    pub debt_value: i128,
}

impl AccountPosition {
    /// Calculate the position of an account under its chosen market rule. The account's
    /// entries are caught up and every reserve it holds is cached in the pool.
    ///
    /// ### Arguments
    /// * pool - The pool
    /// * account - The account to value
    pub fn calculate(e: &Env, pool: &mut Pool, account: &mut Account) -> Self {
        let rule = load_market_rule(e, account.config.market_rule_id);
        Self::calculate_with_rule(e, pool, account, &rule)
    }

    /// Calculate the position of an account under a given market rule
    ///
    /// ### Arguments
    /// * pool - The pool
    /// * account - The account to value
    /// * rule - The market rule to weight the position with
    pub fn calculate_with_rule(
        e: &Env,
        pool: &mut Pool,
        account: &mut Account,
        rule: &Map<Address, AssetRules>,
    ) -> Self {
        let reserve_list = storage::get_res_list(e);
        let mut collateral_value = 0;
        let mut debt_value = 0;
        for (reserve_index, asset) in reserve_list.iter().enumerate() {
            let reserve_index = reserve_index as u32;
            let use_collateral =
                account.has_deposit(reserve_index) && account.is_collateral(reserve_index);
            let has_debt = account.has_debt(reserve_index);
            if !use_collateral && !has_debt {
                continue;
            }

            let mut reserve = pool.load_reserve(e, &asset);
            let entry = account.accrue(e, pool, &mut reserve);
            let price_e18 = load_price_e18(e, pool, &asset);
            let asset_rules = get_asset_rules(rule, &asset);

            if use_collateral && entry.deposit > 0 {
                if let Some(coefficient) = asset_rules.collateral_coefficient_e6 {
                    let value = mul_div_floor(e, entry.deposit, price_e18, reserve.scalar);
                    collateral_value = checked_add(
                        e,
                        collateral_value,
                        mul_div_floor(e, value, i128(coefficient), SCALAR_6),
                    );
                }
            }
            if has_debt && entry.debt > 0 {
                let coefficient = asset_rules
                    .borrow_coefficient_e6
                    .unwrap_or(SCALAR_6 as u32);
                let value = mul_div_ceil(e, entry.debt, price_e18, reserve.scalar);
                debt_value = checked_add(
                    e,
                    debt_value,
                    mul_div_ceil(e, value, i128(coefficient), SCALAR_6),
                );
            }

            pool.cache_reserve(reserve, true);
        }

        AccountPosition {
            collateral_value,
            debt_value,
        }
    }

    /// Check if the weighted collateral covers the weighted debt
    pub fn is_solvent(&self) -> bool {
        self.collateral_value >= self.debt_value
    }

    /// Fetch the (is solvent, free collateral coefficient), where the coefficient is the
    /// distance between the weighted collateral and the weighted debt
    pub fn free_collateral(&self) -> (bool, i128) {
        (
            self.is_solvent(),
            (self.collateral_value - self.debt_value).abs(),
        )
    }

    /// Require that the account is solvent, or panic.
    pub fn require_solvent(&self, e: &Env) {
        if !self.is_solvent() {
            panic_with_error!(e, PoolError::InsufficientCollateral);
        }
    }
}

/// Load the price of an asset normalized to 18 decimals
pub fn load_price_e18(e: &Env, pool: &mut Pool, asset: &Address) -> i128 {
    let price = pool.load_price(e, asset);
    let price_decimals = pool.load_price_decimals(e);
    mul_div_floor(e, price, SCALAR_18, pow10(e, price_decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::AccountReserveData, testutils};
    use sep_40_oracle::testutils::Asset;
    use soroban_sdk::{testutils::Address as _, vec, Symbol};

    fn deposit_entry(deposit: i128) -> AccountReserveData {
        AccountReserveData {
            deposit,
            debt: 0,
            applied_deposit_index: SCALAR_18,
            applied_debt_index: SCALAR_18,
        }
    }

    fn debt_entry(debt: i128) -> AccountReserveData {
        AccountReserveData {
            deposit: 0,
            debt,
            applied_deposit_index: SCALAR_18,
            applied_debt_index: SCALAR_18,
        }
    }

    #[test]
    fn test_calculate_weighs_collateral_and_debt() {
        let e = Env::default();
        e.mock_all_auths();
        e.budget().reset_unlimited();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let (usdc, _) = testutils::create_token_contract(&e, &bombadil, 6);
        let (weth, _) = testutils::create_token_contract(&e, &bombadil, 18);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![
                &e,
                Asset::Stellar(usdc.clone()),
                Asset::Stellar(weth.clone()),
            ],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 1_0000000, 2000_0000000]);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &oracle, &bombadil);
            testutils::create_reserve(&e, &usdc, 6);
            testutils::create_reserve(&e, &weth, 18);

            // 1000 USDC as collateral and 0.25 WETH of debt
            storage::set_account_reserve(&e, &samwise, 0, &deposit_entry(1_000_000_000));
            storage::set_account_reserve(&e, &samwise, 1, &debt_entry(250_000_000_000_000_000));
            let mut account_config = storage::get_account_config(&e, &samwise);
            account_config.deposits = 0b01;
            account_config.collaterals = 0b01;
            account_config.borrows = 0b10;
            storage::set_account_config(&e, &samwise, &account_config);

            let mut pool = Pool::load(&e);
            let mut account = Account::load(&e, &samwise);
            let position = AccountPosition::calculate(&e, &mut pool, &mut account);

            // 1000 * 0.9 and 500 * 1.1
            assert_eq!(position.collateral_value, 900 * SCALAR_18);
            assert_eq!(position.debt_value, 550 * SCALAR_18);
            assert!(position.is_solvent());
            assert_eq!(position.free_collateral(), (true, 350 * SCALAR_18));
        });
    }

    #[test]
    fn test_calculate_ignores_non_collateral_deposits() {
        let e = Env::default();
        e.mock_all_auths();
        e.budget().reset_unlimited();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let (usdc, _) = testutils::create_token_contract(&e, &bombadil, 6);
        let (weth, _) = testutils::create_token_contract(&e, &bombadil, 18);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![
                &e,
                Asset::Stellar(usdc.clone()),
                Asset::Stellar(weth.clone()),
            ],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 1_0000000, 2000_0000000]);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &oracle, &bombadil);
            testutils::create_reserve(&e, &usdc, 6);
            testutils::create_reserve(&e, &weth, 18);

            storage::set_account_reserve(&e, &samwise, 0, &deposit_entry(1_000_000_000));
            storage::set_account_reserve(&e, &samwise, 1, &debt_entry(1));
            let mut account_config = storage::get_account_config(&e, &samwise);
            account_config.deposits = 0b01;
            account_config.borrows = 0b10;
            storage::set_account_config(&e, &samwise, &account_config);

            let mut pool = Pool::load(&e);
            let mut account = Account::load(&e, &samwise);
            let position = AccountPosition::calculate(&e, &mut pool, &mut account);

            // 1e-18 WETH is 2000e-18 USD, weighted 1.1 and rounded up
            assert_eq!(position.collateral_value, 0);
            assert_eq!(position.debt_value, 2200);
            assert_eq!(position.free_collateral(), (false, 2200));
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1234)")]
    fn test_require_solvent() {
        let e = Env::default();
        let position = AccountPosition {
            collateral_value: 100,
            debt_value: 101,
        };
        position.require_solvent(&e);
    }

    #[test]
    fn test_empty_position_is_solvent() {
        let e = Env::default();
        let position = AccountPosition {
            collateral_value: 0,
            debt_value: 0,
        };
        position.require_solvent(&e);
        assert_eq!(position.free_collateral(), (true, 0));
    }
}
