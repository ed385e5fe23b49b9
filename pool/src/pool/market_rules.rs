use cast::i128;
use soroban_sdk::{contracttype, panic_with_error, Address, Env, Map, Symbol};

use crate::{
    constants::{MAX_PENALTY_E6, SCALAR_6},
    errors::PoolError,
    storage,
};

use super::{pool::Pool, Account, AccountPosition};

/// The coefficients and liquidation penalty of an asset under a market rule
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AssetRules {
    pub collateral_coefficient_e6: Option<u32>, // share of a deposit counted as collateral, None if disabled
    pub borrow_coefficient_e6: Option<u32>,     // weight applied to a debt, None if borrowing is disabled
    pub penalty_e6: Option<u32>,                // liquidation bonus paid from the account
}

impl AssetRules {
    /// The rules of an asset missing from a market rule
    pub fn disabled() -> Self {
        AssetRules {
            collateral_coefficient_e6: None,
            borrow_coefficient_e6: None,
            penalty_e6: None,
        }
    }

    /// Require that the rules are valid, or panic.
    pub fn require_valid(&self, e: &Env) {
        let scalar = SCALAR_6 as u32;
        if let Some(collateral) = self.collateral_coefficient_e6 {
            if collateral > scalar {
                panic_with_error!(e, PoolError::InvalidAssetRule);
            }
        }
        if let Some(borrow) = self.borrow_coefficient_e6 {
            if borrow < scalar {
                panic_with_error!(e, PoolError::InvalidAssetRule);
            }
        }
        match self.penalty_e6 {
            Some(penalty) => {
                if penalty > MAX_PENALTY_E6
                    || i128(self.collateral_coefficient_e6.unwrap_or(0)) + i128(penalty)
                        > SCALAR_6
                {
                    panic_with_error!(e, PoolError::InvalidAssetRule);
                }
            }
            None => {
                if self.collateral_coefficient_e6.is_some()
                    || self.borrow_coefficient_e6.is_some()
                {
                    panic_with_error!(e, PoolError::InvalidAssetRule);
                }
            }
        }
    }

    /// The liquidation penalty, zero if unset
    pub fn penalty(&self) -> i128 {
        i128(self.penalty_e6.unwrap_or(0))
    }
}

/// Load a market rule
///
/// ### Panics
/// If the rule does not exist
pub fn load_market_rule(e: &Env, rule_id: u32) -> Map<Address, AssetRules> {
    match storage::get_market_rule(e, rule_id) {
        Some(rule) => rule,
        None => panic_with_error!(e, PoolError::MarketRuleInvalidId),
    }
}

/// Fetch the rules of an asset under a market rule. Assets missing from the rule are disabled.
pub fn get_asset_rules(rule: &Map<Address, AssetRules>, asset: &Address) -> AssetRules {
    rule.get(asset.clone()).unwrap_or(AssetRules::disabled())
}

/// Append a new market rule
///
/// ### Arguments
/// * `rules` - The rules of each asset under the new market rule
///
/// ### Returns
/// The id of the new market rule
///
/// ### Panics
/// If an asset is not registered or its rules are invalid
pub fn execute_add_market_rule(e: &Env, rules: &Map<Address, AssetRules>) -> u32 {
    for (asset, asset_rules) in rules.iter() {
        if !storage::has_res(e, &asset) {
            panic_with_error!(e, PoolError::AssetNotRegistered);
        }
        asset_rules.require_valid(e);
    }

    let rule_id = storage::get_market_rule_count(e);
    storage::set_market_rule(e, rule_id, rules);
    storage::set_market_rule_count(e, rule_id + 1);
    rule_id
}

/// Modify the rules of an asset under an existing market rule
///
/// ### Panics
/// If the rule does not exist, the asset is not registered, or the rules are invalid
pub fn execute_modify_asset_rule(e: &Env, rule_id: u32, asset: &Address, rules: &AssetRules) {
    let mut rule = load_market_rule(e, rule_id);
    if !storage::has_res(e, asset) {
        panic_with_error!(e, PoolError::AssetNotRegistered);
    }
    rules.require_valid(e);

    rule.set(asset.clone(), rules.clone());
    storage::set_market_rule(e, rule_id, &rule);
}

/// Enable or disable an account's deposit of an asset as collateral
///
/// ### Arguments
/// * `account` - The account
/// * `asset` - The asset deposited
/// * `use_as_collateral` - If the deposit should be used as collateral
///
/// ### Panics
/// If the flag is unchanged, enabling lacks a deposit or a collateral coefficient,
/// or disabling leaves the account insolvent
pub fn execute_set_as_collateral(
    e: &Env,
    account: &Address,
    asset: &Address,
    use_as_collateral: bool,
) {
    let mut pool = Pool::load(e);
    let mut reserve = pool.load_reserve(e, asset);
    reserve.require_active(e);

    let mut user = Account::load(e, account);
    let reserve_index = reserve.config.index;
    if user.is_collateral(reserve_index) == use_as_collateral {
        panic_with_error!(e, PoolError::AlreadySet);
    }

    let entry = user.accrue(e, &mut pool, &mut reserve);
    user.set_collateral(reserve_index, use_as_collateral);
    if use_as_collateral {
        if entry.deposit == 0 {
            panic_with_error!(e, PoolError::MinimalCollateral);
        }
        reserve.require_minimal_collateral(e, entry.deposit);
        let rule = load_market_rule(e, user.config.market_rule_id);
        if get_asset_rules(&rule, asset).collateral_coefficient_e6.is_none() {
            panic_with_error!(e, PoolError::RuleCollateralDisable);
        }
        pool.cache_reserve(reserve, true);
    } else {
        pool.cache_reserve(reserve, true);
        AccountPosition::calculate(e, &mut pool, &mut user).require_solvent(e);
    }

    pool.store_cached_reserves(e);
    user.store(e);

    e.events().publish(
        (Symbol::new(e, "set_as_collateral"), account.clone()),
        (asset.clone(), use_as_collateral),
    );
}

/// Switch the market rule an account is evaluated under
///
/// ### Arguments
/// * `account` - The account
/// * `rule_id` - The id of the new market rule
///
/// ### Panics
/// If the rule does not exist or is already chosen, disables a held collateral or debt,
/// or leaves the account insolvent
pub fn execute_choose_market_rule(e: &Env, account: &Address, rule_id: u32) {
    let mut user = Account::load(e, account);
    if user.config.market_rule_id == rule_id {
        panic_with_error!(e, PoolError::AlreadySet);
    }
    let rule = load_market_rule(e, rule_id);

    let reserve_list = storage::get_res_list(e);
    for (reserve_index, asset) in reserve_list.iter().enumerate() {
        let reserve_index = reserve_index as u32;
        let asset_rules = get_asset_rules(&rule, &asset);
        if user.is_collateral(reserve_index) && asset_rules.collateral_coefficient_e6.is_none() {
            panic_with_error!(e, PoolError::RuleCollateralDisable);
        }
        if user.has_debt(reserve_index) && asset_rules.borrow_coefficient_e6.is_none() {
            panic_with_error!(e, PoolError::RuleBorrowDisable);
        }
    }

    user.config.market_rule_id = rule_id;
    let mut pool = Pool::load(e);
    AccountPosition::calculate_with_rule(e, &mut pool, &mut user, &rule).require_solvent(e);

    pool.store_cached_reserves(e);
    user.store(e);

    e.events()
        .publish((Symbol::new(e, "choose_market_rule"), account.clone()), rule_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;
    use soroban_sdk::{map, testutils::Address as _};

    fn rules(collateral: Option<u32>, borrow: Option<u32>, penalty: Option<u32>) -> AssetRules {
        AssetRules {
            collateral_coefficient_e6: collateral,
            borrow_coefficient_e6: borrow,
            penalty_e6: penalty,
        }
    }

    #[test]
    fn test_require_valid() {
        let e = Env::default();

        rules(Some(750_000), Some(1_250_000), Some(50_000)).require_valid(&e);
        rules(Some(500_000), None, Some(500_000)).require_valid(&e);
        rules(None, Some(1_000_000), Some(0)).require_valid(&e);
        rules(None, None, None).require_valid(&e);
        rules(None, None, Some(100_000)).require_valid(&e);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1230)")]
    fn test_require_valid_collateral_plus_penalty() {
        let e = Env::default();
        rules(Some(960_000), Some(1_000_000), Some(50_000)).require_valid(&e);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1230)")]
    fn test_require_valid_borrow_below_one() {
        let e = Env::default();
        rules(Some(500_000), Some(999_999), Some(50_000)).require_valid(&e);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1230)")]
    fn test_require_valid_penalty_too_large() {
        let e = Env::default();
        rules(None, Some(1_000_000), Some(500_001)).require_valid(&e);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1230)")]
    fn test_require_valid_missing_penalty() {
        let e = Env::default();
        rules(Some(500_000), None, None).require_valid(&e);
    }

    #[test]
    fn test_add_and_modify_market_rule() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);

            // rule 0 holds the default rules of each registered asset
            let rule_0 = load_market_rule(&e, 0);
            assert_eq!(
                rule_0.get_unchecked(underlying.clone()),
                testutils::default_asset_rules()
            );

            let new_rules = rules(Some(500_000), None, Some(100_000));
            let rule_id =
                execute_add_market_rule(&e, &map![&e, (underlying.clone(), new_rules.clone())]);
            assert_eq!(rule_id, 1);
            assert_eq!(storage::get_market_rule_count(&e), 2);
            assert_eq!(get_asset_rules(&load_market_rule(&e, 1), &underlying), new_rules);

            let modified = rules(Some(600_000), Some(1_500_000), Some(100_000));
            execute_modify_asset_rule(&e, 1, &underlying, &modified);
            assert_eq!(get_asset_rules(&load_market_rule(&e, 1), &underlying), modified);
            // other rules are untouched
            assert_eq!(
                get_asset_rules(&load_market_rule(&e, 0), &underlying),
                testutils::default_asset_rules()
            );
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1233)")]
    fn test_modify_asset_rule_unknown_id() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            execute_modify_asset_rule(&e, 1, &underlying, &testutils::default_asset_rules());
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1205)")]
    fn test_add_market_rule_unknown_asset() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            execute_add_market_rule(
                &e,
                &map![&e, (Address::generate(&e), testutils::default_asset_rules())],
            );
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1220)")]
    fn test_choose_market_rule_already_set() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            execute_choose_market_rule(&e, &samwise, 0);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1233)")]
    fn test_choose_market_rule_unknown_id() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            execute_choose_market_rule(&e, &samwise, 3);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1232)")]
    fn test_choose_market_rule_disables_collateral() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let rule_id = execute_add_market_rule(
                &e,
                &map![&e, (underlying.clone(), rules(None, Some(1_000_000), Some(0)))],
            );

            let mut account_config = storage::get_account_config(&e, &samwise);
            account_config.deposits = 1;
            account_config.collaterals = 1;
            storage::set_account_config(&e, &samwise, &account_config);

            execute_choose_market_rule(&e, &samwise, rule_id);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1231)")]
    fn test_choose_market_rule_disables_borrow() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let rule_id = execute_add_market_rule(
                &e,
                &map![&e, (underlying.clone(), rules(Some(900_000), None, Some(50_000)))],
            );

            let mut account_config = storage::get_account_config(&e, &samwise);
            account_config.borrows = 1;
            storage::set_account_config(&e, &samwise, &account_config);

            execute_choose_market_rule(&e, &samwise, rule_id);
        });
    }

    #[test]
    fn test_choose_market_rule_empty_account() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            let rule_id = execute_add_market_rule(&e, &map![&e]);

            execute_choose_market_rule(&e, &samwise, rule_id);
            assert_eq!(storage::get_account_config(&e, &samwise).market_rule_id, 1);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1243)")]
    fn test_set_as_collateral_without_deposit() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            execute_set_as_collateral(&e, &samwise, &underlying, true);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1220)")]
    fn test_set_as_collateral_unchanged() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);
            execute_set_as_collateral(&e, &samwise, &underlying, false);
        });
    }
}
