use soroban_sdk::{map, panic_with_error, vec, Address, Env, Map, Vec};

use sep_40_oracle::{Asset, PriceFeedClient};

use crate::{
    constants::{MAX_PRICE_AGE, SCALAR_6},
    dependencies::{AccessControlClient, FeeReductionProviderClient},
    errors::PoolError,
    storage::{self, PoolConfig},
};

use super::reserve::Reserve;

pub struct Pool {
    pub config: PoolConfig,
    reserves: Map<Address, Reserve>,
    reserves_to_store: Vec<Address>,
    price_decimals: Option<u32>,
    prices: Map<Address, i128>,
    fee_reductions: Map<Address, (u32, u32)>,
}

impl Pool {
    /// Load the Pool from the ledger
    pub fn load(e: &Env) -> Self {
        let pool_config = storage::get_pool_config(e);
        Pool {
            config: pool_config,
            reserves: map![e],
            reserves_to_store: vec![e],
            price_decimals: None,
            prices: map![e],
            fee_reductions: map![e],
        }
    }

    /// Load a Reserve from the ledger and update to the current ledger timestamp. Returns
    /// a cached version if it exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// If the asset is not registered
    pub fn load_reserve(&self, e: &Env, asset: &Address) -> Reserve {
        if let Some(reserve) = self.reserves.get(asset.clone()) {
            return reserve;
        }
        if !storage::has_res(e, asset) {
            panic_with_error!(e, PoolError::AssetNotRegistered);
        }
        Reserve::load(e, asset)
    }

    /// Cache the updated reserve in the pool.
    ///
    /// ### Arguments
    /// * reserve - The updated reserve
    /// * write - If the reserve needs to be written to the ledger
    pub fn cache_reserve(&mut self, reserve: Reserve, write: bool) {
        if !self.reserves_to_store.contains(&reserve.asset) && write {
            self.reserves_to_store.push_back(reserve.asset.clone());
        }
        self.reserves.set(reserve.asset.clone(), reserve);
    }

    /// Store the cached reserves to the ledger that need to be written.
    pub fn store_cached_reserves(&self, e: &Env) {
        for address in self.reserves_to_store.iter() {
            let reserve = self.reserves.get_unchecked(address);
            reserve.store(e, self.config.tw_capacity);
        }
    }

    /// Load the decimals of the prices for the Pool's oracle. Returns a cached version if one
    /// already exists.
    pub fn load_price_decimals(&mut self, e: &Env) -> u32 {
        if let Some(decimals) = self.price_decimals {
            return decimals;
        }
        let oracle_client = PriceFeedClient::new(e, &self.config.oracle);
        let decimals = oracle_client.decimals();
        self.price_decimals = Some(decimals);
        decimals
    }

    /// Load a price from the Pool's oracle. Returns a cached version if one already exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// If the oracle has no price for the asset or the price is stale
    pub fn load_price(&mut self, e: &Env, asset: &Address) -> i128 {
        if let Some(price) = self.prices.get(asset.clone()) {
            return price;
        }
        let oracle_client = PriceFeedClient::new(e, &self.config.oracle);
        let oracle_asset = Asset::Stellar(asset.clone());
        let price_data = match oracle_client.lastprice(&oracle_asset) {
            Some(price_data) if price_data.price > 0 => price_data,
            _ => panic_with_error!(e, PoolError::NoPriceFeed),
        };
        require_price_fresh(e, price_data.timestamp);
        self.prices.set(asset.clone(), price_data.price);
        price_data.price
    }

    /// Load the (deposit fee reduction, debt fee reduction) of an account. Returns a cached
    /// version if one already exists.
    ///
    /// ### Arguments
    /// * account - The account paying the fees
    pub fn load_fee_reductions(&mut self, e: &Env, account: &Address) -> (u32, u32) {
        if let Some(reductions) = self.fee_reductions.get(account.clone()) {
            return reductions;
        }
        let reductions = match &self.config.fee_reduction_provider {
            Some(provider) => {
                let (deposit_reduction, debt_reduction) =
                    FeeReductionProviderClient::new(e, provider).get_fee_reductions(account);
                (
                    deposit_reduction.min(SCALAR_6 as u32),
                    debt_reduction.min(SCALAR_6 as u32),
                )
            }
            None => (0, 0),
        };
        self.fee_reductions.set(account.clone(), reductions);
        reductions
    }

    /// Load the flash loan fee reduction of an account
    ///
    /// ### Arguments
    /// * account - The account initiating the flash loan
    pub fn load_flash_loan_fee_reduction(&self, e: &Env, account: &Address) -> u32 {
        match &self.config.fee_reduction_provider {
            Some(provider) => FeeReductionProviderClient::new(e, provider)
                .get_flash_loan_fee_reduction(account)
                .min(SCALAR_6 as u32),
            None => 0,
        }
    }

    /// Check if an account holds a role
    ///
    /// ### Arguments
    /// * role - The id of the role
    /// * account - The account to check
    pub fn has_role(&self, e: &Env, role: u32, account: &Address) -> bool {
        AccessControlClient::new(e, &self.config.access_control).has_role(&role, account)
    }

    /// Require that an account holds a role, or panic.
    ///
    /// ### Arguments
    /// * role - The id of the role
    /// * account - The account to check
    pub fn require_role(&self, e: &Env, role: u32, account: &Address) {
        if !self.has_role(e, role, account) {
            panic_with_error!(e, PoolError::MissingRole);
        }
    }
}

/// Require a price published at `timestamp` to be at most `MAX_PRICE_AGE` old, or panic.
fn require_price_fresh(e: &Env, timestamp: u64) {
    if timestamp.saturating_add(MAX_PRICE_AGE) < e.ledger().timestamp() {
        panic_with_error!(e, PoolError::StalePrice);
    }
}

#[cfg(test)]
mod tests {
    use sep_40_oracle::testutils::Asset;
    use soroban_sdk::{testutils::Address as _, Symbol};

    use crate::{constants::ROLE_TREASURY, testutils};

    use super::*;

    #[test]
    fn test_reserve_cache() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying, 6);

            let mut pool = Pool::load(&e);
            let mut reserve = pool.load_reserve(&e, &underlying);
            reserve.data.total_deposit = 123;
            pool.cache_reserve(reserve.clone(), true);

            // the cached reserve is returned instead of the ledger one
            let new_reserve = pool.load_reserve(&e, &underlying);
            assert_eq!(new_reserve.data.total_deposit, 123);
            assert_eq!(storage::get_res_data(&e, &underlying).total_deposit, 0);

            // store all cached reserves and verify the data is updated
            pool.store_cached_reserves(&e);
            assert_eq!(storage::get_res_data(&e, &underlying).total_deposit, 123);
        });
    }

    #[test]
    fn test_reserve_cache_stores_only_marked() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 1000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying_0, _) = testutils::create_token_contract(&e, &bombadil, 6);
        let (underlying_1, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            testutils::create_reserve(&e, &underlying_0, 6);
            testutils::create_reserve(&e, &underlying_1, 6);

            let mut pool = Pool::load(&e);
            let mut reserve_0 = pool.load_reserve(&e, &underlying_0);
            reserve_0.data.total_deposit = 123;
            pool.cache_reserve(reserve_0, false);
            let mut reserve_1 = pool.load_reserve(&e, &underlying_1);
            reserve_1.data.total_deposit = 456;
            pool.cache_reserve(reserve_1, true);

            pool.store_cached_reserves(&e);
            assert_eq!(storage::get_res_data(&e, &underlying_0).total_deposit, 0);
            assert_eq!(storage::get_res_data(&e, &underlying_1).total_deposit, 456);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1205)")]
    fn test_load_reserve_not_registered() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil, 6);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            Pool::load(&e).load_reserve(&e, &underlying);
        });
    }

    #[test]
    fn test_load_price() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 100_000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let underlying = Address::generate(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(underlying.clone())],
            &8,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 12_3400_0000]);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &oracle, &bombadil);
            let mut pool = Pool::load(&e);
            assert_eq!(pool.load_price_decimals(&e), 8);
            assert_eq!(pool.load_price(&e, &underlying), 12_3400_0000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1252)")]
    fn test_load_price_stale() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 100_000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let underlying = Address::generate(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(underlying.clone())],
            &8,
            &300,
        );
        oracle_client.set_price(&vec![&e, 1_0000_0000], &(100_000 - MAX_PRICE_AGE - 1));

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &oracle, &bombadil);
            Pool::load(&e).load_price(&e, &underlying);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1251)")]
    fn test_load_price_no_price_feed() {
        let e = Env::default();
        e.mock_all_auths();
        testutils::set_timestamp(&e, 100_000);

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let underlying = Address::generate(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(underlying.clone())],
            &8,
            &300,
        );
        oracle_client.set_price(&vec![&e, 0], &100_000);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &oracle, &bombadil);
            Pool::load(&e).load_price(&e, &underlying);
        });
    }

    #[test]
    fn test_require_price_fresh() {
        let e = Env::default();
        testutils::set_timestamp(&e, 100_000);

        require_price_fresh(&e, 100_000 - MAX_PRICE_AGE);
        require_price_fresh(&e, 100_000);
        // publication times past the ledger time do not overflow
        require_price_fresh(&e, u64::MAX);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1252)")]
    fn test_require_price_fresh_stale() {
        let e = Env::default();
        testutils::set_timestamp(&e, 100_000);

        require_price_fresh(&e, 100_000 - MAX_PRICE_AGE - 1);
    }

    #[test]
    fn test_load_fee_reductions() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (fee_reduction, fee_reduction_client) = testutils::create_fee_reduction_provider(&e);
        fee_reduction_client.set_fee_reductions(&samwise, &250_000, &2_000_000);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &bombadil);
            let mut pool = Pool::load(&e);
            assert_eq!(pool.load_fee_reductions(&e, &samwise), (0, 0));

            let mut config = storage::get_pool_config(&e);
            config.fee_reduction_provider = Some(fee_reduction);
            storage::set_pool_config(&e, &config);
            let mut pool = Pool::load(&e);
            assert_eq!(pool.load_fee_reductions(&e, &samwise), (250_000, 1_000_000));
            assert_eq!(pool.load_fee_reductions(&e, &frodo), (0, 0));
        });
    }

    #[test]
    fn test_require_role() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (access_control, access_control_client) =
            testutils::create_access_control(&e, &bombadil);
        access_control_client.grant_role(&bombadil, &ROLE_TREASURY, &samwise);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &access_control);
            let pool = Pool::load(&e);
            assert!(pool.has_role(&e, ROLE_TREASURY, &samwise));
            assert!(!pool.has_role(&e, ROLE_TREASURY, &bombadil));
            pool.require_role(&e, ROLE_TREASURY, &samwise);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1210)")]
    fn test_require_role_missing() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (access_control, _) = testutils::create_access_control(&e, &bombadil);

        e.as_contract(&pool, || {
            testutils::setup_pool(&e, &bombadil, &access_control);
            Pool::load(&e).require_role(&e, ROLE_TREASURY, &samwise);
        });
    }
}
