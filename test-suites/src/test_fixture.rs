use std::ops::{Index, IndexMut};

use lending_pool::{
    AssetRules, InterestRateModelParams, LendingPoolClient, LendingPoolContract, ReserveFees,
    ReserveRestrictions, DEFAULT_TW_CAPACITY, ONE_PERCENT_APR_E18, ROLE_ASSET_LISTING_ADMIN,
    ROLE_EMERGENCY_ADMIN, ROLE_PARAMETERS_ADMIN, ROLE_STABLECOIN_RATE_ADMIN, ROLE_TREASURY,
};
use mock_access_control::{MockAccessControl, MockAccessControlClient};
use mock_fee_reduction::{MockFeeReduction, MockFeeReductionClient};
use mock_flash_receiver::{MockFlashReceiver, MockFlashReceiverClient};
use sep_40_oracle::testutils::{Asset, MockPriceOracleClient, MockPriceOracleWASM};
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::testutils::{Address as _, Ledger, LedgerInfo};
use soroban_sdk::{vec as svec, Address, Env, IntoVal, Symbol};

pub const SCALAR_6: i128 = 1_000_000;
pub const SCALAR_7: i128 = 1_000_0000;
pub const SCALAR_9: i128 = 1_000_000_000;
pub const SCALAR_18: i128 = 1_000_000_000_000_000_000;

#[derive(Clone, Copy)]
#[repr(usize)]
pub enum TokenIndex {
    USDC = 0,
    USDAX = 1,
    WETH = 2,
}

impl<T> Index<TokenIndex> for Vec<T> {
    type Output = T;

    fn index(&self, index: TokenIndex) -> &Self::Output {
        &self[index as usize]
    }
}

impl<T> IndexMut<TokenIndex> for Vec<T> {
    fn index_mut(&mut self, index: TokenIndex) -> &mut Self::Output {
        &mut self[index as usize]
    }
}

pub struct TestFixture<'a> {
    pub env: Env,
    pub bombadil: Address,
    pub users: Vec<Address>,
    pub access_control: MockAccessControlClient<'a>,
    pub fee_reduction: MockFeeReductionClient<'a>,
    pub flash_receiver: MockFlashReceiverClient<'a>,
    pub oracle: MockPriceOracleClient<'a>,
    pub pool: LendingPoolClient<'a>,
    pub tokens: Vec<MockTokenClient<'a>>,
}

impl TestFixture<'_> {
    /// Create a new TestFixture for the lending pool
    ///
    /// Deploys USDC (0, 6 decimals), USDax (1, 6 decimals) and wETH (2, 9 decimals) test tokens
    /// and registers each of them as an adaptive reserve. Bombadil holds every admin role.
    pub fn create<'a>() -> TestFixture<'a> {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();
        e.budget().reset_unlimited();

        let bombadil = Address::generate(&e);

        e.ledger().set(LedgerInfo {
            timestamp: 1700000000,
            protocol_version: 20,
            sequence_number: 100,
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 3110400,
        });

        // deploy tokens
        let usdc_client = create_token(&e, &bombadil, 6, "USDC");
        let usdax_client = create_token(&e, &bombadil, 6, "USDAX");
        let weth_client = create_token(&e, &bombadil, 9, "wETH");

        // deploy collaborators
        let access_control_id = e.register_contract(None, MockAccessControl {});
        let access_control_client = MockAccessControlClient::new(&e, &access_control_id);
        access_control_client.initialize(&bombadil);
        for role in [
            ROLE_ASSET_LISTING_ADMIN,
            ROLE_PARAMETERS_ADMIN,
            ROLE_STABLECOIN_RATE_ADMIN,
            ROLE_EMERGENCY_ADMIN,
            ROLE_TREASURY,
        ] {
            access_control_client.grant_role(&bombadil, &role, &bombadil);
        }
        let fee_reduction_id = e.register_contract(None, MockFeeReduction {});
        let fee_reduction_client = MockFeeReductionClient::new(&e, &fee_reduction_id);

        let oracle_id = Address::generate(&e);
        e.register_contract_wasm(&oracle_id, MockPriceOracleWASM);
        let oracle_client = MockPriceOracleClient::new(&e, &oracle_id);
        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &svec![
                &e,
                Asset::Stellar(usdc_client.address.clone()),
                Asset::Stellar(usdax_client.address.clone()),
                Asset::Stellar(weth_client.address.clone()),
            ],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&svec![&e, 1_0000000, 1_0000000, 2000_0000000]);

        // deploy the pool
        let pool_id = e.register_contract(None, LendingPoolContract {});
        let pool_client = LendingPoolClient::new(&e, &pool_id);
        pool_client.initialize(
            &access_control_id,
            &oracle_id,
            &Some(fee_reduction_id),
            &1000,
            &DEFAULT_TW_CAPACITY,
        );

        let flash_receiver_id = e.register_contract(None, MockFlashReceiver {});
        let flash_receiver_client = MockFlashReceiverClient::new(&e, &flash_receiver_id);
        flash_receiver_client.initialize(&pool_id);

        let fixture = TestFixture {
            env: e,
            bombadil,
            users: vec![],
            access_control: access_control_client,
            fee_reduction: fee_reduction_client,
            flash_receiver: flash_receiver_client,
            oracle: oracle_client,
            pool: pool_client,
            tokens: vec![usdc_client, usdax_client, weth_client],
        };

        // register reserves
        fixture.create_reserve(
            TokenIndex::USDC,
            &AssetRules {
                collateral_coefficient_e6: Some(980_000),
                borrow_coefficient_e6: Some(1_100_000),
                penalty_e6: Some(20_000),
            },
        );
        fixture.create_reserve(
            TokenIndex::USDAX,
            &AssetRules {
                collateral_coefficient_e6: Some(900_000),
                borrow_coefficient_e6: Some(1_100_000),
                penalty_e6: Some(50_000),
            },
        );
        fixture.create_reserve(
            TokenIndex::WETH,
            &AssetRules {
                collateral_coefficient_e6: Some(800_000),
                borrow_coefficient_e6: Some(1_200_000),
                penalty_e6: Some(100_000),
            },
        );
        fixture
    }

    /// Create a fixture with a funded liquidity provider (user 0) holding 100k USDC and
    /// 100k USDax in the pool, and a borrower (user 1) with 10 wETH of collateral
    pub fn create_with_data<'a>() -> TestFixture<'a> {
        let mut fixture = TestFixture::create();
        let frodo = Address::generate(&fixture.env);
        let samwise = Address::generate(&fixture.env);

        fixture.tokens[TokenIndex::USDC].mint(&frodo, &(1_000_000 * SCALAR_6));
        fixture.tokens[TokenIndex::USDAX].mint(&frodo, &(1_000_000 * SCALAR_6));
        fixture.tokens[TokenIndex::WETH].mint(&samwise, &(100 * SCALAR_9));

        fixture.pool.deposit(
            &frodo,
            &frodo,
            &fixture.tokens[TokenIndex::USDC].address,
            &(100_000 * SCALAR_6),
        );
        fixture.pool.deposit(
            &frodo,
            &frodo,
            &fixture.tokens[TokenIndex::USDAX].address,
            &(100_000 * SCALAR_6),
        );
        fixture.pool.deposit(
            &samwise,
            &samwise,
            &fixture.tokens[TokenIndex::WETH].address,
            &(10 * SCALAR_9),
        );

        fixture.users.push(frodo);
        fixture.users.push(samwise);
        fixture
    }

    pub fn create_reserve(&self, token_index: TokenIndex, rules: &AssetRules) -> u32 {
        let token = &self.tokens[token_index];
        self.pool.register_asset(
            &self.bombadil,
            &token.address,
            &token.decimals(),
            rules,
            &default_restrictions(),
            &default_fees(),
            &default_irm_params(),
        )
    }

    /// Set the oracle price of each token, 7 decimals, in TokenIndex order
    pub fn set_prices(&self, usdc: i128, usdax: i128, weth: i128) {
        self.oracle
            .set_price_stable(&svec![&self.env, usdc, usdax, weth]);
    }

    /********** Chain Helpers ***********/

    /// Advance the ledger by `time` seconds. The sequence number moves by one so persistent
    /// entries do not expire across long jumps.
    pub fn jump(&self, time: u64) {
        self.env.ledger().set(LedgerInfo {
            timestamp: self.env.ledger().timestamp().saturating_add(time),
            protocol_version: 20,
            sequence_number: self.env.ledger().sequence() + 1,
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 3110400,
        });
    }
}

fn create_token<'a>(e: &Env, admin: &Address, decimals: u32, symbol: &str) -> MockTokenClient<'a> {
    let contract_id = Address::generate(e);
    e.register_contract_wasm(&contract_id, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_id);
    client.initialize(
        admin,
        &decimals,
        &"test token".into_val(e),
        &symbol.into_val(e),
    );
    client
}

/// Target 90% utilization, rate at target between 2% and 10%, 50% at full utilization
pub fn default_irm_params() -> InterestRateModelParams {
    InterestRateModelParams {
        target_ur_e6: 900_000,
        min_rate_at_target: 2 * ONE_PERCENT_APR_E18,
        max_rate_at_target: 10 * ONE_PERCENT_APR_E18,
        rate_at_target: 2 * ONE_PERCENT_APR_E18,
        rate_at_max_ur: 50 * ONE_PERCENT_APR_E18,
        min_time_between_adjustments: 60,
    }
}

pub fn default_restrictions() -> ReserveRestrictions {
    ReserveRestrictions {
        maximal_total_deposit: None,
        maximal_total_debt: None,
        minimal_collateral: 0,
        minimal_debt: 0,
    }
}

pub fn default_fees() -> ReserveFees {
    ReserveFees {
        deposit_fee_e6: 0,
        debt_fee_e6: 0,
    }
}
