#![cfg(test)]

use crate::{
    constants::{DEFAULT_TW_CAPACITY, ONE_PERCENT_APR_E18},
    pool::{self, AssetRules, InterestRateModelParams},
    storage::{ReserveFees, ReserveRestrictions},
    LendingPoolContract,
};
use mock_access_control::{MockAccessControl, MockAccessControlClient};
use mock_fee_reduction::{MockFeeReduction, MockFeeReductionClient};
use mock_flash_receiver::{MockFlashReceiver, MockFlashReceiverClient};
use sep_40_oracle::testutils::{MockPriceOracleClient, MockPriceOracleWASM};
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::{
    testutils::{Address as _, Ledger, LedgerInfo},
    Address, Env, IntoVal,
};

pub(crate) fn create_pool(e: &Env) -> Address {
    e.register_contract(None, LendingPoolContract {})
}

/// Set the ledger timestamp. The sequence number is held constant so persistent entries
/// never expire between large time jumps.
pub(crate) fn set_timestamp(e: &Env, timestamp: u64) {
    e.ledger().set(LedgerInfo {
        timestamp,
        protocol_version: 20,
        sequence_number: 1234,
        network_id: Default::default(),
        base_reserve: 10,
        min_temp_entry_ttl: 10,
        min_persistent_entry_ttl: 10,
        max_entry_ttl: 2000000,
    });
}

//************************************************
//           External Contract Helpers
//************************************************

// ***** Token *****

pub(crate) fn create_token_contract<'a>(
    e: &Env,
    admin: &Address,
    decimals: u32,
) -> (Address, MockTokenClient<'a>) {
    let contract_address = Address::generate(e);
    e.register_contract_wasm(&contract_address, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_address);
    client.initialize(admin, &decimals, &"unit".into_val(e), &"test".into_val(e));
    (contract_address, client)
}

//***** Oracle ******

pub(crate) fn create_mock_oracle<'a>(e: &Env) -> (Address, MockPriceOracleClient<'a>) {
    let contract_address = e.register_contract_wasm(None, MockPriceOracleWASM);
    (
        contract_address.clone(),
        MockPriceOracleClient::new(e, &contract_address),
    )
}

//***** Access Control ******

pub(crate) fn create_access_control<'a>(
    e: &Env,
    admin: &Address,
) -> (Address, MockAccessControlClient<'a>) {
    let contract_address = e.register_contract(None, MockAccessControl {});
    let client = MockAccessControlClient::new(e, &contract_address);
    client.initialize(admin);
    (contract_address, client)
}

//***** Fee Reduction Provider ******

pub(crate) fn create_fee_reduction_provider<'a>(
    e: &Env,
) -> (Address, MockFeeReductionClient<'a>) {
    let contract_address = e.register_contract(None, MockFeeReduction {});
    (
        contract_address.clone(),
        MockFeeReductionClient::new(e, &contract_address),
    )
}

//***** Flash Loan Receiver ******

pub(crate) fn create_flash_receiver<'a>(
    e: &Env,
    pool: &Address,
) -> (Address, MockFlashReceiverClient<'a>) {
    let contract_address = e.register_contract(None, MockFlashReceiver {});
    let client = MockFlashReceiverClient::new(e, &contract_address);
    client.initialize(pool);
    (contract_address, client)
}

//************************************************
//           Object Creation Helpers
//************************************************

pub(crate) fn default_irm_params() -> InterestRateModelParams {
    InterestRateModelParams {
        target_ur_e6: 900_000,
        min_rate_at_target: 2 * ONE_PERCENT_APR_E18,
        max_rate_at_target: 10 * ONE_PERCENT_APR_E18,
        rate_at_target: 2 * ONE_PERCENT_APR_E18,
        rate_at_max_ur: 50 * ONE_PERCENT_APR_E18,
        min_time_between_adjustments: 60,
    }
}

pub(crate) fn default_asset_rules() -> AssetRules {
    AssetRules {
        collateral_coefficient_e6: Some(900_000),
        borrow_coefficient_e6: Some(1_100_000),
        penalty_e6: Some(50_000),
    }
}

pub(crate) fn default_restrictions() -> ReserveRestrictions {
    ReserveRestrictions {
        maximal_total_deposit: None,
        maximal_total_debt: None,
        minimal_collateral: 0,
        minimal_debt: 0,
    }
}

pub(crate) fn default_fees() -> ReserveFees {
    ReserveFees {
        deposit_fee_e6: 0,
        debt_fee_e6: 0,
    }
}

/// Initialize the pool with a 0.1% flash loan fee and no fee reduction provider.
/// Must be called within the pool's contract context.
pub(crate) fn setup_pool(e: &Env, oracle: &Address, access_control: &Address) {
    pool::execute_initialize(e, access_control, oracle, &None, 1000, DEFAULT_TW_CAPACITY);
}

/// Register an asset with the default parameters. Must be called within the pool's
/// contract context.
pub(crate) fn create_reserve(e: &Env, asset: &Address, decimals: u32) -> u32 {
    pool::execute_register_asset(
        e,
        asset,
        decimals,
        &default_asset_rules(),
        &default_restrictions(),
        &default_fees(),
        &default_irm_params(),
    )
}
