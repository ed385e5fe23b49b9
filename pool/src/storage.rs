use soroban_sdk::{
    contracttype, panic_with_error, unwrap::UnwrapOptimized, vec, Address, Env, IntoVal, Map,
    Symbol, TryFromVal, Val, Vec,
};

use crate::{
    constants::MAX_RESERVES,
    pool::{AssetRules, RateModel},
    PoolError,
};

pub(crate) const LEDGER_THRESHOLD_SHARED: u32 = 172800; // ~ 10 days
pub(crate) const LEDGER_BUMP_SHARED: u32 = 241920; // ~ 14 days

pub(crate) const LEDGER_THRESHOLD_USER: u32 = 518400; // ~ 30 days
pub(crate) const LEDGER_BUMP_USER: u32 = 535670; // ~ 31 days

/********** Storage Types **********/

/// The pool's config
#[derive(Clone)]
#[contracttype]
pub struct PoolConfig {
    pub oracle: Address,         // the SEP-40 price feed used to value accounts
    pub access_control: Address, // the contract answering role checks
    pub fee_reduction_provider: Option<Address>, // the contract granting per-account fee reductions
    pub flash_loan_fee_e6: u32,  // the base flash loan fee expressed in 6 decimals
    pub tw_capacity: u32,        // the number of utilization entries retained per reserve
}

/// The fees a reserve charges on accrued interest
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ReserveFees {
    pub deposit_fee_e6: u32, // the share of deposit interest taken by the protocol, 6 decimals
    pub debt_fee_e6: u32,    // the share of debt interest added for the protocol, 6 decimals
}

/// The limits placed on a reserve's totals and account balances
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ReserveRestrictions {
    pub maximal_total_deposit: Option<i128>,
    pub maximal_total_debt: Option<i128>,
    pub minimal_collateral: i128, // the minimum non-zero deposit an account can use as collateral
    pub minimal_debt: i128,       // the minimum non-zero debt an account can hold
}

/// The configuration information about a reserve asset
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ReserveConfig {
    pub index: u32,    // the index of the reserve in the list
    pub decimals: u32, // the decimals used by the underlying token contract
    pub fees: ReserveFees,
    pub restrictions: ReserveRestrictions,
}

/// The data for a reserve asset
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ReserveData {
    pub activated: bool,
    pub frozen: bool,
    pub total_deposit: i128, // the total deposits of the reserve, in underlying tokens
    pub total_debt: i128,    // the total debt of the reserve, in underlying tokens
    pub deposit_index: i128, // the cumulative deposit interest index expressed in 18 decimals
    pub debt_index: i128,    // the cumulative debt interest index expressed in 18 decimals
    pub deposit_rate: i128,  // the current deposit APR expressed in 18 decimals
    pub debt_rate: i128,     // the current debt APR expressed in 18 decimals
    pub earned_fee: i128,    // the protocol income not yet taken, in underlying tokens
    pub last_time: u64,      // the last time the data was accrued
}

/// A sample of a reserve's cumulative utilization
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct TwUrEntry {
    pub timestamp: u64,
    pub accumulator: i128, // the sum of utilization (6 decimals) times seconds since registration
}

/// The configuration of an account
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AccountConfig {
    pub deposits: u64,    // bitset of reserve indices with a non-zero deposit
    pub collaterals: u64, // bitset of reserve indices used as collateral
    pub borrows: u64,     // bitset of reserve indices with a non-zero debt
    pub market_rule_id: u32,
}

/// An account's balances in a single reserve
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AccountReserveData {
    pub deposit: i128,
    pub debt: i128,
    pub applied_deposit_index: i128, // the reserve deposit index the deposit was last updated to
    pub applied_debt_index: i128,    // the reserve debt index the debt was last updated to
}

/********** Storage Key Types **********/

const POOL_CONFIG_KEY: &str = "Config";
const RES_LIST_KEY: &str = "ResList";
const RULE_COUNT_KEY: &str = "RuleCount";

#[derive(Clone)]
#[contracttype]
pub struct AccountReserveKey {
    pub account: Address,
    pub reserve_id: u32,
}

#[derive(Clone)]
#[contracttype]
pub struct TwEntryKey {
    pub reserve_id: u32,
    pub slot: u32,
}

#[derive(Clone)]
#[contracttype]
pub enum PoolDataKey {
    // A map of underlying asset's contract address to reserve config
    ResConfig(Address),
    // A map of underlying asset's contract address to reserve data
    ResData(Address),
    // A map of underlying asset's contract address to its interest rate model
    ResModel(Address),
    // The next logical index of a reserve's utilization ring
    TwIndex(u32),
    // A slot of a reserve's utilization ring
    TwEntry(TwEntryKey),
    // A market rule by id
    MarketRule(u32),
    // The configuration of an account
    AcctConfig(Address),
    // The balances of an account in a reserve
    AcctReserve(AccountReserveKey),
}

/********** Storage **********/

/// Bump the instance rent for the contract
pub fn extend_instance(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Fetch an entry in persistent storage that has a default value if it doesn't exist
fn get_persistent_default<K: IntoVal<Env, Val>, V: TryFromVal<Env, Val>>(
    e: &Env,
    key: &K,
    default: V,
    bump_threshold: u32,
    bump_amount: u32,
) -> V {
    if let Some(result) = e.storage().persistent().get::<K, V>(key) {
        e.storage()
            .persistent()
            .extend_ttl(key, bump_threshold, bump_amount);
        result
    } else {
        default
    }
}

/// Write an entry to persistent storage and bump it
fn set_persistent<K: IntoVal<Env, Val>, V: IntoVal<Env, Val>>(
    e: &Env,
    key: &K,
    value: &V,
    bump_threshold: u32,
    bump_amount: u32,
) {
    e.storage().persistent().set::<K, V>(key, value);
    e.storage()
        .persistent()
        .extend_ttl(key, bump_threshold, bump_amount);
}

/********** Pool Config **********/

/// Fetch the pool configuration
///
/// ### Panics
/// If the pool's config is not set
pub fn get_pool_config(e: &Env) -> PoolConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, POOL_CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the pool configuration
///
/// ### Arguments
/// * `config` - The pool configuration
pub fn set_pool_config(e: &Env, config: &PoolConfig) {
    e.storage()
        .instance()
        .set::<Symbol, PoolConfig>(&Symbol::new(e, POOL_CONFIG_KEY), config);
}

/// Checks if the pool has been initialized
pub fn has_pool_config(e: &Env) -> bool {
    e.storage().instance().has(&Symbol::new(e, POOL_CONFIG_KEY))
}

/********** Reserve Config (ResConfig) **********/

/// Fetch the reserve config for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
///
/// ### Panics
/// If the reserve does not exist
pub fn get_res_config(e: &Env, asset: &Address) -> ReserveConfig {
    let key = PoolDataKey::ResConfig(asset.clone());
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<PoolDataKey, ReserveConfig>(&key)
        .unwrap_optimized()
}

/// Set the reserve configuration for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `config` - The reserve configuration for the asset
pub fn set_res_config(e: &Env, asset: &Address, config: &ReserveConfig) {
    let key = PoolDataKey::ResConfig(asset.clone());
    set_persistent(e, &key, config, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Checks if a reserve exists for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
pub fn has_res(e: &Env, asset: &Address) -> bool {
    let key = PoolDataKey::ResConfig(asset.clone());
    e.storage().persistent().has(&key)
}

/********** Reserve Data (ResData) **********/

/// Fetch the reserve data for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
///
/// ### Panics
/// If the reserve does not exist
pub fn get_res_data(e: &Env, asset: &Address) -> ReserveData {
    let key = PoolDataKey::ResData(asset.clone());
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<PoolDataKey, ReserveData>(&key)
        .unwrap_optimized()
}

/// Set the reserve data for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `data` - The reserve data for the asset
pub fn set_res_data(e: &Env, asset: &Address, data: &ReserveData) {
    let key = PoolDataKey::ResData(asset.clone());
    set_persistent(e, &key, data, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Reserve Interest Rate Model (ResModel) **********/

/// Fetch the interest rate model for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
///
/// ### Panics
/// If the reserve does not exist
pub fn get_res_model(e: &Env, asset: &Address) -> RateModel {
    let key = PoolDataKey::ResModel(asset.clone());
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<PoolDataKey, RateModel>(&key)
        .unwrap_optimized()
}

/// Set the interest rate model for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `model` - The interest rate model for the asset
pub fn set_res_model(e: &Env, asset: &Address, model: &RateModel) {
    let key = PoolDataKey::ResModel(asset.clone());
    set_persistent(e, &key, model, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Reserve List (ResList) **********/

/// Fetch the list of reserves
pub fn get_res_list(e: &Env) -> Vec<Address> {
    get_persistent_default(
        e,
        &Symbol::new(e, RES_LIST_KEY),
        vec![e],
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Add a reserve to the back of the list and returns the index
///
/// ### Arguments
/// * `asset` - The contract address of the underlying asset
///
/// ### Panics
/// If the number of reserves in the list exceeds 64
///
// @dev: Once added it can't be removed
pub fn push_res_list(e: &Env, asset: &Address) -> u32 {
    let mut res_list = get_res_list(e);
    if res_list.len() == MAX_RESERVES {
        panic_with_error!(e, PoolError::BadRequest)
    }
    res_list.push_back(asset.clone());
    let new_index = res_list.len() - 1;
    set_persistent(
        e,
        &Symbol::new(e, RES_LIST_KEY),
        &res_list,
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    );
    new_index
}

/// Fetch the address of the reserve at an index
///
/// ### Arguments
/// * `index` - The index of the reserve
///
/// ### Panics
/// If no reserve exists at the index
pub fn get_res_address(e: &Env, index: u32) -> Address {
    match get_res_list(e).get(index) {
        Some(asset) => asset,
        None => panic_with_error!(e, PoolError::NoSuchAsset),
    }
}

/********** Utilization Ring (TwIndex, TwEntry) **********/

/// Fetch the next logical index of a reserve's utilization ring
///
/// ### Arguments
/// * `reserve_id` - The index of the reserve
pub fn get_tw_index(e: &Env, reserve_id: u32) -> u32 {
    let key = PoolDataKey::TwIndex(reserve_id);
    get_persistent_default(e, &key, 0u32, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED)
}

/// Set the next logical index of a reserve's utilization ring
///
/// ### Arguments
/// * `reserve_id` - The index of the reserve
/// * `index` - The next logical index
pub fn set_tw_index(e: &Env, reserve_id: u32, index: u32) {
    let key = PoolDataKey::TwIndex(reserve_id);
    set_persistent(e, &key, &index, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Fetch a slot of a reserve's utilization ring
///
/// ### Arguments
/// * `reserve_id` - The index of the reserve
/// * `slot` - The physical slot in the ring
pub fn get_tw_entry(e: &Env, reserve_id: u32, slot: u32) -> Option<TwUrEntry> {
    let key = PoolDataKey::TwEntry(TwEntryKey { reserve_id, slot });
    get_persistent_default::<PoolDataKey, Option<TwUrEntry>>(
        e,
        &key,
        None,
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Set a slot of a reserve's utilization ring
///
/// ### Arguments
/// * `reserve_id` - The index of the reserve
/// * `slot` - The physical slot in the ring
/// * `entry` - The utilization entry
pub fn set_tw_entry(e: &Env, reserve_id: u32, slot: u32, entry: &TwUrEntry) {
    let key = PoolDataKey::TwEntry(TwEntryKey { reserve_id, slot });
    set_persistent(e, &key, entry, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Market Rules **********/

/// Fetch the number of market rules
pub fn get_market_rule_count(e: &Env) -> u32 {
    get_persistent_default(
        e,
        &Symbol::new(e, RULE_COUNT_KEY),
        0u32,
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Set the number of market rules
///
/// ### Arguments
/// * `count` - The number of market rules
pub fn set_market_rule_count(e: &Env, count: u32) {
    set_persistent(
        e,
        &Symbol::new(e, RULE_COUNT_KEY),
        &count,
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    );
}

/// Fetch a market rule
///
/// ### Arguments
/// * `rule_id` - The id of the market rule
pub fn get_market_rule(e: &Env, rule_id: u32) -> Option<Map<Address, AssetRules>> {
    let key = PoolDataKey::MarketRule(rule_id);
    get_persistent_default::<PoolDataKey, Option<Map<Address, AssetRules>>>(
        e,
        &key,
        None,
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Set a market rule
///
/// ### Arguments
/// * `rule_id` - The id of the market rule
/// * `rule` - The asset rules of the market rule
pub fn set_market_rule(e: &Env, rule_id: u32, rule: &Map<Address, AssetRules>) {
    let key = PoolDataKey::MarketRule(rule_id);
    set_persistent(e, &key, rule, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Accounts **********/

/// Fetch the account's config or return an empty config using market rule 0
///
/// ### Arguments
/// * `account` - The address of the account
pub fn get_account_config(e: &Env, account: &Address) -> AccountConfig {
    let key = PoolDataKey::AcctConfig(account.clone());
    get_persistent_default(
        e,
        &key,
        AccountConfig {
            deposits: 0,
            collaterals: 0,
            borrows: 0,
            market_rule_id: 0,
        },
        LEDGER_THRESHOLD_USER,
        LEDGER_BUMP_USER,
    )
}

/// Set the account's config
///
/// ### Arguments
/// * `account` - The address of the account
/// * `config` - The new config for the account
pub fn set_account_config(e: &Env, account: &Address, config: &AccountConfig) {
    let key = PoolDataKey::AcctConfig(account.clone());
    set_persistent(e, &key, config, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/// Fetch the account's balances in a reserve, if any exist
///
/// ### Arguments
/// * `account` - The address of the account
/// * `reserve_id` - The index of the reserve
pub fn get_account_reserve(
    e: &Env,
    account: &Address,
    reserve_id: u32,
) -> Option<AccountReserveData> {
    let key = PoolDataKey::AcctReserve(AccountReserveKey {
        account: account.clone(),
        reserve_id,
    });
    get_persistent_default::<PoolDataKey, Option<AccountReserveData>>(
        e,
        &key,
        None,
        LEDGER_THRESHOLD_USER,
        LEDGER_BUMP_USER,
    )
}

/// Set the account's balances in a reserve
///
/// ### Arguments
/// * `account` - The address of the account
/// * `reserve_id` - The index of the reserve
/// * `data` - The account's balances in the reserve
pub fn set_account_reserve(e: &Env, account: &Address, reserve_id: u32, data: &AccountReserveData) {
    let key = PoolDataKey::AcctReserve(AccountReserveKey {
        account: account.clone(),
        reserve_id,
    });
    set_persistent(e, &key, data, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/// Remove the account's balances in a reserve
///
/// ### Arguments
/// * `account` - The address of the account
/// * `reserve_id` - The index of the reserve
pub fn del_account_reserve(e: &Env, account: &Address, reserve_id: u32) {
    let key = PoolDataKey::AcctReserve(AccountReserveKey {
        account: account.clone(),
        reserve_id,
    });
    e.storage().persistent().remove(&key);
}
