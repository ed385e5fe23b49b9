use crate::{
    constants::{
        ROLE_ASSET_LISTING_ADMIN, ROLE_EMERGENCY_ADMIN, ROLE_PARAMETERS_ADMIN,
        ROLE_STABLECOIN_RATE_ADMIN, ROLE_TREASURY,
    },
    errors::PoolError,
    pool::{
        self, Account, AccountPosition, Action, ActionType, AssetRules, InterestRateModelParams,
        Pool, RateModel, UtilizationRing,
    },
    storage::{
        self, AccountConfig, AccountReserveData, PoolConfig, ReserveConfig, ReserveData,
        ReserveFees, ReserveRestrictions, TwUrEntry,
    },
};
use soroban_sdk::{
    contract, contractclient, contractimpl, panic_with_error, vec, Address, Bytes, Env, Map,
    Symbol, Vec,
};

/// ### LendingPool
///
/// A multi-asset lending pool with adaptive interest rates and per-account market rules.
#[contract]
pub struct LendingPoolContract;

#[contractclient(name = "LendingPoolClient")]
pub trait LendingPool {
    /// Initialize the pool
    ///
    /// ### Arguments
    /// * `access_control` - The contract answering role checks
    /// * `oracle` - The contract address of the SEP-40 price feed
    /// * `fee_reduction_provider` - The contract granting fee reductions, if any
    /// * `flash_loan_fee_e6` - The base flash loan fee expressed in 6 decimals
    /// * `tw_capacity` - The number of utilization entries retained per reserve
    ///
    /// ### Panics
    /// If the pool is already initialized or the arguments are invalid
    fn initialize(
        e: Env,
        access_control: Address,
        oracle: Address,
        fee_reduction_provider: Option<Address>,
        flash_loan_fee_e6: u32,
        tw_capacity: u32,
    );

    /********** Admin Functions **********/

    /// (Asset listing admin only) Register an asset with an adaptive interest rate model
    ///
    /// Returns the index of the new reserve
    ///
    /// ### Arguments
    /// * `caller` - The address holding the asset listing role
    /// * `asset` - The underlying asset to add as a reserve
    /// * `decimals` - The decimals of the underlying asset
    /// * `default_rules` - The asset's rules within market rule 0
    /// * `restrictions` - The reserve's restrictions
    /// * `fees` - The reserve's fees
    /// * `irm_params` - The parameters of the interest rate model
    ///
    /// ### Panics
    /// If the caller lacks the role, the asset is already registered or any parameter is invalid
    #[allow(clippy::too_many_arguments)]
    fn register_asset(
        e: Env,
        caller: Address,
        asset: Address,
        decimals: u32,
        default_rules: AssetRules,
        restrictions: ReserveRestrictions,
        fees: ReserveFees,
        irm_params: InterestRateModelParams,
    ) -> u32;

    /// (Asset listing admin only) Register a stablecoin with a fixed debt rate
    ///
    /// Returns the index of the new reserve
    ///
    /// ### Arguments
    /// * `debt_rate` - The debt APR expressed in 18 decimals
    ///
    /// ### Panics
    /// If the caller lacks the role, the asset is already registered or any parameter is invalid
    #[allow(clippy::too_many_arguments)]
    fn register_stablecoin(
        e: Env,
        caller: Address,
        asset: Address,
        decimals: u32,
        default_rules: AssetRules,
        restrictions: ReserveRestrictions,
        fees: ReserveFees,
        debt_rate: i128,
    ) -> u32;

    /// (Emergency admin only) Activate or deactivate a reserve
    ///
    /// ### Panics
    /// If the caller lacks the role or the reserve is already in the requested state
    fn set_reserve_is_active(e: Env, caller: Address, asset: Address, activated: bool);

    /// (Emergency admin only) Freeze or unfreeze a reserve. Frozen reserves reject deposits,
    /// borrows and flash loans.
    ///
    /// ### Panics
    /// If the caller lacks the role or the reserve is already in the requested state
    fn set_reserve_is_frozen(e: Env, caller: Address, asset: Address, frozen: bool);

    /// (Parameters admin only) Set the restrictions of a reserve
    fn set_reserve_restrictions(
        e: Env,
        caller: Address,
        asset: Address,
        restrictions: ReserveRestrictions,
    );

    /// (Parameters admin only) Set the fees of a reserve. Interest accrued before the
    /// call keeps the old fees.
    fn set_reserve_fees(e: Env, caller: Address, asset: Address, fees: ReserveFees);

    /// (Parameters admin only) Replace the interest rate model parameters of an adaptive
    /// reserve. The time of the last adjustment is kept.
    ///
    /// ### Panics
    /// If the caller lacks the role, the reserve uses a stable rate or the parameters are invalid
    fn set_interest_rate_model(
        e: Env,
        caller: Address,
        asset: Address,
        irm_params: InterestRateModelParams,
    );

    /// (Stablecoin rate admin only) Set the debt rate of a stable reserve
    ///
    /// ### Panics
    /// If the caller lacks the role or the reserve uses an adaptive rate
    fn set_stablecoin_debt_rate(e: Env, caller: Address, asset: Address, debt_rate: i128);

    /// (Parameters admin only) Append a new market rule
    ///
    /// Returns the id of the new market rule
    fn add_market_rule(e: Env, caller: Address, rules: Map<Address, AssetRules>) -> u32;

    /// (Parameters admin only) Modify the rules of an asset within a market rule
    fn modify_asset_rule(e: Env, caller: Address, rule_id: u32, asset: Address, rules: AssetRules);

    /// (Parameters admin only) Set the base flash loan fee
    fn set_flash_loan_fee(e: Env, caller: Address, flash_loan_fee_e6: u32);

    /// (Parameters admin only) Set or remove the fee reduction provider
    fn set_fee_reduction_provider(e: Env, caller: Address, provider: Option<Address>);

    /// (Parameters admin only) Set the price feed
    fn set_price_feed_provider(e: Env, caller: Address, oracle: Address);

    /// (Treasury only) Transfer the protocol income of each asset to `to`
    ///
    /// Returns the amount taken for each asset
    fn take_protocol_income(e: Env, caller: Address, assets: Vec<Address>, to: Address)
        -> Vec<i128>;

    /********** Account Functions **********/

    /// Submit a batch of actions where `on_behalf_of` takes on the position and `caller` sends
    /// and receives any tokens
    ///
    /// Returns the amount moved by each action
    ///
    /// ### Arguments
    /// * `caller` - The address sending and receiving tokens
    /// * `on_behalf_of` - The account whose position is modified
    /// * `actions` - The actions to apply, in order
    ///
    /// ### Panics
    /// If any action fails or the account ends the batch insolvent
    fn multi_op(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        actions: Vec<Action>,
    ) -> Vec<i128>;

    /// Deposit `amount` of `asset` for `on_behalf_of`
    fn deposit(e: Env, caller: Address, on_behalf_of: Address, asset: Address, amount: i128)
        -> i128;

    /// Withdraw up to `amount` of `asset` from `on_behalf_of`
    ///
    /// Returns the amount withdrawn
    fn withdraw(e: Env, caller: Address, on_behalf_of: Address, asset: Address, amount: i128)
        -> i128;

    /// Borrow `amount` of `asset` against the collateral of `on_behalf_of`
    fn borrow(e: Env, caller: Address, on_behalf_of: Address, asset: Address, amount: i128)
        -> i128;

    /// Repay up to `amount` of the `asset` debt of `on_behalf_of`
    ///
    /// Returns the amount repaid
    fn repay(e: Env, caller: Address, on_behalf_of: Address, asset: Address, amount: i128)
        -> i128;

    /// Enable or disable a deposit of the account as collateral
    ///
    /// ### Panics
    /// If the flag is already set, the market rule does not allow the asset as collateral or
    /// disabling it would leave the account insolvent
    fn set_as_collateral(e: Env, account: Address, asset: Address, use_as_collateral: bool);

    /// Switch the market rule the account is valued under
    ///
    /// ### Panics
    /// If the rule is already chosen, does not exist, disables a held position or leaves the
    /// account insolvent
    fn choose_market_rule(e: Env, account: Address, rule_id: u32);

    /// Repay the debt of an insolvent account in exchange for its collateral plus penalties
    ///
    /// Returns the (amount repaid, amount of collateral taken)
    ///
    /// ### Arguments
    /// * `liquidator` - The address repaying the debt
    /// * `liquidated` - The insolvent account
    /// * `asset_to_repay` - The debt asset to repay
    /// * `asset_to_take` - The collateral asset to take
    /// * `amount_to_repay` - The maximum amount to repay
    /// * `minimum_received_e18` - The minimum collateral received per unit repaid, 18 decimals
    #[allow(clippy::too_many_arguments)]
    fn liquidate(
        e: Env,
        liquidator: Address,
        liquidated: Address,
        asset_to_repay: Address,
        asset_to_take: Address,
        amount_to_repay: i128,
        minimum_received_e18: i128,
    ) -> (i128, i128);

    /// Lend `amounts` of `assets` to `receiver` for the duration of its callback
    ///
    /// Returns the fee charged for each asset
    fn flash_loan(
        e: Env,
        caller: Address,
        receiver: Address,
        assets: Vec<Address>,
        amounts: Vec<i128>,
        data: Bytes,
    ) -> Vec<i128>;

    /// Accrue the interest of a reserve up to now
    ///
    /// ### Panics
    /// If the reserve is inactive
    fn accumulate_interest(e: Env, asset: Address);

    /// Move the rate at target of an adaptive reserve based on the time weighted utilization
    /// since the last adjustment
    ///
    /// Returns the new rate at target
    ///
    /// ### Arguments
    /// * `guessed_index` - The index of the first utilization entry of the window, if known
    fn adjust_rate_at_target(e: Env, asset: Address, guessed_index: Option<u32>) -> i128;

    /********** Views **********/

    fn view_pool_config(e: Env) -> PoolConfig;

    fn view_reserve_list(e: Env) -> Vec<Address>;

    fn view_reserve_config(e: Env, asset: Address) -> ReserveConfig;

    fn view_reserve_data(e: Env, asset: Address) -> ReserveData;

    fn view_interest_rate_model(e: Env, asset: Address) -> RateModel;

    /// Fetch the utilization entries for the logical indices in `[from, to)`. Indices not yet
    /// written, or already overwritten, read back as None.
    ///
    /// ### Panics
    /// If `to < from` or the range is wider than the ring's capacity
    fn view_asset_tw_entries(
        e: Env,
        asset: Address,
        from: u32,
        to: u32,
    ) -> Vec<Option<TwUrEntry>>;

    /// Fetch the logical index the next utilization entry will be written to
    fn view_asset_tw_index(e: Env, asset: Address) -> u32;

    /// Fetch the time weighted utilization between two logical indices, 6 decimals
    fn view_tw_utilization(e: Env, asset: Address, from: u32, to: u32) -> i128;

    fn view_market_rule(e: Env, rule_id: u32) -> Map<Address, AssetRules>;

    fn view_market_rule_count(e: Env) -> u32;

    fn view_account_config(e: Env, account: Address) -> AccountConfig;

    fn view_account_reserve_data(e: Env, account: Address, asset: Address) -> AccountReserveData;

    /// Fetch (is solvent, free collateral coefficient) for an account, accrued to now. The
    /// coefficient is the distance between the weighted collateral value and the weighted
    /// debt value, in the price feed's base asset with 18 decimals.
    fn view_account_free_collateral_coefficient(e: Env, account: Address) -> (bool, i128);

    fn view_protocol_income(e: Env, assets: Vec<Address>) -> Vec<(Address, i128)>;

    /// Quote the flash loan fee the caller would pay for `amount` of `asset`
    fn view_flash_loan_fee(e: Env, caller: Address, asset: Address, amount: i128) -> i128;
}

#[contractimpl]
impl LendingPool for LendingPoolContract {
    fn initialize(
        e: Env,
        access_control: Address,
        oracle: Address,
        fee_reduction_provider: Option<Address>,
        flash_loan_fee_e6: u32,
        tw_capacity: u32,
    ) {
        storage::extend_instance(&e);

        pool::execute_initialize(
            &e,
            &access_control,
            &oracle,
            &fee_reduction_provider,
            flash_loan_fee_e6,
            tw_capacity,
        );
    }

    /********** Admin Functions **********/

    #[allow(clippy::too_many_arguments)]
    fn register_asset(
        e: Env,
        caller: Address,
        asset: Address,
        decimals: u32,
        default_rules: AssetRules,
        restrictions: ReserveRestrictions,
        fees: ReserveFees,
        irm_params: InterestRateModelParams,
    ) -> u32 {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_ASSET_LISTING_ADMIN, &caller);

        let index = pool::execute_register_asset(
            &e,
            &asset,
            decimals,
            &default_rules,
            &restrictions,
            &fees,
            &irm_params,
        );

        e.events()
            .publish((Symbol::new(&e, "register_asset"), caller), (asset, index));
        index
    }

    #[allow(clippy::too_many_arguments)]
    fn register_stablecoin(
        e: Env,
        caller: Address,
        asset: Address,
        decimals: u32,
        default_rules: AssetRules,
        restrictions: ReserveRestrictions,
        fees: ReserveFees,
        debt_rate: i128,
    ) -> u32 {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_ASSET_LISTING_ADMIN, &caller);

        let index = pool::execute_register_stablecoin(
            &e,
            &asset,
            decimals,
            &default_rules,
            &restrictions,
            &fees,
            debt_rate,
        );

        e.events().publish(
            (Symbol::new(&e, "register_stablecoin"), caller),
            (asset, index),
        );
        index
    }

    fn set_reserve_is_active(e: Env, caller: Address, asset: Address, activated: bool) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_EMERGENCY_ADMIN, &caller);

        pool::execute_set_reserve_is_active(&e, &asset, activated);

        e.events().publish(
            (Symbol::new(&e, "set_reserve_is_active"), caller),
            (asset, activated),
        );
    }

    fn set_reserve_is_frozen(e: Env, caller: Address, asset: Address, frozen: bool) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_EMERGENCY_ADMIN, &caller);

        pool::execute_set_reserve_is_frozen(&e, &asset, frozen);

        e.events().publish(
            (Symbol::new(&e, "set_reserve_is_frozen"), caller),
            (asset, frozen),
        );
    }

    fn set_reserve_restrictions(
        e: Env,
        caller: Address,
        asset: Address,
        restrictions: ReserveRestrictions,
    ) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_reserve_restrictions(&e, &asset, &restrictions);

        e.events().publish(
            (Symbol::new(&e, "set_reserve_restrictions"), caller),
            (asset, restrictions),
        );
    }

    fn set_reserve_fees(e: Env, caller: Address, asset: Address, fees: ReserveFees) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_reserve_fees(&e, &asset, &fees);

        e.events()
            .publish((Symbol::new(&e, "set_reserve_fees"), caller), (asset, fees));
    }

    fn set_interest_rate_model(
        e: Env,
        caller: Address,
        asset: Address,
        irm_params: InterestRateModelParams,
    ) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_interest_rate_model(&e, &asset, &irm_params);

        e.events().publish(
            (Symbol::new(&e, "set_interest_rate_model"), caller),
            (asset, irm_params),
        );
    }

    fn set_stablecoin_debt_rate(e: Env, caller: Address, asset: Address, debt_rate: i128) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_STABLECOIN_RATE_ADMIN, &caller);

        pool::execute_set_stablecoin_debt_rate(&e, &asset, debt_rate);

        e.events().publish(
            (Symbol::new(&e, "set_stablecoin_debt_rate"), caller),
            (asset, debt_rate),
        );
    }

    fn add_market_rule(e: Env, caller: Address, rules: Map<Address, AssetRules>) -> u32 {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        let rule_id = pool::execute_add_market_rule(&e, &rules);

        e.events()
            .publish((Symbol::new(&e, "add_market_rule"), caller), rule_id);
        rule_id
    }

    fn modify_asset_rule(e: Env, caller: Address, rule_id: u32, asset: Address, rules: AssetRules) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_modify_asset_rule(&e, rule_id, &asset, &rules);

        e.events().publish(
            (Symbol::new(&e, "modify_asset_rule"), caller),
            (rule_id, asset, rules),
        );
    }

    fn set_flash_loan_fee(e: Env, caller: Address, flash_loan_fee_e6: u32) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_flash_loan_fee(&e, flash_loan_fee_e6);

        e.events().publish(
            (Symbol::new(&e, "set_flash_loan_fee"), caller),
            flash_loan_fee_e6,
        );
    }

    fn set_fee_reduction_provider(e: Env, caller: Address, provider: Option<Address>) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_fee_reduction_provider(&e, &provider);

        e.events().publish(
            (Symbol::new(&e, "set_fee_reduction_provider"), caller),
            provider,
        );
    }

    fn set_price_feed_provider(e: Env, caller: Address, oracle: Address) {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_PARAMETERS_ADMIN, &caller);

        pool::execute_set_price_feed_provider(&e, &oracle);

        e.events()
            .publish((Symbol::new(&e, "set_price_feed_provider"), caller), oracle);
    }

    fn take_protocol_income(
        e: Env,
        caller: Address,
        assets: Vec<Address>,
        to: Address,
    ) -> Vec<i128> {
        storage::extend_instance(&e);
        require_admin(&e, ROLE_TREASURY, &caller);

        pool::execute_take_protocol_income(&e, &assets, &to)
    }

    /********** Account Functions **********/

    fn multi_op(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        actions: Vec<Action>,
    ) -> Vec<i128> {
        storage::extend_instance(&e);
        caller.require_auth();

        pool::execute_multi_op(&e, &caller, &on_behalf_of, &actions)
    }

    fn deposit(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        asset: Address,
        amount: i128,
    ) -> i128 {
        execute_single_action(&e, ActionType::Deposit, &caller, &on_behalf_of, &asset, amount)
    }

    fn withdraw(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        asset: Address,
        amount: i128,
    ) -> i128 {
        execute_single_action(&e, ActionType::Withdraw, &caller, &on_behalf_of, &asset, amount)
    }

    fn borrow(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        asset: Address,
        amount: i128,
    ) -> i128 {
        execute_single_action(&e, ActionType::Borrow, &caller, &on_behalf_of, &asset, amount)
    }

    fn repay(
        e: Env,
        caller: Address,
        on_behalf_of: Address,
        asset: Address,
        amount: i128,
    ) -> i128 {
        execute_single_action(&e, ActionType::Repay, &caller, &on_behalf_of, &asset, amount)
    }

    fn set_as_collateral(e: Env, account: Address, asset: Address, use_as_collateral: bool) {
        storage::extend_instance(&e);
        account.require_auth();

        pool::execute_set_as_collateral(&e, &account, &asset, use_as_collateral);
    }

    fn choose_market_rule(e: Env, account: Address, rule_id: u32) {
        storage::extend_instance(&e);
        account.require_auth();

        pool::execute_choose_market_rule(&e, &account, rule_id);
    }

    #[allow(clippy::too_many_arguments)]
    fn liquidate(
        e: Env,
        liquidator: Address,
        liquidated: Address,
        asset_to_repay: Address,
        asset_to_take: Address,
        amount_to_repay: i128,
        minimum_received_e18: i128,
    ) -> (i128, i128) {
        storage::extend_instance(&e);
        liquidator.require_auth();

        pool::execute_liquidate(
            &e,
            &liquidator,
            &liquidated,
            &asset_to_repay,
            &asset_to_take,
            amount_to_repay,
            minimum_received_e18,
        )
    }

    fn flash_loan(
        e: Env,
        caller: Address,
        receiver: Address,
        assets: Vec<Address>,
        amounts: Vec<i128>,
        data: Bytes,
    ) -> Vec<i128> {
        storage::extend_instance(&e);
        caller.require_auth();

        pool::execute_flash_loan(&e, &caller, &receiver, &assets, &amounts, &data)
    }

    fn accumulate_interest(e: Env, asset: Address) {
        storage::extend_instance(&e);
        let reserve = pool::execute_accumulate_interest(&e, &asset);

        e.events().publish(
            (Symbol::new(&e, "accumulate_interest"), asset),
            (reserve.data.deposit_index, reserve.data.debt_index),
        );
    }

    fn adjust_rate_at_target(e: Env, asset: Address, guessed_index: Option<u32>) -> i128 {
        storage::extend_instance(&e);
        pool::execute_adjust_rate_at_target(&e, &asset, guessed_index)
    }

    /********** Views **********/

    fn view_pool_config(e: Env) -> PoolConfig {
        storage::get_pool_config(&e)
    }

    fn view_reserve_list(e: Env) -> Vec<Address> {
        storage::get_res_list(&e)
    }

    fn view_reserve_config(e: Env, asset: Address) -> ReserveConfig {
        require_registered(&e, &asset);
        storage::get_res_config(&e, &asset)
    }

    fn view_reserve_data(e: Env, asset: Address) -> ReserveData {
        require_registered(&e, &asset);
        storage::get_res_data(&e, &asset)
    }

    fn view_interest_rate_model(e: Env, asset: Address) -> RateModel {
        require_registered(&e, &asset);
        storage::get_res_model(&e, &asset)
    }

    fn view_asset_tw_entries(
        e: Env,
        asset: Address,
        from: u32,
        to: u32,
    ) -> Vec<Option<TwUrEntry>> {
        let ring = load_ring(&e, &asset);
        if to < from || to - from > ring.capacity() {
            panic_with_error!(&e, PoolError::BadRequest);
        }
        let mut entries = vec![&e];
        for index in from..to {
            entries.push_back(ring.get(&e, index));
        }
        entries
    }

    fn view_asset_tw_index(e: Env, asset: Address) -> u32 {
        load_ring(&e, &asset).next_index()
    }

    fn view_tw_utilization(e: Env, asset: Address, from: u32, to: u32) -> i128 {
        let (utilization, _) = load_ring(&e, &asset).time_weighted_average(&e, from, to);
        utilization
    }

    fn view_market_rule(e: Env, rule_id: u32) -> Map<Address, AssetRules> {
        match storage::get_market_rule(&e, rule_id) {
            Some(rule) => rule,
            None => panic_with_error!(&e, PoolError::MarketRuleInvalidId),
        }
    }

    fn view_market_rule_count(e: Env) -> u32 {
        storage::get_market_rule_count(&e)
    }

    fn view_account_config(e: Env, account: Address) -> AccountConfig {
        storage::get_account_config(&e, &account)
    }

    fn view_account_reserve_data(e: Env, account: Address, asset: Address) -> AccountReserveData {
        require_registered(&e, &asset);
        let reserve_id = storage::get_res_config(&e, &asset).index;
        storage::get_account_reserve(&e, &account, reserve_id).unwrap_or(AccountReserveData {
            deposit: 0,
            debt: 0,
            applied_deposit_index: 0,
            applied_debt_index: 0,
        })
    }

    fn view_account_free_collateral_coefficient(e: Env, account: Address) -> (bool, i128) {
        let mut pool = Pool::load(&e);
        let mut account = Account::load(&e, &account);
        AccountPosition::calculate(&e, &mut pool, &mut account).free_collateral()
    }

    fn view_protocol_income(e: Env, assets: Vec<Address>) -> Vec<(Address, i128)> {
        pool::execute_view_protocol_income(&e, &assets)
    }

    fn view_flash_loan_fee(e: Env, caller: Address, asset: Address, amount: i128) -> i128 {
        pool::execute_view_flash_loan_fee(&e, &caller, &asset, amount)
    }
}

/// Require the caller to authorize the call and hold `role`
fn require_admin(e: &Env, role: u32, caller: &Address) {
    caller.require_auth();
    Pool::load(e).require_role(e, role, caller);
}

fn require_registered(e: &Env, asset: &Address) {
    if !storage::has_res(e, asset) {
        panic_with_error!(e, PoolError::AssetNotRegistered);
    }
}

fn load_ring(e: &Env, asset: &Address) -> UtilizationRing {
    require_registered(e, asset);
    let reserve_id = storage::get_res_config(e, asset).index;
    UtilizationRing::load(e, reserve_id, storage::get_pool_config(e).tw_capacity)
}

fn execute_single_action(
    e: &Env,
    action_type: ActionType,
    caller: &Address,
    on_behalf_of: &Address,
    asset: &Address,
    amount: i128,
) -> i128 {
    storage::extend_instance(e);
    caller.require_auth();

    let actions = vec![
        e,
        Action {
            action_type: action_type as u32,
            asset: asset.clone(),
            amount,
        },
    ];
    pool::execute_multi_op(e, caller, on_behalf_of, &actions).get_unchecked(0)
}
