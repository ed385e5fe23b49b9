mod account;
pub use account::Account;

mod actions;
pub use actions::{Action, ActionType};

mod config;
pub use config::{
    execute_accumulate_interest, execute_initialize, execute_register_asset,
    execute_register_stablecoin, execute_set_fee_reduction_provider, execute_set_flash_loan_fee,
    execute_set_interest_rate_model, execute_set_price_feed_provider,
    execute_set_reserve_fees, execute_set_reserve_is_active, execute_set_reserve_is_frozen,
    execute_set_reserve_restrictions, execute_set_stablecoin_debt_rate,
};

mod flash_loan;
pub use flash_loan::{execute_flash_loan, execute_view_flash_loan_fee};

mod income;
pub use income::{execute_take_protocol_income, execute_view_protocol_income};

mod interest;
pub use interest::{
    execute_adjust_rate_at_target, InterestRateModel, InterestRateModelParams, RateModel,
};

mod liquidation;
pub use liquidation::execute_liquidate;

mod market_rules;
pub use market_rules::{
    execute_add_market_rule, execute_choose_market_rule, execute_modify_asset_rule,
    execute_set_as_collateral, AssetRules,
};

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;

mod reserve;
pub use reserve::Reserve;

mod solvency;
pub use solvency::AccountPosition;

mod submit;
pub use submit::execute_multi_op;

mod twur;
pub use twur::UtilizationRing;
