#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod constants;
mod contract;
mod dependencies;
mod errors;
mod math;
mod pool;
mod storage;
mod testutils;
mod validator;

pub use constants::*;
pub use contract::*;
pub use errors::PoolError;
pub use pool::{
    AccountPosition, Action, ActionType, AssetRules, InterestRateModel, InterestRateModelParams,
    RateModel,
};
pub use storage::{
    AccountConfig, AccountReserveData, AccountReserveKey, PoolConfig, PoolDataKey, ReserveConfig,
    ReserveData, ReserveFees, ReserveRestrictions, TwEntryKey, TwUrEntry,
};
