/// Fixed point scalar for coefficients, fees and utilization (6 decimals)
pub const SCALAR_6: i128 = 1_000_000;

/// Fixed point scalar for rates, indices and valuations (18 decimals)
pub const SCALAR_18: i128 = 1_000_000_000_000_000_000;

/// The number of seconds in a year
pub const SECONDS_PER_YEAR: i128 = 31_536_000;

/// One percent APR expressed with 18 decimals
pub const ONE_PERCENT_APR_E18: i128 = 10_000_000_000_000_000;

/// The default number of entries retained by a reserve's utilization ring
pub const DEFAULT_TW_CAPACITY: u32 = 60;

/// The maximum number of entries a reserve's utilization ring can retain
pub const MAX_TW_CAPACITY: u32 = 256;

/// The maximum number of reserves the pool can hold, bounded by the account bitsets
pub const MAX_RESERVES: u32 = 64;

/// The number of seconds of full utilization error required to move the rate at target
/// across its entire band
pub const RATE_ADJUSTMENT_PERIOD: i128 = 1800;

/// The maximum age of an oracle price, in seconds
pub const MAX_PRICE_AGE: u64 = 24 * 60 * 60;

/// The maximum liquidation penalty of a single asset (6 decimals)
pub const MAX_PENALTY_E6: u32 = 500_000;

/// The divisor applied to the flash loan fee for holders of the flash borrower role
pub const FLASH_BORROWER_FEE_DIVISOR: i128 = 10;

/********** Roles **********/

/// Can register new assets to the pool
pub const ROLE_ASSET_LISTING_ADMIN: u32 = 1;

/// Can modify reserve parameters, market rules and pool level configuration
pub const ROLE_PARAMETERS_ADMIN: u32 = 2;

/// Can set the debt rate of stablecoin reserves
pub const ROLE_STABLECOIN_RATE_ADMIN: u32 = 3;

/// Can activate, deactivate, freeze and unfreeze reserves
pub const ROLE_EMERGENCY_ADMIN: u32 = 4;

/// Can withdraw the protocol income
pub const ROLE_TREASURY: u32 = 5;

/// Receives a reduced flash loan fee
pub const ROLE_FLASH_BORROWER: u32 = 6;
