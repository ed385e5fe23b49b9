use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the lending pool contract. Common errors are codes that match up with the
/// built-in contracts error reporting. Pool specific errors start at 1200.
pub enum PoolError {
    // Common Errors
    InternalError = 1,
    AlreadyInitializedError = 3,

    BalanceError = 10,
    OverflowError = 12,

    // Math Errors (start at 1200)
    UnderflowError = 1200,
    DivByZeroError = 1201,

    // Pool Request Errors
    BadRequest = 1202,
    AmountNotGreaterThanZero = 1203,
    AlreadyRegistered = 1204,
    AssetNotRegistered = 1205,
    InvalidPoolInitArgs = 1206,
    InvalidReserveMetadata = 1207,
    WrongIndex = 1208,

    // Access Errors
    MissingRole = 1210,
    InvalidCaller = 1211,

    // Reserve State Errors
    AlreadySet = 1220,
    Inactive = 1221,
    Frozen = 1222,
    InvalidUtilRate = 1223,

    // Market Rule Errors
    InvalidAssetRule = 1230,
    RuleBorrowDisable = 1231,
    RuleCollateralDisable = 1232,
    MarketRuleInvalidId = 1233,
    InsufficientCollateral = 1234,

    // Reserve Restriction Errors
    MaxDebtReached = 1240,
    MaxDepositReached = 1241,
    MinimalDebt = 1242,
    MinimalCollateral = 1243,

    // Oracle Errors
    NoSuchAsset = 1250,
    NoPriceFeed = 1251,
    StalePrice = 1252,

    // Liquidation Errors
    Collaterized = 1260,
    NothingToRepay = 1261,
    NothingToCompensateWith = 1262,
    TakingNotACollateral = 1263,
    MinimumRecieved = 1264,
}
