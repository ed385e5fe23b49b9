use soroban_sdk::{contractclient, Address, Env};

/// Grants per-account reductions of the pool's fees. Reductions are expressed in 6 decimals,
/// where 1_000_000 waives the fee entirely.
#[contractclient(name = "FeeReductionProviderClient")]
pub trait FeeReductionProvider {
    /// Fetch the (deposit fee reduction, debt fee reduction) for an account
    ///
    /// ### Arguments
    /// * `account` - The account paying the fees
    fn get_fee_reductions(e: Env, account: Address) -> (u32, u32);

    /// Fetch the flash loan fee reduction for an account
    ///
    /// ### Arguments
    /// * `account` - The account initiating the flash loan
    fn get_flash_loan_fee_reduction(e: Env, account: Address) -> u32;
}
