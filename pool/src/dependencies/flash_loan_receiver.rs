use soroban_sdk::{contractclient, Address, Bytes, Env, Vec};

/// A contract that receives flash loaned funds from the pool
#[contractclient(name = "FlashLoanReceiverClient")]
pub trait FlashLoanReceiver {
    /// Execute an operation with the loaned funds. The receiver must return each amount plus its
    /// fee to the pool before returning.
    ///
    /// ### Arguments
    /// * `caller` - The address that requested the flash loan
    /// * `assets` - The loaned assets
    /// * `amounts` - The loaned amount of each asset
    /// * `fees` - The fee owed for each asset
    /// * `data` - Arbitrary data forwarded from the caller
    fn exec_op(
        e: Env,
        caller: Address,
        assets: Vec<Address>,
        amounts: Vec<i128>,
        fees: Vec<i128>,
        data: Bytes,
    );
}
