use sep_41_token::TokenClient;
use soroban_sdk::{
    contract, contractimpl, unwrap::UnwrapOptimized, Address, Bytes, Env, Symbol, Vec,
};

const POOL_KEY: &str = "Pool";
const REPAY_KEY: &str = "Repay";
const CALLS_KEY: &str = "Calls";

#[contract]
pub struct MockFlashReceiver;

pub trait MockFlashReceiverTrait {
    /// Setup the receiver
    ///
    /// ### Arguments
    /// * `pool` - The pool the loaned funds are returned to
    fn initialize(e: Env, pool: Address);

    /// Return each loaned amount plus its fee to the pool, unless repayment is disabled
    fn exec_op(
        e: Env,
        caller: Address,
        assets: Vec<Address>,
        amounts: Vec<i128>,
        fees: Vec<i128>,
        data: Bytes,
    );

    /// Mock Only: Set whether `exec_op` returns the funds. Defaults to true.
    fn set_repay(e: Env, repay: bool);

    /// Mock Only: The number of times `exec_op` was called
    fn calls(e: Env) -> u32;
}

#[contractimpl]
impl MockFlashReceiverTrait for MockFlashReceiver {
    fn initialize(e: Env, pool: Address) {
        e.storage()
            .instance()
            .set::<Symbol, Address>(&Symbol::new(&e, POOL_KEY), &pool);
    }

    fn exec_op(
        e: Env,
        _caller: Address,
        assets: Vec<Address>,
        amounts: Vec<i128>,
        fees: Vec<i128>,
        _data: Bytes,
    ) {
        let calls = Self::calls(e.clone());
        e.storage()
            .instance()
            .set::<Symbol, u32>(&Symbol::new(&e, CALLS_KEY), &(calls + 1));

        let repay = e
            .storage()
            .instance()
            .get::<Symbol, bool>(&Symbol::new(&e, REPAY_KEY))
            .unwrap_or(true);
        if !repay {
            return;
        }

        let pool = e
            .storage()
            .instance()
            .get::<Symbol, Address>(&Symbol::new(&e, POOL_KEY))
            .unwrap_optimized();
        for (index, asset) in assets.iter().enumerate() {
            let index = index as u32;
            let amount = amounts.get_unchecked(index) + fees.get_unchecked(index);
            TokenClient::new(&e, &asset).transfer(&e.current_contract_address(), &pool, &amount);
        }
    }

    fn set_repay(e: Env, repay: bool) {
        e.storage()
            .instance()
            .set::<Symbol, bool>(&Symbol::new(&e, REPAY_KEY), &repay);
    }

    fn calls(e: Env) -> u32 {
        e.storage()
            .instance()
            .get::<Symbol, u32>(&Symbol::new(&e, CALLS_KEY))
            .unwrap_or(0)
    }
}
