use soroban_sdk::{contract, contractimpl, contracttype, Address, Env};

#[derive(Clone)]
#[contracttype]
pub enum FeeReductionDataKey {
    Reductions(Address),
    FlashLoanReduction(Address),
}

#[contract]
pub struct MockFeeReduction;

pub trait MockFeeReductionTrait {
    /// Fetch the (deposit fee reduction, debt fee reduction) for an account, 6 decimals
    fn get_fee_reductions(e: Env, account: Address) -> (u32, u32);

    /// Fetch the flash loan fee reduction for an account, 6 decimals
    fn get_flash_loan_fee_reduction(e: Env, account: Address) -> u32;

    /// Mock Only: Set the deposit and debt fee reductions for an account
    fn set_fee_reductions(e: Env, account: Address, deposit_reduction: u32, debt_reduction: u32);

    /// Mock Only: Set the flash loan fee reduction for an account
    fn set_flash_loan_fee_reduction(e: Env, account: Address, reduction: u32);
}

#[contractimpl]
impl MockFeeReductionTrait for MockFeeReduction {
    fn get_fee_reductions(e: Env, account: Address) -> (u32, u32) {
        e.storage()
            .instance()
            .get::<FeeReductionDataKey, (u32, u32)>(&FeeReductionDataKey::Reductions(account))
            .unwrap_or((0, 0))
    }

    fn get_flash_loan_fee_reduction(e: Env, account: Address) -> u32 {
        e.storage()
            .instance()
            .get::<FeeReductionDataKey, u32>(&FeeReductionDataKey::FlashLoanReduction(account))
            .unwrap_or(0)
    }

    fn set_fee_reductions(e: Env, account: Address, deposit_reduction: u32, debt_reduction: u32) {
        e.storage().instance().set::<FeeReductionDataKey, (u32, u32)>(
            &FeeReductionDataKey::Reductions(account),
            &(deposit_reduction, debt_reduction),
        );
    }

    fn set_flash_loan_fee_reduction(e: Env, account: Address, reduction: u32) {
        e.storage().instance().set::<FeeReductionDataKey, u32>(
            &FeeReductionDataKey::FlashLoanReduction(account),
            &reduction,
        );
    }
}
