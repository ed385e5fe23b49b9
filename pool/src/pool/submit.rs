use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env, Vec};

use super::{
    actions::{build_actions, Action, ActionType},
    pool::Pool,
    AccountPosition,
};

/// Execute a batch of actions for an account against the pool.
///
/// ### Arguments
/// * caller - The address sending tokens to and receiving tokens from the pool
/// * on_behalf_of - The address of the account whose positions are being modified
/// * actions - A vec of actions to be processed, in order
///
/// ### Returns
/// The amount moved by each action
///
/// ### Panics
/// If the batch is unable to be fully executed
pub fn execute_multi_op(
    e: &Env,
    caller: &Address,
    on_behalf_of: &Address,
    actions: &Vec<Action>,
) -> Vec<i128> {
    if caller != on_behalf_of
        && actions
            .iter()
            .any(|action| ActionType::from_u32(e, action.action_type).reduces_solvency())
    {
        on_behalf_of.require_auth();
    }

    let mut pool = Pool::load(e);
    let (transfers, mut account, check_solvency, amounts) =
        build_actions(e, &mut pool, caller, on_behalf_of, actions);

    if check_solvency {
        // panics if the account cannot cover its weighted debt
        AccountPosition::calculate(e, &mut pool, &mut account).require_solvent(e);
    }

    // transfer tokens from caller to pool
    for (asset, amount) in transfers.net.iter() {
        if amount > 0 {
            TokenClient::new(e, &asset).transfer(caller, &e.current_contract_address(), &amount);
        }
    }

    // store updated info to ledger
    pool.store_cached_reserves(e);
    account.store(e);

    // transfer tokens from pool to caller
    for (asset, amount) in transfers.net.iter() {
        if amount < 0 {
            TokenClient::new(e, &asset).transfer(&e.current_contract_address(), caller, &-amount);
        }
    }

    amounts
}
