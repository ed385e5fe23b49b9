use sep_41_token::TokenClient;
use soroban_sdk::{vec, Address, Env, Symbol, Vec};

use super::pool::Pool;

/// Fetch the protocol income earned by each asset, accrued to the current ledger timestamp
///
/// ### Panics
/// If any asset is not registered
pub fn execute_view_protocol_income(e: &Env, assets: &Vec<Address>) -> Vec<(Address, i128)> {
    let pool = Pool::load(e);
    let mut income = vec![e];
    for asset in assets.iter() {
        let reserve = pool.load_reserve(e, &asset);
        income.push_back((asset, reserve.data.earned_fee));
    }
    income
}

/// Transfer the protocol income earned by each asset to `to`. The amount taken is capped
/// at the pool's balance of the asset.
///
/// ### Arguments
/// * assets - The assets to take income from
/// * to - The address receiving the income
///
/// ### Returns
/// The amount taken for each asset
///
/// ### Panics
/// If any asset is not registered
pub fn execute_take_protocol_income(e: &Env, assets: &Vec<Address>, to: &Address) -> Vec<i128> {
    let mut pool = Pool::load(e);
    let pool_address = e.current_contract_address();
    let mut taken: Vec<i128> = vec![e];
    let mut transfers: Vec<(Address, i128)> = vec![e];
    for asset in assets.iter() {
        let mut reserve = pool.load_reserve(e, &asset);
        let balance = TokenClient::new(e, &asset).balance(&pool_address);
        let amount = reserve.data.earned_fee.min(balance).max(0);
        if amount > 0 {
            reserve.data.earned_fee -= amount;
            transfers.push_back((asset.clone(), amount));
        }
        pool.cache_reserve(reserve, true);
        taken.push_back(amount);
    }

    pool.store_cached_reserves(e);

    for (asset, amount) in transfers.iter() {
        TokenClient::new(e, &asset).transfer(&pool_address, to, &amount);
        e.events().publish(
            (Symbol::new(e, "income_taken"), asset.clone()),
            (to.clone(), amount),
        );
    }
    taken
}
