use cast::i128;
use soroban_sdk::{map, Address, Env, Map};

use crate::{
    constants::SCALAR_6,
    math::{checked_add, checked_sub, mul_div_ceil, mul_div_floor},
    storage::{self, AccountConfig, AccountReserveData},
};

use super::{Pool, Reserve};

/// The balances of an account entry caught up to a reserve's indices
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatchUp {
    pub deposit: i128,     // the deposit after interest and the deposit fee
    pub debt: i128,        // the debt after interest and the debt fee
    pub deposit_fee: i128, // the protocol's share of the deposit interest
    pub debt_fee: i128,    // the protocol's charge on top of the debt interest
}

/// Calculate the balances of an account entry caught up to the reserve's current indices
///
/// ### Arguments
/// * `entry` - The account's balances in the reserve
/// * `reserve` - The reserve, accrued to the current ledger timestamp
/// * `fee_reductions` - The account's (deposit fee reduction, debt fee reduction)
pub fn calc_catch_up(
    e: &Env,
    entry: &AccountReserveData,
    reserve: &Reserve,
    fee_reductions: (u32, u32),
) -> CatchUp {
    let mut result = CatchUp {
        deposit: entry.deposit,
        debt: entry.debt,
        deposit_fee: 0,
        debt_fee: 0,
    };

    if entry.deposit > 0 && entry.applied_deposit_index < reserve.data.deposit_index {
        let accrued = mul_div_floor(
            e,
            entry.deposit,
            reserve.data.deposit_index,
            entry.applied_deposit_index,
        );
        let interest = accrued - entry.deposit;
        let fee_e6 = effective_fee(e, reserve.config.fees.deposit_fee_e6, fee_reductions.0);
        result.deposit_fee = mul_div_floor(e, interest, fee_e6, SCALAR_6);
        result.deposit = accrued - result.deposit_fee;
    }

    if entry.debt > 0 && entry.applied_debt_index < reserve.data.debt_index {
        let accrued = mul_div_floor(e, entry.debt, reserve.data.debt_index, entry.applied_debt_index);
        let interest = accrued - entry.debt;
        let fee_e6 = effective_fee(e, reserve.config.fees.debt_fee_e6, fee_reductions.1);
        result.debt_fee = mul_div_ceil(e, interest, fee_e6, SCALAR_6);
        result.debt = checked_add(e, accrued, result.debt_fee);
    }
    result
}

/// Apply a fee reduction to a fee, both expressed in 6 decimals
fn effective_fee(e: &Env, fee_e6: u32, reduction_e6: u32) -> i128 {
    let reduction = i128(reduction_e6).min(SCALAR_6);
    mul_div_floor(e, i128(fee_e6), SCALAR_6 - reduction, SCALAR_6)
}

/// An account's state in the pool
pub struct Account {
    pub address: Address,
    pub config: AccountConfig,
    entries: Map<u32, AccountReserveData>, // the touched entries, keyed by reserve index
}

impl Account {
    /// Load an account from the ledger
    pub fn load(e: &Env, address: &Address) -> Self {
        Account {
            address: address.clone(),
            config: storage::get_account_config(e, address),
            entries: map![e],
        }
    }

    /// Store the account's config and every touched entry to the ledger. Empty entries
    /// are removed.
    pub fn store(&self, e: &Env) {
        storage::set_account_config(e, &self.address, &self.config);
        for (reserve_id, entry) in self.entries.iter() {
            if entry.deposit == 0 && entry.debt == 0 {
                storage::del_account_reserve(e, &self.address, reserve_id);
            } else {
                storage::set_account_reserve(e, &self.address, reserve_id, &entry);
            }
        }
    }

    /// Fetch the account's entry for a reserve as last written, without catching it up. Missing
    /// entries are empty at the reserve's current indices.
    pub fn get_entry(&self, e: &Env, reserve: &Reserve) -> AccountReserveData {
        if let Some(entry) = self.entries.get(reserve.config.index) {
            return entry;
        }
        match storage::get_account_reserve(e, &self.address, reserve.config.index) {
            Some(entry) => entry,
            None => AccountReserveData {
                deposit: 0,
                debt: 0,
                applied_deposit_index: reserve.data.deposit_index,
                applied_debt_index: reserve.data.debt_index,
            },
        }
    }

    /// Catch the account's entry for a reserve up to the reserve's indices. Protocol fees are
    /// moved from the reserve totals into the reserve's earned fee.
    ///
    /// ### Returns
    /// The caught up entry
    pub fn accrue(&mut self, e: &Env, pool: &mut Pool, reserve: &mut Reserve) -> AccountReserveData {
        let entry = self.get_entry(e, reserve);
        let fee_reductions = if entry.deposit > 0 || entry.debt > 0 {
            pool.load_fee_reductions(e, &self.address)
        } else {
            (0, 0)
        };
        let caught_up = calc_catch_up(e, &entry, reserve, fee_reductions);

        if caught_up.deposit_fee > 0 {
            reserve.remove_deposit(e, caught_up.deposit_fee);
            reserve.add_earned_fee(e, caught_up.deposit_fee);
        }
        if caught_up.debt_fee > 0 {
            reserve.add_debt(e, caught_up.debt_fee);
            reserve.add_earned_fee(e, caught_up.debt_fee);
        }

        let new_entry = AccountReserveData {
            deposit: caught_up.deposit,
            debt: caught_up.debt,
            applied_deposit_index: reserve.data.deposit_index,
            applied_debt_index: reserve.data.debt_index,
        };
        self.entries.set(reserve.config.index, new_entry.clone());
        new_entry
    }

    /********** Balances **********/

    /// Add to the account's deposit. The entry must be caught up.
    pub fn add_deposit(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let mut entry = self.get_entry(e, reserve);
        entry.deposit = checked_add(e, entry.deposit, amount);
        reserve.add_deposit(e, amount);
        self.set_deposit_bit(reserve.config.index, true);
        self.entries.set(reserve.config.index, entry);
    }

    /// Remove from the account's deposit. The entry must be caught up. Emptied deposits are
    /// no longer used as collateral.
    ///
    /// ### Panics
    /// If the amount exceeds the deposit
    pub fn remove_deposit(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let mut entry = self.get_entry(e, reserve);
        entry.deposit = checked_sub(e, entry.deposit, amount);
        reserve.remove_deposit(e, amount);
        if entry.deposit == 0 {
            self.set_deposit_bit(reserve.config.index, false);
            self.set_collateral(reserve.config.index, false);
        }
        self.entries.set(reserve.config.index, entry);
    }

    /// Move deposit from this account to another without changing the reserve total. Both
    /// entries must be caught up.
    ///
    /// ### Panics
    /// If the amount exceeds the deposit
    pub fn transfer_deposit(&mut self, e: &Env, to: &mut Account, reserve: &Reserve, amount: i128) {
        let mut entry = self.get_entry(e, reserve);
        entry.deposit = checked_sub(e, entry.deposit, amount);
        if entry.deposit == 0 {
            self.set_deposit_bit(reserve.config.index, false);
            self.set_collateral(reserve.config.index, false);
        }
        self.entries.set(reserve.config.index, entry);

        let mut to_entry = to.get_entry(e, reserve);
        to_entry.deposit = checked_add(e, to_entry.deposit, amount);
        to.set_deposit_bit(reserve.config.index, true);
        to.entries.set(reserve.config.index, to_entry);
    }

    /// Add to the account's debt. The entry must be caught up.
    pub fn add_debt(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let mut entry = self.get_entry(e, reserve);
        entry.debt = checked_add(e, entry.debt, amount);
        reserve.add_debt(e, amount);
        self.config.borrows |= 1 << reserve.config.index;
        self.entries.set(reserve.config.index, entry);
    }

    /// Remove from the account's debt. The entry must be caught up.
    ///
    /// ### Panics
    /// If the amount exceeds the debt
    pub fn remove_debt(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let mut entry = self.get_entry(e, reserve);
        entry.debt = checked_sub(e, entry.debt, amount);
        reserve.remove_debt(e, amount);
        if entry.debt == 0 {
            self.config.borrows &= !(1 << reserve.config.index);
        }
        self.entries.set(reserve.config.index, entry);
    }

    /********** Bitsets **********/

    pub fn has_deposit(&self, reserve_index: u32) -> bool {
        self.config.deposits & (1 << reserve_index) != 0
    }

    pub fn is_collateral(&self, reserve_index: u32) -> bool {
        self.config.collaterals & (1 << reserve_index) != 0
    }

    pub fn has_debt(&self, reserve_index: u32) -> bool {
        self.config.borrows & (1 << reserve_index) != 0
    }

    /// Set or clear the collateral flag of a reserve
    pub fn set_collateral(&mut self, reserve_index: u32, use_as_collateral: bool) {
        if use_as_collateral {
            self.config.collaterals |= 1 << reserve_index;
        } else {
            self.config.collaterals &= !(1 << reserve_index);
        }
    }

    fn set_deposit_bit(&mut self, reserve_index: u32, has_deposit: bool) {
        if has_deposit {
            self.config.deposits |= 1 << reserve_index;
        } else {
            self.config.deposits &= !(1 << reserve_index);
        }
    }
}
