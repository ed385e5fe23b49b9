use soroban_sdk::{contracttype, panic_with_error, vec, Address, Env, Map, Symbol, Vec};

use crate::{errors::PoolError, math::checked_add, validator::require_positive};

use super::{
    market_rules::{get_asset_rules, load_market_rule},
    pool::Pool,
    Account,
};

/// An action an account makes against the pool
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Action {
    pub action_type: u32,
    pub asset: Address,
    pub amount: i128,
}

/// The type of an action
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ActionType {
    Deposit = 0,
    Withdraw = 1,
    Borrow = 2,
    Repay = 3,
}

impl ActionType {
    /// Convert a u32 to an ActionType
    ///
    /// ### Panics
    /// If the value is not a valid ActionType
    pub fn from_u32(e: &Env, value: u32) -> Self {
        match value {
            0 => ActionType::Deposit,
            1 => ActionType::Withdraw,
            2 => ActionType::Borrow,
            3 => ActionType::Repay,
            _ => panic_with_error!(e, PoolError::BadRequest),
        }
    }

    /// Check if the action can reduce the solvency of an account
    pub fn reduces_solvency(&self) -> bool {
        matches!(self, ActionType::Withdraw | ActionType::Borrow)
    }

    fn event_name(&self) -> &'static str {
        match self {
            ActionType::Deposit => "deposit",
            ActionType::Withdraw => "withdraw",
            ActionType::Borrow => "borrow",
            ActionType::Repay => "repay",
        }
    }
}

/// The net token transfers between the caller and the pool, per asset. Positive amounts
/// are sent from the caller to the pool and negative amounts from the pool to the caller.
pub struct Transfers {
    pub net: Map<Address, i128>,
}

impl Transfers {
    /// Create an empty set of transfers
    pub fn new(e: &Env) -> Self {
        Transfers { net: Map::new(e) }
    }

    /// Add tokens the caller needs to transfer to the pool
    pub fn add_inflow(&mut self, e: &Env, asset: &Address, amount: i128) {
        let current = self.net.get(asset.clone()).unwrap_or(0);
        self.net.set(asset.clone(), checked_add(e, current, amount));
    }

    /// Add tokens the pool needs to transfer to the caller
    pub fn add_outflow(&mut self, e: &Env, asset: &Address, amount: i128) {
        let current = self.net.get(asset.clone()).unwrap_or(0);
        self.net.set(asset.clone(), checked_add(e, current, -amount));
    }
}

/// Apply a set of actions to an account's positions and the pool's reserves. Validates each
/// action against the reserve state, the account's market rule and the reserve restrictions.
///
/// ### Arguments
/// * pool - The pool
/// * caller - The address sending and receiving the tokens
/// * on_behalf_of - The address of the account whose positions are modified
/// * actions - The actions to apply, in order
///
/// ### Returns
/// A tuple of (transfers, account, check_solvency, amounts) where:
/// * transfers - The net token transfers between the caller and the pool
/// * account - The state of the account after the actions have been applied
/// * check_solvency - If a solvency check needs to be performed
/// * amounts - The amount actually moved by each action
///
/// ### Panics
/// If any action is invalid
pub fn build_actions(
    e: &Env,
    pool: &mut Pool,
    caller: &Address,
    on_behalf_of: &Address,
    actions: &Vec<Action>,
) -> (Transfers, Account, bool, Vec<i128>) {
    let mut transfers = Transfers::new(e);
    let mut account = Account::load(e, on_behalf_of);
    let rule = load_market_rule(e, account.config.market_rule_id);
    let mut check_solvency = false;
    let mut amounts: Vec<i128> = vec![e];

    for action in actions.iter() {
        let action_type = ActionType::from_u32(e, action.action_type);
        require_positive(e, action.amount);
        let mut reserve = pool.load_reserve(e, &action.asset);
        reserve.require_active(e);
        let reserve_index = reserve.config.index;
        let entry = account.accrue(e, pool, &mut reserve);

        let amount = match action_type {
            ActionType::Deposit => {
                reserve.require_not_frozen(e);
                let had_deposit = entry.deposit > 0;
                account.add_deposit(e, &mut reserve, action.amount);
                reserve.require_deposit_cap(e);

                // a first deposit is used as collateral when the account's rule allows it
                let new_deposit = entry.deposit + action.amount;
                if !had_deposit
                    && !account.is_collateral(reserve_index)
                    && get_asset_rules(&rule, &action.asset)
                        .collateral_coefficient_e6
                        .is_some()
                    && new_deposit >= reserve.config.restrictions.minimal_collateral
                {
                    account.set_collateral(reserve_index, true);
                }
                transfers.add_inflow(e, &action.asset, action.amount);
                action.amount
            }
            ActionType::Withdraw => {
                let to_withdraw = action.amount.min(entry.deposit);
                require_positive(e, to_withdraw);
                account.remove_deposit(e, &mut reserve, to_withdraw);
                if account.is_collateral(reserve_index) {
                    reserve.require_minimal_collateral(e, entry.deposit - to_withdraw);
                }
                reserve.require_utilization_valid(e);
                transfers.add_outflow(e, &action.asset, to_withdraw);
                to_withdraw
            }
            ActionType::Borrow => {
                reserve.require_not_frozen(e);
                if get_asset_rules(&rule, &action.asset)
                    .borrow_coefficient_e6
                    .is_none()
                {
                    panic_with_error!(e, PoolError::RuleBorrowDisable);
                }
                account.add_debt(e, &mut reserve, action.amount);
                reserve.require_minimal_debt(e, entry.debt + action.amount);
                reserve.require_debt_cap(e);
                reserve.require_utilization_valid(e);
                transfers.add_outflow(e, &action.asset, action.amount);
                action.amount
            }
            ActionType::Repay => {
                let to_repay = action.amount.min(entry.debt);
                require_positive(e, to_repay);
                account.remove_debt(e, &mut reserve, to_repay);
                reserve.require_minimal_debt(e, entry.debt - to_repay);
                transfers.add_inflow(e, &action.asset, to_repay);
                to_repay
            }
        };
        check_solvency = check_solvency || action_type.reduces_solvency();

        pool.cache_reserve(reserve, true);
        amounts.push_back(amount);
        e.events().publish(
            (
                Symbol::new(e, action_type.event_name()),
                action.asset.clone(),
                on_behalf_of.clone(),
            ),
            (caller.clone(), amount),
        );
    }

    (transfers, account, check_solvency, amounts)
}
