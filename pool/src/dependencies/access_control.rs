use soroban_sdk::{contractclient, Address, Env};

/// The role registry consulted before any permissioned pool operation
#[contractclient(name = "AccessControlClient")]
pub trait AccessControl {
    /// Check if an account holds a role
    ///
    /// ### Arguments
    /// * `role` - The id of the role
    /// * `account` - The account to check
    fn has_role(e: Env, role: u32, account: Address) -> bool;
}
