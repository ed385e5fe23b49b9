use crate::storage;
use soroban_sdk::{contract, contracterror, contractimpl, panic_with_error, Address, Env, Symbol};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AccessControlError {
    AlreadyInitialized = 3,
    MissingRole = 100,
    InvalidCaller = 101,
    RoleRedundant = 102,
}

/// The role that can grant and revoke every other role
pub const ROLE_ADMIN: u32 = 0;

#[contract]
pub struct MockAccessControl;

pub trait MockAccessControlTrait {
    /// Setup the access control contract. The admin holds `ROLE_ADMIN`.
    ///
    /// ### Arguments
    /// * `admin` - The address allowed to grant and revoke roles
    fn initialize(e: Env, admin: Address);

    /// Check if an account holds a role
    fn has_role(e: Env, role: u32, account: Address) -> bool;

    /// (Admin only) Grant a role to an account
    ///
    /// ### Panics
    /// If the caller is not the admin or the account already holds the role
    fn grant_role(e: Env, caller: Address, role: u32, account: Address);

    /// (Admin only) Revoke a role from an account
    ///
    /// ### Panics
    /// If the caller is not the admin, the account does not hold the role or the admin
    /// attempts to revoke its own admin role
    fn revoke_role(e: Env, caller: Address, role: u32, account: Address);
}

#[contractimpl]
impl MockAccessControlTrait for MockAccessControl {
    fn initialize(e: Env, admin: Address) {
        if storage::has_admin(&e) {
            panic_with_error!(&e, AccessControlError::AlreadyInitialized);
        }
        storage::set_admin(&e, &admin);
        storage::set_role(&e, ROLE_ADMIN, &admin, true);
    }

    fn has_role(e: Env, role: u32, account: Address) -> bool {
        storage::has_role(&e, role, &account)
    }

    fn grant_role(e: Env, caller: Address, role: u32, account: Address) {
        caller.require_auth();
        if !storage::has_role(&e, ROLE_ADMIN, &caller) {
            panic_with_error!(&e, AccessControlError::MissingRole);
        }
        if storage::has_role(&e, role, &account) {
            panic_with_error!(&e, AccessControlError::RoleRedundant);
        }
        storage::set_role(&e, role, &account, true);

        e.events()
            .publish((Symbol::new(&e, "grant_role"), caller), (role, account));
    }

    fn revoke_role(e: Env, caller: Address, role: u32, account: Address) {
        caller.require_auth();
        if !storage::has_role(&e, ROLE_ADMIN, &caller) {
            panic_with_error!(&e, AccessControlError::MissingRole);
        }
        if role == ROLE_ADMIN && account == storage::get_admin(&e) {
            panic_with_error!(&e, AccessControlError::InvalidCaller);
        }
        if !storage::has_role(&e, role, &account) {
            panic_with_error!(&e, AccessControlError::RoleRedundant);
        }
        storage::set_role(&e, role, &account, false);

        e.events()
            .publish((Symbol::new(&e, "revoke_role"), caller), (role, account));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_grant_and_revoke() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let address = e.register_contract(None, MockAccessControl {});
        let client = MockAccessControlClient::new(&e, &address);
        client.initialize(&bombadil);

        assert!(client.has_role(&ROLE_ADMIN, &bombadil));
        assert!(!client.has_role(&2, &samwise));

        client.grant_role(&bombadil, &2, &samwise);
        assert!(client.has_role(&2, &samwise));

        client.revoke_role(&bombadil, &2, &samwise);
        assert!(!client.has_role(&2, &samwise));
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #100)")]
    fn test_grant_not_admin() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let address = e.register_contract(None, MockAccessControl {});
        let client = MockAccessControlClient::new(&e, &address);
        client.initialize(&bombadil);

        client.grant_role(&samwise, &2, &samwise);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #102)")]
    fn test_grant_redundant() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let address = e.register_contract(None, MockAccessControl {});
        let client = MockAccessControlClient::new(&e, &address);
        client.initialize(&bombadil);

        client.grant_role(&bombadil, &2, &samwise);
        client.grant_role(&bombadil, &2, &samwise);
    }
}
