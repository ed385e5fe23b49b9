use soroban_sdk::{contracttype, unwrap::UnwrapOptimized, Address, Env, Symbol};

const ADMIN_KEY: &str = "Admin";

#[derive(Clone)]
#[contracttype]
pub struct RoleKey {
    pub role: u32,
    pub account: Address,
}

#[derive(Clone)]
#[contracttype]
pub enum AccessControlDataKey {
    Role(RoleKey),
}

pub fn has_admin(e: &Env) -> bool {
    e.storage().instance().has(&Symbol::new(e, ADMIN_KEY))
}

pub fn get_admin(e: &Env) -> Address {
    e.storage()
        .instance()
        .get::<Symbol, Address>(&Symbol::new(e, ADMIN_KEY))
        .unwrap_optimized()
}

pub fn set_admin(e: &Env, admin: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, ADMIN_KEY), admin);
}

pub fn has_role(e: &Env, role: u32, account: &Address) -> bool {
    let key = AccessControlDataKey::Role(RoleKey {
        role,
        account: account.clone(),
    });
    e.storage()
        .instance()
        .get::<AccessControlDataKey, bool>(&key)
        .unwrap_or(false)
}

pub fn set_role(e: &Env, role: u32, account: &Address, granted: bool) {
    let key = AccessControlDataKey::Role(RoleKey {
        role,
        account: account.clone(),
    });
    if granted {
        e.storage()
            .instance()
            .set::<AccessControlDataKey, bool>(&key, &true);
    } else {
        e.storage().instance().remove(&key);
    }
}
