//! Role storage shared by the farm and the rewarder.
//!
//! Each contract keeps its own copy of these keys in its own storage; the
//! helpers only fix the layout. Callers authenticate the actor first and
//! map a missing role to their own error type.

use soroban_sdk::{contracttype, Address, Env};

use crate::Role;

#[contracttype]
#[derive(Clone)]
pub enum AccessKey {
    Admin,
    Role(Role, Address),
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&AccessKey::Admin, admin);
}

pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&AccessKey::Admin)
}

pub fn is_admin(env: &Env, account: &Address) -> bool {
    get_admin(env).map_or(false, |admin| admin == *account)
}

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&AccessKey::Role(role, account.clone()))
        .unwrap_or(false)
}

pub fn grant_role(env: &Env, role: Role, account: &Address) {
    env.storage()
        .persistent()
        .set(&AccessKey::Role(role, account.clone()), &true);
}

pub fn revoke_role(env: &Env, role: Role, account: &Address) {
    env.storage()
        .persistent()
        .remove(&AccessKey::Role(role, account.clone()));
}
