//! Owner and group name resolution for header `uname`/`gname` fields.
//!
//! Lookups are best effort: any failure yields `None` and the header field
//! is left blank.

use std::collections::HashMap;
use std::sync::Mutex;

pub trait OwnerLookup: Send + Sync {
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Never resolves anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOwners;

impl OwnerLookup for NoOwners {
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }
}

/// Resolves names through the system user and group databases, caching
/// every answer (including misses) per id.
#[derive(Debug, Default)]
pub struct SystemOwners {
    users: Mutex<HashMap<u32, Option<String>>>,
    groups: Mutex<HashMap<u32, Option<String>>>,
}

impl SystemOwners {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cached(
    cache: &Mutex<HashMap<u32, Option<String>>>,
    id: u32,
    resolve: impl FnOnce(u32) -> Option<String>,
) -> Option<String> {
    if let Ok(map) = cache.lock() {
        if let Some(hit) = map.get(&id) {
            return hit.clone();
        }
    }
    let name = resolve(id);
    if let Ok(mut map) = cache.lock() {
        map.insert(id, name.clone());
    }
    name
}

impl OwnerLookup for SystemOwners {
    fn user_name(&self, uid: u32) -> Option<String> {
        cached(&self.users, uid, lookup_user)
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        cached(&self.groups, gid, lookup_group)
    }
}

#[cfg(unix)]
fn lookup_user(uid: u32) -> Option<String> {
    use nix::unistd::{Uid, User};
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(user) => user.map(|u| u.name),
        Err(e) => {
            tracing::debug!(uid, error = %e, "user lookup failed");
            None
        }
    }
}

#[cfg(unix)]
fn lookup_group(gid: u32) -> Option<String> {
    use nix::unistd::{Gid, Group};
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(group) => group.map(|g| g.name),
        Err(e) => {
            tracing::debug!(gid, error = %e, "group lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn lookup_user(_uid: u32) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn lookup_group(_gid: u32) -> Option<String> {
    None
}
