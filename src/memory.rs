// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! In-memory implementations of the engine's collaborators.
//!
//! Used by the replay binary, the tests and the benchmarks. Hosts with a
//! persistent store implement the traits in [`crate::services`] instead.

use crate::base::{Address, Amount};
use crate::error::PoolError;
use crate::keys;
use crate::services::{Event, EventSink, PoolDirectory, Store, Witness};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Ordered key-value store.
///
/// Zero is never held: putting zero removes the entry, matching the
/// delete-on-exhaustion rule the engine follows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<Vec<u8>, Amount>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits genesis balances and records their sum as the circulating
    /// supply. Minting is outside the engine, so hosts seed state here.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (Address, Amount)>,
    {
        let mut store = Self::new();
        let mut supply: Amount = 0;
        for (address, amount) in balances {
            let key = keys::balance_key(&address);
            let current = store.get(&key).unwrap_or(0);
            store.put(&key, current.saturating_add(amount));
            supply = supply.saturating_add(amount);
        }
        store.put(keys::TOTAL_SUPPLY_KEY, supply);
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], Amount)> {
        self.entries.iter().map(|(key, value)| (key.as_slice(), *value))
    }

    /// Balance entries, i.e. those keyed by a well-formed address.
    pub fn balances(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.iter()
            .filter(|(key, _)| key.len() == Address::LEN)
            .map(|(key, value)| (Address::new(key), value))
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Amount> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: &[u8], value: Amount) {
        debug_assert!(value >= 0, "Invariant violated: negative store value: {value}");
        if value == 0 {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_vec(), value);
        }
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }
}

/// Addresses the current invocation is authorized by.
#[derive(Debug, Clone, Default)]
pub struct WitnessSet {
    signers: BTreeSet<Address>,
}

impl WitnessSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle that denies every address.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn signed_by(address: Address) -> Self {
        let mut witness = Self::new();
        witness.insert(address);
        witness
    }

    pub fn insert(&mut self, address: Address) {
        self.signers.insert(address);
    }
}

impl Witness for WitnessSet {
    fn is_authorized_by(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }
}

/// Pooled recipients and their ordered member lists.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: HashMap<Address, Vec<Address>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags `pool` as a pooled recipient with the given members.
    ///
    /// Duplicates are dropped, keeping the first occurrence. Registering an
    /// existing pool replaces its member list.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NoMembers`] - `members` is empty.
    /// - [`PoolError::SelfMembership`] - `pool` is listed as its own member.
    pub fn register<I>(&mut self, pool: Address, members: I) -> Result<(), PoolError>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut ordered = Vec::new();
        for member in members {
            if member == pool {
                return Err(PoolError::SelfMembership);
            }
            if !ordered.contains(&member) {
                ordered.push(member);
            }
        }
        if ordered.is_empty() {
            return Err(PoolError::NoMembers);
        }
        self.pools.insert(pool, ordered);
        Ok(())
    }

    /// Appends a member, flagging `pool` as a pooled recipient if needed.
    pub fn add_member(&mut self, pool: Address, member: Address) -> Result<(), PoolError> {
        if member == pool {
            return Err(PoolError::SelfMembership);
        }
        let members = self.pools.entry(pool).or_default();
        if !members.contains(&member) {
            members.push(member);
        }
        Ok(())
    }

    /// Removes a member. The pool stays flagged even once it has no members
    /// left; transfers to it then fail until members are added again.
    pub fn remove_member(&mut self, pool: &Address, member: &Address) -> Result<(), PoolError> {
        let members = self.pools.get_mut(pool).ok_or(PoolError::UnknownPool)?;
        members.retain(|m| m != member);
        Ok(())
    }
}

impl PoolDirectory for PoolRegistry {
    fn is_pool(&self, address: &Address) -> bool {
        self.pools.contains_key(address)
    }

    fn members(&self, pool: &Address) -> Vec<Address> {
        self.pools.get(pool).cloned().unwrap_or_default()
    }

    fn total_key(&self, pool: &Address) -> Vec<u8> {
        keys::pool_total_key(pool)
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and returns everything logged so far.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
