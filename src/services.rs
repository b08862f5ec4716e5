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

//! Collaborators the engine runs against.
//!
//! The engine owns no state of its own. Every operation receives a
//! [`Context`] bundling the key-value store, the authorization oracle, the
//! pool directory and the event sink supplied by the host for the current
//! invocation.

use crate::base::{Address, Amount};
use serde::Serialize;

/// Key-value store of amounts.
///
/// Absent keys read as zero for every consumer in this crate. The engine
/// never writes a zero value: it deletes the entry instead.
pub trait Store {
    fn get(&self, key: &[u8]) -> Option<Amount>;
    fn put(&mut self, key: &[u8], value: Amount);
    fn delete(&mut self, key: &[u8]);
}

/// Authorization oracle for the current invocation.
pub trait Witness {
    /// Whether the caller identity of this invocation includes `address`.
    fn is_authorized_by(&self, address: &Address) -> bool;
}

/// Membership directory of pooled recipients.
pub trait PoolDirectory {
    fn is_pool(&self, address: &Address) -> bool;

    /// Members in a stable order. Empty for unknown addresses.
    fn members(&self, pool: &Address) -> Vec<Address>;

    /// Store key of the pool's running total.
    fn total_key(&self, pool: &Address) -> Vec<u8>;
}

/// Notification emitted by a successful state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Approve {
        owner: Address,
        spender: Address,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
}

/// Append-only sink; emission is fire-and-forget.
pub trait EventSink {
    fn emit(&mut self, event: Event);

    fn emit_transfer(&mut self, from: Address, to: Address, amount: Amount) {
        self.emit(Event::Transfer { from, to, amount });
    }

    fn emit_approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.emit(Event::Approve {
            owner,
            spender,
            amount,
        });
    }
}

/// Services handed to the engine for a single invocation.
pub struct Context<'a> {
    pub store: &'a mut dyn Store,
    pub witness: &'a dyn Witness,
    pub pools: &'a dyn PoolDirectory,
    pub events: &'a mut dyn EventSink,
}

impl<'a> Context<'a> {
    pub fn new(
        store: &'a mut dyn Store,
        witness: &'a dyn Witness,
        pools: &'a dyn PoolDirectory,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            store,
            witness,
            pools,
            events,
        }
    }
}

// JSON numbers lose precision past 2^53, so amounts go out as strings.
mod amount_str {
    use crate::base::Amount;
    use serde::Serializer;

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }
}
