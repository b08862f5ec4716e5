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

//! Staged store writes.
//!
//! Operations read through a [`ChangeSet`] and stage every write in it.
//! Nothing reaches the store until the staged [`Writes`] are applied, which
//! only happens once the operation can no longer fail.

use crate::base::Amount;
use crate::error::LedgerError;
use crate::services::Store;

pub(crate) struct ChangeSet<'s> {
    store: &'s dyn Store,
    /// Staged values in first-write order. Zero means delete.
    staged: Vec<(Vec<u8>, Amount)>,
}

impl<'s> ChangeSet<'s> {
    pub(crate) fn new(store: &'s dyn Store) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    /// Current value of `key`, staged writes included. Absent reads as zero.
    pub(crate) fn read(&self, key: &[u8]) -> Amount {
        self.staged
            .iter()
            .find(|(staged, _)| staged == key)
            .map(|(_, value)| *value)
            .unwrap_or_else(|| self.store.get(key).unwrap_or(0))
    }

    fn stage(&mut self, key: &[u8], value: Amount) {
        debug_assert!(value >= 0, "Invariant violated: staged negative value: {value}");
        match self.staged.iter_mut().find(|(staged, _)| staged == key) {
            Some((_, slot)) => *slot = value,
            None => self.staged.push((key.to_vec(), value)),
        }
    }

    /// Adds `amount` to the entry at `key`.
    pub(crate) fn credit(&mut self, key: &[u8], amount: Amount) -> Result<(), LedgerError> {
        let value = self
            .read(key)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.stage(key, value);
        Ok(())
    }

    /// Subtracts `amount` from the entry at `key`, failing with `short` when
    /// the entry holds less.
    pub(crate) fn debit(
        &mut self,
        key: &[u8],
        amount: Amount,
        short: LedgerError,
    ) -> Result<(), LedgerError> {
        let current = self.read(key);
        if current < amount {
            return Err(short);
        }
        self.stage(key, current - amount);
        Ok(())
    }

    /// Overwrites the entry at `key`.
    pub(crate) fn set(&mut self, key: &[u8], value: Amount) {
        self.stage(key, value);
    }

    /// Releases the store borrow, keeping only the staged values.
    pub(crate) fn into_writes(self) -> Writes {
        Writes(self.staged)
    }
}

/// Values staged by a finished [`ChangeSet`].
#[derive(Debug)]
pub(crate) struct Writes(Vec<(Vec<u8>, Amount)>);

impl Writes {
    /// Zero deletes the entry, anything else is put.
    pub(crate) fn apply(self, store: &mut dyn Store) {
        for (key, value) in self.0 {
            if value == 0 {
                store.delete(&key);
            } else {
                store.put(&key, value);
            }
        }
    }
}
