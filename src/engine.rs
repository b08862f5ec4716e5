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

//! Ledger engine.
//!
//! The [`Engine`] implements the token's state transitions over the
//! collaborators in a [`Context`]: direct transfers (including fan-out to
//! pooled recipients), delegated transfers against an allowance, approvals
//! and the read-only queries.
//!
//! # Atomicity
//!
//! Every check of an operation runs before anything is written. Writes are
//! staged in a change set and only reach the store once the operation can
//! no longer fail; events are emitted after that. A rejected operation
//! leaves the store untouched and emits nothing.

use crate::base::{Address, Amount};
use crate::changeset::ChangeSet;
use crate::error::{InvokeError, LedgerError};
use crate::keys;
use crate::operation::{Argument, Operation, Value};
use crate::services::{Context, Event, PoolDirectory, Store};
use tracing::{debug, trace};

/// Static token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    /// Number of decimal places a base unit is displayed with.
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Ledger Token".to_string(),
            symbol: "LGT".to_string(),
            decimals: 8,
        }
    }
}

/// Token ledger state machine.
///
/// Holds only static configuration; all ledger state lives in the store
/// passed with each call.
///
/// # Invariants
///
/// - Balances and allowances are never negative and never stored as zero.
/// - Successful transfers conserve the sum of all balances.
/// - A pooled recipient never holds a balance entry.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    token: TokenConfig,
}

impl Engine {
    pub fn new(token: TokenConfig) -> Self {
        Engine { token }
    }

    pub fn token(&self) -> &TokenConfig {
        &self.token
    }

    /// Invokes an operation by name with positional arguments.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Argument`] - unknown operation, wrong arity or
    ///   argument kind. No logic ran.
    /// - [`InvokeError::Rejected`] - the operation ran and was rejected.
    pub fn invoke(
        &self,
        cx: &mut Context<'_>,
        name: &str,
        args: Vec<Argument>,
    ) -> Result<Value, InvokeError> {
        let operation = Operation::parse(name, args)?;
        Ok(self.execute(cx, operation)?)
    }

    /// Runs a parsed operation.
    ///
    /// State-changing operations return [`Value::Done`] on success.
    pub fn execute(&self, cx: &mut Context<'_>, operation: Operation) -> Result<Value, LedgerError> {
        let value = match operation {
            Operation::Name => Value::Text(self.token.name.clone()),
            Operation::Symbol => Value::Text(self.token.symbol.clone()),
            Operation::Decimals => Value::Decimals(self.token.decimals),
            Operation::TotalSupply => Value::Amount(self.total_supply(&*cx.store)),
            Operation::BalanceOf { address } => Value::Amount(self.balance_of(&*cx.store, &address)),
            Operation::Transfer { from, to, amount } => {
                self.transfer(cx, &from, &to, amount)?;
                Value::Done
            }
            Operation::TransferFrom { from, to, amount } => {
                self.transfer_from(cx, &from, &to, amount)?;
                Value::Done
            }
            Operation::Approve {
                owner,
                spender,
                amount,
            } => {
                self.approve(cx, &owner, &spender, amount)?;
                Value::Done
            }
            Operation::Allowance { owner, spender } => {
                Value::Amount(self.allowance(&*cx.store, &owner, &spender))
            }
        };

        Ok(value)
    }

    pub fn total_supply(&self, store: &dyn Store) -> Amount {
        store.get(keys::TOTAL_SUPPLY_KEY).unwrap_or(0)
    }

    /// Balance of `address`; zero when it has no entry.
    pub fn balance_of(&self, store: &dyn Store, address: &Address) -> Amount {
        store.get(&keys::balance_key(address)).unwrap_or(0)
    }

    /// Amount `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, store: &dyn Store, owner: &Address, spender: &Address) -> Amount {
        store.get(&keys::allowance_key(owner, spender)).unwrap_or(0)
    }

    /// Moves `amount` from `from` to `to`, authorized by `from`.
    ///
    /// Transferring to oneself succeeds without touching the store or
    /// emitting an event. When `to` is a pooled recipient the amount is
    /// split across its members and added to the pool's running total.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `amount` is not positive.
    /// - [`LedgerError::MalformedAddress`] - `from`, `to` or a pool member is
    ///   not 20 bytes.
    /// - [`LedgerError::Unauthorized`] - the call is not authorized by `from`.
    /// - [`LedgerError::InsufficientFunds`] - `from` holds less than `amount`.
    /// - [`LedgerError::EmptyPool`] - `to` is a pool without members.
    /// - [`LedgerError::Overflow`] - a credit would overflow.
    pub fn transfer(
        &self,
        cx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if !from.is_well_formed() || !to.is_well_formed() {
            return Err(LedgerError::MalformedAddress);
        }
        if !cx.witness.is_authorized_by(from) {
            debug!(%from, "from address is not the tx sender");
            return Err(LedgerError::Unauthorized);
        }
        if from == to {
            debug!(%from, "transfer to self");
            return Ok(());
        }

        let mut changes = ChangeSet::new(&*cx.store);
        changes
            .debit(&keys::balance_key(from), amount, LedgerError::InsufficientFunds)
            .inspect_err(|_| debug!(%from, amount, "insufficient funds"))?;

        let mut events = Vec::new();
        if cx.pools.is_pool(to) {
            distribute(&mut changes, cx.pools, from, to, amount, &mut events)?;
        } else {
            changes.credit(&keys::balance_key(to), amount)?;
            events.push(Event::Transfer {
                from: from.clone(),
                to: to.clone(),
                amount,
            });
        }

        changes.into_writes().apply(cx.store);
        trace!(%from, %to, amount, "transfer applied");
        for event in events {
            cx.events.emit(event);
        }
        Ok(())
    }

    /// Moves `amount` from `from` to `to` against the allowance keyed by
    /// the `(from, to)` pair.
    ///
    /// The allowance is the authorization: the oracle is not consulted.
    /// Pooled recipients get no fan-out on this path and are credited
    /// directly.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `amount` is not positive.
    /// - [`LedgerError::MalformedAddress`] - either address is not 20 bytes.
    /// - [`LedgerError::InsufficientAllowance`] - allowance below `amount`.
    /// - [`LedgerError::InsufficientBalance`] - `from` holds less than `amount`.
    /// - [`LedgerError::Overflow`] - the credit would overflow.
    pub fn transfer_from(
        &self,
        cx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if !from.is_well_formed() || !to.is_well_formed() {
            return Err(LedgerError::MalformedAddress);
        }
        let allowance_key = keys::allowance_key(from, to);

        let mut changes = ChangeSet::new(&*cx.store);
        changes
            .debit(&allowance_key, amount, LedgerError::InsufficientAllowance)
            .inspect_err(|_| debug!(%from, %to, amount, "insufficient funds approved"))?;
        changes
            .debit(&keys::balance_key(from), amount, LedgerError::InsufficientBalance)
            .inspect_err(|_| debug!(%from, amount, "insufficient tokens in from balance"))?;
        changes.credit(&keys::balance_key(to), amount)?;

        changes.into_writes().apply(cx.store);
        trace!(%from, %to, amount, "delegated transfer applied");
        cx.events.emit_transfer(from.clone(), to.clone(), amount);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s balance to `amount`,
    /// replacing any previous value. Zero clears it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::MalformedAddress`] - either address is not 20 bytes.
    /// - [`LedgerError::Unauthorized`] - the call is not authorized by `owner`.
    /// - [`LedgerError::NegativeAmount`] - `amount` is negative.
    /// - [`LedgerError::ApprovalExceedsBalance`] - `owner` holds less than `amount`.
    pub fn approve(
        &self,
        cx: &mut Context<'_>,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if !owner.is_well_formed() || !spender.is_well_formed() {
            return Err(LedgerError::MalformedAddress);
        }
        if !cx.witness.is_authorized_by(owner) {
            debug!(%owner, "incorrect permission");
            return Err(LedgerError::Unauthorized);
        }
        if amount < 0 {
            debug!(%owner, amount, "negative amount");
            return Err(LedgerError::NegativeAmount);
        }
        if self.balance_of(&*cx.store, owner) < amount {
            debug!(%owner, amount, "approval exceeds balance");
            return Err(LedgerError::ApprovalExceedsBalance);
        }

        let mut changes = ChangeSet::new(&*cx.store);
        changes.set(&keys::allowance_key(owner, spender), amount);

        changes.into_writes().apply(cx.store);
        trace!(%owner, %spender, amount, "allowance set");
        cx.events.emit_approve(owner.clone(), spender.clone(), amount);
        Ok(())
    }
}

/// Stages the fan-out of `amount` across the members of `pool`.
///
/// Each member gets `amount / n`; the first member also gets the remainder
/// so the credits add up to `amount`. Members whose share is zero are
/// skipped. The pool's running total grows by the full `amount`. A member
/// that is not a well-formed address fails the whole transfer.
fn distribute(
    changes: &mut ChangeSet<'_>,
    pools: &dyn PoolDirectory,
    from: &Address,
    pool: &Address,
    amount: Amount,
    events: &mut Vec<Event>,
) -> Result<(), LedgerError> {
    let members = pools.members(pool);
    let count = Amount::try_from(members.len()).map_err(|_| LedgerError::Overflow)?;
    if count == 0 {
        debug!(%pool, "pool has no members");
        return Err(LedgerError::EmptyPool);
    }
    if let Some(member) = members.iter().find(|m| !m.is_well_formed()) {
        debug!(%pool, %member, "malformed pool member");
        return Err(LedgerError::MalformedAddress);
    }

    let share = amount / count;
    let remainder = amount % count;
    debug!(%pool, members = members.len(), share, remainder, "splitting amount across pool members");

    for (i, member) in members.into_iter().enumerate() {
        let credit = if i == 0 { share + remainder } else { share };
        if credit == 0 {
            continue;
        }
        changes.credit(&keys::balance_key(&member), credit)?;
        events.push(Event::Transfer {
            from: from.clone(),
            to: member,
            amount: credit,
        });
    }

    changes.credit(&pools.total_key(pool), amount)?;
    Ok(())
}
