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

//! Error types for ledger operations.
//!
//! Two outcomes are kept apart: [`ArgumentError`] means the call itself was
//! malformed and no logic ran, [`LedgerError`] means the operation ran and
//! was rejected. Neither mutates the store.

use thiserror::Error;

/// Logical failures of a well-formed operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Transfer amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Approval amount is negative
    #[error("negative amount")]
    NegativeAmount,

    /// Address is not exactly 20 bytes long
    #[error("malformed address")]
    MalformedAddress,

    /// Call is not authorized by the required address
    #[error("caller is not authorized by the sending address")]
    Unauthorized,

    /// Sender balance is below the transfer amount
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Allowance is below the requested amount
    #[error("insufficient funds approved")]
    InsufficientAllowance,

    /// Owner balance is below the delegated transfer amount
    #[error("insufficient tokens in from balance")]
    InsufficientBalance,

    /// Owner tries to approve more than they currently hold
    #[error("approval exceeds owner balance")]
    ApprovalExceedsBalance,

    /// Pooled recipient has no members to distribute to
    #[error("pool has no members")]
    EmptyPool,

    /// A credit would overflow the amount type
    #[error("amount overflow")]
    Overflow,
}

/// Malformed invocations, detected before any logic runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("incorrect arg length for `{operation}`: expected {expected}, got {got}")]
    Arity {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("argument {position} of `{operation}` must be an integer")]
    ExpectedInteger {
        operation: &'static str,
        position: usize,
    },

    #[error("argument {position} of `{operation}` must be a byte string")]
    ExpectedBytes {
        operation: &'static str,
        position: usize,
    },
}

/// Outcome of a failed invocation by name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Rejected(#[from] LedgerError),
}

/// Pool registration errors of the in-memory directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool must have at least one member")]
    NoMembers,

    #[error("pool cannot be its own member")]
    SelfMembership,

    #[error("unknown pool")]
    UnknownPool,
}
