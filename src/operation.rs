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

//! Operation dispatch.
//!
//! Callers invoke the ledger by operation name with a positional argument
//! list. [`Operation::parse`] maps that onto a closed set of typed variants,
//! checking arity and argument kinds before any ledger logic runs.

use crate::base::{Address, Amount};
use crate::error::ArgumentError;
use serde::Serialize;

/// Positional argument of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Bytes(Vec<u8>),
    Integer(Amount),
}

impl From<&Address> for Argument {
    fn from(address: &Address) -> Self {
        Self::Bytes(address.as_bytes().to_vec())
    }
}

impl From<Address> for Argument {
    fn from(address: Address) -> Self {
        Self::Bytes(address.as_bytes().to_vec())
    }
}

impl From<Amount> for Argument {
    fn from(amount: Amount) -> Self {
        Self::Integer(amount)
    }
}

/// The supported operations with their typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf {
        address: Address,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approve {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    Allowance {
        owner: Address,
        spender: Address,
    },
}

impl Operation {
    /// Operation names, in the order they are advertised.
    pub const NAMES: [&'static str; 9] = [
        "name",
        "symbol",
        "decimals",
        "totalSupply",
        "balanceOf",
        "transfer",
        "transferFrom",
        "approve",
        "allowance",
    ];

    /// Builds an operation from its name and positional arguments.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::UnknownOperation`] - `name` is not supported.
    /// - [`ArgumentError::Arity`] - wrong number of arguments.
    /// - [`ArgumentError::ExpectedBytes`] / [`ArgumentError::ExpectedInteger`] -
    ///   an argument has the wrong kind.
    pub fn parse(name: &str, args: Vec<Argument>) -> Result<Self, ArgumentError> {
        let operation = match name {
            "name" => {
                arity::<0>("name", args)?;
                Self::Name
            }
            "symbol" => {
                arity::<0>("symbol", args)?;
                Self::Symbol
            }
            "decimals" => {
                arity::<0>("decimals", args)?;
                Self::Decimals
            }
            "totalSupply" => {
                arity::<0>("totalSupply", args)?;
                Self::TotalSupply
            }
            "balanceOf" => {
                let [address] = arity::<1>("balanceOf", args)?;
                Self::BalanceOf {
                    address: bytes("balanceOf", 0, address)?,
                }
            }
            "transfer" => {
                let [from, to, amount] = arity::<3>("transfer", args)?;
                Self::Transfer {
                    from: bytes("transfer", 0, from)?,
                    to: bytes("transfer", 1, to)?,
                    amount: integer("transfer", 2, amount)?,
                }
            }
            "transferFrom" => {
                let [from, to, amount] = arity::<3>("transferFrom", args)?;
                Self::TransferFrom {
                    from: bytes("transferFrom", 0, from)?,
                    to: bytes("transferFrom", 1, to)?,
                    amount: integer("transferFrom", 2, amount)?,
                }
            }
            "approve" => {
                let [owner, spender, amount] = arity::<3>("approve", args)?;
                Self::Approve {
                    owner: bytes("approve", 0, owner)?,
                    spender: bytes("approve", 1, spender)?,
                    amount: integer("approve", 2, amount)?,
                }
            }
            "allowance" => {
                let [owner, spender] = arity::<2>("allowance", args)?;
                Self::Allowance {
                    owner: bytes("allowance", 0, owner)?,
                    spender: bytes("allowance", 1, spender)?,
                }
            }
            other => return Err(ArgumentError::UnknownOperation(other.to_string())),
        };

        Ok(operation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Decimals => "decimals",
            Self::TotalSupply => "totalSupply",
            Self::BalanceOf { .. } => "balanceOf",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transferFrom",
            Self::Approve { .. } => "approve",
            Self::Allowance { .. } => "allowance",
        }
    }
}

fn arity<const N: usize>(
    operation: &'static str,
    args: Vec<Argument>,
) -> Result<[Argument; N], ArgumentError> {
    let got = args.len();
    args.try_into().map_err(|_| ArgumentError::Arity {
        operation,
        expected: N,
        got,
    })
}

fn bytes(
    operation: &'static str,
    position: usize,
    argument: Argument,
) -> Result<Address, ArgumentError> {
    match argument {
        Argument::Bytes(bytes) => Ok(Address::new(bytes)),
        Argument::Integer(_) => Err(ArgumentError::ExpectedBytes {
            operation,
            position,
        }),
    }
}

fn integer(
    operation: &'static str,
    position: usize,
    argument: Argument,
) -> Result<Amount, ArgumentError> {
    match argument {
        Argument::Integer(value) => Ok(value),
        Argument::Bytes(_) => Err(ArgumentError::ExpectedInteger {
            operation,
            position,
        }),
    }
}

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Decimals(u8),
    Amount(Amount),
    /// A state-changing operation succeeded.
    Done,
}
