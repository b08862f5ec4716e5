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

//! Store key layout.
//!
//! | Entry          | Key                               | Length |
//! |----------------|-----------------------------------|--------|
//! | Balance        | `address`                         | 20     |
//! | Allowance      | `owner ++ spender`                | 40     |
//! | Total supply   | `in_circulation`                  | 14     |
//! | Pool total     | `pool_total: ++ pool`             | 31     |
//!
//! Lengths differ per entry kind. The engine only derives keys from
//! addresses it has checked to be 20 bytes, which keeps the kinds apart.

use crate::base::Address;

/// Well-known key holding the circulating supply.
pub const TOTAL_SUPPLY_KEY: &[u8] = b"in_circulation";

/// Prefix of the running-total key of a pooled recipient.
pub const POOL_TOTAL_PREFIX: &[u8] = b"pool_total:";

/// Length of an allowance key built from two well-formed addresses.
pub const ALLOWANCE_KEY_LEN: usize = 2 * Address::LEN;

pub fn balance_key(address: &Address) -> Vec<u8> {
    address.as_bytes().to_vec()
}

/// Concatenation of owner and spender, in that order.
pub fn allowance_key(owner: &Address, spender: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.as_bytes().len() + spender.as_bytes().len());
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(spender.as_bytes());
    key
}

pub fn pool_total_key(pool: &Address) -> Vec<u8> {
    [POOL_TOTAL_PREFIX, pool.as_bytes()].concat()
}
