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

//! # Token Ledger
//!
//! This library implements a fungible token ledger over an abstract
//! key-value store: owner-authorized transfers, delegated spending through
//! approve/allowance, and pooled recipients whose incoming transfers are
//! fanned out across a member list.
//!
//! ## Core Components
//!
//! - [`Engine`]: State transitions and queries, dispatched by operation name
//! - [`Context`]: The store, authorization oracle, pool directory and event
//!   sink the engine runs against
//! - [`Operation`]: Supported operations with their typed arguments
//! - [`LedgerError`] / [`ArgumentError`]: Rejected operations vs. malformed calls
//! - [`memory`]: In-memory implementations of the collaborators
//!
//! ## Example
//!
//! ```
//! use token_ledger::memory::{EventLog, MemoryStore, PoolRegistry, WitnessSet};
//! use token_ledger::{Address, Argument, Context, Engine, Value};
//!
//! let alice = Address::repeat(0xa1);
//! let bob = Address::repeat(0xb0);
//!
//! let mut store = MemoryStore::with_balances([(alice.clone(), 100)]);
//! let witness = WitnessSet::signed_by(alice.clone());
//! let pools = PoolRegistry::new();
//! let mut events = EventLog::new();
//! let mut cx = Context::new(&mut store, &witness, &pools, &mut events);
//!
//! let engine = Engine::default();
//! let args = vec![Argument::from(&alice), Argument::from(&bob), Argument::Integer(40)];
//! assert_eq!(engine.invoke(&mut cx, "transfer", args), Ok(Value::Done));
//!
//! let balance = engine.invoke(&mut cx, "balanceOf", vec![Argument::from(&bob)]);
//! assert_eq!(balance, Ok(Value::Amount(40)));
//! ```
//!
//! ## Execution Model
//!
//! The engine is synchronous and holds no ledger state. Each call runs to
//! completion against the context it is handed.

mod base;
mod changeset;
mod engine;
pub mod error;
pub mod keys;
pub mod memory;
mod operation;
mod services;

pub use base::{Address, Amount};
pub use engine::{Engine, TokenConfig};
pub use error::{ArgumentError, InvokeError, LedgerError, PoolError};
pub use operation::{Argument, Operation, Value};
pub use services::{Context, Event, EventSink, PoolDirectory, Store, Witness};
