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

//! Benchmarks for the ledger engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Direct transfers
//! - Pooled fan-out with growing member counts
//! - Approve and delegated transfers
//! - Dispatch by operation name

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use token_ledger::memory::{EventLog, MemoryStore, PoolRegistry, WitnessSet};
use token_ledger::{Address, Amount, Argument, Context, Engine};

// =============================================================================
// Helper Functions
// =============================================================================

const SENDER: u8 = 0x01;
const POOL: u8 = 0xf0;

struct Host {
    store: MemoryStore,
    witness: WitnessSet,
    pools: PoolRegistry,
    events: EventLog,
}

impl Host {
    fn new(accounts: u8) -> Self {
        Self {
            store: MemoryStore::with_balances(
                (1..=accounts).map(|b| (Address::repeat(b), Amount::MAX / 1024)),
            ),
            witness: WitnessSet::signed_by(Address::repeat(SENDER)),
            pools: PoolRegistry::new(),
            events: EventLog::new(),
        }
    }

    fn cx(&mut self) -> Context<'_> {
        Context::new(&mut self.store, &self.witness, &self.pools, &mut self.events)
    }
}

// =============================================================================
// Transfer Benchmarks
// =============================================================================

fn bench_direct_transfer(c: &mut Criterion) {
    let engine = Engine::default();
    let from = Address::repeat(SENDER);
    let to = Address::repeat(0x02);

    c.bench_function("direct_transfer", |b| {
        let mut host = Host::new(2);
        b.iter(|| {
            engine
                .transfer(&mut host.cx(), &from, &to, black_box(1))
                .unwrap();
            host.events.drain();
        })
    });
}

fn bench_transfer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer_throughput");
    let engine = Engine::default();
    let from = Address::repeat(SENDER);

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut host = Host::new(100);
                for i in 0..count {
                    let to = Address::repeat((i % 99 + 2) as u8);
                    engine.transfer(&mut host.cx(), &from, &to, 1).unwrap();
                }
                black_box(&host.store);
            })
        });
    }
    group.finish();
}

fn bench_pooled_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("pooled_transfer");
    let engine = Engine::default();
    let from = Address::repeat(SENDER);
    let pool = Address::repeat(POOL);

    for members in [2u8, 16, 128].iter() {
        group.throughput(Throughput::Elements(u64::from(*members)));
        group.bench_with_input(BenchmarkId::from_parameter(members), members, |b, &members| {
            let mut host = Host::new(1);
            host.pools
                .register(pool.clone(), (2..members + 2).map(Address::repeat))
                .unwrap();
            b.iter(|| {
                engine
                    .transfer(&mut host.cx(), &from, &pool, black_box(1_000))
                    .unwrap();
                host.events.drain();
            })
        });
    }
    group.finish();
}

// =============================================================================
// Allowance Benchmarks
// =============================================================================

fn bench_approve_transfer_from(c: &mut Criterion) {
    let engine = Engine::default();
    let owner = Address::repeat(SENDER);
    let spender = Address::repeat(0x02);

    c.bench_function("approve_transfer_from", |b| {
        let mut host = Host::new(1);
        b.iter(|| {
            engine.approve(&mut host.cx(), &owner, &spender, 10).unwrap();
            engine
                .transfer_from(&mut host.cx(), &owner, &spender, black_box(10))
                .unwrap();
            host.events.drain();
        })
    });
}

fn bench_invoke_by_name(c: &mut Criterion) {
    let engine = Engine::default();
    let from = Address::repeat(SENDER);
    let to = Address::repeat(0x02);

    c.bench_function("invoke_transfer", |b| {
        let mut host = Host::new(2);
        b.iter(|| {
            let args = vec![Argument::from(&from), Argument::from(&to), Argument::Integer(1)];
            engine
                .invoke(&mut host.cx(), black_box("transfer"), args)
                .unwrap();
            host.events.drain();
        })
    });
}

criterion_group!(
    transfers,
    bench_direct_transfer,
    bench_transfer_throughput,
    bench_pooled_transfer,
);

criterion_group!(allowances, bench_approve_transfer_from, bench_invoke_by_name,);

criterion_main!(transfers, allowances);
