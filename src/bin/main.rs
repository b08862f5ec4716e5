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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use token_ledger::memory::{EventLog, MemoryStore, PoolRegistry, WitnessSet};
use token_ledger::{Address, Amount, Argument, Context, Engine, TokenConfig};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Token Ledger - Replay token operations
///
/// Seeds an in-memory ledger from a genesis file, replays an operations CSV
/// against it and writes the resulting balances to stdout.
#[derive(Parser, Debug)]
#[command(name = "token-ledger")]
#[command(about = "Replays token ledger operations from a CSV file", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: signer,operation,arg1,arg2,arg3
    /// Example: cargo run -- --genesis genesis.csv operations.csv > balances.csv
    #[arg(value_name = "FILE")]
    operations: PathBuf,

    /// CSV file with initial balances (address,amount)
    #[arg(long, value_name = "FILE")]
    genesis: Option<PathBuf>,

    /// CSV file with pooled recipients (pool,member)
    #[arg(long, value_name = "FILE")]
    pools: Option<PathBuf>,

    /// Token name
    #[arg(long, default_value = "Ledger Token")]
    name: String,

    /// Token symbol
    #[arg(long, default_value = "LGT")]
    symbol: String,

    /// Decimal places used to display balances
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(0..=28))]
    decimals: u8,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let engine = Engine::new(TokenConfig {
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
    });

    let mut store = match args.genesis.as_deref().map(open).transpose() {
        Ok(Some(file)) => load_genesis(file).unwrap_or_else(|e| fail("reading genesis", e)),
        Ok(None) => MemoryStore::new(),
        Err(e) => fail("opening genesis", e),
    };

    let pools = match args.pools.as_deref().map(open).transpose() {
        Ok(Some(file)) => load_pools(file).unwrap_or_else(|e| fail("reading pools", e)),
        Ok(None) => PoolRegistry::new(),
        Err(e) => fail("opening pools", e),
    };

    let file = open(&args.operations).unwrap_or_else(|e| fail("opening operations", e));
    if let Err(e) = replay(&engine, &mut store, &pools, file) {
        fail("processing operations", e);
    }

    if let Err(e) = write_balances(&engine, &store, std::io::stdout()) {
        fail("writing output", e);
    }
}

fn open(path: &Path) -> std::io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("Error {}: {}", context, error);
    process::exit(1);
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader)
}

#[derive(Debug, Deserialize)]
struct GenesisRecord {
    address: String,
    amount: Amount,
}

/// Loads initial balances; the total supply becomes their sum.
///
/// Rows with a malformed address or a non-positive amount are skipped.
fn load_genesis<R: Read>(reader: R) -> Result<MemoryStore, csv::Error> {
    let mut balances = Vec::new();
    for result in csv_reader(reader).deserialize::<GenesisRecord>() {
        let record = result?;
        match parse_address(&record.address) {
            Some(address) if record.amount > 0 => balances.push((address, record.amount)),
            Some(address) => warn!(%address, amount = record.amount, "skipping non-positive genesis balance"),
            None => warn!(address = %record.address, "skipping genesis row with malformed address"),
        }
    }
    info!(accounts = balances.len(), "genesis loaded");
    Ok(MemoryStore::with_balances(balances))
}

#[derive(Debug, Deserialize)]
struct PoolRecord {
    pool: String,
    member: String,
}

/// Loads pool memberships in file order.
fn load_pools<R: Read>(reader: R) -> Result<PoolRegistry, csv::Error> {
    let mut pools = PoolRegistry::new();
    for result in csv_reader(reader).deserialize::<PoolRecord>() {
        let record = result?;
        let (Some(pool), Some(member)) = (parse_address(&record.pool), parse_address(&record.member))
        else {
            warn!(pool = %record.pool, member = %record.member, "skipping malformed pool row");
            continue;
        };
        if let Err(e) = pools.add_member(pool, member) {
            warn!(pool = %record.pool, "skipping pool row: {}", e);
        }
    }
    Ok(pools)
}

/// Raw CSV record of one invocation.
///
/// Fields: `signer, operation, arg1, arg2, arg3`
#[derive(Debug, Deserialize)]
struct OperationRecord {
    signer: Option<String>,
    operation: String,
    arg1: Option<String>,
    arg2: Option<String>,
    arg3: Option<String>,
}

impl OperationRecord {
    /// Authorized address of the call, if any.
    fn witness(&self) -> Option<WitnessSet> {
        match self.signer.as_deref() {
            None | Some("") => Some(WitnessSet::deny_all()),
            Some(signer) => parse_address(signer).map(WitnessSet::signed_by),
        }
    }

    /// Positional arguments; `0x`-prefixed fields are byte strings, the rest
    /// integers. Returns `None` if a field is neither.
    fn arguments(&self) -> Option<Vec<Argument>> {
        [&self.arg1, &self.arg2, &self.arg3]
            .into_iter()
            .flatten()
            .filter(|field| !field.is_empty())
            .map(|field| parse_argument(field))
            .collect()
    }
}

/// Parses a hex address, accepting only well-formed ones.
fn parse_address(field: &str) -> Option<Address> {
    field
        .parse::<Address>()
        .ok()
        .filter(Address::is_well_formed)
}

fn parse_argument(field: &str) -> Option<Argument> {
    if let Some(digits) = field.strip_prefix("0x") {
        hex::decode(digits).ok().map(Argument::Bytes)
    } else {
        field.parse::<Amount>().ok().map(Argument::Integer)
    }
}

/// Replays every row of an operations CSV against `store`.
///
/// Malformed rows, argument errors and rejected operations are logged and
/// skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
fn replay<R: Read>(
    engine: &Engine,
    store: &mut MemoryStore,
    pools: &PoolRegistry,
    reader: R,
) -> Result<EventLog, csv::Error> {
    let mut events = EventLog::new();

    for (row, result) in csv_reader(reader).deserialize::<OperationRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row, "skipping malformed row: {}", e);
                continue;
            }
        };
        let (Some(witness), Some(args)) = (record.witness(), record.arguments()) else {
            warn!(row, "skipping row with unparsable signer or arguments");
            continue;
        };

        let mut cx = Context::new(&mut *store, &witness, pools, &mut events);
        match engine.invoke(&mut cx, &record.operation, args) {
            Ok(value) => debug!(row, operation = %record.operation, ?value, "ok"),
            Err(e) => warn!(row, operation = %record.operation, "skipping: {}", e),
        }
    }

    info!(events = events.len(), "replay finished");
    Ok(events)
}

#[derive(Debug, Serialize)]
struct BalanceRecord {
    address: Address,
    balance: Decimal,
}

/// Writes every balance entry as `address,balance`, scaled to the token's
/// decimals.
fn write_balances<W: Write>(engine: &Engine, store: &MemoryStore, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    let scale = u32::from(engine.token().decimals);

    for (address, amount) in store.balances() {
        let balance = match Decimal::try_from_i128_with_scale(amount, scale) {
            Ok(balance) => balance,
            Err(e) => {
                warn!(%address, amount, "balance not representable: {}", e);
                continue;
            }
        };
        wtr.serialize(BalanceRecord { address, balance })?;
    }

    wtr.flush()?;
    Ok(())
}
