//! Manual smoke-test CLI for a single in-process table. A `clap`-driven
//! REPL that drives one `TableEngine` directly: players
//! join, a hand starts, actions are applied, and the resulting state/event
//! is printed after every command. Not a server — no ingress, no
//! networking, just a loop over stdin for hand-testing the engine.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use poker_core::config::SyncConfig;
use poker_core::deck_oracle::InMemoryDeckOracle;
use poker_core::engine::nl::types::{Chips, PlayerId, SeatId, TableStakes};
use poker_core::engine::nl::PlayerAction;
use poker_core::logging::TracingGameLogger;
use poker_core::persistence::InMemoryPersistence;
use poker_core::resilience::ResilienceRegistry;
use poker_core::table::{TableConfig, TableEngine};

#[derive(Parser, Debug)]
#[command(name = "table_repl", about = "Drive a single poker_core table from stdin")]
struct Cli {
    #[arg(long, default_value = "demo-table")]
    table_id: String,

    #[arg(long, default_value_t = 5)]
    small_blind: Chips,

    #[arg(long, default_value_t = 10)]
    big_blind: Chips,

    #[arg(long, default_value_t = 20)]
    min_buy_in: Chips,

    #[arg(long, default_value_t = 10_000)]
    max_buy_in: Chips,

    #[arg(long, default_value_t = 9)]
    max_seats: SeatId,
}

/// One line of input: `join <player_id> <seat> <buy_in>`, `start`,
/// `act <player_id> fold|check|call|all_in`, `bet <player_id> <to>`,
/// `raise <player_id> <to>`, `state`, `view <player_id>`, `quit`.
fn dispatch_line(line: &str) -> Option<(PlayerId, PlayerAction)> {
    let mut parts = line.split_whitespace();
    let player_id: PlayerId = parts.next()?.parse().ok()?;
    let kind = parts.next()?;
    let action = match kind {
        "fold" => PlayerAction::Fold,
        "check" => PlayerAction::Check,
        "call" => PlayerAction::Call,
        "all_in" => PlayerAction::AllIn,
        "bet" => PlayerAction::Bet { to: parts.next()?.parse().ok()? },
        "raise" => PlayerAction::Raise { to: parts.next()?.parse().ok()? },
        _ => return None,
    };
    Some((player_id, action))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install tracing subscriber")?;

    let cli = Cli::parse();
    let config = TableConfig {
        table_id: cli.table_id,
        min_buy_in: cli.min_buy_in,
        max_buy_in: cli.max_buy_in,
        stakes: TableStakes { small_blind: cli.small_blind, big_blind: cli.big_blind },
        max_seats: cli.max_seats,
    };

    let mut engine = TableEngine::new(
        config,
        Arc::new(InMemoryDeckOracle::new()),
        Arc::new(InMemoryPersistence::new()),
        Arc::new(TracingGameLogger::default()),
        Arc::new(ResilienceRegistry::new()),
        SyncConfig::default(),
    );

    println!("table_repl ready. Commands: join <id> <seat> <buy_in> | start | <id> fold|check|call|all_in | <id> bet <to> | <id> raise <to> | state | view <id> | quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let timestamp = Utc::now().timestamp();

        let mut words = line.split_whitespace();
        match words.next() {
            Some("quit") => break,
            Some("state") => {
                println!("{}", serde_json::to_string_pretty(&engine.get_state()).unwrap());
            }
            Some("view") => {
                if let Some(id) = words.next().and_then(|s| s.parse::<PlayerId>().ok()) {
                    println!("{}", serde_json::to_string_pretty(&engine.get_player_view(id)).unwrap());
                } else {
                    eprintln!("usage: view <player_id>");
                }
            }
            Some("join") => {
                let rest: Vec<&str> = words.collect();
                let parsed = if rest.len() == 3 {
                    match (rest[0].parse::<PlayerId>(), rest[1].parse::<SeatId>(), rest[2].parse::<Chips>()) {
                        (Ok(id), Ok(seat), Ok(buy_in)) => Some((id, seat, buy_in)),
                        _ => None,
                    }
                } else {
                    None
                };
                match parsed {
                    Some((id, seat, buy_in)) => match engine.add_player(id, seat, buy_in, timestamp) {
                        Ok(event) => println!("{event:?}"),
                        Err(err) => eprintln!("error: {err}"),
                    },
                    None => eprintln!("usage: join <player_id> <seat> <buy_in>"),
                }
            }
            Some("start") => match engine.start_hand(timestamp).await {
                Ok(events) => events.iter().for_each(|e| println!("{e:?}")),
                Err(err) => eprintln!("error: {err}"),
            },
            _ => match dispatch_line(line) {
                Some((player_id, action)) => match engine.apply_action(player_id, action, timestamp).await {
                    Ok(events) => events.iter().for_each(|e| println!("{e:?}")),
                    Err(err) => eprintln!("error: {err}"),
                },
                None => eprintln!("unrecognized command: {line}"),
            },
        }
        io::stdout().flush().ok();
    }
    Ok(())
}
