//! chipstack console - a line-oriented front end over the casino core.
//!
//! Reference command surface only: it parses text, calls the [`Casino`]
//! facade, and renders results. Every line starts with the acting user's
//! id, so one console can exercise several accounts at once:
//!
//! ```text
//! 7 daily
//! 7 s 50
//! 7 bj 100
//! 7 hit
//! 9 setall 1000
//! ```
//!
//! The admin flag handed to the privileged ledger commands is derived here
//! by comparing the acting user against `--admin-id`; the core rejects the
//! call when the flag is false.

use chipstack::games::RoundView;
use chipstack::{Casino, CasinoConfig, CoinFace, Decision, GameError, Rank, UserId};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "chipstack")]
#[command(about = "In-memory chip ledger and wagering games", long_about = None)]
struct Args {
    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// User id allowed to run setbalance/setall
    #[arg(long, default_value = "1")]
    admin_id: UserId,

    /// Emit results as JSON lines instead of prose
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chipstack=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CasinoConfig::load(path)?,
        None => CasinoConfig::default(),
    };
    let casino = Casino::new(config);

    println!("chipstack console");
    println!(
        "commands: <user> daily | balance | s <bet> | cf <bet> <heads|tails> | \
         bj <bet> | hit | stand | setbalance <user> <amount> | setall <amount> | quit"
    );

    // Last unresolved blackjack hand per user, so `hit`/`stand` need no id.
    let mut open_hands: HashMap<UserId, Uuid> = HashMap::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let mut parts = line.split_whitespace();
        let user = match parts.next().and_then(|t| t.parse::<UserId>().ok()) {
            Some(user) => user,
            None => {
                println!("expected: <user-id> <command>");
                continue;
            }
        };
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();
        run_command(&casino, &args, &mut open_hands, user, command, &rest);
    }

    Ok(())
}

fn run_command(
    casino: &Casino,
    args: &Args,
    open_hands: &mut HashMap<UserId, Uuid>,
    user: UserId,
    command: &str,
    rest: &[&str],
) {
    let admin = user == args.admin_id;
    match command {
        "balance" => {
            let balance = casino.balance(user);
            emit(
                args.json,
                &serde_json::json!({ "user": user, "balance": balance }),
                format!("balance: {} chips", balance),
            );
        }
        "daily" => match casino.claim_daily(user, Utc::now()) {
            Ok(reward) => emit(
                args.json,
                &reward,
                format!(
                    "claimed {} chips; balance {}",
                    reward.amount, reward.new_balance
                ),
            ),
            Err(err) => report(args.json, err),
        },
        "s" | "slots" => match parse_amount(rest.first()) {
            Some(bet) => match casino.spin(user, bet) {
                Ok(spin) => {
                    let reels: Vec<String> =
                        spin.reels.iter().map(|s| s.to_string()).collect();
                    emit(
                        args.json,
                        &spin,
                        format!(
                            "[ {} ] payout {}, balance {}",
                            reels.join(" "),
                            signed(spin.payout),
                            spin.new_balance
                        ),
                    );
                }
                Err(err) => report(args.json, err),
            },
            None => println!("usage: <user> s <bet>"),
        },
        "cf" | "coinflip" => match (parse_amount(rest.first()), rest.get(1)) {
            (Some(bet), Some(call)) => match call.parse::<CoinFace>() {
                Ok(call) => match casino.flip(user, bet, call) {
                    Ok(flip) => emit(
                        args.json,
                        &flip,
                        format!(
                            "coin came up {}; payout {}, balance {}",
                            flip.outcome,
                            signed(flip.payout),
                            flip.new_balance
                        ),
                    ),
                    Err(err) => report(args.json, err),
                },
                Err(err) => report(args.json, err),
            },
            _ => println!("usage: <user> cf <bet> <heads|tails>"),
        },
        "bj" | "blackjack" => match parse_amount(rest.first()) {
            Some(bet) => match casino.start_blackjack(user, bet) {
                Ok(view) => {
                    if !view.is_resolved() {
                        open_hands.insert(user, view.session_id);
                    }
                    show_round(args.json, &view);
                }
                Err(err) => report(args.json, err),
            },
            None => println!("usage: <user> bj <bet>"),
        },
        "hit" | "stand" => {
            let decision = if command == "hit" {
                Decision::Hit
            } else {
                Decision::Stand
            };
            let Some(session) = open_hands.get(&user).copied() else {
                println!("no open blackjack hand; start one with: <user> bj <bet>");
                return;
            };
            match casino.submit_decision(session, decision) {
                Ok(view) => {
                    if view.is_resolved() {
                        open_hands.remove(&user);
                    }
                    show_round(args.json, &view);
                }
                Err(err @ GameError::UnknownSession) => {
                    // Resolved out from under us, usually by the decision
                    // timeout.
                    open_hands.remove(&user);
                    report(args.json, err);
                }
                Err(err) => report(args.json, err),
            }
        }
        "setbalance" => match (
            rest.first().and_then(|t| t.parse::<UserId>().ok()),
            parse_amount(rest.get(1)),
        ) {
            (Some(target), Some(amount)) => match casino.set_balance(admin, target, amount) {
                Ok(balance) => emit(
                    args.json,
                    &serde_json::json!({ "user": target, "balance": balance }),
                    format!("set user {} to {} chips", target, balance),
                ),
                Err(err) => report(args.json, err),
            },
            _ => println!("usage: <user> setbalance <user> <amount>"),
        },
        "setall" => match parse_amount(rest.first()) {
            Some(amount) => match casino.set_all_balances(admin, amount) {
                Ok(updated) => emit(
                    args.json,
                    &serde_json::json!({ "amount": amount, "updated": updated }),
                    format!("set {} accounts to {} chips", updated, amount),
                ),
                Err(err) => report(args.json, err),
            },
            None => println!("usage: <user> setall <amount>"),
        },
        other => println!("unknown command: {}", other),
    }
}

/// Amounts arrive as plain integers; anything else is a usage error.
fn parse_amount(token: Option<&&str>) -> Option<i64> {
    token.and_then(|t| t.parse::<i64>().ok())
}

fn signed(n: i64) -> String {
    if n >= 0 {
        format!("+{}", n)
    } else {
        n.to_string()
    }
}

fn hand(cards: &[Rank]) -> String {
    let labels: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
    labels.join(" ")
}

fn show_round(json: bool, view: &RoundView) {
    let text = if view.is_resolved() {
        let dealer = view.dealer.as_deref().unwrap_or_default();
        let dealer_total = view.dealer_total.unwrap_or_default();
        let payout = view.payout.unwrap_or_default();
        let balance = view.new_balance.unwrap_or_default();
        let verdict = match payout {
            p if p > 0 => "you win".to_string(),
            p if p < 0 => "you lose".to_string(),
            _ => "push".to_string(),
        };
        format!(
            "you: {} ({}) | dealer: {} ({}) | {}; payout {}, balance {}",
            hand(&view.player),
            view.player_total,
            hand(dealer),
            dealer_total,
            verdict,
            signed(payout),
            balance
        )
    } else {
        format!(
            "you: {} ({}) | dealer shows {} | hit or stand?",
            hand(&view.player),
            view.player_total,
            view.dealer_upcard
        )
    };
    emit(json, view, text);
}

fn emit<T: Serialize>(json: bool, value: &T, text: String) {
    if json {
        match serde_json::to_string(value) {
            Ok(line) => println!("{}", line),
            Err(err) => tracing::warn!(%err, "failed to encode result"),
        }
    } else {
        println!("{}", text);
    }
}

fn report(json: bool, err: GameError) {
    if json {
        println!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        println!("! {}", err);
    }
}
