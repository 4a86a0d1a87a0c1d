mod dlq;
mod domain;
mod engine;
mod ingestion;
mod session;
mod store;

use std::{env, fs::File, path::Path};

use futures::StreamExt;

use crate::dlq::StdErrDLQ;
use crate::domain::{
    AccessGate, Command, DeadLetterQueue, Error, GoalAccount, Principal, Store,
    TransactionStatus, traits::CommandStream,
};
use crate::engine::{Engine, Policy, Snapshot};
use crate::session::StaticGate;
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the flushed balances.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut auto_post = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        if arg == "--auto-post" {
            auto_post = true;
        } else {
            path = Some(arg);
        }
    }
    let path = path.ok_or("usage: allowance_ledger <operations.csv> [--auto-post]")?;
    let file = File::open(Path::new(&path)).map_err(Error::from)?;

    let mut ingestion = ingestion::CsvReader::new(file)?;
    let mut gate = StaticGate::new(None);
    let dlq = StdErrDLQ::default();
    let mut engine = Engine::new(
        MemoryStore::new(),
        Policy {
            auto_post_requester_deposits: auto_post,
        },
    );

    let mut commands = ingestion.stream();
    while let Some(cmd) = commands.next().await {
        match cmd {
            Ok(cmd) => {
                if let Err(e) = dispatch(&mut engine, &mut gate, cmd) {
                    dlq.report(&e);
                }
            }
            Err(e) => dlq.report(&e),
        }
    }

    engine.flush();
    Ok(())
}

/// Routes one command: provisioning rows go straight to the gate/store,
/// business rows are authenticated and handed to the engine.
fn dispatch<S: Store>(
    engine: &mut Engine<S>,
    gate: &mut StaticGate,
    cmd: Command,
) -> Result<(), Error> {
    match cmd {
        Command::RegisterUser {
            token,
            user_id,
            role,
        } => {
            gate.issue(token, Principal::new(user_id, role));
            Ok(())
        }
        Command::ProvisionGoalAccount {
            user_id,
            primary,
            target,
        } => engine
            .store_mut()
            .insert_goal_account(GoalAccount::new(user_id, primary, target)),
        Command::GoalAction {
            token,
            action,
            amount,
        } => {
            let principal = gate.authenticate(&token)?;
            engine.apply_goal_action(&principal, action, amount)?;
            Ok(())
        }
        Command::CreateRequest {
            token,
            kind,
            amount,
            purpose,
            link,
            notes,
        } => {
            let principal = gate.authenticate(&token)?;
            engine.create_request(&principal, kind, amount, &purpose, link, notes)?;
            Ok(())
        }
        Command::Approve {
            token,
            request_id,
            fulfilled,
            receipt_ref,
            note,
        } => {
            let principal = gate.authenticate(&token)?;
            engine.approve_and_post(&principal, request_id, fulfilled, receipt_ref, note)?;
            Ok(())
        }
        Command::Deny {
            token,
            request_id,
            note,
        } => {
            let principal = gate.authenticate(&token)?;
            engine.deny_request(&principal, request_id, note)
        }
        Command::Post {
            token,
            user_id,
            kind,
            amount,
            memo,
        } => {
            let principal = gate.authenticate(&token)?;
            engine.post_direct(
                &principal,
                &user_id,
                kind,
                amount,
                &memo,
                TransactionStatus::Posted,
            )?;
            Ok(())
        }
        Command::Snapshot { token } => {
            let principal = gate.authenticate(&token)?;
            match engine.snapshot(&principal) {
                Snapshot::Goal(s) => {
                    println!("snapshot,{},{},{},{}", s.user_id, s.primary, s.goal, s.target);
                }
                Snapshot::Ledger {
                    user_id,
                    balance,
                    recent,
                } => {
                    println!("snapshot,{},{}", user_id, balance);
                    for tx in recent {
                        println!(
                            "txn,{},{},{:?},{},{}",
                            tx.id, tx.created_at, tx.kind, tx.amount, tx.memo
                        );
                    }
                }
            }
            Ok(())
        }
        Command::ListPending { token, scope } => {
            let principal = gate.authenticate(&token)?;
            for req in engine.list_pending(&principal, scope)? {
                println!(
                    "pending,{},{},{:?},{},{}",
                    req.id, req.user_id, req.kind, req.amount, req.purpose
                );
            }
            Ok(())
        }
        Command::ListBalances { token } => {
            let principal = gate.authenticate(&token)?;
            let sheet = engine.list_balances(&principal)?;
            for (user, balance) in &sheet.ledger {
                println!("balance,{},{}", user, balance);
            }
            for goal in &sheet.goals {
                println!(
                    "balance,{},{},{},{}",
                    goal.user_id, goal.primary, goal.goal, goal.target
                );
            }
            Ok(())
        }
    }
}
