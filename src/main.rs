// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line inspector for the configured chain.
//!
//! ```text
//! nmx-wallet chain-info
//! nmx-wallet balance <address>
//! nmx-wallet delegations <address>
//! nmx-wallet rewards <address>
//! nmx-wallet validators
//! nmx-wallet proposals
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use nmx_wallet::extension::Account;
use nmx_wallet::logging::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
use nmx_wallet::query::{ProposalStatus, ValidatorStatus};
use nmx_wallet::{BalanceSynchronizer, ChainConfig, ChainInfo, ChainQuery, RestQueryClient};
use serde::Serialize;
use tracing::error;

const USAGE: &str =
    "usage: nmx-wallet <chain-info | balance <addr> | delegations <addr> | rewards <addr> | validators | proposals>";

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogFormat::from_env(), DEFAULT_LOG_LEVEL);

    let config = match ChainConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let command: Vec<&str> = args.iter().map(String::as_str).collect();

    match run(&config, &command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ChainConfig, command: &[&str]) -> Result<(), String> {
    if let ["chain-info"] = command {
        return print_json(&ChainInfo::resolve(config));
    }

    let query = RestQueryClient::new(config).map_err(|e| e.to_string())?;

    match command {
        ["balance", address] => {
            let balances = BalanceSynchronizer::new(Arc::new(query), config.base_denom.clone());
            let snapshot = balances
                .refresh_once(&Account::new(*address, Vec::new()))
                .await;
            if snapshot.placeholder {
                return Err(format!("could not fetch balance for {address}"));
            }
            println!(
                "{} {}",
                snapshot.display_amount(&config.converter()),
                config.display_denom
            );
            Ok(())
        }
        ["delegations", address] => print_json(&query.delegations(address).await.map_err(|e| e.to_string())?),
        ["rewards", address] => print_json(&query.rewards(address).await.map_err(|e| e.to_string())?),
        ["validators"] => print_json(
            &query
                .validators(Some(ValidatorStatus::Bonded))
                .await
                .map_err(|e| e.to_string())?,
        ),
        ["proposals"] => print_json(
            &query
                .proposals(Some(ProposalStatus::VotingPeriod))
                .await
                .map_err(|e| e.to_string())?,
        ),
        _ => Err(USAGE.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}
