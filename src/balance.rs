// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Synchronizer
//!
//! Keeps the connected account's balance in the configured base denomination
//! up to date.
//!
//! ## Strategy
//!
//! [`start`](BalanceSynchronizer::start) fetches immediately and then every
//! `interval` (default 30 s) until [`stop`](BalanceSynchronizer::stop).
//! [`refresh_once`](BalanceSynchronizer::refresh_once) performs a single
//! on-demand fetch, e.g. after a transaction.
//!
//! Each fetch replaces the published [`BalanceSnapshot`] wholesale. A failed
//! fetch publishes a zero placeholder and logs a warning; it never reaches the
//! caller.
//!
//! ## Shutdown
//!
//! `stop()` is synchronous: it cancels the poller's token, aborts the task and
//! bumps a generation counter so that a fetch already in flight cannot
//! publish after the stop.
//!
//! Callers that fetch on behalf of a session which may change underneath them
//! capture [`generation`](BalanceSynchronizer::generation) up front and use
//! [`refresh_if_current`](BalanceSynchronizer::refresh_if_current).

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::extension::Account;
use crate::query::ChainQuery;
use crate::units::UnitConverter;

/// Default interval between balance fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Balance of one denomination at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub denom: String,
    /// Base units.
    pub amount: u128,
    pub as_of: DateTime<Utc>,
    /// Set when the fetch failed and `amount` is a stand-in zero.
    pub placeholder: bool,
}

impl BalanceSnapshot {
    /// Human-facing amount, e.g. `"1.5"` for `1500000` with 6 decimals.
    pub fn display_amount(&self, converter: &UnitConverter) -> String {
        converter.format(self.amount)
    }
}

#[derive(Default)]
struct Poller {
    generation: u64,
    task: Option<(CancellationToken, JoinHandle<()>)>,
}

pub struct BalanceSynchronizer {
    query: Arc<dyn ChainQuery>,
    denom: String,
    interval: Duration,
    snapshot: watch::Sender<Option<BalanceSnapshot>>,
    poller: Mutex<Poller>,
}

impl BalanceSynchronizer {
    pub fn new(query: Arc<dyn ChainQuery>, denom: impl Into<String>) -> Self {
        Self::with_interval(query, denom, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(
        query: Arc<dyn ChainQuery>,
        denom: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            query,
            denom: denom.into(),
            interval,
            snapshot,
            poller: Mutex::new(Poller::default()),
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<BalanceSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<BalanceSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.lock().task.is_some()
    }

    /// Begin polling for `account`, replacing any previous poller.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self: &Arc<Self>, account: &Account) {
        let mut poller = self.lock();
        Self::cancel(&mut poller);

        let generation = poller.generation;
        let shutdown = CancellationToken::new();
        let this = Arc::clone(self);
        let address = account.address.clone();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move { this.run(address, generation, token).await });
        poller.task = Some((shutdown, handle));

        info!(
            address = %account.address,
            interval_secs = self.interval.as_secs(),
            "Balance polling started"
        );
    }

    /// Cancel polling. No fetch started before the call can publish after it.
    pub fn stop(&self) {
        let mut poller = self.lock();
        if poller.task.is_some() {
            debug!("Balance polling stopped");
        }
        Self::cancel(&mut poller);
    }

    /// Drop the published snapshot.
    pub fn clear(&self) {
        self.snapshot.send_replace(None);
    }

    /// Bumped by every `start` and `stop`.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Fetch once and publish, unless a stop or restart happened meanwhile.
    pub async fn refresh_once(&self, account: &Account) -> BalanceSnapshot {
        let generation = self.generation();
        self.refresh(&account.address, generation).await
    }

    /// Fetch once and publish only if the generation is still `generation`.
    pub async fn refresh_if_current(&self, account: &Account, generation: u64) -> BalanceSnapshot {
        self.refresh(&account.address, generation).await
    }

    async fn run(&self, address: String, generation: u64, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                return;
            }

            self.refresh(&address, generation).await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => return,
            }
        }
    }

    async fn refresh(&self, address: &str, generation: u64) -> BalanceSnapshot {
        let snapshot = self.fetch(address).await;

        let poller = self.lock();
        if poller.generation == generation {
            self.snapshot.send_replace(Some(snapshot.clone()));
        } else {
            debug!(address, "Discarding balance fetched before stop");
        }
        snapshot
    }

    async fn fetch(&self, address: &str) -> BalanceSnapshot {
        let amount = match self.query.balances(address).await {
            Ok(balances) => balances
                .into_iter()
                .find(|coin| coin.denom == self.denom)
                .map(|coin| {
                    coin.amount.parse::<u128>().map_err(|e| {
                        format!("invalid {} amount `{}`: {e}", self.denom, coin.amount)
                    })
                })
                .unwrap_or(Ok(0)),
            Err(e) => Err(e.to_string()),
        };

        match amount {
            Ok(amount) => BalanceSnapshot {
                denom: self.denom.clone(),
                amount,
                as_of: Utc::now(),
                placeholder: false,
            },
            Err(error) => {
                warn!(address, denom = %self.denom, error = %error, "Balance fetch failed");
                BalanceSnapshot {
                    denom: self.denom.clone(),
                    amount: 0,
                    as_of: Utc::now(),
                    placeholder: true,
                }
            }
        }
    }

    fn cancel(poller: &mut Poller) {
        poller.generation = poller.generation.wrapping_add(1);
        if let Some((token, handle)) = poller.task.take() {
            token.cancel();
            handle.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Poller> {
        self.poller.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
