// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Session
//!
//! Owns the connection lifecycle and the single [`SessionState`] value.
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──▶ Connected
//!      ▲                        │   ▲           │
//!      │                        ▼   └─account───┤
//!      └───────disconnect──── Error    changed  │
//!      ◀────────────────────disconnect──────────┘
//! ```
//!
//! ## Single flight
//!
//! Transitions happen under one lock. A `connect()` while `Connecting` is
//! rejected with [`WalletError::SessionBusy`]; an account-change notification
//! while `Connecting` is coalesced into the running attempt, which re-runs
//! once before committing. `disconnect()` bumps an epoch so that a late
//! attempt result is discarded ([`WalletError::ConnectionCancelled`]).
//!
//! ## Account changes
//!
//! An account change while `Connected` moves straight to `Connecting` with
//! the account, signing handle and balance already dropped. That `Connecting`
//! stands in for `Disconnected`: no state between the old and new binding
//! carries an address, so the bound address only ever changes by passing
//! through a state with none.
//!
//! ## Balance
//!
//! Entering `Connected` starts the [`BalanceSynchronizer`]; leaving it stops
//! the poller synchronously and drops the cached snapshot. Every transition
//! bumps the synchronizer's generation, so a fetch begun for an earlier
//! binding never publishes.

mod hint;

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::balance::{BalanceSnapshot, BalanceSynchronizer};
use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::extension::{Account, ChainRegistrar, WalletExtension};
use crate::tx::{ChainBackend, SigningHandle};

pub use hint::{HintStoreError, JsonFileStore, KeyValueStore, MemoryStore};

use hint::ReconnectHint;

/// Connection state. Exactly one value is live at a time.
#[derive(Debug, Clone)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected {
        account: Account,
        signing_handle: SigningHandle,
    },
    Error {
        reason: WalletError,
    },
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            SessionState::Connected { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected { .. } => "connected",
            SessionState::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Default)]
struct Flight {
    /// Bumped by every transition that invalidates an in-flight attempt.
    epoch: u64,
    /// An account change arrived while the attempt was running.
    rerun: bool,
}

enum Step {
    Rerun,
    Cancelled,
    Done(Result<Account, WalletError>),
}

struct Inner {
    chain_id: String,
    registrar: ChainRegistrar,
    backend: ChainBackend,
    balances: Arc<BalanceSynchronizer>,
    hint: ReconnectHint,
    state: watch::Sender<SessionState>,
    flight: Mutex<Flight>,
    listener: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.listener.cancel();
        self.balances.stop();
    }
}

/// Handle to the wallet session. Clones share the same session.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<Inner>,
}

impl WalletSession {
    /// Build a session. `extension` is `None` when no wallet extension is
    /// installed.
    pub fn new(
        config: &ChainConfig,
        extension: Option<Arc<dyn WalletExtension>>,
        backend: ChainBackend,
        hints: Arc<dyn KeyValueStore>,
    ) -> Self {
        let balances = Arc::new(BalanceSynchronizer::new(
            backend.query.clone(),
            config.base_denom.clone(),
        ));
        Self::with_balances(config, extension, backend, hints, balances)
    }

    /// Like [`new`](Self::new) with a caller-provided synchronizer.
    pub fn with_balances(
        config: &ChainConfig,
        extension: Option<Arc<dyn WalletExtension>>,
        backend: ChainBackend,
        hints: Arc<dyn KeyValueStore>,
        balances: Arc<BalanceSynchronizer>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                chain_id: config.chain_id.clone(),
                registrar: ChainRegistrar::new(extension, config),
                backend,
                balances,
                hint: ReconnectHint::new(hints, &config.chain_id),
                state,
                flight: Mutex::new(Flight::default()),
                listener: CancellationToken::new(),
            }),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.inner.chain_id
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn account(&self) -> Option<Account> {
        self.inner.state.borrow().account().cloned()
    }

    /// Account and signing handle, or [`WalletError::NotConnected`].
    pub fn connected(&self) -> Result<(Account, SigningHandle), WalletError> {
        match &*self.inner.state.borrow() {
            SessionState::Connected {
                account,
                signing_handle,
            } => Ok((account.clone(), signing_handle.clone())),
            _ => Err(WalletError::NotConnected),
        }
    }

    /// Like [`connected`](Self::connected), plus the balance generation of
    /// that binding. Read under the transition lock so the three agree.
    pub(crate) fn binding(&self) -> Result<(Account, SigningHandle, u64), WalletError> {
        let _flight = self.inner.flight();
        let (account, handle) = self.connected()?;
        Ok((account, handle, self.inner.balances.generation()))
    }

    pub fn balances(&self) -> &Arc<BalanceSynchronizer> {
        &self.inner.balances
    }

    pub fn balance(&self) -> Option<BalanceSnapshot> {
        self.inner.balances.snapshot()
    }

    /// Connect to the wallet extension.
    ///
    /// Valid from `Disconnected` or `Error`. Any failure moves the session to
    /// `Error` with no account bound.
    pub async fn connect(&self) -> Result<Account, WalletError> {
        let epoch = {
            let mut flight = self.inner.flight();
            match &*self.inner.state.borrow() {
                SessionState::Connecting => return Err(WalletError::SessionBusy),
                SessionState::Connected { .. } => return Err(WalletError::AlreadyConnected),
                SessionState::Disconnected | SessionState::Error { .. } => {}
            }
            flight.epoch += 1;
            flight.rerun = false;
            self.inner.state.send_replace(SessionState::Connecting);
            flight.epoch
        };

        self.inner.run_attempt(epoch).await
    }

    /// Drop the connection. Valid from any state.
    ///
    /// Synchronously stops balance polling, clears the cached balance and the
    /// reconnection hint, and invalidates any in-flight connect.
    pub fn disconnect(&self) {
        let mut flight = self.inner.flight();
        flight.epoch += 1;
        flight.rerun = false;

        self.inner.balances.stop();
        self.inner.balances.clear();
        self.inner.state.send_replace(SessionState::Disconnected);
        self.inner.hint.clear();

        info!(chain_id = %self.inner.chain_id, "Wallet disconnected");
    }

    /// Attempt one automatic reconnect if a hint was recorded.
    ///
    /// Returns `Ok(None)` when there is nothing to restore. A failed attempt
    /// clears the hint.
    pub async fn restore(&self) -> Result<Option<Account>, WalletError> {
        let Some(address) = self.inner.hint.load() else {
            return Ok(None);
        };

        info!(chain_id = %self.inner.chain_id, address = %address, "Restoring wallet session");

        match self.connect().await {
            Ok(account) => {
                if account.address != address {
                    info!(
                        previous = %address,
                        current = %account.address,
                        "Wallet restored with a different account"
                    );
                }
                Ok(Some(account))
            }
            Err(e @ (WalletError::SessionBusy | WalletError::AlreadyConnected)) => Err(e),
            Err(e) => {
                self.inner.hint.clear();
                Err(e)
            }
        }
    }

    /// Forward the extension's account-change notifications into the
    /// connect pipeline until [`shutdown`](Self::shutdown).
    ///
    /// Returns `None` when no extension is installed.
    pub fn spawn_account_listener(&self) -> Option<JoinHandle<()>> {
        let extension = self.inner.registrar.extension().ok()?;
        let mut changes = extension.account_changes();
        let shutdown = self.inner.listener.clone();
        let session = Arc::downgrade(&self.inner);

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    received = changes.recv() => match received {
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            spawn_account_change(&session);
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                }
            }
        }))
    }

    /// Stop the account listener and balance polling.
    pub fn shutdown(&self) {
        self.inner.listener.cancel();
        self.inner.balances.stop();
    }

    /// React to an account change reported by the extension.
    pub async fn handle_account_change(&self) {
        self.inner.handle_account_change().await;
    }
}

fn spawn_account_change(session: &Weak<Inner>) {
    if let Some(inner) = session.upgrade() {
        tokio::spawn(async move { inner.handle_account_change().await });
    }
}

impl Inner {
    fn flight(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn handle_account_change(&self) {
        let epoch = {
            let mut flight = self.flight();
            match &*self.state.borrow() {
                SessionState::Connecting => {
                    debug!("Account changed during connect, re-running attempt");
                    flight.rerun = true;
                    return;
                }
                SessionState::Disconnected | SessionState::Error { .. } => return,
                SessionState::Connected { .. } => {}
            }

            flight.epoch += 1;
            flight.rerun = false;
            self.balances.stop();
            self.balances.clear();
            self.state.send_replace(SessionState::Connecting);
            flight.epoch
        };

        info!(chain_id = %self.chain_id, "Wallet account changed, reconnecting");

        if let Err(e) = self.run_attempt(epoch).await {
            warn!(chain_id = %self.chain_id, error = %e, "Reconnect after account change failed");
        }
    }

    async fn run_attempt(&self, epoch: u64) -> Result<Account, WalletError> {
        let attempt_id = Uuid::new_v4();

        loop {
            debug!(%attempt_id, chain_id = %self.chain_id, "Connect attempt");
            let outcome = self.attempt().await;

            match self.settle(epoch, outcome) {
                Step::Rerun => continue,
                Step::Cancelled => {
                    info!(%attempt_id, "Discarding connect result after disconnect");
                    return Err(WalletError::ConnectionCancelled);
                }
                Step::Done(Ok(account)) => {
                    info!(%attempt_id, address = %account.address, "Wallet connected");
                    return Ok(account);
                }
                Step::Done(Err(e)) => {
                    warn!(%attempt_id, error = %e, "Wallet connection failed");
                    return Err(e);
                }
            }
        }
    }

    /// Commit an attempt's outcome if it is still current.
    fn settle(&self, epoch: u64, outcome: Result<(Account, SigningHandle), WalletError>) -> Step {
        let mut flight = self.flight();
        if flight.epoch != epoch {
            return Step::Cancelled;
        }
        if flight.rerun {
            flight.rerun = false;
            return Step::Rerun;
        }

        match outcome {
            Ok((account, signing_handle)) => {
                self.state.send_replace(SessionState::Connected {
                    account: account.clone(),
                    signing_handle,
                });
                self.balances.start(&account);
                self.hint.record(&account.address);
                Step::Done(Ok(account))
            }
            Err(reason) => {
                self.state.send_replace(SessionState::Error {
                    reason: reason.clone(),
                });
                Step::Done(Err(reason))
            }
        }
    }

    async fn attempt(&self) -> Result<(Account, SigningHandle), WalletError> {
        let extension = self.registrar.ensure_registered().await?;

        let signer = extension
            .get_offline_signer(&self.chain_id)
            .map_err(|e| WalletError::Extension(e.to_string()))?;

        let accounts = signer
            .get_accounts()
            .await
            .map_err(|e| WalletError::Extension(e.to_string()))?;

        let account = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        let handle = SigningHandle::new(self.chain_id.clone(), signer, self.backend.clone());

        Ok((account, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{account, backend, MockBroadcaster, MockExtension, MockQuery, MockSigner};

    struct Fixture {
        session: WalletSession,
        extension: Arc<MockExtension>,
        signer: Arc<MockSigner>,
        query: Arc<MockQuery>,
        hints: Arc<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let signer = Arc::new(MockSigner::new(vec![account("nmx1alice")]));
        let extension = Arc::new(MockExtension::new(signer.clone()));
        let query = Arc::new(MockQuery::new());
        let hints = Arc::new(MemoryStore::new());
        let session = WalletSession::new(
            &ChainConfig::default(),
            Some(extension.clone()),
            backend(query.clone(), Arc::new(MockBroadcaster::succeeding())),
            hints.clone(),
        );
        Fixture {
            session,
            extension,
            signer,
            query,
            hints,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn connect_binds_first_account_and_starts_balance() {
        let f = fixture();
        f.signer
            .set_accounts(vec![account("nmx1alice"), account("nmx1bob")]);

        let account = f.session.connect().await.unwrap();
        assert_eq!(account.address, "nmx1alice");
        assert!(f.session.state().is_connected());
        assert!(f.session.balances().is_running());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(f.query.balance_calls(), 1);
        assert_eq!(f.session.balance().map(|b| b.amount), Some(1_000_000));
        assert_eq!(
            f.hints.get("nomercychain-testnet-1/walletAddress").unwrap().as_deref(),
            Some("nmx1alice")
        );
    }

    #[tokio::test]
    async fn connect_without_extension_is_wallet_not_found() {
        let session = WalletSession::new(
            &ChainConfig::default(),
            None,
            backend(Arc::new(MockQuery::new()), Arc::new(MockBroadcaster::succeeding())),
            Arc::new(MemoryStore::new()),
        );

        assert_eq!(session.connect().await, Err(WalletError::WalletNotFound));
        assert!(matches!(
            session.state(),
            SessionState::Error { reason: WalletError::WalletNotFound }
        ));
        assert!(session.account().is_none());
        assert!(session.spawn_account_listener().is_none());
    }

    #[tokio::test]
    async fn no_accounts_is_error_state() {
        let f = fixture();
        f.signer.set_accounts(vec![]);

        assert_eq!(f.session.connect().await, Err(WalletError::NoAccounts));
        assert_eq!(f.session.state().name(), "error");
        assert!(!f.session.balances().is_running());
    }

    #[tokio::test]
    async fn connect_is_valid_again_after_error() {
        let f = fixture();
        f.signer.set_accounts(vec![]);
        assert!(f.session.connect().await.is_err());

        f.signer.set_accounts(vec![account("nmx1alice")]);
        assert!(f.session.connect().await.is_ok());
        assert_eq!(
            f.session.connect().await,
            Err(WalletError::AlreadyConnected)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_connect_calls_extension_once() {
        let f = fixture();
        f.signer.set_delay(Duration::from_secs(1));

        let (first, second) = tokio::join!(f.session.connect(), f.session.connect());

        assert_eq!(first.map(|a| a.address), Ok("nmx1alice".to_string()));
        assert_eq!(second, Err(WalletError::SessionBusy));
        assert_eq!(f.signer.get_accounts_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_discards_in_flight_connect() {
        let f = fixture();
        f.signer.set_delay(Duration::from_secs(1));

        let session = f.session.clone();
        let pending = tokio::spawn(async move { session.connect().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.session.state().name(), "connecting");

        f.session.disconnect();
        let result = pending.await.unwrap();

        assert_eq!(result, Err(WalletError::ConnectionCancelled));
        assert_eq!(f.session.state().name(), "disconnected");
        assert!(!f.session.balances().is_running());
        assert_eq!(f.hints.get("nomercychain-testnet-1/walletConnected").unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_stops_polling_and_clears_balance() {
        let f = fixture();
        f.session.connect().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(f.session.balance().is_some());

        f.session.disconnect();
        let calls = f.query.balance_calls();
        assert!(f.session.balance().is_none());
        assert!(f.session.account().is_none());
        assert!(matches!(f.session.connected(), Err(WalletError::NotConnected)));

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(f.query.balance_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn account_change_rebinds_new_account() {
        let f = fixture();
        f.session.connect().await.unwrap();
        let listener = f.session.spawn_account_listener().unwrap();
        tokio::task::yield_now().await;

        f.signer.set_accounts(vec![account("nmx1bob")]);
        f.extension.notify_account_change();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(f.session.account().map(|a| a.address), Some("nmx1bob".to_string()));
        assert_eq!(f.signer.get_accounts_calls(), 2);
        assert_eq!(f.extension.enable_calls(), 2);

        f.session.shutdown();
        listener.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn account_change_while_connected_clears_before_rebinding() {
        let f = fixture();
        f.session.connect().await.unwrap();
        f.signer.set_delay(Duration::from_secs(1));
        f.signer.set_accounts(vec![account("nmx1bob")]);

        let session = f.session.clone();
        let reconnect = tokio::spawn(async move { session.handle_account_change().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(f.session.state().name(), "connecting");
        assert!(f.session.account().is_none());
        assert!(f.session.balance().is_none());

        reconnect.await.unwrap();
        assert_eq!(f.session.account().map(|a| a.address), Some("nmx1bob".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn account_change_never_publishes_two_addresses_back_to_back() {
        let f = fixture();
        f.session.connect().await.unwrap();
        let mut states = f.session.subscribe();
        states.borrow_and_update();
        f.signer.set_delay(Duration::from_secs(1));
        f.signer.set_accounts(vec![account("nmx1bob")]);

        let session = f.session.clone();
        let reconnect = tokio::spawn(async move { session.handle_account_change().await });

        let mut seen = Vec::new();
        while seen.len() < 2 {
            states.changed().await.unwrap();
            let state = states.borrow_and_update().clone();
            seen.push((state.name(), state.account().map(|a| a.address.clone())));
        }
        reconnect.await.unwrap();

        assert_eq!(
            seen,
            vec![
                ("connecting", None),
                ("connected", Some("nmx1bob".to_string())),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn binding_generation_changes_with_every_transition() {
        let f = fixture();
        assert_eq!(f.session.binding().err(), Some(WalletError::NotConnected));

        f.session.connect().await.unwrap();
        let (bound, _, first) = f.session.binding().unwrap();
        assert_eq!(bound.address, "nmx1alice");

        f.signer.set_accounts(vec![account("nmx1bob")]);
        f.session.handle_account_change().await;
        let (bound, _, second) = f.session.binding().unwrap();
        assert_eq!(bound.address, "nmx1bob");
        assert_ne!(first, second);

        f.session.disconnect();
        assert_ne!(f.session.balances().generation(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn account_change_during_connect_reruns_once() {
        let f = fixture();
        f.signer.set_delay(Duration::from_secs(1));

        let session = f.session.clone();
        let pending = tokio::spawn(async move { session.connect().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        f.signer.set_accounts(vec![account("nmx1bob")]);
        f.session.handle_account_change().await;
        f.session.handle_account_change().await;

        let account = pending.await.unwrap().unwrap();
        assert_eq!(account.address, "nmx1bob");
        assert_eq!(f.signer.get_accounts_calls(), 2);
    }

    #[tokio::test]
    async fn account_change_when_disconnected_is_ignored() {
        let f = fixture();
        f.session.handle_account_change().await;
        assert_eq!(f.session.state().name(), "disconnected");
        assert_eq!(f.signer.get_accounts_calls(), 0);
    }

    #[tokio::test]
    async fn restore_reconnects_from_hint() {
        let f = fixture();
        assert_eq!(f.session.restore().await, Ok(None));

        f.hints.set("nomercychain-testnet-1/walletConnected", "true").unwrap();
        f.hints.set("nomercychain-testnet-1/walletAddress", "nmx1alice").unwrap();

        let restored = f.session.restore().await.unwrap();
        assert_eq!(restored.map(|a| a.address), Some("nmx1alice".to_string()));
        assert_eq!(f.signer.get_accounts_calls(), 1);
    }

    #[tokio::test]
    async fn failed_restore_clears_hint() {
        let f = fixture();
        f.hints.set("nomercychain-testnet-1/walletConnected", "true").unwrap();
        f.hints.set("nomercychain-testnet-1/walletAddress", "nmx1alice").unwrap();
        f.signer.set_accounts(vec![]);

        assert_eq!(f.session.restore().await, Err(WalletError::NoAccounts));
        assert_eq!(f.hints.get("nomercychain-testnet-1/walletConnected").unwrap(), None);
        assert_eq!(f.session.restore().await, Ok(None));
        assert_eq!(f.signer.get_accounts_calls(), 1);
    }
}
