// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory collaborators shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::extension::{
    Account, AccountChanged, ChainInfo, ExtensionError, OfflineSigner, SignDoc, SignedTx,
    WalletExtension,
};
use crate::messages::Coin;
use crate::query::{
    AccountInfo, ChainQuery, Delegation, Proposal, ProposalStatus, QueryError, Rewards, Validator,
    ValidatorStatus,
};
use crate::tx::{BroadcastFailure, Broadcaster, ChainBackend, JsonTxEncoder, TransactionResult};

pub(crate) fn account(address: &str) -> Account {
    Account::new(address, vec![2, 0xAB])
}

pub(crate) fn backend(query: Arc<MockQuery>, broadcaster: Arc<MockBroadcaster>) -> ChainBackend {
    ChainBackend {
        query,
        encoder: Arc::new(JsonTxEncoder),
        broadcaster,
    }
}

pub(crate) struct MockSigner {
    accounts: Mutex<Vec<Account>>,
    delay: Mutex<Option<Duration>>,
    reject: AtomicBool,
    get_accounts_calls: AtomicUsize,
    signed: Mutex<Vec<SignDoc>>,
}

impl MockSigner {
    pub(crate) fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            delay: Mutex::new(None),
            reject: AtomicBool::new(false),
            get_accounts_calls: AtomicUsize::new(0),
            signed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_accounts(&self, accounts: Vec<Account>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    /// Make `get_accounts` take `delay` of (virtual) time.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn reject_signing(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub(crate) fn get_accounts_calls(&self) -> usize {
        self.get_accounts_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_signed(&self) -> Option<SignDoc> {
        self.signed.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl OfflineSigner for MockSigner {
    async fn get_accounts(&self) -> Result<Vec<Account>, ExtensionError> {
        self.get_accounts_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn sign(&self, _signer_address: &str, doc: &SignDoc) -> Result<SignedTx, ExtensionError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(ExtensionError::Rejected("user denied".into()));
        }
        self.signed.lock().unwrap().push(doc.clone());
        Ok(SignedTx {
            sign_doc: doc.clone(),
            signature: b"signature".to_vec(),
            public_key: vec![2, 0xAB],
        })
    }
}

pub(crate) struct MockExtension {
    signer: Arc<MockSigner>,
    chain_known: AtomicBool,
    reject_suggestion: AtomicBool,
    enable_calls: AtomicUsize,
    suggest_calls: AtomicUsize,
    suggested: Mutex<Option<ChainInfo>>,
    changes: broadcast::Sender<AccountChanged>,
}

impl MockExtension {
    /// An extension that already knows the chain.
    pub(crate) fn new(signer: Arc<MockSigner>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            signer,
            chain_known: AtomicBool::new(true),
            reject_suggestion: AtomicBool::new(false),
            enable_calls: AtomicUsize::new(0),
            suggest_calls: AtomicUsize::new(0),
            suggested: Mutex::new(None),
            changes,
        }
    }

    pub(crate) fn unknown_chain(self) -> Self {
        self.chain_known.store(false, Ordering::SeqCst);
        self
    }

    pub(crate) fn rejecting_suggestion(self) -> Self {
        self.reject_suggestion.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn suggested(&self) -> Option<ChainInfo> {
        self.suggested.lock().unwrap().clone()
    }

    pub(crate) fn notify_account_change(&self) {
        let _ = self.changes.send(AccountChanged);
    }
}

#[async_trait]
impl WalletExtension for MockExtension {
    async fn enable(&self, chain_id: &str) -> Result<(), ExtensionError> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        if self.chain_known.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ExtensionError::UnknownChain(chain_id.to_string()))
        }
    }

    async fn experimental_suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), ExtensionError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_suggestion.load(Ordering::SeqCst) {
            return Err(ExtensionError::Rejected("user declined chain".into()));
        }
        *self.suggested.lock().unwrap() = Some(chain_info.clone());
        self.chain_known.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn get_offline_signer(&self, _chain_id: &str) -> Result<Arc<dyn OfflineSigner>, ExtensionError> {
        let signer: Arc<dyn OfflineSigner> = self.signer.clone();
        Ok(signer)
    }

    fn account_changes(&self) -> broadcast::Receiver<AccountChanged> {
        self.changes.subscribe()
    }
}

pub(crate) struct MockQuery {
    balances: Mutex<Vec<Coin>>,
    fail_balances: AtomicBool,
    balance_calls: AtomicUsize,
    account: Mutex<AccountInfo>,
    fail_account: AtomicBool,
    account_calls: AtomicUsize,
}

impl MockQuery {
    pub(crate) fn new() -> Self {
        Self {
            balances: Mutex::new(vec![Coin::new("unmx", "1000000")]),
            fail_balances: AtomicBool::new(false),
            balance_calls: AtomicUsize::new(0),
            account: Mutex::new(AccountInfo {
                account_number: 1,
                sequence: 0,
            }),
            fail_account: AtomicBool::new(false),
            account_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_balances(&self, balances: Vec<Coin>) {
        *self.balances.lock().unwrap() = balances;
    }

    pub(crate) fn fail_balances(&self, fail: bool) {
        self.fail_balances.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_account(&self, account_number: u64, sequence: u64) {
        *self.account.lock().unwrap() = AccountInfo {
            account_number,
            sequence,
        };
    }

    pub(crate) fn fail_account(&self) {
        self.fail_account.store(true, Ordering::SeqCst);
    }

    pub(crate) fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainQuery for MockQuery {
    async fn balances(&self, _address: &str) -> Result<Vec<Coin>, QueryError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balances.load(Ordering::SeqCst) {
            return Err(QueryError::Request("connection refused".into()));
        }
        Ok(self.balances.lock().unwrap().clone())
    }

    async fn delegations(&self, _address: &str) -> Result<Vec<Delegation>, QueryError> {
        Ok(Vec::new())
    }

    async fn rewards(&self, _address: &str) -> Result<Rewards, QueryError> {
        Ok(Rewards::default())
    }

    async fn account(&self, _address: &str) -> Result<AccountInfo, QueryError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_account.load(Ordering::SeqCst) {
            return Err(QueryError::Status {
                status: 404,
                body: "account not found".into(),
            });
        }
        Ok(*self.account.lock().unwrap())
    }

    async fn validators(&self, _status: Option<ValidatorStatus>) -> Result<Vec<Validator>, QueryError> {
        Ok(Vec::new())
    }

    async fn proposals(&self, _status: Option<ProposalStatus>) -> Result<Vec<Proposal>, QueryError> {
        Ok(Vec::new())
    }
}

pub(crate) struct MockBroadcaster {
    response: Mutex<Result<TransactionResult, BroadcastFailure>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockBroadcaster {
    pub(crate) fn succeeding() -> Self {
        Self::responding(TransactionResult {
            code: 0,
            transaction_hash: "A1B2C3".into(),
            raw_log: "[]".into(),
        })
    }

    pub(crate) fn responding(result: TransactionResult) -> Self {
        Self {
            response: Mutex::new(Ok(result)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(failure: BroadcastFailure) -> Self {
        Self {
            response: Mutex::new(Err(failure)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every broadcast take `delay` of (virtual) time.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broadcaster for MockBroadcaster {
    async fn broadcast(&self, _tx_bytes: &[u8]) -> Result<TransactionResult, BroadcastFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}
