// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Extension Interface
//!
//! The browser wallet holds the keys; the core only ever sees accounts and
//! signatures. Everything the core needs from it is expressed by two traits:
//!
//! - [`WalletExtension`]: chain enable / suggestion, signer lookup and the
//!   account-change notification channel.
//! - [`OfflineSigner`]: account listing and signing of a [`SignDoc`].
//!
//! An absent extension is modelled as `None` at construction time and
//! surfaces as [`WalletError::WalletNotFound`](crate::error::WalletError).

pub mod chain_info;
pub mod registrar;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::messages::Message;
use crate::tx::Fee;

pub use chain_info::ChainInfo;
pub use registrar::ChainRegistrar;

/// Errors reported by the wallet extension or its signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("chain {0} is not known to the extension")]
    UnknownChain(String),

    #[error("extension unavailable: {0}")]
    Unavailable(String),
}

/// An account exposed by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    #[serde(default)]
    pub public_key: Vec<u8>,
}

impl Account {
    pub fn new(address: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            public_key,
        }
    }
}

/// Notification that the extension's active account changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountChanged;

/// Everything the signer commits to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDoc {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub messages: Vec<Message>,
    pub fee: Fee,
    pub memo: String,
}

/// A sign document together with the signature produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    pub sign_doc: SignDoc,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Signing capability bound to one chain.
#[async_trait]
pub trait OfflineSigner: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<Account>, ExtensionError>;

    async fn sign(&self, signer_address: &str, doc: &SignDoc) -> Result<SignedTx, ExtensionError>;
}

/// The browser wallet extension.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Ask the user to authorise `chain_id`. Fails if the chain is unknown.
    async fn enable(&self, chain_id: &str) -> Result<(), ExtensionError>;

    /// Register a chain the extension does not know yet.
    async fn experimental_suggest_chain(&self, chain_info: &ChainInfo) -> Result<(), ExtensionError>;

    fn get_offline_signer(&self, chain_id: &str) -> Result<Arc<dyn OfflineSigner>, ExtensionError>;

    /// Subscribe to active-account changes.
    fn account_changes(&self) -> broadcast::Receiver<AccountChanged>;
}
