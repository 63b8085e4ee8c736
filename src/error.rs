// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller-visible error taxonomy.
//!
//! Every expected failure of the core resolves to a [`WalletError`]. Variants
//! carry plain strings so the error can be stored inside
//! [`SessionState::Error`](crate::session::SessionState) and cloned to every
//! observer. An on-chain execution failure is *not* an error: it is a
//! [`TransactionResult`](crate::tx::TransactionResult) with a non-zero code.

/// Errors surfaced by the wallet core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet extension not found. Please install a compatible wallet extension.")]
    WalletNotFound,

    #[error("Chain registration failed: {0}")]
    ChainRegistration(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("A connection attempt is already in progress")]
    SessionBusy,

    #[error("Wallet is already connected")]
    AlreadyConnected,

    #[error("Connection attempt was cancelled by a disconnect")]
    ConnectionCancelled,

    #[error("Wallet extension returned no accounts")]
    NoAccounts,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Transaction must contain at least one message")]
    EmptyTransaction,

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Transaction encoding failed: {0}")]
    Encoding(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Wallet extension error: {0}")]
    Extension(String),
}

impl WalletError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage(message.into())
    }

    pub fn broadcast(message: impl Into<String>) -> Self {
        Self::Broadcast(message.into())
    }

    /// Whether the failure happened before anything reached the network.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::SessionBusy
                | Self::AlreadyConnected
                | Self::InvalidAmount(_)
                | Self::InvalidMessage(_)
                | Self::InvalidFee(_)
                | Self::EmptyTransaction
        )
    }
}
