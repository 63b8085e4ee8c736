// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signs and broadcasts transactions through the connected session.

use tracing::{debug, info, warn};

use super::{FeePolicy, TransactionRequest, TransactionResult};
use crate::config::{ChainConfig, GasPrice};
use crate::error::WalletError;
use crate::messages::Message;
use crate::session::WalletSession;

#[derive(Clone)]
pub struct TransactionDispatcher {
    session: WalletSession,
    fee_policy: FeePolicy,
    gas_price: GasPrice,
}

impl TransactionDispatcher {
    /// Dispatcher using the default fixed fee in the base denomination.
    pub fn new(session: WalletSession, config: &ChainConfig) -> Self {
        Self::with_fee_policy(
            session,
            config,
            FeePolicy::default_fixed(&config.base_denom),
        )
    }

    pub fn with_fee_policy(
        session: WalletSession,
        config: &ChainConfig,
        fee_policy: FeePolicy,
    ) -> Self {
        Self {
            session,
            fee_policy,
            gas_price: config.gas_price.clone(),
        }
    }

    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    /// Build a request with this dispatcher's fee policy.
    pub fn prepare(
        &self,
        messages: Vec<Message>,
        memo: impl Into<String>,
    ) -> Result<TransactionRequest, WalletError> {
        let fee = self.fee_policy.resolve(&self.gas_price)?;
        TransactionRequest::new(messages, fee, memo)
    }

    /// Sign and broadcast `request` for the connected account.
    ///
    /// Fails with [`WalletError::NotConnected`] before any network call when
    /// the session is not connected. A non-zero result code is returned as
    /// data. Every returned result triggers one balance refresh; a failure
    /// does not. The refresh is skipped, and never published, once the
    /// session has disconnected or rebound to another account.
    pub async fn dispatch(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionResult, WalletError> {
        let (account, handle, generation) = self.session.binding()?;

        let result = handle.sign_and_broadcast(&account.address, request).await;

        match &result {
            Ok(outcome) if outcome.is_success() => {
                info!(
                    address = %account.address,
                    tx_hash = %outcome.transaction_hash,
                    "Transaction succeeded"
                );
            }
            Ok(outcome) => {
                warn!(
                    address = %account.address,
                    tx_hash = %outcome.transaction_hash,
                    code = outcome.code,
                    raw_log = %outcome.raw_log,
                    "Transaction failed on chain"
                );
            }
            Err(e) if e.is_precondition() => {
                debug!(address = %account.address, error = %e, "Transaction not sent");
                return result;
            }
            Err(e) => {
                warn!(address = %account.address, error = %e, "Transaction dispatch failed");
                return result;
            }
        }

        let still_bound = self
            .session
            .account()
            .is_some_and(|current| current.address == account.address);
        if still_bound {
            self.session
                .balances()
                .refresh_if_current(&account, generation)
                .await;
        } else {
            debug!(address = %account.address, "Session changed during dispatch, skipping balance refresh");
        }

        result
    }

    /// [`prepare`](Self::prepare) then [`dispatch`](Self::dispatch).
    pub async fn dispatch_messages(
        &self,
        messages: Vec<Message>,
        memo: impl Into<String>,
    ) -> Result<TransactionResult, WalletError> {
        self.session.connected()?;
        let request = self.prepare(messages, memo)?;
        self.dispatch(&request).await
    }
}
