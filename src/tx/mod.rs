// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transactions
//!
//! A [`TransactionRequest`] is an ordered, non-empty list of messages with an
//! explicit fee and a memo. There is no implicit zero-fee transaction: the
//! fee always carries at least one coin and a non-zero gas limit.
//!
//! A [`TransactionResult`] with a non-zero `code` is an on-chain execution
//! failure and is returned as data; only transport failures are errors.

pub mod dispatcher;
pub mod signing;

use serde::{Deserialize, Serialize};

use crate::config::GasPrice;
use crate::error::WalletError;
use crate::messages::{Coin, Message};

pub use dispatcher::TransactionDispatcher;
pub use signing::{
    BroadcastFailure, Broadcaster, ChainBackend, EncodeError, JsonTxEncoder, RpcBroadcaster,
    SigningHandle, TxEncoder,
};

/// Fixed fee amount in base units.
pub const DEFAULT_FEE_AMOUNT: u128 = 5_000;
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub amount: Vec<Coin>,
    #[serde(rename = "gas")]
    pub gas_limit: u64,
}

impl Fee {
    pub fn new(amount: Coin, gas_limit: u64) -> Self {
        Self {
            amount: vec![amount],
            gas_limit,
        }
    }

    fn validate(&self) -> Result<(), WalletError> {
        if self.gas_limit == 0 {
            return Err(WalletError::InvalidFee("gas limit must be greater than 0".into()));
        }
        if self.amount.is_empty() {
            return Err(WalletError::InvalidFee("fee must contain at least one coin".into()));
        }
        for coin in &self.amount {
            if coin.denom.trim().is_empty() {
                return Err(WalletError::InvalidFee("fee denomination is empty".into()));
            }
            if coin.amount.is_empty() || !coin.amount.bytes().all(|b| b.is_ascii_digit()) {
                return Err(WalletError::InvalidFee(format!(
                    "fee amount `{}` is not a base-unit integer",
                    coin.amount
                )));
            }
        }
        Ok(())
    }
}

/// How the dispatcher prices a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeePolicy {
    /// Use this fee verbatim.
    Fixed(Fee),
    /// Price `gas_limit` with the configured gas price, rounded up.
    GasPrice { gas_limit: u64 },
}

impl FeePolicy {
    /// 5000 base units for 200000 gas.
    pub fn default_fixed(denom: &str) -> Self {
        FeePolicy::Fixed(Fee::new(
            Coin::new(denom, DEFAULT_FEE_AMOUNT),
            DEFAULT_GAS_LIMIT,
        ))
    }

    pub fn resolve(&self, gas_price: &GasPrice) -> Result<Fee, WalletError> {
        match self {
            FeePolicy::Fixed(fee) => Ok(fee.clone()),
            FeePolicy::GasPrice { gas_limit } => {
                if gas_price.is_zero() {
                    return Err(WalletError::InvalidFee(format!(
                        "gas price {gas_price} yields a zero fee"
                    )));
                }
                let amount = gas_price.fee_for_gas(*gas_limit);
                Ok(Fee::new(Coin::new(&gas_price.denom, amount), *gas_limit))
            }
        }
    }
}

/// A validated transaction ready for signing.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    messages: Vec<Message>,
    fee: Fee,
    memo: String,
}

impl TransactionRequest {
    pub fn new(
        messages: Vec<Message>,
        fee: Fee,
        memo: impl Into<String>,
    ) -> Result<Self, WalletError> {
        if messages.is_empty() {
            return Err(WalletError::EmptyTransaction);
        }
        fee.validate()?;

        Ok(Self {
            messages,
            fee,
            memo: memo.into(),
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn fee(&self) -> &Fee {
        &self.fee
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }
}

/// Chain response to a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    /// 0 on success.
    pub code: u32,
    pub transaction_hash: String,
    pub raw_log: String,
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}
