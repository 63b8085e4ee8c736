// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bank module messages.

use serde::{Deserialize, Serialize};

use super::{require, Coin, Message, MessageFactory};
use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl MessageFactory {
    /// Transfer `amount` display tokens from `from_address` to `to_address`.
    pub fn send(
        &self,
        from_address: &str,
        to_address: &str,
        amount: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::Send(MsgSend {
            from_address: require("sender address", from_address)?,
            to_address: require("recipient address", to_address)?,
            amount: vec![self.positive_coin("transfer amount", amount)?],
        }))
    }
}
