// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Distribution module messages.

use serde::{Deserialize, Serialize};

use super::{require, Message, MessageFactory};
use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgWithdrawDelegatorReward {
    pub delegator_address: String,
    pub validator_address: String,
}

impl MessageFactory {
    /// Withdraw rewards accrued with one validator.
    pub fn withdraw_rewards(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::WithdrawDelegatorReward(MsgWithdrawDelegatorReward {
            delegator_address: require("delegator address", delegator_address)?,
            validator_address: require("validator address", validator_address)?,
        }))
    }

    /// One withdrawal message per validator, in the given order.
    pub fn withdraw_all_rewards<S: AsRef<str>>(
        &self,
        delegator_address: &str,
        validator_addresses: &[S],
    ) -> Result<Vec<Message>, WalletError> {
        if validator_addresses.is_empty() {
            return Err(WalletError::invalid_message(
                "at least one validator address is required",
            ));
        }

        validator_addresses
            .iter()
            .map(|validator| self.withdraw_rewards(delegator_address, validator.as_ref()))
            .collect()
    }
}
