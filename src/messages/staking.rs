// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staking module messages.

use serde::{Deserialize, Serialize};

use super::{require, Coin, Message, MessageFactory};
use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgDelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgUndelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgBeginRedelegate {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: Coin,
}

impl MessageFactory {
    /// Delegate `amount` display tokens to a validator.
    pub fn delegate(
        &self,
        delegator_address: &str,
        validator_address: &str,
        amount: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::Delegate(MsgDelegate {
            delegator_address: require("delegator address", delegator_address)?,
            validator_address: require("validator address", validator_address)?,
            amount: self.positive_coin("delegation amount", amount)?,
        }))
    }

    /// Start unbonding `amount` display tokens from a validator.
    pub fn undelegate(
        &self,
        delegator_address: &str,
        validator_address: &str,
        amount: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::Undelegate(MsgUndelegate {
            delegator_address: require("delegator address", delegator_address)?,
            validator_address: require("validator address", validator_address)?,
            amount: self.positive_coin("undelegation amount", amount)?,
        }))
    }

    /// Move `amount` display tokens of stake between validators.
    pub fn redelegate(
        &self,
        delegator_address: &str,
        validator_src_address: &str,
        validator_dst_address: &str,
        amount: &str,
    ) -> Result<Message, WalletError> {
        let src = require("source validator address", validator_src_address)?;
        let dst = require("destination validator address", validator_dst_address)?;
        if src == dst {
            return Err(WalletError::invalid_message(
                "source and destination validators must differ",
            ));
        }

        Ok(Message::BeginRedelegate(MsgBeginRedelegate {
            delegator_address: require("delegator address", delegator_address)?,
            validator_src_address: src,
            validator_dst_address: dst,
            amount: self.positive_coin("redelegation amount", amount)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factory() -> MessageFactory {
        MessageFactory::with_denom("unmx", 6)
    }

    #[test]
    fn delegate_converts_amount() {
        let message = factory().delegate("addr1", "valAddr1", "100").unwrap();

        assert_eq!(
            message,
            Message::Delegate(MsgDelegate {
                delegator_address: "addr1".to_string(),
                validator_address: "valAddr1".to_string(),
                amount: Coin::new("unmx", "100000000"),
            })
        );
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "typeUrl": "/cosmos.staking.v1beta1.MsgDelegate",
                "value": {
                    "delegatorAddress": "addr1",
                    "validatorAddress": "valAddr1",
                    "amount": { "denom": "unmx", "amount": "100000000" }
                }
            })
        );
    }

    #[test]
    fn undelegate_uses_own_type_url() {
        let message = factory().undelegate("addr1", "valAddr1", "0.5").unwrap();
        assert_eq!(message.type_url(), "/cosmos.staking.v1beta1.MsgUndelegate");
        match message {
            Message::Undelegate(msg) => assert_eq!(msg.amount.amount, "500000"),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn redelegate_fields() {
        let message = factory()
            .redelegate("addr1", "valA", "valB", "1")
            .unwrap();
        assert_eq!(
            serde_json::to_value(&message).unwrap()["value"],
            json!({
                "delegatorAddress": "addr1",
                "validatorSrcAddress": "valA",
                "validatorDstAddress": "valB",
                "amount": { "denom": "unmx", "amount": "1000000" }
            })
        );
    }

    #[test]
    fn redelegate_rejects_same_validator() {
        assert!(matches!(
            factory().redelegate("addr1", "valA", "valA", "1"),
            Err(WalletError::InvalidMessage(_))
        ));
    }

    #[test]
    fn staking_rejects_missing_identifiers() {
        let f = factory();
        assert!(matches!(f.delegate("addr1", "", "1"), Err(WalletError::InvalidMessage(_))));
        assert!(matches!(f.undelegate("", "val", "1"), Err(WalletError::InvalidMessage(_))));
        assert!(matches!(f.delegate("addr1", "val", "abc"), Err(WalletError::InvalidAmount(_))));
    }
}
