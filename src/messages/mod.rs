// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed chain operations.
//!
//! A [`Message`] is a closed set of operation kinds, one payload shape per
//! kind. It serialises to the `{ "typeUrl": ..., "value": { ... } }` shape
//! expected by the chain adapter. Messages are only produced by
//! [`MessageFactory`]; the builders live next to the payloads of each module:
//!
//! - `bank` - token transfers
//! - `staking` - delegate / undelegate / redelegate
//! - `distribution` - reward withdrawal
//! - `governance` - proposals, deposits and votes
//! - `custom` - NoMercyChain modules (dynacontract, hyperchain, truthgpt, deai)

pub mod bank;
pub mod custom;
pub mod distribution;
pub mod governance;
pub mod staking;

use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::units::UnitConverter;

pub use bank::MsgSend;
pub use custom::{
    MsgAddLearningData, MsgCreateAiAgent, MsgCreateChain, MsgCreateDynaContract,
    MsgExecuteAiAgent, MsgExecuteDynaContract, MsgJoinChain, MsgSubmitOracleQuery,
    MsgVerifyOracleResponse, OracleQueryType,
};
pub use distribution::MsgWithdrawDelegatorReward;
pub use governance::{MsgDeposit, MsgSubmitProposal, MsgVote, ProposalContent, TextProposal, VoteOption};
pub use staking::{MsgBeginRedelegate, MsgDelegate, MsgUndelegate};

/// An amount of a single denomination, in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl ToString) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }
}

/// Every operation the wallet can sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typeUrl", content = "value")]
pub enum Message {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    Send(MsgSend),
    #[serde(rename = "/cosmos.staking.v1beta1.MsgDelegate")]
    Delegate(MsgDelegate),
    #[serde(rename = "/cosmos.staking.v1beta1.MsgUndelegate")]
    Undelegate(MsgUndelegate),
    #[serde(rename = "/cosmos.staking.v1beta1.MsgBeginRedelegate")]
    BeginRedelegate(MsgBeginRedelegate),
    #[serde(rename = "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward")]
    WithdrawDelegatorReward(MsgWithdrawDelegatorReward),
    #[serde(rename = "/cosmos.gov.v1beta1.MsgSubmitProposal")]
    SubmitProposal(MsgSubmitProposal),
    #[serde(rename = "/cosmos.gov.v1beta1.MsgDeposit")]
    Deposit(MsgDeposit),
    #[serde(rename = "/cosmos.gov.v1beta1.MsgVote")]
    Vote(MsgVote),
    #[serde(rename = "/nomercychain.nmxchain.dynacontract.MsgCreateDynaContract")]
    CreateDynaContract(MsgCreateDynaContract),
    #[serde(rename = "/nomercychain.nmxchain.dynacontract.MsgExecuteDynaContract")]
    ExecuteDynaContract(MsgExecuteDynaContract),
    #[serde(rename = "/nomercychain.nmxchain.dynacontract.MsgAddLearningData")]
    AddLearningData(MsgAddLearningData),
    #[serde(rename = "/nomercychain.nmxchain.hyperchain.MsgCreateChain")]
    CreateChain(MsgCreateChain),
    #[serde(rename = "/nomercychain.nmxchain.hyperchain.MsgJoinChain")]
    JoinChain(MsgJoinChain),
    #[serde(rename = "/nomercychain.nmxchain.truthgpt.MsgSubmitOracleQuery")]
    SubmitOracleQuery(MsgSubmitOracleQuery),
    #[serde(rename = "/nomercychain.nmxchain.truthgpt.MsgVerifyOracleResponse")]
    VerifyOracleResponse(MsgVerifyOracleResponse),
    #[serde(rename = "/nomercychain.nmxchain.deai.MsgCreateAIAgent")]
    CreateAiAgent(MsgCreateAiAgent),
    #[serde(rename = "/nomercychain.nmxchain.deai.MsgExecuteAIAgent")]
    ExecuteAiAgent(MsgExecuteAiAgent),
}

impl Message {
    /// Protobuf type URL identifying the operation.
    pub fn type_url(&self) -> &'static str {
        match self {
            Message::Send(_) => "/cosmos.bank.v1beta1.MsgSend",
            Message::Delegate(_) => "/cosmos.staking.v1beta1.MsgDelegate",
            Message::Undelegate(_) => "/cosmos.staking.v1beta1.MsgUndelegate",
            Message::BeginRedelegate(_) => "/cosmos.staking.v1beta1.MsgBeginRedelegate",
            Message::WithdrawDelegatorReward(_) => {
                "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward"
            }
            Message::SubmitProposal(_) => "/cosmos.gov.v1beta1.MsgSubmitProposal",
            Message::Deposit(_) => "/cosmos.gov.v1beta1.MsgDeposit",
            Message::Vote(_) => "/cosmos.gov.v1beta1.MsgVote",
            Message::CreateDynaContract(_) => {
                "/nomercychain.nmxchain.dynacontract.MsgCreateDynaContract"
            }
            Message::ExecuteDynaContract(_) => {
                "/nomercychain.nmxchain.dynacontract.MsgExecuteDynaContract"
            }
            Message::AddLearningData(_) => "/nomercychain.nmxchain.dynacontract.MsgAddLearningData",
            Message::CreateChain(_) => "/nomercychain.nmxchain.hyperchain.MsgCreateChain",
            Message::JoinChain(_) => "/nomercychain.nmxchain.hyperchain.MsgJoinChain",
            Message::SubmitOracleQuery(_) => "/nomercychain.nmxchain.truthgpt.MsgSubmitOracleQuery",
            Message::VerifyOracleResponse(_) => {
                "/nomercychain.nmxchain.truthgpt.MsgVerifyOracleResponse"
            }
            Message::CreateAiAgent(_) => "/nomercychain.nmxchain.deai.MsgCreateAIAgent",
            Message::ExecuteAiAgent(_) => "/nomercychain.nmxchain.deai.MsgExecuteAIAgent",
        }
    }
}

/// Builds [`Message`]s for the configured chain.
///
/// Human-facing amounts are converted to base units of the configured base
/// denomination. Fixed deposits and fees of the chain modules are owned here,
/// never supplied by callers.
#[derive(Debug, Clone)]
pub struct MessageFactory {
    denom: String,
    converter: UnitConverter,
}

impl MessageFactory {
    pub fn new(config: &ChainConfig) -> Self {
        Self::with_denom(config.base_denom.clone(), config.decimal_places)
    }

    pub fn with_denom(denom: impl Into<String>, decimal_places: u8) -> Self {
        Self {
            denom: denom.into(),
            converter: UnitConverter::new(decimal_places),
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    /// Convert a human amount into a coin of the base denomination.
    fn coin(&self, amount: &str) -> Result<Coin, WalletError> {
        let units = self.converter.to_base_units(amount)?;
        Ok(Coin::new(&self.denom, units))
    }

    /// Like [`coin`](Self::coin) but rejects a zero amount.
    fn positive_coin(&self, field: &str, amount: &str) -> Result<Coin, WalletError> {
        let units = self.converter.parse(amount)?;
        if units == 0 {
            return Err(WalletError::invalid_amount(format!(
                "{field} must be greater than 0"
            )));
        }
        Ok(Coin::new(&self.denom, units))
    }

    /// A policy amount expressed in whole display tokens.
    fn policy_coin(&self, whole_tokens: u64) -> Coin {
        let units = (whole_tokens as u128).saturating_mul(10u128.pow(self.converter.decimals() as u32));
        Coin::new(&self.denom, units)
    }
}

/// Reject empty identifiers.
fn require(field: &str, value: &str) -> Result<String, WalletError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WalletError::invalid_message(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn factory() -> MessageFactory {
        MessageFactory::with_denom("unmx", 6)
    }

    #[test]
    fn serialized_type_url_matches_type_url() {
        let f = factory();
        let messages = vec![
            f.send("nmx1from", "nmx1to", "1").unwrap(),
            f.delegate("nmx1d", "nmxvaloper1v", "1").unwrap(),
            f.undelegate("nmx1d", "nmxvaloper1v", "1").unwrap(),
            f.redelegate("nmx1d", "nmxvaloper1a", "nmxvaloper1b", "1").unwrap(),
            f.withdraw_rewards("nmx1d", "nmxvaloper1v").unwrap(),
            f.submit_proposal("nmx1p", "Title", "Body", "10").unwrap(),
            f.deposit("nmx1p", 1, "5").unwrap(),
            f.vote("nmx1p", 1, VoteOption::Yes).unwrap(),
            f.create_contract("nmx1c", "name", "code", "", "gpt").unwrap(),
            f.execute_contract("nmx1c", "c1", "run", &json!({}), None).unwrap(),
            f.add_learning_data("nmx1c", "c1", "TRAINING", &json!([1])).unwrap(),
            f.create_hyperchain("nmx1c", "hc", "", "app", &["bank".into()], "").unwrap(),
            f.join_hyperchain("nmxvaloper1v", "hc-1", "50").unwrap(),
            f.submit_oracle_query("nmx1s", OracleQueryType::FactCheck, "q", "nmx1o").unwrap(),
            f.verify_oracle_response("nmx1v", "q1", true, "ok").unwrap(),
            f.create_ai_agent("nmx1c", "agent", "", "gpt", "prompt").unwrap(),
            f.execute_ai_agent("nmx1s", "a1", "input").unwrap(),
        ];

        for message in messages {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["typeUrl"], message.type_url());
            assert!(value["value"].is_object());

            let back: Message = serde_json::from_value(value).unwrap();
            assert_eq!(back, message);
        }
    }

    #[test]
    fn policy_coin_uses_decimals() {
        assert_eq!(factory().policy_coin(100), Coin::new("unmx", "100000000"));
        assert_eq!(
            MessageFactory::with_denom("aeth", 18).policy_coin(1),
            Coin::new("aeth", "1000000000000000000")
        );
    }

    #[test]
    fn require_trims_and_rejects_blank() {
        assert_eq!(require("field", " nmx1 ").unwrap(), "nmx1");
        assert!(matches!(
            require("delegator address", "   "),
            Err(WalletError::InvalidMessage(msg)) if msg.contains("delegator address")
        ));
    }

    #[test]
    fn factory_from_config() {
        let config = ChainConfig::default();
        let f = MessageFactory::new(&config);
        assert_eq!(f.denom(), "unmx");
        assert_eq!(f.coin("2.5").unwrap(), Coin::new("unmx", "2500000"));
    }
}
