// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NoMercyChain module messages: dynacontract, hyperchain, truthgpt and deai.
//!
//! Deposits and fees of these modules are fixed by chain policy and filled in
//! by the factory:
//!
//! | Message                  | Field     | Amount (NMX) |
//! |--------------------------|-----------|--------------|
//! | `MsgCreateDynaContract`  | `deposit` | 100          |
//! | `MsgCreateChain`         | `deposit` | 10000        |
//! | `MsgCreateAIAgent`       | `deposit` | 100          |
//! | `MsgExecuteAIAgent`      | `fee`     | 1            |
//! | `MsgSubmitOracleQuery`   | `fee`     | see [`OracleQueryType::fee`] |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{require, Coin, Message, MessageFactory};
use crate::error::WalletError;

pub const CONTRACT_DEPOSIT: u64 = 100;
pub const HYPERCHAIN_DEPOSIT: u64 = 10_000;
pub const AI_AGENT_DEPOSIT: u64 = 100;
pub const AI_AGENT_EXECUTION_FEE: u64 = 1;

/// Contract type code of a standard contract.
const STANDARD_CONTRACT_TYPE: &str = "1";

/// Provenance tag attached to learning data submitted by this client.
const LEARNING_DATA_SOURCE: &str = "client";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateDynaContract {
    pub creator: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub ai_model: String,
    pub contract_type: String,
    pub deposit: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgExecuteDynaContract {
    pub sender: String,
    pub contract_id: String,
    pub function_name: String,
    /// JSON-encoded call parameters.
    pub params: String,
    pub amount: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgAddLearningData {
    pub sender: String,
    pub contract_id: String,
    pub data_type: String,
    /// JSON-encoded payload.
    pub data: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateChain {
    pub creator: String,
    pub name: String,
    pub description: String,
    pub chain_type: String,
    pub modules: Vec<String>,
    pub ai_prompt: String,
    pub deposit: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgJoinChain {
    pub validator: String,
    pub chain_id: String,
    pub stake: Coin,
}

/// Kind of oracle query; determines the query fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OracleQueryType {
    FactCheck,
    DataFeed,
    Prediction,
}

impl OracleQueryType {
    /// Query fee in whole display tokens.
    pub fn fee(self) -> u64 {
        match self {
            OracleQueryType::FactCheck => 5,
            OracleQueryType::DataFeed => 2,
            OracleQueryType::Prediction => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgSubmitOracleQuery {
    pub sender: String,
    pub query_type: OracleQueryType,
    pub query_prompt: String,
    pub provider: String,
    pub fee: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVerifyOracleResponse {
    pub verifier: String,
    pub query_id: String,
    pub is_valid: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateAiAgent {
    pub creator: String,
    pub name: String,
    pub description: String,
    pub ai_model: String,
    pub prompt: String,
    pub deposit: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgExecuteAiAgent {
    pub sender: String,
    pub agent_id: String,
    pub input: String,
    pub fee: Coin,
}

fn encode_json(field: &str, value: &Value) -> Result<String, WalletError> {
    serde_json::to_string(value)
        .map_err(|e| WalletError::invalid_message(format!("{field} is not serialisable: {e}")))
}

impl MessageFactory {
    // dynacontract

    pub fn create_contract(
        &self,
        creator: &str,
        name: &str,
        code: &str,
        description: &str,
        ai_model: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::CreateDynaContract(MsgCreateDynaContract {
            creator: require("creator address", creator)?,
            name: require("contract name", name)?,
            code: require("contract code", code)?,
            description: description.to_string(),
            ai_model: require("AI model", ai_model)?,
            contract_type: STANDARD_CONTRACT_TYPE.to_string(),
            deposit: self.policy_coin(CONTRACT_DEPOSIT),
        }))
    }

    /// Call a contract function. `amount` defaults to zero when absent.
    pub fn execute_contract(
        &self,
        sender: &str,
        contract_id: &str,
        function_name: &str,
        params: &Value,
        amount: Option<&str>,
    ) -> Result<Message, WalletError> {
        Ok(Message::ExecuteDynaContract(MsgExecuteDynaContract {
            sender: require("sender address", sender)?,
            contract_id: require("contract id", contract_id)?,
            function_name: require("function name", function_name)?,
            params: encode_json("params", params)?,
            amount: self.coin(amount.unwrap_or("0"))?,
        }))
    }

    pub fn add_learning_data(
        &self,
        sender: &str,
        contract_id: &str,
        data_type: &str,
        data: &Value,
    ) -> Result<Message, WalletError> {
        Ok(Message::AddLearningData(MsgAddLearningData {
            sender: require("sender address", sender)?,
            contract_id: require("contract id", contract_id)?,
            data_type: require("data type", data_type)?,
            data: encode_json("data", data)?,
            source: LEARNING_DATA_SOURCE.to_string(),
        }))
    }

    // hyperchain

    pub fn create_hyperchain(
        &self,
        creator: &str,
        name: &str,
        description: &str,
        chain_type: &str,
        modules: &[String],
        ai_prompt: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::CreateChain(MsgCreateChain {
            creator: require("creator address", creator)?,
            name: require("chain name", name)?,
            description: description.to_string(),
            chain_type: require("chain type", chain_type)?,
            modules: modules.to_vec(),
            ai_prompt: ai_prompt.to_string(),
            deposit: self.policy_coin(HYPERCHAIN_DEPOSIT),
        }))
    }

    pub fn join_hyperchain(
        &self,
        validator: &str,
        chain_id: &str,
        stake: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::JoinChain(MsgJoinChain {
            validator: require("validator address", validator)?,
            chain_id: require("hyperchain id", chain_id)?,
            stake: self.positive_coin("stake", stake)?,
        }))
    }

    // truthgpt

    pub fn submit_oracle_query(
        &self,
        sender: &str,
        query_type: OracleQueryType,
        query_prompt: &str,
        provider: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::SubmitOracleQuery(MsgSubmitOracleQuery {
            sender: require("sender address", sender)?,
            query_type,
            query_prompt: require("query prompt", query_prompt)?,
            provider: require("provider address", provider)?,
            fee: self.policy_coin(query_type.fee()),
        }))
    }

    pub fn verify_oracle_response(
        &self,
        verifier: &str,
        query_id: &str,
        is_valid: bool,
        feedback: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::VerifyOracleResponse(MsgVerifyOracleResponse {
            verifier: require("verifier address", verifier)?,
            query_id: require("query id", query_id)?,
            is_valid,
            feedback: feedback.to_string(),
        }))
    }

    // deai

    pub fn create_ai_agent(
        &self,
        creator: &str,
        name: &str,
        description: &str,
        ai_model: &str,
        prompt: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::CreateAiAgent(MsgCreateAiAgent {
            creator: require("creator address", creator)?,
            name: require("agent name", name)?,
            description: description.to_string(),
            ai_model: require("AI model", ai_model)?,
            prompt: require("agent prompt", prompt)?,
            deposit: self.policy_coin(AI_AGENT_DEPOSIT),
        }))
    }

    pub fn execute_ai_agent(
        &self,
        sender: &str,
        agent_id: &str,
        input: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::ExecuteAiAgent(MsgExecuteAiAgent {
            sender: require("sender address", sender)?,
            agent_id: require("agent id", agent_id)?,
            input: input.to_string(),
            fee: self.policy_coin(AI_AGENT_EXECUTION_FEE),
        }))
    }
}
