// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response records of the chain query service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::QueryError;
use crate::messages::Coin;

#[derive(Debug, Deserialize)]
pub(super) struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    /// Decimal share amount as reported by the chain.
    pub shares: String,
    pub balance: Coin,
}

#[derive(Debug, Deserialize)]
pub(super) struct DelegationsResponse {
    #[serde(default)]
    delegation_responses: Vec<DelegationEntry>,
}

#[derive(Debug, Deserialize)]
struct DelegationEntry {
    delegation: DelegationRecord,
    balance: Coin,
}

#[derive(Debug, Deserialize)]
struct DelegationRecord {
    delegator_address: String,
    validator_address: String,
    #[serde(default)]
    shares: String,
}

impl DelegationsResponse {
    pub(super) fn into_delegations(self) -> Vec<Delegation> {
        self.delegation_responses
            .into_iter()
            .map(|entry| Delegation {
                delegator_address: entry.delegation.delegator_address,
                validator_address: entry.delegation.validator_address,
                shares: entry.delegation.shares,
                balance: entry.balance,
            })
            .collect()
    }
}

/// Pending rewards per validator. Amounts are decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    #[serde(default)]
    pub rewards: Vec<ValidatorReward>,
    #[serde(default)]
    pub total: Vec<Coin>,
}

impl Rewards {
    /// Validators with a pending reward, in response order.
    pub fn validator_addresses(&self) -> Vec<String> {
        self.rewards
            .iter()
            .filter(|r| !r.reward.is_empty())
            .map(|r| r.validator_address.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorReward {
    pub validator_address: String,
    #[serde(default)]
    pub reward: Vec<Coin>,
}

/// Signing metadata of an on-chain account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

impl AccountInfo {
    /// Parse `/cosmos/auth/v1beta1/accounts/{address}`.
    ///
    /// Vesting accounts nest the base account one or two levels deep.
    pub(crate) fn from_response(body: &Value) -> Result<Self, QueryError> {
        let account = body
            .get("account")
            .ok_or_else(|| QueryError::InvalidResponse("missing account".into()))?;

        let base = [
            Some(account),
            account.get("base_account"),
            account
                .get("base_vesting_account")
                .and_then(|v| v.get("base_account")),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.get("account_number").is_some())
        .ok_or_else(|| QueryError::InvalidResponse("account has no account_number".into()))?;

        Ok(Self {
            account_number: numeric_field(base, "account_number")?,
            sequence: numeric_field(base, "sequence")?,
        })
    }
}

/// Read a `u64` sent either as a JSON string or number. Missing means 0.
fn numeric_field(value: &Value, field: &str) -> Result<u64, QueryError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|e| QueryError::InvalidResponse(format!("{field} `{s}`: {e}"))),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| QueryError::InvalidResponse(format!("{field} {n} is not a u64"))),
        Some(other) => Err(QueryError::InvalidResponse(format!(
            "{field} has unexpected type: {other}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorStatus {
    Bonded,
    Unbonding,
    Unbonded,
}

impl ValidatorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidatorStatus::Bonded => "BOND_STATUS_BONDED",
            ValidatorStatus::Unbonding => "BOND_STATUS_UNBONDING",
            ValidatorStatus::Unbonded => "BOND_STATUS_UNBONDED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validator {
    pub operator_address: String,
    pub moniker: String,
    pub status: String,
    pub jailed: bool,
    /// Bonded tokens in base units.
    pub tokens: u128,
    /// Commission rate as a decimal string.
    pub commission_rate: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidatorsResponse {
    #[serde(default)]
    validators: Vec<ValidatorRecord>,
}

#[derive(Debug, Deserialize)]
struct ValidatorRecord {
    operator_address: String,
    #[serde(default)]
    jailed: bool,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "u128_from_str")]
    tokens: u128,
    #[serde(default)]
    description: ValidatorDescription,
    #[serde(default)]
    commission: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidatorDescription {
    #[serde(default)]
    moniker: String,
}

impl ValidatorsResponse {
    pub(super) fn into_validators(self) -> Vec<Validator> {
        self.validators
            .into_iter()
            .map(|record| {
                let commission_rate = record
                    .commission
                    .as_ref()
                    .and_then(|c| c.pointer("/commission_rates/rate"))
                    .and_then(Value::as_str)
                    .unwrap_or("0")
                    .to_string();
                Validator {
                    operator_address: record.operator_address,
                    moniker: record.description.moniker,
                    status: record.status,
                    jailed: record.jailed,
                    tokens: record.tokens,
                    commission_rate,
                }
            })
            .collect()
    }
}

fn u128_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::DepositPeriod => "PROPOSAL_STATUS_DEPOSIT_PERIOD",
            ProposalStatus::VotingPeriod => "PROPOSAL_STATUS_VOTING_PERIOD",
            ProposalStatus::Passed => "PROPOSAL_STATUS_PASSED",
            ProposalStatus::Rejected => "PROPOSAL_STATUS_REJECTED",
            ProposalStatus::Failed => "PROPOSAL_STATUS_FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub proposal_id: u64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub voting_end_time: Option<DateTime<Utc>>,
}

impl Proposal {
    pub(crate) fn list_from_response(body: &Value) -> Result<Vec<Self>, QueryError> {
        let Some(items) = body.get("proposals") else {
            return Ok(Vec::new());
        };
        let items = items
            .as_array()
            .ok_or_else(|| QueryError::InvalidResponse("proposals is not an array".into()))?;
        items.iter().map(Self::from_value).collect()
    }

    fn from_value(value: &Value) -> Result<Self, QueryError> {
        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let voting_end_time = value
            .get("voting_end_time")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Self {
            proposal_id: numeric_field(value, "proposal_id")?,
            title: text("/content/title"),
            description: text("/content/description"),
            status: text("/status"),
            voting_end_time,
        })
    }
}
