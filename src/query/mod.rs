// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain Query Service
//!
//! Read-only access to the chain's REST interface.
//!
//! | Operation | Path |
//! |-----------|------|
//! | `balances` | `/cosmos/bank/v1beta1/balances/{address}` |
//! | `delegations` | `/cosmos/staking/v1beta1/delegations/{address}` |
//! | `rewards` | `/cosmos/distribution/v1beta1/delegators/{address}/rewards` |
//! | `account` | `/cosmos/auth/v1beta1/accounts/{address}` |
//! | `validators` | `/cosmos/staking/v1beta1/validators[?status=]` |
//! | `proposals` | `/cosmos/gov/v1beta1/proposals[?proposal_status=]` |
//!
//! Numeric identifiers (account number, sequence, proposal id) arrive as
//! strings and are parsed into integers here.

mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{join_url, ChainConfig};
use crate::messages::Coin;

pub use types::{
    AccountInfo, Delegation, Proposal, ProposalStatus, Rewards, Validator, ValidatorReward,
    ValidatorStatus,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query request failed: {0}")]
    Request(String),

    #[error("query returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("query response was invalid: {0}")]
    InvalidResponse(String),
}

/// Read-only chain queries.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// All balances of `address`, one entry per denomination.
    async fn balances(&self, address: &str) -> Result<Vec<Coin>, QueryError>;

    async fn delegations(&self, address: &str) -> Result<Vec<Delegation>, QueryError>;

    async fn rewards(&self, address: &str) -> Result<Rewards, QueryError>;

    /// Account number and sequence used to build sign documents.
    async fn account(&self, address: &str) -> Result<AccountInfo, QueryError>;

    async fn validators(&self, status: Option<ValidatorStatus>) -> Result<Vec<Validator>, QueryError>;

    async fn proposals(&self, status: Option<ProposalStatus>) -> Result<Vec<Proposal>, QueryError>;
}

/// [`ChainQuery`] over the Cosmos SDK REST gateway.
#[derive(Debug, Clone)]
pub struct RestQueryClient {
    base_url: Url,
    http: Client,
}

impl RestQueryClient {
    pub fn new(config: &ChainConfig) -> Result<Self, QueryError> {
        Self::with_base_url(config.rest_endpoint.clone())
    }

    pub fn with_base_url(base_url: Url) -> Result<Self, QueryError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| QueryError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, QueryError> {
        debug!(path, "Chain query");

        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| QueryError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| QueryError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))
    }
}

#[async_trait]
impl ChainQuery for RestQueryClient {
    async fn balances(&self, address: &str) -> Result<Vec<Coin>, QueryError> {
        let body: types::BalancesResponse = self
            .get_json(&format!("/cosmos/bank/v1beta1/balances/{address}"), &[])
            .await?;
        Ok(body.balances)
    }

    async fn delegations(&self, address: &str) -> Result<Vec<Delegation>, QueryError> {
        let body: types::DelegationsResponse = self
            .get_json(&format!("/cosmos/staking/v1beta1/delegations/{address}"), &[])
            .await?;
        Ok(body.into_delegations())
    }

    async fn rewards(&self, address: &str) -> Result<Rewards, QueryError> {
        self.get_json(
            &format!("/cosmos/distribution/v1beta1/delegators/{address}/rewards"),
            &[],
        )
        .await
    }

    async fn account(&self, address: &str) -> Result<AccountInfo, QueryError> {
        let body: Value = self
            .get_json(&format!("/cosmos/auth/v1beta1/accounts/{address}"), &[])
            .await?;
        AccountInfo::from_response(&body)
    }

    async fn validators(&self, status: Option<ValidatorStatus>) -> Result<Vec<Validator>, QueryError> {
        let query: Vec<(&str, &str)> = status.map(|s| ("status", s.as_str())).into_iter().collect();
        let body: types::ValidatorsResponse = self
            .get_json("/cosmos/staking/v1beta1/validators", &query)
            .await?;
        Ok(body.into_validators())
    }

    async fn proposals(&self, status: Option<ProposalStatus>) -> Result<Vec<Proposal>, QueryError> {
        let query: Vec<(&str, &str)> = status
            .map(|s| ("proposal_status", s.as_str()))
            .into_iter()
            .collect();
        let body: Value = self.get_json("/cosmos/gov/v1beta1/proposals", &query).await?;
        Proposal::list_from_response(&body)
    }
}
