// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain suggestion payload submitted to the extension for unknown chains.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::{ChainConfig, CHAIN_INFO_ENV};

/// BIP-44 coin type shared by Cosmos SDK chains.
pub const COSMOS_COIN_TYPE: u32 = 118;

const GAS_PRICE_LOW: f64 = 0.01;
const GAS_PRICE_AVERAGE: f64 = 0.025;
const GAS_PRICE_HIGH: f64 = 0.04;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc: String,
    pub rest: String,
    pub stake_currency: Currency,
    pub bip44: Bip44,
    pub bech32_config: Bech32Config,
    pub currencies: Vec<Currency>,
    pub fee_currencies: Vec<Currency>,
    pub gas_price_step: GasPriceStep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub coin_denom: String,
    pub coin_minimal_denom: String,
    pub coin_decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44 {
    pub coin_type: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bech32Config {
    pub bech32_prefix_acc_addr: String,
    pub bech32_prefix_acc_pub: String,
    pub bech32_prefix_val_addr: String,
    pub bech32_prefix_val_pub: String,
    pub bech32_prefix_cons_addr: String,
    pub bech32_prefix_cons_pub: String,
}

impl Bech32Config {
    /// Standard Cosmos SDK prefixes derived from the account prefix.
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            bech32_prefix_acc_addr: prefix.to_string(),
            bech32_prefix_acc_pub: format!("{prefix}pub"),
            bech32_prefix_val_addr: format!("{prefix}valoper"),
            bech32_prefix_val_pub: format!("{prefix}valoperpub"),
            bech32_prefix_cons_addr: format!("{prefix}valcons"),
            bech32_prefix_cons_pub: format!("{prefix}valconspub"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasPriceStep {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

impl Default for GasPriceStep {
    fn default() -> Self {
        Self {
            low: GAS_PRICE_LOW,
            average: GAS_PRICE_AVERAGE,
            high: GAS_PRICE_HIGH,
        }
    }
}

impl ChainInfo {
    /// Payload derived from the chain configuration alone.
    pub fn derive(config: &ChainConfig) -> Self {
        let currency = Currency {
            coin_denom: config.display_denom.clone(),
            coin_minimal_denom: config.base_denom.clone(),
            coin_decimals: config.decimal_places,
        };

        Self {
            chain_id: config.chain_id.clone(),
            chain_name: config.chain_name.clone(),
            rpc: config.rpc_endpoint.as_str().trim_end_matches('/').to_string(),
            rest: config.rest_endpoint.as_str().trim_end_matches('/').to_string(),
            stake_currency: currency.clone(),
            bip44: Bip44 {
                coin_type: COSMOS_COIN_TYPE,
            },
            bech32_config: Bech32Config::from_prefix(&config.bech32_prefix),
            currencies: vec![currency.clone()],
            fee_currencies: vec![currency],
            gas_price_step: GasPriceStep::default(),
        }
    }

    /// The configured override if it parses, otherwise the derived payload.
    pub fn resolve(config: &ChainConfig) -> Self {
        let Some(raw) = config.chain_info_override.as_deref() else {
            return Self::derive(config);
        };

        match serde_json::from_str::<ChainInfo>(raw) {
            Ok(info) => info,
            Err(e) => {
                error!(
                    var = CHAIN_INFO_ENV,
                    error = %e,
                    "Invalid chain info override, using derived chain info"
                );
                Self::derive(config)
            }
        }
    }
}
