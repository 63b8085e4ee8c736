// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain Configuration
//!
//! Immutable chain parameters loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NMX_CHAIN_ID` | Chain identifier | `nomercychain-testnet-1` |
//! | `NMX_CHAIN_NAME` | Display name used in chain suggestions | `NoMercyChain Testnet` |
//! | `NMX_RPC_ENDPOINT` | Tendermint RPC (broadcast) endpoint | `http://localhost:26657` |
//! | `NMX_REST_ENDPOINT` | REST query endpoint | `http://localhost:1317` |
//! | `NMX_GAS_PRICE` | Gas price as `<decimal><denom>` | `0.025unmx` |
//! | `NMX_DENOM` | Base denomination | `unmx` |
//! | `NMX_DENOM_NAME` | Display denomination | `NMX` |
//! | `NMX_DECIMAL_PLACES` | Decimal places of the display denomination | `6` |
//! | `NMX_BECH32_PREFIX` | Account address prefix | `nmx` |
//! | `NMX_CHAIN_INFO` | Full JSON chain suggestion override | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `nmx_wallet=info` |

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::units::{UnitConverter, MAX_DECIMAL_PLACES};

pub const CHAIN_ID_ENV: &str = "NMX_CHAIN_ID";
pub const CHAIN_NAME_ENV: &str = "NMX_CHAIN_NAME";
pub const RPC_ENDPOINT_ENV: &str = "NMX_RPC_ENDPOINT";
pub const REST_ENDPOINT_ENV: &str = "NMX_REST_ENDPOINT";
pub const GAS_PRICE_ENV: &str = "NMX_GAS_PRICE";
pub const DENOM_ENV: &str = "NMX_DENOM";
pub const DENOM_NAME_ENV: &str = "NMX_DENOM_NAME";
pub const DECIMAL_PLACES_ENV: &str = "NMX_DECIMAL_PLACES";
pub const BECH32_PREFIX_ENV: &str = "NMX_BECH32_PREFIX";
pub const CHAIN_INFO_ENV: &str = "NMX_CHAIN_INFO";

const DEFAULT_CHAIN_ID: &str = "nomercychain-testnet-1";
const DEFAULT_CHAIN_NAME: &str = "NoMercyChain Testnet";
const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:26657";
const DEFAULT_REST_ENDPOINT: &str = "http://localhost:1317";
const DEFAULT_GAS_PRICE: &str = "0.025unmx";
const DEFAULT_DENOM: &str = "unmx";
const DEFAULT_DENOM_NAME: &str = "NMX";
const DEFAULT_DECIMAL_PLACES: u8 = 6;
const DEFAULT_BECH32_PREFIX: &str = "nmx";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration value missing: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Chain parameters. Immutable for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    pub chain_id: String,
    pub chain_name: String,
    pub display_denom: String,
    pub base_denom: String,
    pub decimal_places: u8,
    pub rpc_endpoint: Url,
    pub rest_endpoint: Url,
    pub gas_price: GasPrice,
    pub bech32_prefix: String,
    /// Raw JSON chain suggestion that replaces the derived one when present.
    pub chain_info_override: Option<String>,
}

impl ChainConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let chain_id = value(CHAIN_ID_ENV, DEFAULT_CHAIN_ID);
        let rpc_endpoint = parse_url(RPC_ENDPOINT_ENV, &value(RPC_ENDPOINT_ENV, DEFAULT_RPC_ENDPOINT))?;
        let rest_endpoint =
            parse_url(REST_ENDPOINT_ENV, &value(REST_ENDPOINT_ENV, DEFAULT_REST_ENDPOINT))?;

        let decimal_places = match lookup(DECIMAL_PLACES_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u8>().map_err(|e| ConfigError::Invalid {
                var: DECIMAL_PLACES_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_DECIMAL_PLACES,
        };
        if decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::Invalid {
                var: DECIMAL_PLACES_ENV,
                reason: format!("must be at most {MAX_DECIMAL_PLACES}"),
            });
        }

        let gas_price = value(GAS_PRICE_ENV, DEFAULT_GAS_PRICE)
            .parse::<GasPrice>()
            .map_err(|reason| ConfigError::Invalid {
                var: GAS_PRICE_ENV,
                reason,
            })?;

        Ok(Self {
            chain_id,
            chain_name: value(CHAIN_NAME_ENV, DEFAULT_CHAIN_NAME),
            display_denom: value(DENOM_NAME_ENV, DEFAULT_DENOM_NAME),
            base_denom: value(DENOM_ENV, DEFAULT_DENOM),
            decimal_places,
            rpc_endpoint,
            rest_endpoint,
            gas_price,
            bech32_prefix: value(BECH32_PREFIX_ENV, DEFAULT_BECH32_PREFIX),
            chain_info_override: lookup(CHAIN_INFO_ENV).filter(|v| !v.trim().is_empty()),
        })
    }

    /// Converter for the configured display/base denomination pair.
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(self.decimal_places)
    }

    /// Join a path onto the REST endpoint.
    pub fn rest_url(&self, path: &str) -> String {
        join_url(&self.rest_endpoint, path)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        // Defaults are static and known-valid.
        Self::from_lookup(|_| None).unwrap_or_else(|e| unreachable!("default config invalid: {e}"))
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

pub(crate) fn join_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Gas price such as `0.025unmx`, stored as an exact decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    /// Price scaled by `10^scale`.
    numerator: u128,
    scale: u32,
    pub denom: String,
}

impl GasPrice {
    /// Fee in base units for `gas_limit`, rounded up.
    pub fn fee_for_gas(&self, gas_limit: u64) -> u128 {
        let total = (gas_limit as u128).saturating_mul(self.numerator);
        let divisor = 10u128.pow(self.scale);
        total.div_ceil(divisor)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }
}

impl FromStr for GasPrice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("gas price `{s}` has no denomination"))?;
        let (amount, denom) = s.split_at(split);

        if amount.is_empty() {
            return Err(format!("gas price `{s}` has no amount"));
        }
        if !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(format!("invalid denomination `{denom}`"));
        }

        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
        if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
            return Err(format!("invalid gas price amount `{amount}`"));
        }
        if fraction.len() > MAX_DECIMAL_PLACES as usize {
            return Err(format!("gas price `{amount}` has too many decimal places"));
        }

        let digits = format!("{whole}{fraction}");
        let numerator = digits
            .parse::<u128>()
            .map_err(|e| format!("invalid gas price amount `{amount}`: {e}"))?;

        Ok(Self {
            numerator,
            scale: fraction.len() as u32,
            denom: denom.to_string(),
        })
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converter = UnitConverter::new(self.scale as u8);
        write!(f, "{}{}", converter.format(self.numerator), self.denom)
    }
}

impl Serialize for GasPrice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GasPrice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
