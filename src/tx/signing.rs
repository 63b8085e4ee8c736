// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signing and Broadcast
//!
//! [`SigningHandle`] is the capability a connected session hands out. It
//! turns a [`TransactionRequest`] into a broadcast result in four steps:
//!
//! 1. Query account number and sequence for the signer.
//! 2. Ask the extension's offline signer to sign the [`SignDoc`].
//! 3. Encode the signed transaction with the injected [`TxEncoder`].
//! 4. Submit the bytes through the [`Broadcaster`].
//!
//! The bundled [`RpcBroadcaster`] speaks Tendermint JSON-RPC
//! (`broadcast_tx_sync`).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use super::{TransactionRequest, TransactionResult};
use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::extension::{OfflineSigner, SignDoc, SignedTx};
use crate::query::{ChainQuery, RestQueryClient};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EncodeError(pub String);

/// Chain adapter turning a signed transaction into wire bytes.
pub trait TxEncoder: Send + Sync {
    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, EncodeError>;
}

/// Encodes the signed transaction as a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTxEncoder;

impl TxEncoder for JsonTxEncoder {
    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, EncodeError> {
        let document = json!({
            "body": tx.sign_doc,
            "signature": Base64::encode_string(&tx.signature),
            "publicKey": Base64::encode_string(&tx.public_key),
        });
        serde_json::to_vec(&document).map_err(|e| EncodeError(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed broadcast response: {0}")]
    MalformedResponse(String),
}

impl From<BroadcastFailure> for WalletError {
    fn from(failure: BroadcastFailure) -> Self {
        WalletError::Broadcast(failure.to_string())
    }
}

/// Submits encoded transactions.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<TransactionResult, BroadcastFailure>;
}

/// Tendermint RPC broadcaster.
#[derive(Debug, Clone)]
pub struct RpcBroadcaster {
    endpoint: Url,
    http: Client,
}

impl RpcBroadcaster {
    pub fn new(endpoint: Url) -> Result<Self, BroadcastFailure> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| BroadcastFailure::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { endpoint, http })
    }
}

#[async_trait]
impl Broadcaster for RpcBroadcaster {
    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<TransactionResult, BroadcastFailure> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "broadcast_tx_sync",
            "params": { "tx": Base64::encode_string(tx_bytes) },
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| BroadcastFailure::Transport(format!("POST {} failed: {e}", self.endpoint)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BroadcastFailure::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BroadcastFailure::MalformedResponse(format!("invalid JSON: {e}")))?;

        parse_broadcast_response(&body, tx_bytes)
    }
}

/// Map a `broadcast_tx_sync` JSON-RPC response to a result.
pub(crate) fn parse_broadcast_response(
    body: &Value,
    tx_bytes: &[u8],
) -> Result<TransactionResult, BroadcastFailure> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("data")
            .and_then(Value::as_str)
            .or_else(|| error.get("message").and_then(Value::as_str))
            .unwrap_or("unknown error")
            .to_string();
        return Err(BroadcastFailure::Rpc { code, message });
    }

    let result = body
        .get("result")
        .filter(|r| r.is_object())
        .ok_or_else(|| BroadcastFailure::MalformedResponse("missing result object".into()))?;

    let code = match result.get("code") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|c| u32::try_from(c).ok())
            .ok_or_else(|| {
                BroadcastFailure::MalformedResponse(format!("invalid result code {value}"))
            })?,
    };

    let transaction_hash = result
        .get("hash")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| tx_hash(tx_bytes));

    let raw_log = result
        .get("log")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(TransactionResult {
        code,
        transaction_hash,
        raw_log,
    })
}

/// Upper-case hex SHA-256 of the transaction bytes.
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    Sha256::digest(tx_bytes)
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect()
}

/// Network collaborators shared by every signing handle of a session.
#[derive(Clone)]
pub struct ChainBackend {
    pub query: Arc<dyn ChainQuery>,
    pub encoder: Arc<dyn TxEncoder>,
    pub broadcaster: Arc<dyn Broadcaster>,
}

impl ChainBackend {
    /// REST queries, JSON encoding and RPC broadcast for `config`.
    pub fn from_config(config: &ChainConfig) -> Result<Self, WalletError> {
        let query = RestQueryClient::new(config)
            .map_err(|e| WalletError::broadcast(format!("query client: {e}")))?;
        let broadcaster = RpcBroadcaster::new(config.rpc_endpoint.clone())?;

        Ok(Self {
            query: Arc::new(query),
            encoder: Arc::new(JsonTxEncoder),
            broadcaster: Arc::new(broadcaster),
        })
    }
}

impl fmt::Debug for ChainBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBackend").finish_non_exhaustive()
    }
}

/// Capability to sign and broadcast for the connected account.
#[derive(Clone)]
pub struct SigningHandle {
    chain_id: String,
    signer: Arc<dyn OfflineSigner>,
    backend: ChainBackend,
}

impl SigningHandle {
    pub fn new(
        chain_id: impl Into<String>,
        signer: Arc<dyn OfflineSigner>,
        backend: ChainBackend,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            signer,
            backend,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub async fn sign_and_broadcast(
        &self,
        signer_address: &str,
        request: &TransactionRequest,
    ) -> Result<TransactionResult, WalletError> {
        let account = self
            .backend
            .query
            .account(signer_address)
            .await
            .map_err(|e| WalletError::broadcast(format!("account lookup failed: {e}")))?;

        let doc = SignDoc {
            chain_id: self.chain_id.clone(),
            account_number: account.account_number,
            sequence: account.sequence,
            messages: request.messages().to_vec(),
            fee: request.fee().clone(),
            memo: request.memo().to_string(),
        };

        debug!(
            address = %signer_address,
            account_number = doc.account_number,
            sequence = doc.sequence,
            messages = doc.messages.len(),
            "Requesting signature"
        );

        let signed = self
            .signer
            .sign(signer_address, &doc)
            .await
            .map_err(|e| WalletError::SigningRejected(e.to_string()))?;

        let tx_bytes = self
            .backend
            .encoder
            .encode(&signed)
            .map_err(|e| WalletError::Encoding(e.to_string()))?;

        match self.backend.broadcaster.broadcast(&tx_bytes).await {
            Ok(result) => {
                info!(
                    address = %signer_address,
                    tx_hash = %result.transaction_hash,
                    code = result.code,
                    "Transaction broadcast"
                );
                Ok(result)
            }
            Err(failure) => {
                warn!(address = %signer_address, error = %failure, "Broadcast failed");
                Err(failure.into())
            }
        }
    }
}

impl fmt::Debug for SigningHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningHandle")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
