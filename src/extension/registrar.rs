// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Makes sure the extension knows the configured chain before a session is
//! established.

use std::sync::Arc;

use tracing::{info, warn};

use super::{ChainInfo, WalletExtension};
use crate::config::ChainConfig;
use crate::error::WalletError;

pub struct ChainRegistrar {
    extension: Option<Arc<dyn WalletExtension>>,
    chain_id: String,
    chain_info: ChainInfo,
}

impl ChainRegistrar {
    pub fn new(extension: Option<Arc<dyn WalletExtension>>, config: &ChainConfig) -> Self {
        Self {
            extension,
            chain_id: config.chain_id.clone(),
            chain_info: ChainInfo::resolve(config),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn chain_info(&self) -> &ChainInfo {
        &self.chain_info
    }

    /// The extension, or [`WalletError::WalletNotFound`].
    pub fn extension(&self) -> Result<&Arc<dyn WalletExtension>, WalletError> {
        self.extension.as_ref().ok_or(WalletError::WalletNotFound)
    }

    /// Enable the chain, suggesting it first if the extension rejects it.
    ///
    /// When the chain is already known only `enable` is called, so repeated
    /// calls are idempotent from the core's side.
    pub async fn ensure_registered(&self) -> Result<Arc<dyn WalletExtension>, WalletError> {
        let extension = self.extension()?.clone();

        let first_error = match extension.enable(&self.chain_id).await {
            Ok(()) => return Ok(extension),
            Err(e) => e,
        };

        info!(
            chain_id = %self.chain_id,
            reason = %first_error,
            "Chain not enabled in wallet extension, suggesting chain"
        );

        if let Err(e) = extension.experimental_suggest_chain(&self.chain_info).await {
            warn!(chain_id = %self.chain_id, error = %e, "Chain suggestion failed");
            return Err(WalletError::ChainRegistration(e.to_string()));
        }

        extension.enable(&self.chain_id).await.map_err(|e| {
            warn!(chain_id = %self.chain_id, error = %e, "Enable after suggestion failed");
            WalletError::ChainRegistration(e.to_string())
        })?;

        info!(chain_id = %self.chain_id, "Chain registered with wallet extension");
        Ok(extension)
    }
}
