// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NoMercyChain Wallet - wallet session and transaction core
//!
//! This crate connects to a user's browser wallet extension, builds typed
//! NoMercyChain operations, signs and broadcasts them through the extension,
//! and keeps the connected account's balance in sync.
//!
//! ## Modules
//!
//! - `config` - Chain configuration from the environment
//! - `units` - Display amount / base unit conversion
//! - `messages` - Typed chain operations and their builders
//! - `extension` - Wallet extension interface and chain registration
//! - `query` - Chain REST queries
//! - `session` - Connection state machine and reconnection hint
//! - `tx` - Fees, signing, broadcast and dispatch
//! - `balance` - Balance polling
//!
//! ## Wiring
//!
//! ```rust,ignore
//! let config = ChainConfig::from_env()?;
//! let backend = ChainBackend::from_config(&config)?;
//! let session = WalletSession::new(&config, extension, backend, hints);
//! session.spawn_account_listener();
//! session.restore().await?;
//!
//! let factory = MessageFactory::new(&config);
//! let dispatcher = TransactionDispatcher::new(session.clone(), &config);
//! let result = dispatcher
//!     .dispatch_messages(vec![factory.delegate(&address, &validator, "100")?], "")
//!     .await?;
//! ```

pub mod balance;
pub mod config;
pub mod error;
pub mod extension;
pub mod logging;
pub mod messages;
pub mod query;
pub mod session;
pub mod tx;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

pub use balance::{BalanceSnapshot, BalanceSynchronizer};
pub use config::{ChainConfig, ConfigError, GasPrice};
pub use error::WalletError;
pub use extension::{Account, ChainInfo, ChainRegistrar, OfflineSigner, WalletExtension};
pub use messages::{Coin, Message, MessageFactory};
pub use query::{ChainQuery, RestQueryClient};
pub use session::{KeyValueStore, SessionState, WalletSession};
pub use tx::{
    ChainBackend, FeePolicy, TransactionDispatcher, TransactionRequest, TransactionResult,
};
pub use units::UnitConverter;
