//! ChainStamp: WalletConnect sessions and Stacks registry calls.
//!
//! # Architecture
//!
//! ```text
//! WalletManager (session)
//!   │
//!   ├── PairingProvider (trait)
//!   │     ├── JsProvider      (wasm: @walletconnect/universal-provider)
//!   │     └── test doubles
//!   │
//!   ├── ContractCaller ── stx_callContract ──▶ wallet signs + broadcasts
//!   │
//!   └── Registries (hash / stamp / tag)
//!         ├── writes:  ContractCall builders (Clarity args, fee)
//!         └── reads:   ReadOnlyClient ── HiroClient (/v2/contracts/call-read)
//! ```
//!
//! # Flow
//!
//! | Step | Call | Result |
//! |------|------|--------|
//! | pair | `wallet.connect_with(on_uri)` | pairing URI surfaced, then `Connected { address, .. }` |
//! | resume | `wallet.restore_session()` | address of a stored session, if any |
//! | write | `form.submit(&wallet, registry.stamp_message(msg))` | `FormStatus::Success { txid }` |
//! | read | `registry.stamp(&hiro, id)` | `Option<StampRecord>` |
//! | leave | `wallet.disconnect()` | local state cleared, always |
//!
//! # Features
//!
//! - `native` - tokio timers, tracing subscriber, the `chainstamp` CLI
//! - `wasm` - wasm-bindgen bindings (`ChainStamp` class) for the browser
//!
//! # Usage
//!
//! ```ignore
//! use chainstamp::{AppConfig, WalletManager, StampRegistry, RegistryForm};
//!
//! let wallet = WalletManager::new(AppConfig::new(project_id), factory)?;
//! let connected = wallet.connect_with(|uri| show_qr(uri)).await?;
//!
//! let stamps = StampRegistry::new(&wallet.config().contracts);
//! let form = RegistryForm::default();
//! let status = form.submit(&wallet, stamps.stamp_message("gm")).await;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod api;
pub mod clarity;
pub mod config;
pub mod contract;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod session;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use api::{HiroClient, ReadOnlyClient, TxStatus};
pub use clarity::{ClarityError, ClarityValue};
pub use config::{AppConfig, AppMetadata, ContractsConfig, Network, RegistryKind};
pub use contract::{ContractCall, ContractCaller, ContractId};
pub use error::{WalletError, WalletResult};
pub use registry::{FormStatus, HashRegistry, RegistryForm, StampRecord, StampRegistry, TagRecord, TagRegistry};
pub use session::{Connected, PairingProvider, ProviderEvent, ProviderFactory, Session, WalletManager, WalletState};

#[cfg(feature = "wasm")]
pub use wasm::ChainStamp;
