//! The wallet SDK seam.
//!
//! The manager never talks to a relay itself. It drives a [`PairingProvider`]
//! created lazily through a [`ProviderFactory`]: the browser build wraps the JS
//! Universal Provider, tests plug in a scripted one.

use super::types::{ConnectParams, InitOptions, Session};
use crate::error::WalletResult;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

/// Events the provider pushes to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `display_uri`: a fresh pairing string for the QR code.
    DisplayUri(String),
    /// `session_delete`: the peer ended the session.
    SessionDelete { topic: Option<String> },
}

impl ProviderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::DisplayUri(_) => "display_uri",
            ProviderEvent::SessionDelete { .. } => "session_delete",
        }
    }
}

pub type EventListener = Rc<dyn Fn(ProviderEvent)>;

#[async_trait(?Send)]
pub trait PairingProvider {
    /// Propose a session and wait for the peer. `Ok(None)` means the
    /// provider finished without producing one.
    async fn connect(&self, params: &ConnectParams) -> WalletResult<Option<Session>>;

    /// Send a JSON-RPC request over the active session.
    async fn request(&self, chain_id: &str, method: &str, params: Value) -> WalletResult<Value>;

    async fn disconnect(&self) -> WalletResult<()>;

    /// Current session, if the provider holds one (restored or fresh).
    fn session(&self) -> Option<Session>;

    /// Register a listener for all provider events.
    fn on_event(&self, listener: EventListener);
}

#[async_trait(?Send)]
pub trait ProviderFactory {
    type Provider: PairingProvider + 'static;

    async fn init(&self, options: &InitOptions) -> WalletResult<Self::Provider>;
}
