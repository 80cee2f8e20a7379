//! WalletManager - the single owner of the pairing provider and wallet state.
//!
//! ```text
//! connect() ──▶ ensure_provider ──▶ provider.connect ──▶ stx_getAddresses (15s)
//!                    │                    │                      │ timeout / error / empty
//!                    │ (once)             │ display_uri          ▼
//!                    ▼                    ▼               session accounts
//!              on_event listener ──▶ WalletState ──▶ subscribers
//! ```
//!
//! Everything runs on one thread; shared state lives behind `Rc<RefCell<_>>`
//! and no borrow is held across an `.await`.

use super::methods;
use super::provider::{PairingProvider, ProviderEvent, ProviderFactory};
use super::types::{AddressesResult, ConnectParams, InitOptions, Session, NAMESPACE};
use crate::config::AppConfig;
use crate::error::{WalletError, WalletResult};
use crate::runtime::with_timeout;
use futures::channel::mpsc;
use futures::lock::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

type UriHook = Box<dyn FnOnce(&str)>;

/// Observable snapshot of the wallet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub is_connected: bool,
    pub is_connecting: bool,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub pairing_uri: Option<String>,
    pub show_qr_modal: bool,
    pub topic: Option<String>,
}

impl WalletState {
    fn clear_session(&mut self) {
        self.is_connected = false;
        self.address = None;
        self.public_key = None;
        self.pairing_uri = None;
        self.show_qr_modal = false;
        self.topic = None;
    }
}

/// Result of a successful [`WalletManager::connect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connected {
    pub address: String,
    pub public_key: Option<String>,
    pub topic: String,
}

struct Inner<F: ProviderFactory> {
    config: AppConfig,
    factory: F,
    provider: RefCell<Option<Rc<F::Provider>>>,
    init_lock: Mutex<()>,
    state: RefCell<WalletState>,
    uri_hook: RefCell<Option<UriHook>>,
    watchers: RefCell<Vec<mpsc::UnboundedSender<WalletState>>>,
}

impl<F: ProviderFactory> Inner<F> {
    fn update(&self, f: impl FnOnce(&mut WalletState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        self.watchers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }

    fn handle_event(&self, event: ProviderEvent) {
        debug!(event = event.name(), "provider event");
        match event {
            ProviderEvent::DisplayUri(uri) => self.on_display_uri(uri),
            ProviderEvent::SessionDelete { topic } => self.on_session_delete(topic),
        }
    }

    fn on_display_uri(&self, uri: String) {
        let Some(hook) = self.uri_hook.borrow_mut().take() else {
            debug!("display_uri outside a connect attempt, ignored");
            return;
        };
        self.update(|s| {
            s.pairing_uri = Some(uri.clone());
            s.show_qr_modal = true;
        });
        hook(&uri);
    }

    fn on_session_delete(&self, topic: Option<String>) {
        let current = self.state.borrow().topic.clone();
        let Some(current) = current else {
            debug!(deleted = ?topic, "session_delete without an active session, ignored");
            return;
        };
        if let Some(deleted) = &topic {
            if *deleted != current {
                debug!(%deleted, %current, "session_delete for another topic, ignored");
                return;
            }
        }
        info!(topic = %current, "wallet session deleted by peer");
        self.update(|s| {
            // a pairing in flight keeps its URI and QR modal
            let pending = s.is_connecting.then(|| (s.pairing_uri.take(), s.show_qr_modal));
            s.clear_session();
            if let Some((uri, show_qr)) = pending {
                s.pairing_uri = uri;
                s.show_qr_modal = show_qr;
            }
        });
    }
}

/// Resets `is_connecting` if a connect future is dropped before finishing.
struct ConnectGuard<F: ProviderFactory>(Rc<Inner<F>>);

impl<F: ProviderFactory> Drop for ConnectGuard<F> {
    fn drop(&mut self) {
        self.0.uri_hook.borrow_mut().take();
        if self.0.state.borrow().is_connecting {
            self.0.update(|s| {
                s.is_connecting = false;
                s.pairing_uri = None;
                s.show_qr_modal = false;
            });
        }
    }
}

pub struct WalletManager<F: ProviderFactory> {
    inner: Rc<Inner<F>>,
}

impl<F: ProviderFactory> Clone for WalletManager<F> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<F: ProviderFactory + 'static> WalletManager<F> {
    pub fn new(config: AppConfig, factory: F) -> WalletResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Rc::new(Inner {
                config,
                factory,
                provider: RefCell::new(None),
                init_lock: Mutex::new(()),
                state: RefCell::new(WalletState::default()),
                uri_hook: RefCell::new(None),
                watchers: RefCell::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn state(&self) -> WalletState {
        self.inner.state.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().is_connected
    }

    pub fn address(&self) -> Option<String> {
        self.inner.state.borrow().address.clone()
    }

    /// Stream of snapshots, one per state transition.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletState> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.watchers.borrow_mut().push(tx);
        rx
    }

    pub fn set_show_qr_modal(&self, show: bool) {
        self.inner.update(|s| s.show_qr_modal = show);
    }

    /// Pair with a wallet. See [`connect_with`](Self::connect_with).
    pub async fn connect(&self) -> WalletResult<Connected> {
        self.connect_with(|_| {}).await
    }

    /// Pair with a wallet, calling `on_uri` once with the pairing string.
    ///
    /// A second call while one is running fails with
    /// [`WalletError::ConnectInProgress`] and touches nothing.
    pub async fn connect_with(&self, on_uri: impl FnOnce(&str) + 'static) -> WalletResult<Connected> {
        if self.inner.state.borrow().is_connecting {
            return Err(WalletError::ConnectInProgress);
        }
        self.inner.update(|s| {
            s.is_connecting = true;
            s.pairing_uri = None;
        });
        let _guard = ConnectGuard(self.inner.clone());

        let result = self.establish(Box::new(on_uri)).await;
        self.inner.uri_hook.borrow_mut().take();

        match &result {
            Ok(connected) => {
                info!(address = %connected.address, topic = %connected.topic, "wallet connected");
                self.inner.update(|s| {
                    s.is_connected = true;
                    s.address = Some(connected.address.clone());
                    s.public_key = connected.public_key.clone();
                    s.topic = Some(connected.topic.clone());
                    s.pairing_uri = None;
                    s.show_qr_modal = false;
                    s.is_connecting = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "wallet connect failed");
                self.inner.update(|s| {
                    s.pairing_uri = None;
                    s.show_qr_modal = false;
                    s.is_connecting = false;
                });
            }
        }
        result
    }

    async fn establish(&self, on_uri: UriHook) -> WalletResult<Connected> {
        let provider = self.ensure_provider().await?;
        *self.inner.uri_hook.borrow_mut() = Some(on_uri);

        let chain_id = self.inner.config.network.chain_id();
        debug!(chain = chain_id, "proposing session");
        let session = provider
            .connect(&ConnectParams::for_chain(chain_id))
            .await?
            .ok_or_else(|| WalletError::ConnectionFailed("provider returned no session".into()))?;
        debug!(topic = %session.topic, "session established");

        let (address, public_key) = self.resolve_address(provider.as_ref(), &session).await?;
        Ok(Connected { address, public_key, topic: session.topic })
    }

    async fn resolve_address(
        &self,
        provider: &F::Provider,
        session: &Session,
    ) -> WalletResult<(String, Option<String>)> {
        let chain_id = self.inner.config.network.chain_id();
        let timeout = self.inner.config.address_timeout();
        let query = provider.request(chain_id, methods::GET_ADDRESSES, json!({}));

        match with_timeout(timeout, query).await {
            Ok(Ok(value)) => match serde_json::from_value::<AddressesResult>(value) {
                Ok(result) => {
                    if let Some(entry) = result.preferred() {
                        return Ok((entry.address.clone(), entry.public_key.clone()));
                    }
                    debug!("stx_getAddresses returned no addresses");
                }
                Err(e) => warn!(error = %e, "unexpected stx_getAddresses payload"),
            },
            Ok(Err(e)) => warn!(error = %e, "stx_getAddresses failed"),
            Err(_) => warn!(timeout_ms = timeout.as_millis() as u64, "stx_getAddresses timed out"),
        }

        debug!("falling back to session accounts");
        session
            .primary_address(NAMESPACE)
            .map(|address| (address, None))
            .ok_or(WalletError::AddressUnavailable)
    }

    /// Tear down the session. Remote failures are logged; local state is
    /// always cleared.
    pub async fn disconnect(&self) {
        let provider = self.inner.provider.borrow().clone();
        if let Some(provider) = provider {
            if provider.session().is_some() {
                if let Err(e) = provider.disconnect().await {
                    warn!(error = %e, "remote disconnect failed");
                }
            }
        }
        self.inner.update(WalletState::clear_session);
        info!("wallet disconnected");
    }

    /// Pick up a session the provider restored from its own storage.
    pub async fn restore_session(&self) -> WalletResult<Option<String>> {
        let provider = self.ensure_provider().await?;
        let Some(session) = provider.session() else {
            debug!("no stored session");
            return Ok(None);
        };
        let Some(address) = session.primary_address(NAMESPACE) else {
            debug!(topic = %session.topic, "stored session has no stacks account");
            return Ok(None);
        };

        info!(%address, topic = %session.topic, "restored wallet session");
        self.inner.update(|s| {
            s.is_connected = true;
            s.address = Some(address.clone());
            s.topic = Some(session.topic.clone());
        });
        Ok(Some(address))
    }

    /// Send a request over the active session.
    pub(crate) async fn request(&self, method: &str, params: Value) -> WalletResult<Value> {
        let provider = self.active_provider()?;
        let chain_id = self.inner.config.network.chain_id();
        debug!(method, "wallet request");
        provider.request(chain_id, method, params).await.map_err(|e| match e {
            WalletError::Remote { .. } | WalletError::NotConnected => e,
            other => WalletError::remote(method, other),
        })
    }

    fn active_provider(&self) -> WalletResult<Rc<F::Provider>> {
        let provider = self.inner.provider.borrow().clone().ok_or(WalletError::NotConnected)?;
        if !self.is_connected() || provider.session().is_none() {
            return Err(WalletError::NotConnected);
        }
        Ok(provider)
    }

    async fn ensure_provider(&self) -> WalletResult<Rc<F::Provider>> {
        if let Some(provider) = self.inner.provider.borrow().clone() {
            return Ok(provider);
        }
        let _lock = self.inner.init_lock.lock().await;
        if let Some(provider) = self.inner.provider.borrow().clone() {
            return Ok(provider);
        }

        let options = InitOptions::from(&self.inner.config);
        debug!(relay = %options.relay_url, "initializing pairing provider");
        let provider = Rc::new(self.inner.factory.init(&options).await?);

        let weak: Weak<Inner<F>> = Rc::downgrade(&self.inner);
        provider.on_event(Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(event);
            }
        }));

        *self.inner.provider.borrow_mut() = Some(provider.clone());
        info!("pairing provider ready");
        Ok(provider)
    }
}
