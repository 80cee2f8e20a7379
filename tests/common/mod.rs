//! Scripted stand-ins for the wallet SDK and the Stacks API.
#![allow(dead_code)]

use async_trait::async_trait;
use chainstamp::api::ReadOnlyClient;
use chainstamp::clarity::{to_hex, ClarityValue};
use chainstamp::contract::ContractId;
use chainstamp::session::{
    methods, ConnectParams, EventListener, InitOptions, PairingProvider, ProviderEvent, ProviderFactory, Session,
    SessionNamespace,
};
use chainstamp::{AppConfig, WalletError, WalletResult};
use futures::channel::oneshot;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

pub const STX_ADDRESS: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";
pub const ACCOUNT_ADDRESS: &str = "SP000000000000000000002Q6VF78";
pub const TOPIC: &str = "0b1c2d3e4f";
pub const PAIRING_URI: &str = "wc:0b1c2d3e4f@2?relay-protocol=irn&symKey=abcdef&expiryTimestamp=1900000000";

pub fn test_config() -> AppConfig {
    AppConfig::new("test-project")
}

pub fn session_with(topic: &str, accounts: &[&str]) -> Session {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(
        "stacks".to_string(),
        SessionNamespace {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            methods: methods::ALL.iter().map(|m| m.to_string()).collect(),
            events: Vec::new(),
        },
    );
    Session { topic: topic.to_string(), namespaces }
}

pub fn default_session() -> Session {
    session_with(TOPIC, &[&format!("stacks:1:{ACCOUNT_ADDRESS}")])
}

/// How `stx_getAddresses` behaves.
#[derive(Clone)]
pub enum AddressMode {
    Reply(Value),
    Fail(String),
    Hang,
}

pub struct Script {
    pub uri: Option<String>,
    pub session: Option<Session>,
    pub connect_error: Option<String>,
    pub connect_gate: Option<oneshot::Receiver<()>>,
    pub addresses: AddressMode,
    pub responses: HashMap<String, Result<Value, String>>,
    pub fail_disconnect: bool,
    pub fail_init: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            uri: Some(PAIRING_URI.to_string()),
            session: Some(default_session()),
            connect_error: None,
            connect_gate: None,
            addresses: AddressMode::Reply(json!({"addresses": [
                {"address": "bc1qexample", "symbol": "BTC"},
                {"address": STX_ADDRESS, "publicKey": "02abcdef", "symbol": "STX"}
            ]})),
            responses: HashMap::new(),
            fail_disconnect: false,
            fail_init: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub chain_id: String,
    pub method: String,
    pub params: Value,
}

#[derive(Default)]
pub struct Shared {
    pub script: Script,
    /// The provider's own session, as the SDK would hold it.
    pub session: Option<Session>,
    pub listeners: Vec<EventListener>,
    pub connects: Vec<ConnectParams>,
    pub requests: Vec<Recorded>,
    pub init_options: Vec<InitOptions>,
    pub disconnects: usize,
}

/// Test-side handle onto the scripted provider.
#[derive(Clone, Default)]
pub struct Handle(pub Rc<RefCell<Shared>>);

impl Handle {
    pub fn new(script: Script) -> Self {
        Handle(Rc::new(RefCell::new(Shared { script, ..Default::default() })))
    }

    pub fn script(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.0.borrow_mut().script);
    }

    pub fn emit(&self, event: ProviderEvent) {
        let listeners = self.0.borrow().listeners.clone();
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.0.borrow().requests.clone()
    }

    pub fn inits(&self) -> usize {
        self.0.borrow().init_options.len()
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    /// Pretend the SDK restored a session from storage.
    pub fn set_stored_session(&self, session: Option<Session>) {
        self.0.borrow_mut().session = session;
    }
}

pub struct ScriptedProvider {
    handle: Handle,
}

#[async_trait(?Send)]
impl PairingProvider for ScriptedProvider {
    async fn connect(&self, params: &ConnectParams) -> WalletResult<Option<Session>> {
        self.handle.0.borrow_mut().connects.push(params.clone());

        let uri = self.handle.0.borrow().script.uri.clone();
        if let Some(uri) = uri {
            self.handle.emit(ProviderEvent::DisplayUri(uri));
        }

        let gate = self.handle.0.borrow_mut().script.connect_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let (error, session) = {
            let shared = self.handle.0.borrow();
            (shared.script.connect_error.clone(), shared.script.session.clone())
        };
        if let Some(error) = error {
            return Err(WalletError::ConnectionFailed(error));
        }
        self.handle.0.borrow_mut().session = session.clone();
        Ok(session)
    }

    async fn request(&self, chain_id: &str, method: &str, params: Value) -> WalletResult<Value> {
        self.handle.0.borrow_mut().requests.push(Recorded {
            chain_id: chain_id.to_string(),
            method: method.to_string(),
            params,
        });

        if method == methods::GET_ADDRESSES {
            let mode = self.handle.0.borrow().script.addresses.clone();
            return match mode {
                AddressMode::Reply(value) => Ok(value),
                AddressMode::Fail(message) => Err(WalletError::remote(method, message)),
                AddressMode::Hang => futures::future::pending().await,
            };
        }

        let scripted = self.handle.0.borrow().script.responses.get(method).cloned();
        match scripted {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(WalletError::remote(method, message)),
            None => Err(WalletError::remote(method, "method not scripted")),
        }
    }

    async fn disconnect(&self) -> WalletResult<()> {
        let mut shared = self.handle.0.borrow_mut();
        shared.disconnects += 1;
        shared.session = None;
        if shared.script.fail_disconnect {
            return Err(WalletError::remote("disconnect", "relay unreachable"));
        }
        Ok(())
    }

    fn session(&self) -> Option<Session> {
        self.handle.0.borrow().session.clone()
    }

    fn on_event(&self, listener: EventListener) {
        self.handle.0.borrow_mut().listeners.push(listener);
    }
}

pub struct ScriptedFactory {
    pub handle: Handle,
}

#[async_trait(?Send)]
impl ProviderFactory for ScriptedFactory {
    type Provider = ScriptedProvider;

    async fn init(&self, options: &InitOptions) -> WalletResult<ScriptedProvider> {
        let mut shared = self.handle.0.borrow_mut();
        shared.init_options.push(options.clone());
        if shared.script.fail_init {
            return Err(WalletError::Provider("relay handshake failed".into()));
        }
        Ok(ScriptedProvider { handle: self.handle.clone() })
    }
}

pub fn wallet_with(script: Script, config: AppConfig) -> (chainstamp::WalletManager<ScriptedFactory>, Handle) {
    let handle = Handle::new(script);
    let wallet = chainstamp::WalletManager::new(config, ScriptedFactory { handle: handle.clone() })
        .expect("valid config");
    (wallet, handle)
}

pub fn wallet(script: Script) -> (chainstamp::WalletManager<ScriptedFactory>, Handle) {
    wallet_with(script, test_config())
}

/// Read-only client answering from a function-name table.
#[derive(Default)]
pub struct FixtureClient {
    pub responses: RefCell<HashMap<String, ClarityValue>>,
    pub calls: RefCell<Vec<FixtureCall>>,
}

#[derive(Clone, Debug)]
pub struct FixtureCall {
    pub contract: String,
    pub function: String,
    pub args: Vec<String>,
    pub sender: String,
}

impl FixtureClient {
    pub fn with(self, function: &str, value: ClarityValue) -> Self {
        self.responses.borrow_mut().insert(function.to_string(), value);
        self
    }

    pub fn last_call(&self) -> FixtureCall {
        self.calls.borrow().last().cloned().expect("a read-only call")
    }
}

#[async_trait(?Send)]
impl ReadOnlyClient for FixtureClient {
    async fn call_read_only(
        &self,
        contract: &ContractId,
        function: &str,
        args: &[ClarityValue],
        sender: &str,
    ) -> WalletResult<ClarityValue> {
        let args = args.iter().map(to_hex).collect::<Result<_, _>>()?;
        self.calls.borrow_mut().push(FixtureCall {
            contract: contract.to_string(),
            function: function.to_string(),
            args,
            sender: sender.to_string(),
        });
        self.responses
            .borrow()
            .get(function)
            .cloned()
            .ok_or_else(|| WalletError::Api(format!("{function}: no fixture")))
    }
}
