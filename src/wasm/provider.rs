//! PairingProvider over the JS `@walletconnect/universal-provider` object.

use super::{describe_js_error, to_js};
use crate::error::{WalletError, WalletResult};
use crate::session::{
    ConnectParams, EventListener, InitOptions, PairingProvider, ProviderEvent, ProviderFactory, Session,
};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde_json::{json, Value};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "UniversalProvider")]
    pub type JsUniversalProvider;

    #[wasm_bindgen(method, catch, js_name = "connect")]
    fn js_connect(this: &JsUniversalProvider, params: JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = "request")]
    fn js_request(this: &JsUniversalProvider, args: JsValue, chain_id: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = "disconnect")]
    fn js_disconnect(this: &JsUniversalProvider) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = "on")]
    fn js_on(this: &JsUniversalProvider, event: &str, listener: &Function);

    #[wasm_bindgen(method, getter, js_name = "session")]
    fn js_session(this: &JsUniversalProvider) -> JsValue;
}

pub struct JsProvider {
    inner: JsUniversalProvider,
    // keeps the event closures alive for the provider's lifetime
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl JsProvider {
    pub fn new(inner: JsUniversalProvider) -> Self {
        Self { inner, listeners: RefCell::new(Vec::new()) }
    }

    fn listen(&self, event: &str, closure: Closure<dyn FnMut(JsValue)>) {
        self.inner.js_on(event, closure.as_ref().unchecked_ref());
        self.listeners.borrow_mut().push(closure);
    }
}

async fn settle(method: &str, promise: Result<Promise, JsValue>) -> WalletResult<JsValue> {
    let promise = promise.map_err(|e| WalletError::remote(method, describe_js_error(&e)))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| WalletError::remote(method, describe_js_error(&e)))
}

#[async_trait(?Send)]
impl PairingProvider for JsProvider {
    async fn connect(&self, params: &ConnectParams) -> WalletResult<Option<Session>> {
        let params = to_js(params).map_err(|e| WalletError::Provider(describe_js_error(&e)))?;
        let value = settle("connect", self.inner.js_connect(params))
            .await
            .map_err(|e| WalletError::ConnectionFailed(e.to_string()))?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        let session = serde_wasm_bindgen::from_value(value)
            .map_err(|e| WalletError::ConnectionFailed(format!("malformed session: {e}")))?;
        Ok(Some(session))
    }

    async fn request(&self, chain_id: &str, method: &str, params: Value) -> WalletResult<Value> {
        let args = to_js(&json!({ "method": method, "params": params }))
            .map_err(|e| WalletError::Provider(describe_js_error(&e)))?;
        let value = settle(method, self.inner.js_request(args, chain_id)).await?;
        if value.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(value).map_err(|e| WalletError::remote(method, e))
    }

    async fn disconnect(&self) -> WalletResult<()> {
        settle("disconnect", self.inner.js_disconnect()).await.map(|_| ())
    }

    fn session(&self) -> Option<Session> {
        let value = self.inner.js_session();
        if value.is_null() || value.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(value).ok()
    }

    fn on_event(&self, listener: EventListener) {
        let on_uri = listener.clone();
        self.listen(
            "display_uri",
            Closure::new(move |uri: JsValue| {
                if let Some(uri) = uri.as_string() {
                    on_uri(ProviderEvent::DisplayUri(uri));
                }
            }),
        );
        self.listen(
            "session_delete",
            Closure::new(move |payload: JsValue| {
                let topic = Reflect::get(&payload, &JsValue::from_str("topic"))
                    .ok()
                    .and_then(|t| t.as_string());
                listener(ProviderEvent::SessionDelete { topic });
            }),
        );
    }
}

/// Builds the provider by calling a JS init function, typically
/// `(opts) => UniversalProvider.init(opts)`.
pub struct JsProviderFactory {
    init: Function,
}

impl JsProviderFactory {
    pub fn new(init: Function) -> Self {
        Self { init }
    }
}

#[async_trait(?Send)]
impl ProviderFactory for JsProviderFactory {
    type Provider = JsProvider;

    async fn init(&self, options: &InitOptions) -> WalletResult<JsProvider> {
        let options = to_js(options).map_err(|e| WalletError::Provider(describe_js_error(&e)))?;
        let returned = self
            .init
            .call1(&JsValue::NULL, &options)
            .map_err(|e| WalletError::Provider(describe_js_error(&e)))?;
        let provider = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| WalletError::Provider(describe_js_error(&e)))?,
            Err(value) => value,
        };
        if provider.is_null() || provider.is_undefined() {
            return Err(WalletError::Provider("init returned no provider".into()));
        }
        Ok(JsProvider::new(provider.unchecked_into()))
    }
}
