//! WASM module: ChainStamp in the browser
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │           ChainStamp (JS API)            │
//! │  connect, disconnect, restoreSession     │
//! │  storeHash, stampMessage, storeTag, ...  │
//! └──────────────┬────────────────┬──────────┘
//!                │                │
//! ┌──────────────▼─────────┐ ┌────▼──────────┐
//! │ WalletManager          │ │ HiroClient    │
//! │  JsProviderFactory     │ │  fetch        │
//! └──────────────┬─────────┘ └───────────────┘
//!                │
//! ┌──────────────▼───────────────────────────┐
//! │   @walletconnect/universal-provider      │
//! └──────────────────────────────────────────┘
//! ```

mod client;
mod provider;

pub use client::ChainStamp;
pub use provider::{JsProvider, JsProviderFactory, JsUniversalProvider};

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

pub fn console_warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

/// Plain JS objects, not `Map`s.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

pub(crate) fn describe_js_error(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
