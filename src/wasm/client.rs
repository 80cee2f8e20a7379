//! ChainStamp: wallet session + registries exposed to JavaScript

use super::provider::JsProviderFactory;
use super::{console_warn, js_err, log, to_js};
use crate::api::HiroClient;
use crate::config::{AppConfig, AppMetadata, RegistryKind};
use crate::registry::{
    explorer_url, parse_digest, HashRegistry, RegistryForm, StampRegistry, TagRegistry,
};
use crate::session::{deep_link, WalletManager};
use futures::StreamExt;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct ChainStamp {
    wallet: WalletManager<JsProviderFactory>,
    api: HiroClient,
    hash: HashRegistry,
    stamp: StampRegistry,
    tag: TagRegistry,
    hash_form: RegistryForm,
    stamp_form: RegistryForm,
    tag_form: RegistryForm,
}

fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

#[wasm_bindgen]
impl ChainStamp {
    /// `config` is a partial `AppConfig` object (camelCase keys);
    /// `initProvider` is `(opts) => UniversalProvider.init(opts)`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, init_provider: js_sys::Function) -> Result<ChainStamp, JsValue> {
        let mut config: AppConfig = if config.is_undefined() || config.is_null() {
            AppConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        if config.metadata == AppMetadata::default() {
            if let Some(origin) = page_origin() {
                config.metadata = AppMetadata::for_origin(&origin);
            }
        }
        if !config.has_project_id() {
            console_warn("[ChainStamp] WalletConnect project id not set. Get one from https://cloud.walletconnect.com");
        }

        let api = HiroClient::new(config.api_url()).map_err(js_err)?;
        let hash = HashRegistry::new(&config.contracts);
        let stamp = StampRegistry::new(&config.contracts);
        let tag = TagRegistry::new(&config.contracts);
        let wallet = WalletManager::new(config, JsProviderFactory::new(init_provider)).map_err(js_err)?;
        log!("[ChainStamp] ready on {}", wallet.config().network.as_str());

        Ok(Self {
            wallet,
            api,
            hash,
            stamp,
            tag,
            hash_form: RegistryForm::default(),
            stamp_form: RegistryForm::default(),
            tag_form: RegistryForm::default(),
        })
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Pair with a wallet. `onUri` (optional) receives the pairing string.
    #[wasm_bindgen]
    pub async fn connect(&self, on_uri: Option<js_sys::Function>) -> Result<JsValue, JsValue> {
        let connected = self
            .wallet
            .connect_with(move |uri| {
                if let Some(callback) = on_uri {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(uri));
                }
            })
            .await
            .map_err(js_err)?;
        log!("[ChainStamp] connected {}", connected.address);
        to_js(&connected)
    }

    #[wasm_bindgen]
    pub async fn disconnect(&self) {
        self.wallet.disconnect().await;
    }

    /// Returns the restored address or `null`.
    #[wasm_bindgen(js_name = "restoreSession")]
    pub async fn restore_session(&self) -> Result<Option<String>, JsValue> {
        self.wallet.restore_session().await.map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.wallet.state())
    }

    /// Call `callback(state)` after every state transition.
    #[wasm_bindgen]
    pub fn subscribe(&self, callback: js_sys::Function) {
        let mut rx = self.wallet.subscribe();
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(state) = rx.next().await {
                if let Ok(value) = to_js(&state) {
                    let _ = callback.call1(&JsValue::NULL, &value);
                }
            }
        });
    }

    #[wasm_bindgen(js_name = "setShowQrModal")]
    pub fn set_show_qr_modal(&self, show: bool) {
        self.wallet.set_show_qr_modal(show);
    }

    /// Universal link for the pending pairing URI, if any.
    #[wasm_bindgen(js_name = "deepLink")]
    pub fn deep_link(&self) -> Option<String> {
        self.wallet.state().pairing_uri.as_deref().map(deep_link)
    }

    #[wasm_bindgen(js_name = "getAddresses")]
    pub async fn get_addresses(&self) -> Result<JsValue, JsValue> {
        let addresses = self.wallet.get_addresses().await.map_err(js_err)?;
        to_js(&addresses)
    }

    #[wasm_bindgen(js_name = "signTransaction")]
    pub async fn sign_transaction(&self, tx_hex: String, broadcast: bool) -> Result<JsValue, JsValue> {
        let signed = self.wallet.sign_transaction(&tx_hex, broadcast).await.map_err(js_err)?;
        to_js(&signed)
    }

    /// `amount` in micro-STX.
    #[wasm_bindgen(js_name = "transferStx")]
    pub async fn transfer_stx(&self, recipient: String, amount: u64, memo: Option<String>) -> Result<String, JsValue> {
        self.wallet
            .transfer_stx(&recipient, amount, memo.as_deref())
            .await
            .map_err(js_err)
    }

    // =========================================================================
    // REGISTRY WRITES (resolve to a FormStatus object)
    // =========================================================================

    /// `digest` is the file's SHA-256 as 64 hex characters.
    #[wasm_bindgen(js_name = "storeHash")]
    pub async fn store_hash(&self, digest: String, description: String) -> Result<JsValue, JsValue> {
        let call = parse_digest(&digest).and_then(|d| self.hash.store_hash(&d, &description));
        to_js(&self.hash_form.submit(&self.wallet, call).await)
    }

    #[wasm_bindgen(js_name = "stampMessage")]
    pub async fn stamp_message(&self, message: String) -> Result<JsValue, JsValue> {
        let call = self.stamp.stamp_message(&message);
        to_js(&self.stamp_form.submit(&self.wallet, call).await)
    }

    #[wasm_bindgen(js_name = "storeTag")]
    pub async fn store_tag(&self, key: String, value: String) -> Result<JsValue, JsValue> {
        let call = self.tag.store_tag(&key, &value);
        to_js(&self.tag_form.submit(&self.wallet, call).await)
    }

    #[wasm_bindgen(js_name = "updateTag")]
    pub async fn update_tag(&self, key: String, value: String) -> Result<JsValue, JsValue> {
        let call = self.tag.update_tag(&key, &value);
        to_js(&self.tag_form.submit(&self.wallet, call).await)
    }

    /// `kind` is `hash`, `stamp` or `tag`.
    #[wasm_bindgen(js_name = "formStatus")]
    pub fn form_status(&self, kind: &str) -> Result<JsValue, JsValue> {
        to_js(&self.form(kind)?.status())
    }

    #[wasm_bindgen(js_name = "resetForm")]
    pub fn reset_form(&self, kind: &str) -> Result<(), JsValue> {
        self.form(kind)?.reset();
        Ok(())
    }

    #[wasm_bindgen(js_name = "explorerUrl")]
    pub fn explorer_url(&self, txid: &str) -> String {
        explorer_url(txid, self.wallet.config().network)
    }

    // =========================================================================
    // REGISTRY READS
    // =========================================================================

    #[wasm_bindgen(js_name = "verifyHash")]
    pub async fn verify_hash(&self, digest: String) -> Result<bool, JsValue> {
        let digest = parse_digest(&digest).map_err(js_err)?;
        self.hash.verify_hash(&self.api, &digest).await.map_err(js_err)
    }

    #[wasm_bindgen(js_name = "getStamp")]
    pub async fn get_stamp(&self, id: u32) -> Result<JsValue, JsValue> {
        to_js(&self.stamp.stamp(&self.api, id.into()).await.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = "getUserStamps")]
    pub async fn get_user_stamps(&self, address: String) -> Result<JsValue, JsValue> {
        to_js(&self.stamp.user_stamps(&self.api, &address).await.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = "getTag")]
    pub async fn get_tag(&self, id: u32) -> Result<JsValue, JsValue> {
        to_js(&self.tag.tag(&self.api, id.into()).await.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = "getTagByKey")]
    pub async fn get_tag_by_key(&self, owner: String, key: String) -> Result<JsValue, JsValue> {
        to_js(&self.tag.tag_by_key(&self.api, &owner, &key).await.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = "getUserTags")]
    pub async fn get_user_tags(&self, address: String) -> Result<JsValue, JsValue> {
        to_js(&self.tag.user_tags(&self.api, &address).await.map_err(js_err)?)
    }

    #[wasm_bindgen(js_name = "txStatus")]
    pub async fn tx_status(&self, txid: String) -> Result<JsValue, JsValue> {
        to_js(&self.api.tx_status(&txid).await.map_err(js_err)?)
    }
}

impl ChainStamp {
    fn form(&self, kind: &str) -> Result<&RegistryForm, JsValue> {
        match RegistryKind::from_str(kind) {
            Some(RegistryKind::Hash) => Ok(&self.hash_form),
            Some(RegistryKind::Stamp) => Ok(&self.stamp_form),
            Some(RegistryKind::Tag) => Ok(&self.tag_form),
            None => Err(JsValue::from_str(&format!("unknown registry '{kind}'"))),
        }
    }
}
