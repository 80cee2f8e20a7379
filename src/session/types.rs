//! Wire shapes exchanged with the pairing provider.

use super::account::address_from_account;
use super::methods;
use crate::config::{AppConfig, AppMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain namespace every session is scoped to.
pub const NAMESPACE: &str = "stacks";

/// Settled namespace inside an approved session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNamespace {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// An approved session. The provider owns it; we only read snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub topic: String,
    #[serde(default)]
    pub namespaces: BTreeMap<String, SessionNamespace>,
}

impl Session {
    pub fn accounts(&self, namespace: &str) -> &[String] {
        self.namespaces.get(namespace).map(|ns| ns.accounts.as_slice()).unwrap_or(&[])
    }

    /// Address of the first account in `namespace`, if any.
    pub fn primary_address(&self, namespace: &str) -> Option<String> {
        let account = self.accounts(namespace).first()?;
        let address = address_from_account(account);
        (!address.is_empty()).then(|| address.to_string())
    }

    pub fn supports(&self, namespace: &str, method: &str) -> bool {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.methods.iter().any(|m| m == method))
            .unwrap_or(false)
    }
}

/// Proposed namespace sent with a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeNamespace {
    pub chains: Vec<String>,
    pub methods: Vec<String>,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    pub namespaces: BTreeMap<String, ProposeNamespace>,
}

impl ConnectParams {
    /// The fixed `stacks` namespace with the full method allow-list.
    pub fn for_chain(chain_id: &str) -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            NAMESPACE.to_string(),
            ProposeNamespace {
                chains: vec![chain_id.to_string()],
                methods: methods::ALL.iter().map(|m| m.to_string()).collect(),
                events: Vec::new(),
            },
        );
        Self { namespaces }
    }
}

/// Options handed to the provider factory on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
    pub project_id: String,
    pub relay_url: String,
    pub metadata: AppMetadata,
}

impl From<&AppConfig> for InitOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            relay_url: config.relay_url.clone(),
            metadata: config.metadata.clone(),
        }
    }
}

/// One entry of a `stx_getAddresses` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StxAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressesResult {
    #[serde(default)]
    pub addresses: Vec<StxAddress>,
}

impl AddressesResult {
    /// Prefer the `STX` entry, else the first non-empty one.
    pub fn preferred(&self) -> Option<&StxAddress> {
        let usable = || self.addresses.iter().filter(|a| !a.address.is_empty());
        usable()
            .find(|a| a.symbol.as_deref() == Some("STX"))
            .or_else(|| usable().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connect_params_shape() {
        let params = ConnectParams::for_chain("stacks:1");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({"namespaces": {"stacks": {
                "chains": ["stacks:1"],
                "methods": ["stx_getAddresses", "stx_signTransaction", "stx_callContract", "stx_transferStx"],
                "events": []
            }}})
        );
    }

    #[test]
    fn session_from_provider_json() {
        let session: Session = serde_json::from_value(json!({
            "topic": "abc",
            "namespaces": {"stacks": {"accounts": ["stacks:1:SP000000000000000000002Q6VF78"], "methods": ["stx_callContract"], "events": []}},
            "expiry": 1700000000
        }))
        .unwrap();
        assert_eq!(session.primary_address(NAMESPACE).as_deref(), Some("SP000000000000000000002Q6VF78"));
        assert!(session.supports(NAMESPACE, "stx_callContract"));
        assert!(!session.supports(NAMESPACE, "stx_transferStx"));
        assert_eq!(session.primary_address("eip155"), None);
    }

    #[test]
    fn preferred_address_picks_stx_symbol() {
        let result: AddressesResult = serde_json::from_value(json!({"addresses": [
            {"address": "bc1qxyz", "symbol": "BTC"},
            {"address": "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7", "publicKey": "02ab", "symbol": "STX"}
        ]}))
        .unwrap();
        let picked = result.preferred().unwrap();
        assert_eq!(picked.address, "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7");
        assert_eq!(picked.public_key.as_deref(), Some("02ab"));
    }

    #[test]
    fn preferred_address_falls_back_to_first() {
        let result: AddressesResult =
            serde_json::from_value(json!({"addresses": [{"address": "SPFIRST"}, {"address": "SPSECOND"}]})).unwrap();
        assert_eq!(result.preferred().unwrap().address, "SPFIRST");
        assert!(AddressesResult::default().preferred().is_none());
    }
}
