//! Pairing URIs issued by the provider during connect.
//!
//! `wc:{topic}@{version}?relay-protocol=irn&symKey=..&expiryTimestamp=..`

use crate::error::{WalletError, WalletResult};
use serde::Serialize;
use url::Url;

const DEEP_LINK_BASE: &str = "https://walletconnect.com/wc?uri=";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingUri {
    pub topic: String,
    pub version: u32,
    pub relay_protocol: Option<String>,
    pub sym_key: Option<String>,
    pub expiry_timestamp: Option<u64>,
    #[serde(skip)]
    raw: String,
}

impl PairingUri {
    pub fn parse(raw: &str) -> WalletResult<Self> {
        let invalid = |why: &str| WalletError::InvalidInput(format!("pairing uri: {why}"));
        let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "wc" {
            return Err(invalid("scheme must be 'wc'"));
        }

        let (topic, version) = url.path().split_once('@').ok_or_else(|| invalid("missing '@version'"))?;
        if topic.is_empty() {
            return Err(invalid("empty topic"));
        }
        let version = version.parse().map_err(|_| invalid("bad version"))?;

        let mut uri = PairingUri {
            topic: topic.to_string(),
            version,
            relay_protocol: None,
            sym_key: None,
            expiry_timestamp: None,
            raw: raw.trim().to_string(),
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "relay-protocol" => uri.relay_protocol = Some(value.into_owned()),
                "symKey" => uri.sym_key = Some(value.into_owned()),
                "expiryTimestamp" => uri.expiry_timestamp = value.parse().ok(),
                _ => {}
            }
        }
        Ok(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Universal link a phone camera can open straight into a wallet.
    pub fn deep_link(&self) -> String {
        deep_link(&self.raw)
    }

    pub fn is_expired(&self, now_unix: u64) -> bool {
        self.expiry_timestamp.map(|t| t <= now_unix).unwrap_or(false)
    }
}

/// Deep link for a raw pairing string, percent-encoded like `encodeURIComponent`.
pub fn deep_link(uri: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(uri.as_bytes()).collect();
    // form encoding turns spaces into '+', the link wants %20
    format!("{DEEP_LINK_BASE}{}", encoded.replace('+', "%20"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "wc:7f6e504bfad60b485450578e05678ed3e8e8c4751d3c6160be17160d63ec90f9@2?relay-protocol=irn&symKey=587d5484ce2a2a6ee3ba1962fdd7e8588e06200c46823bd18fbd67def96ad303&expiryTimestamp=1705000000";

    #[test]
    fn parses_v2_uri() {
        let uri = PairingUri::parse(URI).unwrap();
        assert_eq!(uri.topic, "7f6e504bfad60b485450578e05678ed3e8e8c4751d3c6160be17160d63ec90f9");
        assert_eq!(uri.version, 2);
        assert_eq!(uri.relay_protocol.as_deref(), Some("irn"));
        assert_eq!(uri.sym_key.as_deref().map(str::len), Some(64));
        assert_eq!(uri.expiry_timestamp, Some(1_705_000_000));
        assert!(uri.is_expired(1_705_000_001));
        assert!(!uri.is_expired(1_600_000_000));
    }

    #[test]
    fn deep_link_is_percent_encoded() {
        let link = deep_link("wc:abc@2?relay-protocol=irn&symKey=k");
        assert_eq!(
            link,
            "https://walletconnect.com/wc?uri=wc%3Aabc%402%3Frelay-protocol%3Dirn%26symKey%3Dk"
        );
    }

    #[test]
    fn rejects_non_pairing_strings() {
        assert!(PairingUri::parse("https://example.com").is_err());
        assert!(PairingUri::parse("wc:topic-without-version").is_err());
        assert!(PairingUri::parse("wc:@2").is_err());
        assert!(PairingUri::parse("not a uri").is_err());
    }
}
