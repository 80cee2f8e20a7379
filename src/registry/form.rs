use crate::config::Network;
use crate::contract::{ContractCall, ContractCaller};
use crate::error::{WalletError, WalletResult};
use serde::Serialize;
use std::cell::RefCell;
use tracing::{info, warn};

const EXPLORER_BASE: &str = "https://explorer.stacks.co/txid";

pub fn explorer_url(txid: &str, network: Network) -> String {
    format!("{EXPLORER_BASE}/{txid}?chain={}", network.as_str())
}

/// idle -> submitting -> success | error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Success { txid: String },
    Error { message: String },
}

impl FormStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, FormStatus::Submitting)
    }

    pub fn txid(&self) -> Option<&str> {
        match self {
            FormStatus::Success { txid } => Some(txid),
            _ => None,
        }
    }

    pub fn explorer_url(&self, network: Network) -> Option<String> {
        self.txid().map(|txid| explorer_url(txid, network))
    }

    fn error(e: &WalletError) -> Self {
        FormStatus::Error { message: e.to_string() }
    }
}

/// Status of one registry form across submissions.
#[derive(Debug, Default)]
pub struct RegistryForm {
    status: RefCell<FormStatus>,
}

impl RegistryForm {
    pub fn status(&self) -> FormStatus {
        self.status.borrow().clone()
    }

    pub fn reset(&self) {
        *self.status.borrow_mut() = FormStatus::Idle;
    }

    fn set(&self, status: FormStatus) -> FormStatus {
        *self.status.borrow_mut() = status.clone();
        status
    }

    /// Submit `call` through `caller`. Nothing is sent while a previous
    /// submission is pending, without a session, or when `call` failed
    /// validation.
    pub async fn submit<C: ContractCaller + ?Sized>(
        &self,
        caller: &C,
        call: WalletResult<ContractCall>,
    ) -> FormStatus {
        if self.status.borrow().is_submitting() {
            return FormStatus::Submitting;
        }
        if !caller.is_connected() {
            return self.set(FormStatus::error(&WalletError::NotConnected));
        }
        let call = match call {
            Ok(call) => call,
            Err(e) => return self.set(FormStatus::error(&e)),
        };

        self.set(FormStatus::Submitting);
        match caller.call_contract(&call).await {
            Ok(txid) => {
                info!(%txid, url = %explorer_url(&txid, caller.network()), "registry transaction sent");
                self.set(FormStatus::Success { txid })
            }
            Err(e) => {
                warn!(error = %e, function = %call.function_name, "registry transaction failed");
                self.set(FormStatus::error(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_links() {
        assert_eq!(
            explorer_url("0xabc", Network::Mainnet),
            "https://explorer.stacks.co/txid/0xabc?chain=mainnet"
        );
        let done = FormStatus::Success { txid: "0x1".into() };
        assert_eq!(
            done.explorer_url(Network::Testnet).as_deref(),
            Some("https://explorer.stacks.co/txid/0x1?chain=testnet")
        );
        assert_eq!(FormStatus::Idle.explorer_url(Network::Mainnet), None);
    }

    #[test]
    fn status_serializes_with_tag() {
        let value = serde_json::to_value(FormStatus::Error { message: "nope".into() }).unwrap();
        assert_eq!(value, serde_json::json!({"status": "error", "message": "nope"}));
        assert_eq!(serde_json::to_value(FormStatus::Idle).unwrap(), serde_json::json!({"status": "idle"}));
    }
}
