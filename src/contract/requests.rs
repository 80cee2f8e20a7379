//! Session requests: contract calls, signing, transfers, address listing.

use super::{CallContractParams, ContractCall, ContractCaller, TxidResult};
use crate::clarity::PrincipalData;
use crate::config::Network;
use crate::error::{WalletError, WalletResult};
use crate::session::{methods, AddressesResult, ProviderFactory, StxAddress, WalletManager};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

const MAX_MEMO_BYTES: usize = 34;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionParams {
    pub transaction: String,
    pub broadcast: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    #[serde(default, alias = "txId", skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_tx_hex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStxParams {
    pub recipient: String,
    /// micro-STX, decimal string
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub network: String,
}

impl TransferStxParams {
    pub fn new(recipient: &str, amount: u64, memo: Option<&str>, network: Network) -> WalletResult<Self> {
        PrincipalData::parse(recipient)?;
        if amount == 0 {
            return Err(WalletError::InvalidInput("transfer amount must be positive".into()));
        }
        let memo = memo.map(str::trim).filter(|m| !m.is_empty());
        if let Some(memo) = memo {
            if memo.len() > MAX_MEMO_BYTES {
                return Err(WalletError::InvalidInput(format!("memo exceeds {MAX_MEMO_BYTES} bytes")));
            }
        }
        Ok(Self {
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            memo: memo.map(str::to_string),
            network: network.as_str().to_string(),
        })
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> WalletResult<T> {
    serde_json::from_value(value).map_err(|e| WalletError::remote(method, format!("unexpected response: {e}")))
}

impl<F: ProviderFactory + 'static> WalletManager<F> {
    /// `stx_getAddresses` over the active session.
    pub async fn get_addresses(&self) -> WalletResult<Vec<StxAddress>> {
        let value = self.request(methods::GET_ADDRESSES, serde_json::json!({})).await?;
        Ok(decode::<AddressesResult>(methods::GET_ADDRESSES, value)?.addresses)
    }

    pub async fn sign_transaction(&self, tx_hex: &str, broadcast: bool) -> WalletResult<SignedTransaction> {
        let tx_hex = tx_hex.trim();
        if tx_hex.trim_start_matches("0x").is_empty() || hex::decode(tx_hex.trim_start_matches("0x")).is_err() {
            return Err(WalletError::InvalidInput("transaction must be hex".into()));
        }
        let params = SignTransactionParams { transaction: tx_hex.to_string(), broadcast };
        let value = self.request(methods::SIGN_TRANSACTION, serde_json::to_value(params)?).await?;
        decode(methods::SIGN_TRANSACTION, value)
    }

    pub async fn transfer_stx(&self, recipient: &str, amount: u64, memo: Option<&str>) -> WalletResult<String> {
        let params = TransferStxParams::new(recipient, amount, memo, self.config().network)?;
        let value = self.request(methods::TRANSFER_STX, serde_json::to_value(params)?).await?;
        let txid = decode::<TxidResult>(methods::TRANSFER_STX, value)?.txid;
        info!(%txid, recipient, amount, "stx transfer submitted");
        Ok(txid)
    }
}

#[async_trait(?Send)]
impl<F: ProviderFactory + 'static> ContractCaller for WalletManager<F> {
    fn network(&self) -> Network {
        self.config().network
    }

    fn is_connected(&self) -> bool {
        WalletManager::is_connected(self)
    }

    async fn call_contract(&self, call: &ContractCall) -> WalletResult<String> {
        let params: CallContractParams = call.to_params(self.config().network)?;
        let value = self.request(methods::CALL_CONTRACT, serde_json::to_value(&params)?).await?;
        let txid = decode::<TxidResult>(methods::CALL_CONTRACT, value)?.txid;
        info!(%txid, contract = %call.contract, function = %call.function_name, "contract call submitted");
        Ok(txid)
    }
}
