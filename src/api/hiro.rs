use super::ReadOnlyClient;
use crate::clarity::{from_hex, to_hex, ClarityValue};
use crate::contract::ContractId;
use crate::error::{WalletError, WalletResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ReadOnlyRequest<'a> {
    sender: &'a str,
    arguments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReadOnlyResponse {
    okay: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

impl ReadOnlyResponse {
    fn into_value(self, function: &str) -> WalletResult<ClarityValue> {
        if !self.okay {
            let cause = self.cause.unwrap_or_else(|| "unknown cause".into());
            return Err(WalletError::Api(format!("{function}: {cause}")));
        }
        let hex = self
            .result
            .ok_or_else(|| WalletError::Api(format!("{function}: okay response without result")))?;
        Ok(from_hex(&hex)?)
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    tx_status: String,
    #[serde(default)]
    tx_result: Option<TxResultHex>,
}

#[derive(Debug, Deserialize)]
struct TxResultHex {
    hex: String,
}

impl TxResponse {
    /// An undecodable `tx_result` is logged and reported as no result.
    fn into_info(self, txid: String) -> TxInfo {
        let result = self.tx_result.and_then(|raw| match from_hex(&raw.hex) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, %txid, hex = %raw.hex, "undecodable tx_result");
                None
            }
        });
        TxInfo { txid, status: TxStatus::parse(&self.tx_status), result }
    }
}

/// On-chain status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TxStatus {
    /// The node has not seen the txid yet.
    NotFound,
    Pending,
    Success,
    AbortByResponse,
    AbortByPostCondition,
    Dropped(String),
}

impl TxStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => TxStatus::Pending,
            "success" => TxStatus::Success,
            "abort_by_response" => TxStatus::AbortByResponse,
            "abort_by_post_condition" => TxStatus::AbortByPostCondition,
            other => TxStatus::Dropped(other.trim_start_matches("dropped_").to_string()),
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, TxStatus::NotFound | TxStatus::Pending)
    }
}

/// Status plus the decoded contract-call result, once the node has one.
#[derive(Debug, Clone, PartialEq)]
pub struct TxInfo {
    pub txid: String,
    pub status: TxStatus,
    pub result: Option<ClarityValue>,
}

/// Hiro Stacks API client.
#[derive(Clone)]
pub struct HiroClient {
    http: Client,
    base_url: String,
}

impl HiroClient {
    pub fn new(base_url: &str) -> WalletResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(30));
        Ok(Self { http: builder.build()?, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn tx_status(&self, txid: &str) -> WalletResult<TxStatus> {
        Ok(self.transaction(txid).await?.status)
    }

    pub async fn transaction(&self, txid: &str) -> WalletResult<TxInfo> {
        let txid = txid.trim();
        let txid = if txid.starts_with("0x") { txid.to_string() } else { format!("0x{txid}") };
        let url = format!("{}/extended/v1/tx/{txid}", self.base_url);
        debug!(%url, "fetching transaction");

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(TxInfo { txid, status: TxStatus::NotFound, result: None });
        }
        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, %txid, "tx lookup failed");
            return Err(WalletError::Api(format!("tx {txid}: HTTP {status}")));
        }
        let body: TxResponse = response.json().await?;
        Ok(body.into_info(txid))
    }
}

#[async_trait(?Send)]
impl ReadOnlyClient for HiroClient {
    async fn call_read_only(
        &self,
        contract: &ContractId,
        function: &str,
        args: &[ClarityValue],
        sender: &str,
    ) -> WalletResult<ClarityValue> {
        let url = format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.base_url, contract.address, contract.name, function
        );
        let arguments = args.iter().map(to_hex).collect::<Result<_, _>>()?;
        let body = ReadOnlyRequest { sender, arguments };
        debug!(%contract, function, "read-only call");

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, %contract, function, "read-only call rejected");
            return Err(WalletError::Api(format!("{function}: HTTP {status} {text}")));
        }
        let parsed: ReadOnlyResponse = response.json().await?;
        parsed.into_value(function)
    }
}
