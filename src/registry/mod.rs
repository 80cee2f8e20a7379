//! Registry - the three ChainStamp contracts
//!
//! | Contract | Write | Fee (default) |
//! |----------|-------|---------------|
//! | `hash-registry` | `store-hash (buff 32) (string-utf8 128)` | 0.03 STX |
//! | `stamp-registry` | `stamp-message (string-utf8 256)` | 0.05 STX |
//! | `tag-registry` | `store-tag` / `update-tag` | 0.04 STX |
//!
//! Writes are [`ContractCall`]s submitted through a
//! [`ContractCaller`](crate::contract::ContractCaller); reads go through a
//! [`ReadOnlyClient`] and decode into typed records.

mod form;
mod hash;
mod stamp;
mod tag;

pub use form::{explorer_url, FormStatus, RegistryForm};
pub use hash::{parse_digest, HashRegistry, DEFAULT_DESCRIPTION, MAX_DESCRIPTION_CHARS};
pub use stamp::{StampRecord, StampRegistry, MAX_MESSAGE_CHARS};
pub use tag::{TagRecord, TagRegistry, MAX_KEY_CHARS, MAX_VALUE_CHARS};

use crate::api::ReadOnlyClient;
use crate::clarity::{ClarityError, ClarityValue};
use crate::config::{ContractsConfig, RegistryKind};
use crate::contract::{ContractCall, ContractId};
use crate::error::{WalletError, WalletResult};
use chrono::{DateTime, Utc};

pub const ERR_HASH_EXISTS: u128 = 101;
pub const ERR_TAG_NOT_FOUND: u128 = 103;

/// Human text for a registry `(err uN)` code.
pub fn describe_error(kind: RegistryKind, code: u128) -> Option<&'static str> {
    match (kind, code) {
        (RegistryKind::Hash, ERR_HASH_EXISTS) => Some("hash already registered"),
        (RegistryKind::Tag, ERR_TAG_NOT_FOUND) => Some("tag not found"),
        _ => None,
    }
}

/// One deployed registry contract and the principal reads are evaluated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub kind: RegistryKind,
    pub contract: ContractId,
    pub fee: u64,
    sender: String,
}

impl Registry {
    pub fn new(contracts: &ContractsConfig, kind: RegistryKind) -> Self {
        Self {
            kind,
            contract: contracts.contract_id(kind),
            fee: contracts.fee(kind),
            sender: contracts.deployer.clone(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// A fee-carrying call to `function`.
    pub fn call(&self, function: &str) -> ContractCall {
        ContractCall::new(self.contract.clone(), function).with_fee(self.fee)
    }

    pub async fn read<C: ReadOnlyClient + ?Sized>(
        &self,
        client: &C,
        function: &str,
        args: &[ClarityValue],
    ) -> WalletResult<ClarityValue> {
        let value = client.call_read_only(&self.contract, function, args, &self.sender).await?;
        self.unwrap_response(value)
    }

    pub async fn read_u64<C: ReadOnlyClient + ?Sized>(
        &self,
        client: &C,
        function: &str,
        args: &[ClarityValue],
    ) -> WalletResult<u64> {
        Ok(self.read(client, function, args).await?.expect_u64()?)
    }

    pub async fn contract_owner<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<String> {
        let value = self.read(client, "get-contract-owner", &[]).await?;
        Ok(value.expect_principal()?.to_string())
    }

    pub async fn total_fees<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.read_u64(client, "get-total-fees", &[]).await
    }

    /// Read-only functions answer with bare values; tolerate `(ok v)` and
    /// surface `(err uN)` with the registry's text.
    fn unwrap_response(&self, value: ClarityValue) -> WalletResult<ClarityValue> {
        match value {
            ClarityValue::ResponseOk(inner) => Ok(*inner),
            ClarityValue::ResponseErr(code) => Err(self.error_for(&code)),
            other => Ok(other),
        }
    }

    pub fn error_for(&self, code: &ClarityValue) -> WalletError {
        let message = match code.expect_uint() {
            Ok(n) => match describe_error(self.kind, n) {
                Some(text) => format!("{text} (u{n})"),
                None => format!("error u{n}"),
            },
            Err(_) => format!("error {code}"),
        };
        WalletError::remote(&self.contract.to_string(), message)
    }
}

fn block_time(value: &ClarityValue) -> Result<DateTime<Utc>, ClarityError> {
    let secs = value.expect_u64()?;
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| ClarityError::TypeMismatch { expected: "unix timestamp", found: secs.to_string() })
}

fn uint_list(value: &ClarityValue) -> Result<Vec<u64>, ClarityError> {
    value.expect_list()?.iter().map(ClarityValue::expect_u64).collect()
}
