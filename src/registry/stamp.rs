use super::{block_time, uint_list, Registry};
use crate::api::ReadOnlyClient;
use crate::clarity::{ClarityError, ClarityValue};
use crate::config::{ContractsConfig, RegistryKind};
use crate::contract::ContractCall;
use crate::error::{WalletError, WalletResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MAX_MESSAGE_CHARS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampRecord {
    pub id: u64,
    pub sender: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub block_height: u64,
}

impl StampRecord {
    /// Decode the `get-stamp` tuple.
    pub fn from_clarity(id: u64, value: &ClarityValue) -> Result<Self, ClarityError> {
        Ok(Self {
            id,
            sender: value.field("sender")?.expect_principal()?.to_string(),
            message: value.field("message")?.expect_string()?.to_string(),
            timestamp: block_time(value.field("timestamp")?)?,
            block_height: value.field("block-height")?.expect_u64()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StampRegistry(pub Registry);

impl StampRegistry {
    pub fn new(contracts: &ContractsConfig) -> Self {
        Self(Registry::new(contracts, RegistryKind::Stamp))
    }

    pub fn stamp_message(&self, message: &str) -> WalletResult<ContractCall> {
        let message = message.trim();
        if message.is_empty() {
            return Err(WalletError::InvalidInput("message is empty".into()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(WalletError::InvalidInput(format!("message exceeds {MAX_MESSAGE_CHARS} characters")));
        }
        Ok(self.0.call("stamp-message").arg(ClarityValue::string_utf8(message)))
    }

    pub async fn stamp<C: ReadOnlyClient + ?Sized>(&self, client: &C, id: u64) -> WalletResult<Option<StampRecord>> {
        let value = self.0.read(client, "get-stamp", &[ClarityValue::uint(id)]).await?;
        match value.expect_optional()? {
            Some(tuple) => Ok(Some(StampRecord::from_clarity(id, tuple)?)),
            None => Ok(None),
        }
    }

    pub async fn stamp_count<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-stamp-count", &[]).await
    }

    pub async fn user_stamp_count<C: ReadOnlyClient + ?Sized>(&self, client: &C, user: &str) -> WalletResult<u64> {
        self.0.read_u64(client, "get-user-stamp-count", &[ClarityValue::principal(user)?]).await
    }

    /// Stamp ids sent by `user`, oldest first.
    pub async fn user_stamps<C: ReadOnlyClient + ?Sized>(&self, client: &C, user: &str) -> WalletResult<Vec<u64>> {
        let value = self.0.read(client, "get-user-stamps", &[ClarityValue::principal(user)?]).await?;
        Ok(uint_list(&value)?)
    }

    pub async fn fee<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-stamp-fee", &[]).await
    }
}
