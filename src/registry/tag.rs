use super::{block_time, uint_list, Registry};
use crate::api::ReadOnlyClient;
use crate::clarity::{ClarityError, ClarityValue};
use crate::config::{ContractsConfig, RegistryKind};
use crate::contract::ContractCall;
use crate::error::{WalletError, WalletResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MAX_KEY_CHARS: usize = 64;
pub const MAX_VALUE_CHARS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub owner: String,
    pub key: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
    pub block_height: u64,
}

impl TagRecord {
    pub fn from_clarity(value: &ClarityValue) -> Result<Self, ClarityError> {
        Ok(Self {
            owner: value.field("owner")?.expect_principal()?.to_string(),
            key: value.field("key")?.expect_string()?.to_string(),
            value: value.field("value")?.expect_string()?.to_string(),
            timestamp: block_time(value.field("timestamp")?)?,
            block_height: value.field("block-height")?.expect_u64()?,
        })
    }
}

fn check_len(what: &str, input: &str, max: usize) -> WalletResult<()> {
    let len = input.chars().count();
    if len == 0 {
        return Err(WalletError::InvalidInput(format!("{what} is empty")));
    }
    if len > max {
        return Err(WalletError::InvalidInput(format!("{what} exceeds {max} characters")));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TagRegistry(pub Registry);

impl TagRegistry {
    pub fn new(contracts: &ContractsConfig) -> Self {
        Self(Registry::new(contracts, RegistryKind::Tag))
    }

    fn write(&self, function: &str, key: &str, value: &str) -> WalletResult<ContractCall> {
        let key = key.trim();
        check_len("key", key, MAX_KEY_CHARS)?;
        check_len("value", value, MAX_VALUE_CHARS)?;
        Ok(self
            .0
            .call(function)
            .arg(ClarityValue::string_utf8(key))
            .arg(ClarityValue::string_utf8(value)))
    }

    pub fn store_tag(&self, key: &str, value: &str) -> WalletResult<ContractCall> {
        self.write("store-tag", key, value)
    }

    /// Overwrite a tag the sender already owns; `(err u103)` otherwise.
    pub fn update_tag(&self, key: &str, value: &str) -> WalletResult<ContractCall> {
        self.write("update-tag", key, value)
    }

    pub async fn tag<C: ReadOnlyClient + ?Sized>(&self, client: &C, id: u64) -> WalletResult<Option<TagRecord>> {
        let value = self.0.read(client, "get-tag", &[ClarityValue::uint(id)]).await?;
        Ok(value.expect_optional()?.map(TagRecord::from_clarity).transpose()?)
    }

    pub async fn tag_by_key<C: ReadOnlyClient + ?Sized>(
        &self,
        client: &C,
        owner: &str,
        key: &str,
    ) -> WalletResult<Option<TagRecord>> {
        let args = [ClarityValue::principal(owner)?, ClarityValue::string_utf8(key)];
        let value = self.0.read(client, "get-tag-by-key", &args).await?;
        Ok(value.expect_optional()?.map(TagRecord::from_clarity).transpose()?)
    }

    pub async fn tag_owner<C: ReadOnlyClient + ?Sized>(&self, client: &C, id: u64) -> WalletResult<Option<String>> {
        let value = self.0.read(client, "get-tag-owner", &[ClarityValue::uint(id)]).await?;
        Ok(value.expect_optional()?.map(|p| p.expect_principal().map(|p| p.to_string())).transpose()?)
    }

    pub async fn tag_count<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-tag-count", &[]).await
    }

    pub async fn user_tags<C: ReadOnlyClient + ?Sized>(&self, client: &C, user: &str) -> WalletResult<Vec<u64>> {
        let value = self.0.read(client, "get-user-tags", &[ClarityValue::principal(user)?]).await?;
        Ok(uint_list(&value)?)
    }

    pub async fn fee<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-tag-fee", &[]).await
    }
}
