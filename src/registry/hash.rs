use super::Registry;
use crate::api::ReadOnlyClient;
use crate::clarity::ClarityValue;
use crate::config::{ContractsConfig, RegistryKind};
use crate::contract::ContractCall;
use crate::error::{WalletError, WalletResult};

pub const MAX_DESCRIPTION_CHARS: usize = 128;
pub const DEFAULT_DESCRIPTION: &str = "Document hash";

/// A SHA-256 digest given as 64 hex characters, `0x` optional.
pub fn parse_digest(input: &str) -> WalletResult<[u8; 32]> {
    let trimmed = input.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_part).map_err(|e| WalletError::InvalidInput(format!("digest: {e}")))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| WalletError::InvalidInput(format!("digest must be 32 bytes, got {}", b.len())))
}

#[derive(Debug, Clone)]
pub struct HashRegistry(pub Registry);

impl HashRegistry {
    pub fn new(contracts: &ContractsConfig) -> Self {
        Self(Registry::new(contracts, RegistryKind::Hash))
    }

    /// `store-hash`. A blank description becomes [`DEFAULT_DESCRIPTION`].
    pub fn store_hash(&self, digest: &[u8; 32], description: &str) -> WalletResult<ContractCall> {
        let description = match description.trim() {
            "" => DEFAULT_DESCRIPTION,
            d => d,
        };
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(WalletError::InvalidInput(format!(
                "description exceeds {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(self
            .0
            .call("store-hash")
            .arg(ClarityValue::buffer(digest.to_vec()))
            .arg(ClarityValue::string_utf8(description)))
    }

    pub async fn verify_hash<C: ReadOnlyClient + ?Sized>(&self, client: &C, digest: &[u8; 32]) -> WalletResult<bool> {
        let value = self.0.read(client, "verify-hash", &[ClarityValue::buffer(digest.to_vec())]).await?;
        Ok(value.expect_bool()?)
    }

    pub async fn hash_owner<C: ReadOnlyClient + ?Sized>(
        &self,
        client: &C,
        digest: &[u8; 32],
    ) -> WalletResult<Option<String>> {
        let value = self.0.read(client, "get-hash-owner", &[ClarityValue::buffer(digest.to_vec())]).await?;
        Ok(value.expect_optional()?.map(|p| p.expect_principal().map(|p| p.to_string())).transpose()?)
    }

    pub async fn hash_by_id<C: ReadOnlyClient + ?Sized>(&self, client: &C, id: u64) -> WalletResult<Option<[u8; 32]>> {
        let value = self.0.read(client, "get-hash-by-id", &[ClarityValue::uint(id)]).await?;
        let Some(inner) = value.expect_optional()? else {
            return Ok(None);
        };
        let bytes = inner.expect_buffer()?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WalletError::Api(format!("get-hash-by-id: {}-byte buffer", bytes.len())))?;
        Ok(Some(digest))
    }

    pub async fn hash_count<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-hash-count", &[]).await
    }

    pub async fn user_hash_count<C: ReadOnlyClient + ?Sized>(&self, client: &C, user: &str) -> WalletResult<u64> {
        self.0.read_u64(client, "get-user-hash-count", &[ClarityValue::principal(user)?]).await
    }

    pub async fn fee<C: ReadOnlyClient + ?Sized>(&self, client: &C) -> WalletResult<u64> {
        self.0.read_u64(client, "get-hash-fee", &[]).await
    }
}
