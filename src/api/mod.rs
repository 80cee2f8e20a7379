//! Api - read-only access to a Stacks node over HTTP.
//!
//! Registry queries go through [`ReadOnlyClient`] so they can be served by
//! the Hiro API in production and by a fixture in tests.

mod hiro;

pub use hiro::{HiroClient, TxInfo, TxStatus};

use crate::clarity::ClarityValue;
use crate::contract::ContractId;
use crate::error::WalletResult;
use async_trait::async_trait;

#[async_trait(?Send)]
pub trait ReadOnlyClient {
    /// Evaluate a read-only function. `sender` is the principal the node
    /// evaluates `tx-sender` as.
    async fn call_read_only(
        &self,
        contract: &ContractId,
        function: &str,
        args: &[ClarityValue],
        sender: &str,
    ) -> WalletResult<ClarityValue>;
}
