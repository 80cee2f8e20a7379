//! Contract - turns a call description into a `stx_callContract` request.
//!
//! Arguments travel as `0x`-hex consensus-serialized Clarity values. The
//! wallet signs, broadcasts and answers with a txid.

mod call;
mod id;
mod requests;

pub use call::{CallContractParams, ContractCall, TxidResult};
pub use id::ContractId;
pub use requests::{SignTransactionParams, SignedTransaction, TransferStxParams};

use crate::config::Network;
use crate::error::WalletResult;
use async_trait::async_trait;

/// Submits contract calls over a wallet session.
#[async_trait(?Send)]
pub trait ContractCaller {
    fn network(&self) -> Network;

    fn is_connected(&self) -> bool;

    /// Submit `call`, returning the broadcast txid. Fails with
    /// `NotConnected` when no session is active; never retries.
    async fn call_contract(&self, call: &ContractCall) -> WalletResult<String>;
}
