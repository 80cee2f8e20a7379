//! Session - wallet pairing, address resolution and connection state
//!
//! | Piece | Role |
//! |-------|------|
//! | [`WalletManager`] | connect / disconnect / restore, state snapshots |
//! | [`PairingProvider`] | the wallet SDK seam (JS provider, test double) |
//! | [`PairingUri`] | parsed `wc:` string and its deep link |
//! | [`address_from_account`] | `stacks:1:SP...` to `SP...` |

mod account;
mod manager;
mod pairing;
mod provider;
mod types;

/// JSON-RPC methods requested in the `stacks` namespace.
pub mod methods {
    pub const GET_ADDRESSES: &str = "stx_getAddresses";
    pub const SIGN_TRANSACTION: &str = "stx_signTransaction";
    pub const CALL_CONTRACT: &str = "stx_callContract";
    pub const TRANSFER_STX: &str = "stx_transferStx";

    pub const ALL: [&str; 4] = [GET_ADDRESSES, SIGN_TRANSACTION, CALL_CONTRACT, TRANSFER_STX];
}

pub use account::{address_from_account, short_address};
pub use manager::{Connected, WalletManager, WalletState};
pub use pairing::{deep_link, PairingUri};
pub use provider::{EventListener, PairingProvider, ProviderEvent, ProviderFactory};
pub use types::{
    AddressesResult, ConnectParams, InitOptions, ProposeNamespace, Session, SessionNamespace, StxAddress,
    NAMESPACE,
};
