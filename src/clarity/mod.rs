//! Clarity values - the argument and result language of Stacks contracts
//!
//! Registry calls carry their arguments as consensus-serialized Clarity
//! values (`0x`-prefixed hex) and read-only queries return one.
//!
//! ```text
//! ClarityValue ──serialize──▶ bytes ──hex──▶ "0x0e0000000568656c6c6f"
//!      ▲                                              │
//!      └────────────────deserialize───────────────────┘
//! ```
//!
//! Principals render through c32check (`SP...`, `ST...`).

pub mod c32;
mod codec;
mod value;

pub use codec::{deserialize, from_hex, serialize, to_hex, MAX_DEPTH};
pub use value::{validate_clarity_name, validate_contract_name, ClarityValue, PrincipalData, StandardPrincipal};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClarityError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unknown type prefix 0x{0:02x}")]
    UnknownTypePrefix(u8),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid utf-8 in string value")]
    InvalidUtf8,
    #[error("non-ascii byte in string-ascii value")]
    InvalidAscii,
    #[error("nesting deeper than 64 levels")]
    DepthExceeded,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("checksum mismatch for {0}")]
    ChecksumMismatch(String),
    #[error("invalid contract name: {0}")]
    InvalidContractName(String),
    #[error("invalid clarity name: {0}")]
    InvalidClarityName(String),
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },
}
