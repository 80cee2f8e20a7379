//! Stacks addresses: `S` + c32check(version, hash160).
//!
//! The base32 alphabet, case/`O`/`I`/`L` normalization and the double-SHA256
//! checksum come from the `c32` crate; this module pins the Stacks shape
//! (prefix, 20-byte payload, known version range).

use super::ClarityError;

const PREFIX: char = 'S';
const HASH160_LEN: usize = 20;
/// Shortest payload a 20-byte hash plus checksum can encode to.
const MIN_PAYLOAD_CHARS: usize = 21;

/// Address version bytes
pub mod version {
    pub const MAINNET_SINGLE_SIG: u8 = 22;
    pub const MAINNET_MULTI_SIG: u8 = 20;
    pub const TESTNET_SINGLE_SIG: u8 = 26;
    pub const TESTNET_MULTI_SIG: u8 = 21;
}

fn invalid(address: &str, e: ::c32::Error) -> ClarityError {
    match e {
        ::c32::Error::ChecksumMismatch { .. } => ClarityError::ChecksumMismatch(address.to_string()),
        other => ClarityError::InvalidAddress(format!("{address}: {other}")),
    }
}

/// Render a Stacks address from its version byte and hash160.
pub fn c32_address(version: u8, hash160: &[u8; 20]) -> Result<String, ClarityError> {
    ::c32::encode_check_prefixed(hash160, PREFIX, version)
        .map_err(|e| ClarityError::InvalidAddress(format!("version {version}: {e}")))
}

/// Parse a Stacks address into `(version, hash160)`, validating the checksum.
pub fn c32_address_decode(address: &str) -> Result<(u8, [u8; 20]), ClarityError> {
    if !address.is_ascii() {
        return Err(ClarityError::InvalidAddress(format!("{address}: non-ascii")));
    }
    let rest = address
        .strip_prefix(PREFIX)
        .or_else(|| address.strip_prefix('s'))
        .ok_or_else(|| ClarityError::InvalidAddress(format!("{address}: missing 'S' prefix")))?;
    // version char + payload
    if rest.len() < 1 + MIN_PAYLOAD_CHARS {
        return Err(ClarityError::InvalidAddress(format!("{address}: too short")));
    }

    let (payload, version) = ::c32::decode_check(rest).map_err(|e| invalid(address, e))?;
    let hash160: [u8; 20] = payload.as_slice().try_into().map_err(|_| {
        ClarityError::InvalidAddress(format!(
            "{address}: expected {HASH160_LEN} payload bytes, got {}",
            payload.len()
        ))
    })?;
    Ok((version, hash160))
}
