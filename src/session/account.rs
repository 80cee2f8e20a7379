//! CAIP-10 account strings (`namespace:chainId:address`).

/// Address part of an account string: the third colon segment, or the
/// first one when the third is missing or empty.
pub fn address_from_account(account: &str) -> &str {
    let mut parts = account.split(':');
    let first = parts.next().unwrap_or("");
    match parts.nth(1) {
        Some(address) if !address.is_empty() => address,
        _ => first,
    }
}

/// `SP5K2R...9TJT` style abbreviation for headers and logs.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_segment_wins() {
        assert_eq!(address_from_account("stacks:1:SP123"), "SP123");
        assert_eq!(address_from_account("stacks:1:SP123:extra"), "SP123");
    }

    #[test]
    fn malformed_falls_back_to_first_segment() {
        assert_eq!(address_from_account("SP123"), "SP123");
        assert_eq!(address_from_account("stacks:1"), "stacks");
        assert_eq!(address_from_account("stacks:1:"), "stacks");
        assert_eq!(address_from_account(""), "");
    }

    #[test]
    fn short_address_keeps_edges() {
        assert_eq!(short_address("SP5K2RHMSBH4PAP4PGX77MCVNK1ZEED07CWX9TJT"), "SP5K2R...9TJT");
        assert_eq!(short_address("SP123"), "SP123");
    }
}
