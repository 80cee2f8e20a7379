use crate::clarity::{c32, validate_contract_name, ClarityError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// `{deployer}.{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractId {
    pub address: String,
    pub name: String,
}

impl ContractId {
    /// Unchecked; use [`ContractId::parse`] for untrusted input.
    pub fn new(address: &str, name: &str) -> Self {
        Self { address: address.to_string(), name: name.to_string() }
    }

    pub fn parse(input: &str) -> Result<Self, ClarityError> {
        let (address, name) = input
            .trim()
            .split_once('.')
            .ok_or_else(|| ClarityError::InvalidContractName(format!("{input}: expected 'address.name'")))?;
        c32::c32_address_decode(address)?;
        validate_contract_name(name)?;
        Ok(Self::new(address, name))
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

impl Serialize for ContractId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContractId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ContractId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let id = ContractId::parse("SP5K2RHMSBH4PAP4PGX77MCVNK1ZEED07CWX9TJT.stamp-registry").unwrap();
        assert_eq!(id.address, "SP5K2RHMSBH4PAP4PGX77MCVNK1ZEED07CWX9TJT");
        assert_eq!(id.name, "stamp-registry");
        assert_eq!(id.to_string(), "SP5K2RHMSBH4PAP4PGX77MCVNK1ZEED07CWX9TJT.stamp-registry");
    }

    #[test]
    fn parse_rejects_bad_parts() {
        assert!(ContractId::parse("stamp-registry").is_err());
        assert!(ContractId::parse("SP000000000000000000002Q6VF78.1bad").is_err());
        assert!(ContractId::parse("SPNOTANADDRESS.stamp-registry").is_err());
    }

    #[test]
    fn serde_as_string() {
        let id = ContractId::new("SP000000000000000000002Q6VF78", "pox");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"SP000000000000000000002Q6VF78.pox\"");
        assert_eq!(serde_json::from_str::<ContractId>(&json).unwrap(), id);
    }
}
