use super::ContractId;
use crate::clarity::{to_hex, ClarityError, ClarityValue};
use crate::config::Network;
use serde::{Deserialize, Serialize};

/// A public function call, not yet bound to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub contract: ContractId,
    pub function_name: String,
    pub args: Vec<ClarityValue>,
    /// micro-STX attached to the call
    pub fee: u64,
    pub post_conditions: Vec<String>,
}

impl ContractCall {
    pub fn new(contract: ContractId, function_name: impl Into<String>) -> Self {
        Self {
            contract,
            function_name: function_name.into(),
            args: Vec::new(),
            fee: 0,
            post_conditions: Vec::new(),
        }
    }
    pub fn arg(mut self, value: ClarityValue) -> Self { self.args.push(value); self }
    pub fn with_fee(mut self, fee: u64) -> Self { self.fee = fee; self }
    pub fn with_post_condition(mut self, hex: impl Into<String>) -> Self { self.post_conditions.push(hex.into()); self }

    /// `stx_callContract` params. Arguments keep their order.
    pub fn to_params(&self, network: Network) -> Result<CallContractParams, ClarityError> {
        let function_args = self.args.iter().map(to_hex).collect::<Result<_, _>>()?;
        Ok(CallContractParams {
            contract: self.contract.to_string(),
            contract_address: self.contract.address.clone(),
            contract_name: self.contract.name.clone(),
            function_name: self.function_name.clone(),
            function_args,
            network: network.as_str().to_string(),
            broadcast: true,
            stx_amount: self.fee,
            post_conditions: self.post_conditions.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContractParams {
    pub contract: String,
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<String>,
    pub network: String,
    pub broadcast: bool,
    pub stx_amount: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_conditions: Vec<String>,
}

/// `{ txid }` as returned by `stx_callContract` and `stx_transferStx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxidResult {
    #[serde(alias = "txId")]
    pub txid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_carry_hex_args_in_order() {
        let call = ContractCall::new(ContractId::new("SP000000000000000000002Q6VF78", "tag-registry"), "store-tag")
            .arg(ClarityValue::string_utf8("k"))
            .arg(ClarityValue::string_utf8("v"))
            .with_fee(40_000);
        let value = serde_json::to_value(call.to_params(Network::Mainnet).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "contract": "SP000000000000000000002Q6VF78.tag-registry",
                "contractAddress": "SP000000000000000000002Q6VF78",
                "contractName": "tag-registry",
                "functionName": "store-tag",
                "functionArgs": ["0x0e000000016b", "0x0e0000000176"],
                "network": "mainnet",
                "broadcast": true,
                "stxAmount": 40000
            })
        );
    }

    #[test]
    fn post_conditions_are_forwarded() {
        let call = ContractCall::new(ContractId::new("ST000000000000000000002AMW42H", "x"), "f")
            .with_post_condition("0x0102");
        let params = call.to_params(Network::Testnet).unwrap();
        assert_eq!(params.network, "testnet");
        assert_eq!(params.post_conditions, vec!["0x0102".to_string()]);
        assert!(params.function_args.is_empty());
    }

    #[test]
    fn unencodable_arg_fails_params() {
        let bad = ClarityValue::tuple([("n".repeat(300), ClarityValue::uint(1u32))]);
        let call = ContractCall::new(ContractId::new("SP000000000000000000002Q6VF78", "tag-registry"), "store-tag")
            .arg(ClarityValue::string_utf8("k"))
            .arg(bad);
        assert!(matches!(call.to_params(Network::Mainnet), Err(ClarityError::InvalidClarityName(_))));
    }

    #[test]
    fn txid_accepts_camel_case_alias() {
        let a: TxidResult = serde_json::from_value(json!({"txid": "0xab"})).unwrap();
        let b: TxidResult = serde_json::from_value(json!({"txId": "0xab"})).unwrap();
        assert_eq!(a, b);
    }
}
