use super::c32::{c32_address, c32_address_decode};
use super::ClarityError;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

const MAX_CONTRACT_NAME: usize = 128;
/// Tuple keys share the limit, and must fit the one-byte wire length.
pub const MAX_CLARITY_NAME: usize = 128;

fn contract_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z]([a-zA-Z0-9]|[-_])*$").expect("static regex"))
}

fn clarity_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z]([a-zA-Z0-9]|[-_!?+<>=/*])*$|^[-+=/*]$|^[<>]=?$").expect("static regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardPrincipal {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StandardPrincipal {
    pub fn parse(address: &str) -> Result<Self, ClarityError> {
        let (version, hash160) = c32_address_decode(address)?;
        Ok(Self { version, hash160 })
    }

    pub fn to_address(&self) -> String {
        // version is < 32 for anything we decoded or deserialized
        c32_address(self.version, &self.hash160).unwrap_or_default()
    }
}

impl fmt::Display for StandardPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrincipalData {
    Standard(StandardPrincipal),
    Contract { issuer: StandardPrincipal, name: String },
}

impl PrincipalData {
    /// Parse `SP...` or `SP....contract-name`.
    pub fn parse(input: &str) -> Result<Self, ClarityError> {
        match input.split_once('.') {
            None => Ok(Self::Standard(StandardPrincipal::parse(input)?)),
            Some((issuer, name)) => {
                validate_contract_name(name)?;
                Ok(Self::Contract { issuer: StandardPrincipal::parse(issuer)?, name: name.to_string() })
            }
        }
    }
}

impl fmt::Display for PrincipalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalData::Standard(p) => write!(f, "{p}"),
            PrincipalData::Contract { issuer, name } => write!(f, "{issuer}.{name}"),
        }
    }
}

pub fn validate_contract_name(name: &str) -> Result<(), ClarityError> {
    if name.is_empty() || name.len() > MAX_CONTRACT_NAME || !contract_name_regex().is_match(name) {
        return Err(ClarityError::InvalidContractName(name.to_string()));
    }
    Ok(())
}

/// Tuple keys follow the Clarity identifier rules.
pub fn validate_clarity_name(name: &str) -> Result<(), ClarityError> {
    if name.len() > MAX_CLARITY_NAME || !clarity_name_regex().is_match(name) {
        return Err(ClarityError::InvalidClarityName(name.to_string()));
    }
    Ok(())
}

/// A Clarity value. Tuples keep their fields sorted by name, which is also
/// the consensus serialization order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    StringAscii(String),
    StringUtf8(String),
    Principal(PrincipalData),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
}

impl ClarityValue {
    pub fn uint(n: impl Into<u128>) -> Self {
        Self::UInt(n.into())
    }

    pub fn string_utf8(s: impl Into<String>) -> Self {
        Self::StringUtf8(s.into())
    }

    pub fn buffer(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer(bytes.into())
    }

    pub fn principal(address: &str) -> Result<Self, ClarityError> {
        Ok(Self::Principal(PrincipalData::parse(address)?))
    }

    pub fn some(v: ClarityValue) -> Self {
        Self::OptionalSome(Box::new(v))
    }

    pub fn ok(v: ClarityValue) -> Self {
        Self::ResponseOk(Box::new(v))
    }

    pub fn err(v: ClarityValue) -> Self {
        Self::ResponseErr(Box::new(v))
    }

    pub fn tuple<K: Into<String>>(fields: impl IntoIterator<Item = (K, ClarityValue)>) -> Self {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ClarityValue::Int(_) => "int",
            ClarityValue::UInt(_) => "uint",
            ClarityValue::Bool(_) => "bool",
            ClarityValue::Buffer(_) => "buff",
            ClarityValue::StringAscii(_) => "string-ascii",
            ClarityValue::StringUtf8(_) => "string-utf8",
            ClarityValue::Principal(_) => "principal",
            ClarityValue::ResponseOk(_) | ClarityValue::ResponseErr(_) => "response",
            ClarityValue::OptionalNone | ClarityValue::OptionalSome(_) => "optional",
            ClarityValue::List(_) => "list",
            ClarityValue::Tuple(_) => "tuple",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ClarityError {
        ClarityError::TypeMismatch { expected, found: self.type_name().to_string() }
    }

    pub fn expect_uint(&self) -> Result<u128, ClarityError> {
        match self {
            ClarityValue::UInt(n) => Ok(*n),
            other => Err(other.mismatch("uint")),
        }
    }

    pub fn expect_u64(&self) -> Result<u64, ClarityError> {
        let n = self.expect_uint()?;
        u64::try_from(n).map_err(|_| ClarityError::TypeMismatch {
            expected: "uint fitting u64",
            found: n.to_string(),
        })
    }

    pub fn expect_bool(&self) -> Result<bool, ClarityError> {
        match self {
            ClarityValue::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn expect_buffer(&self) -> Result<&[u8], ClarityError> {
        match self {
            ClarityValue::Buffer(b) => Ok(b),
            other => Err(other.mismatch("buff")),
        }
    }

    /// Either string flavour.
    pub fn expect_string(&self) -> Result<&str, ClarityError> {
        match self {
            ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn expect_principal(&self) -> Result<&PrincipalData, ClarityError> {
        match self {
            ClarityValue::Principal(p) => Ok(p),
            other => Err(other.mismatch("principal")),
        }
    }

    pub fn expect_optional(&self) -> Result<Option<&ClarityValue>, ClarityError> {
        match self {
            ClarityValue::OptionalNone => Ok(None),
            ClarityValue::OptionalSome(v) => Ok(Some(v)),
            other => Err(other.mismatch("optional")),
        }
    }

    /// `Ok(Ok(v))` for `(ok v)`, `Ok(Err(v))` for `(err v)`.
    pub fn expect_response(&self) -> Result<Result<&ClarityValue, &ClarityValue>, ClarityError> {
        match self {
            ClarityValue::ResponseOk(v) => Ok(Ok(v)),
            ClarityValue::ResponseErr(v) => Ok(Err(v)),
            other => Err(other.mismatch("response")),
        }
    }

    pub fn expect_list(&self) -> Result<&[ClarityValue], ClarityError> {
        match self {
            ClarityValue::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }

    pub fn expect_tuple(&self) -> Result<&BTreeMap<String, ClarityValue>, ClarityError> {
        match self {
            ClarityValue::Tuple(fields) => Ok(fields),
            other => Err(other.mismatch("tuple")),
        }
    }

    pub fn field(&self, name: &str) -> Result<&ClarityValue, ClarityError> {
        self.expect_tuple()?.get(name).ok_or_else(|| ClarityError::TypeMismatch {
            expected: "tuple field",
            found: format!("missing '{name}'"),
        })
    }

    /// JSON view for CLI output and JS hosts.
    pub fn to_json(&self) -> Value {
        match self {
            ClarityValue::Int(n) => json!({"type": "int", "value": n.to_string()}),
            ClarityValue::UInt(n) => json!({"type": "uint", "value": n.to_string()}),
            ClarityValue::Bool(b) => json!({"type": "bool", "value": b}),
            ClarityValue::Buffer(b) => json!({"type": "buff", "value": format!("0x{}", hex::encode(b))}),
            ClarityValue::StringAscii(s) => json!({"type": "string-ascii", "value": s}),
            ClarityValue::StringUtf8(s) => json!({"type": "string-utf8", "value": s}),
            ClarityValue::Principal(p) => json!({"type": "principal", "value": p.to_string()}),
            ClarityValue::ResponseOk(v) => json!({"type": "ok", "value": v.to_json()}),
            ClarityValue::ResponseErr(v) => json!({"type": "err", "value": v.to_json()}),
            ClarityValue::OptionalNone => json!({"type": "none"}),
            ClarityValue::OptionalSome(v) => json!({"type": "some", "value": v.to_json()}),
            ClarityValue::List(items) => {
                json!({"type": "list", "value": items.iter().map(|v| v.to_json()).collect::<Vec<_>>()})
            }
            ClarityValue::Tuple(fields) => {
                let map: serde_json::Map<String, Value> =
                    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                json!({"type": "tuple", "value": map})
            }
        }
    }
}

/// Clarity literal syntax, e.g. `(ok u1)`, `(some 'SP...)`, `u"hi"`.
impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::Int(n) => write!(f, "{n}"),
            ClarityValue::UInt(n) => write!(f, "u{n}"),
            ClarityValue::Bool(b) => write!(f, "{b}"),
            ClarityValue::Buffer(b) => write!(f, "0x{}", hex::encode(b)),
            ClarityValue::StringAscii(s) => write!(f, "{s:?}"),
            ClarityValue::StringUtf8(s) => write!(f, "u{s:?}"),
            ClarityValue::Principal(p) => write!(f, "'{p}"),
            ClarityValue::ResponseOk(v) => write!(f, "(ok {v})"),
            ClarityValue::ResponseErr(v) => write!(f, "(err {v})"),
            ClarityValue::OptionalNone => f.write_str("none"),
            ClarityValue::OptionalSome(v) => write!(f, "(some {v})"),
            ClarityValue::List(items) => {
                f.write_str("(list")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(")")
            }
            ClarityValue::Tuple(fields) => {
                f.write_str("(tuple")?;
                for (k, v) in fields {
                    write!(f, " ({k} {v})")?;
                }
                f.write_str(")")
            }
        }
    }
}
