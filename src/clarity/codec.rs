//! Consensus (wire) serialization of Clarity values.

use super::value::{validate_clarity_name, validate_contract_name, ClarityValue, PrincipalData, StandardPrincipal};
use super::ClarityError;
use std::collections::BTreeMap;

/// Deepest nesting accepted when decoding.
pub const MAX_DEPTH: usize = 64;

mod prefix {
    pub const INT: u8 = 0x00;
    pub const UINT: u8 = 0x01;
    pub const BUFFER: u8 = 0x02;
    pub const TRUE: u8 = 0x03;
    pub const FALSE: u8 = 0x04;
    pub const STANDARD_PRINCIPAL: u8 = 0x05;
    pub const CONTRACT_PRINCIPAL: u8 = 0x06;
    pub const OK: u8 = 0x07;
    pub const ERR: u8 = 0x08;
    pub const NONE: u8 = 0x09;
    pub const SOME: u8 = 0x0a;
    pub const LIST: u8 = 0x0b;
    pub const TUPLE: u8 = 0x0c;
    pub const STRING_ASCII: u8 = 0x0d;
    pub const STRING_UTF8: u8 = 0x0e;
}

/// Fails only on names that cannot be put on the wire: tuple keys and
/// contract names are length-prefixed by a single byte.
pub fn serialize(value: &ClarityValue) -> Result<Vec<u8>, ClarityError> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

/// `0x`-prefixed lowercase hex of the serialized value.
pub fn to_hex(value: &ClarityValue) -> Result<String, ClarityError> {
    Ok(format!("0x{}", hex::encode(serialize(value)?)))
}

fn write_len(len: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn write_standard(p: &StandardPrincipal, out: &mut Vec<u8>) {
    out.push(p.version);
    out.extend_from_slice(&p.hash160);
}

fn write_name(name: &str, out: &mut Vec<u8>) {
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
}

fn write_value(value: &ClarityValue, out: &mut Vec<u8>) -> Result<(), ClarityError> {
    match value {
        ClarityValue::Int(n) => {
            out.push(prefix::INT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::UInt(n) => {
            out.push(prefix::UINT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::Bool(true) => out.push(prefix::TRUE),
        ClarityValue::Bool(false) => out.push(prefix::FALSE),
        ClarityValue::Buffer(bytes) => {
            out.push(prefix::BUFFER);
            write_len(bytes.len(), out);
            out.extend_from_slice(bytes);
        }
        ClarityValue::StringAscii(s) => {
            out.push(prefix::STRING_ASCII);
            write_len(s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        ClarityValue::StringUtf8(s) => {
            out.push(prefix::STRING_UTF8);
            write_len(s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        ClarityValue::Principal(PrincipalData::Standard(p)) => {
            out.push(prefix::STANDARD_PRINCIPAL);
            write_standard(p, out);
        }
        ClarityValue::Principal(PrincipalData::Contract { issuer, name }) => {
            out.push(prefix::CONTRACT_PRINCIPAL);
            write_standard(issuer, out);
            validate_contract_name(name)?;
            write_name(name, out);
        }
        ClarityValue::ResponseOk(v) => {
            out.push(prefix::OK);
            write_value(v, out)?;
        }
        ClarityValue::ResponseErr(v) => {
            out.push(prefix::ERR);
            write_value(v, out)?;
        }
        ClarityValue::OptionalNone => out.push(prefix::NONE),
        ClarityValue::OptionalSome(v) => {
            out.push(prefix::SOME);
            write_value(v, out)?;
        }
        ClarityValue::List(items) => {
            out.push(prefix::LIST);
            write_len(items.len(), out);
            for item in items {
                write_value(item, out)?;
            }
        }
        ClarityValue::Tuple(fields) => {
            out.push(prefix::TUPLE);
            write_len(fields.len(), out);
            for (name, v) in fields {
                validate_clarity_name(name)?;
                write_name(name, out);
                write_value(v, out)?;
            }
        }
    }
    Ok(())
}

pub fn deserialize(bytes: &[u8]) -> Result<ClarityValue, ClarityError> {
    let mut reader = Reader { bytes, pos: 0 };
    let value = reader.value(0)?;
    let rest = bytes.len() - reader.pos;
    if rest > 0 {
        return Err(ClarityError::TrailingBytes(rest));
    }
    Ok(value)
}

/// Decode a hex string, with or without the `0x` prefix.
pub fn from_hex(input: &str) -> Result<ClarityValue, ClarityError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ClarityError::InvalidHex(e.to_string()))?;
    deserialize(&bytes)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClarityError> {
        let end = self.pos.checked_add(n).ok_or(ClarityError::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(ClarityError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClarityError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<usize, ClarityError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf) as usize)
    }

    fn u128_bytes(&mut self) -> Result<[u8; 16], ClarityError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn standard(&mut self) -> Result<StandardPrincipal, ClarityError> {
        let version = self.u8()?;
        if version >= 32 {
            return Err(ClarityError::InvalidAddress(format!("version {version} out of range")));
        }
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        Ok(StandardPrincipal { version, hash160 })
    }

    fn name(&mut self) -> Result<String, ClarityError> {
        let len = self.u8()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ClarityError::InvalidUtf8)
    }

    fn value(&mut self, depth: usize) -> Result<ClarityValue, ClarityError> {
        if depth > MAX_DEPTH {
            return Err(ClarityError::DepthExceeded);
        }
        let tag = self.u8()?;
        Ok(match tag {
            prefix::INT => ClarityValue::Int(i128::from_be_bytes(self.u128_bytes()?)),
            prefix::UINT => ClarityValue::UInt(u128::from_be_bytes(self.u128_bytes()?)),
            prefix::TRUE => ClarityValue::Bool(true),
            prefix::FALSE => ClarityValue::Bool(false),
            prefix::BUFFER => {
                let len = self.u32()?;
                ClarityValue::Buffer(self.take(len)?.to_vec())
            }
            prefix::STRING_ASCII => {
                let len = self.u32()?;
                let raw = self.take(len)?;
                if !raw.is_ascii() {
                    return Err(ClarityError::InvalidAscii);
                }
                ClarityValue::StringAscii(String::from_utf8(raw.to_vec()).map_err(|_| ClarityError::InvalidAscii)?)
            }
            prefix::STRING_UTF8 => {
                let len = self.u32()?;
                let raw = self.take(len)?;
                ClarityValue::StringUtf8(String::from_utf8(raw.to_vec()).map_err(|_| ClarityError::InvalidUtf8)?)
            }
            prefix::STANDARD_PRINCIPAL => ClarityValue::Principal(PrincipalData::Standard(self.standard()?)),
            prefix::CONTRACT_PRINCIPAL => {
                let issuer = self.standard()?;
                let name = self.name()?;
                validate_contract_name(&name)?;
                ClarityValue::Principal(PrincipalData::Contract { issuer, name })
            }
            prefix::OK => ClarityValue::ResponseOk(Box::new(self.value(depth + 1)?)),
            prefix::ERR => ClarityValue::ResponseErr(Box::new(self.value(depth + 1)?)),
            prefix::NONE => ClarityValue::OptionalNone,
            prefix::SOME => ClarityValue::OptionalSome(Box::new(self.value(depth + 1)?)),
            prefix::LIST => {
                let len = self.u32()?;
                // Every element takes at least one byte.
                if len > self.bytes.len() - self.pos {
                    return Err(ClarityError::UnexpectedEof);
                }
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            prefix::TUPLE => {
                let len = self.u32()?;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.name()?;
                    validate_clarity_name(&name)?;
                    let v = self.value(depth + 1)?;
                    fields.insert(name, v);
                }
                ClarityValue::Tuple(fields)
            }
            other => return Err(ClarityError::UnknownTypePrefix(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_vector() {
        assert_eq!(
            to_hex(&ClarityValue::uint(1u32)).unwrap(),
            "0x0100000000000000000000000000000001"
        );
    }

    #[test]
    fn negative_int_vector() {
        assert_eq!(
            to_hex(&ClarityValue::Int(-1)).unwrap(),
            "0x00ffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn string_utf8_vector() {
        assert_eq!(to_hex(&ClarityValue::string_utf8("hi")).unwrap(), "0x0e000000026869");
    }

    #[test]
    fn buffer_vector() {
        assert_eq!(to_hex(&ClarityValue::buffer(vec![0xde, 0xad])).unwrap(), "0x0200000002dead");
    }

    #[test]
    fn standard_principal_vector() {
        let v = ClarityValue::principal("SP000000000000000000002Q6VF78").unwrap();
        let expected = format!("0x0516{}", "00".repeat(20));
        assert_eq!(to_hex(&v).unwrap(), expected);
    }

    #[test]
    fn stamp_record_decodes() {
        let record = ClarityValue::some(ClarityValue::tuple([
            ("sender", ClarityValue::principal("SP000000000000000000002Q6VF78").unwrap()),
            ("message", ClarityValue::string_utf8("gm")),
            ("timestamp", ClarityValue::uint(1_700_000_000u64)),
            ("block-height", ClarityValue::uint(42u32)),
        ]));
        let decoded = from_hex(&to_hex(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);

        let inner = decoded.expect_optional().unwrap().unwrap();
        assert_eq!(inner.field("message").unwrap().expect_string().unwrap(), "gm");
    }

    #[test]
    fn response_and_list() {
        let ok = from_hex("0x070100000000000000000000000000000001").unwrap();
        assert_eq!(ok.expect_response().unwrap().unwrap().expect_uint().unwrap(), 1);

        let err = from_hex("0x080100000000000000000000000000000065").unwrap();
        assert_eq!(err.expect_response().unwrap().unwrap_err().expect_uint().unwrap(), 101);

        let list = ClarityValue::List(vec![ClarityValue::uint(1u32), ClarityValue::uint(2u32)]);
        assert_eq!(from_hex(&to_hex(&list).unwrap()).unwrap(), list);
    }

    #[test]
    fn none_and_bools() {
        assert_eq!(from_hex("09").unwrap(), ClarityValue::OptionalNone);
        assert_eq!(from_hex("0x03").unwrap(), ClarityValue::Bool(true));
        assert_eq!(from_hex("0x04").unwrap(), ClarityValue::Bool(false));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(from_hex("0x01ff"), Err(ClarityError::UnexpectedEof));
        assert_eq!(from_hex("0x0303"), Err(ClarityError::TrailingBytes(1)));
        assert_eq!(from_hex("0x42"), Err(ClarityError::UnknownTypePrefix(0x42)));
        assert!(matches!(from_hex("0xzz"), Err(ClarityError::InvalidHex(_))));
        assert_eq!(from_hex("0x0b7fffffff"), Err(ClarityError::UnexpectedEof));
        assert_eq!(from_hex("0x0e00000001ff"), Err(ClarityError::InvalidUtf8));
    }

    #[test]
    fn tuple_keys_must_be_clarity_names() {
        let long = "k".repeat(256);
        let tuple = ClarityValue::tuple([(long.clone(), ClarityValue::Bool(true))]);
        assert_eq!(serialize(&tuple), Err(ClarityError::InvalidClarityName(long)));

        let nested = ClarityValue::List(vec![ClarityValue::tuple([("has space", ClarityValue::OptionalNone)])]);
        assert!(matches!(to_hex(&nested), Err(ClarityError::InvalidClarityName(_))));

        let ok = ClarityValue::tuple([("k".repeat(128), ClarityValue::Bool(true))]);
        assert_eq!(from_hex(&to_hex(&ok).unwrap()).unwrap(), ok);

        // {1x: true}
        assert_eq!(
            from_hex("0x0c0000000102317803"),
            Err(ClarityError::InvalidClarityName("1x".into()))
        );
    }

    #[test]
    fn contract_names_are_checked_on_encode() {
        let issuer = StandardPrincipal { version: 22, hash160: [0u8; 20] };
        let principal = ClarityValue::Principal(PrincipalData::Contract { issuer, name: "x".repeat(300) });
        assert!(matches!(serialize(&principal), Err(ClarityError::InvalidContractName(_))));
    }

    #[test]
    fn depth_is_bounded() {
        let mut bytes = vec![prefix::SOME; MAX_DEPTH + 2];
        bytes.push(prefix::NONE);
        assert_eq!(deserialize(&bytes), Err(ClarityError::DepthExceeded));
    }
}
