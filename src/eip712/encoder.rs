//! EIP-712 Type Encoding
//!
//! Implements `encodeType`, `typeHash`, `encodeData` and `hashStruct`.
//! Struct fields are always encoded in the order the schema declares them,
//! regardless of the key order of the supplied values.

use super::types::*;
use crate::types::Address;
use crate::utils::crypto::keccak256;
use ethers_core::types::U256;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Encode a type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)" followed by every
/// referenced struct type, sorted by name
pub fn encode_type(type_name: &str, types: &TypeSchema) -> Result<String, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let mut result = format_type_string(type_name, fields);

    // BTreeSet iterates alphabetically
    for dep in find_type_dependencies(type_name, types) {
        if dep == type_name {
            continue;
        }
        if let Some(dep_fields) = types.get(&dep) {
            result.push_str(&format_type_string(&dep, dep_fields));
        }
    }

    Ok(result)
}

/// Format a single type string
fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// Find all struct types reachable from `type_name`, including itself
pub fn find_type_dependencies(type_name: &str, types: &TypeSchema) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if dependencies.contains(&current) {
            continue;
        }

        if let Some(fields) = types.get(&current) {
            dependencies.insert(current.clone());

            for field in fields {
                let base_type = get_base_type(&field.type_name);
                if types.contains_key(base_type) && !dependencies.contains(base_type) {
                    to_visit.push(base_type.to_string());
                }
            }
        }
    }

    dependencies
}

/// Get the base type from a potentially array type
/// e.g., "Person[]" -> "Person", "uint256[10]" -> "uint256"
pub fn get_base_type(type_name: &str) -> &str {
    match type_name.find('[') {
        Some(bracket_pos) => &type_name[..bracket_pos],
        None => type_name,
    }
}

/// Split the outermost array dimension: "uint8[2][]" -> ("uint8[2]", None)
fn split_array_type(type_name: &str) -> Result<Option<(&str, Option<usize>)>, Eip712Error> {
    if !type_name.ends_with(']') {
        return Ok(None);
    }

    let open = type_name
        .rfind('[')
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
    let element_type = &type_name[..open];
    let len_str = &type_name[open + 1..type_name.len() - 1];

    let len = if len_str.is_empty() {
        None
    } else {
        Some(
            len_str
                .parse::<usize>()
                .map_err(|_| Eip712Error::InvalidType(type_name.to_string()))?,
        )
    };

    Ok(Some((element_type, len)))
}

/// Calculate the type hash for a struct type
/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, types: &TypeSchema) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_type(type_name, types)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// typeHash || enc(field_1) || ... || enc(field_n), fields in schema order
pub fn encode_data(
    type_name: &str,
    values: &Map<String, Value>,
    types: &TypeSchema,
) -> Result<Vec<u8>, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_value = values.get(&field.name).ok_or_else(|| {
            Eip712Error::SchemaFieldMissing(format!("{}.{}", type_name, field.name))
        })?;
        encoded.extend_from_slice(&encode_field(&field.type_name, field_value, types)?);
    }

    Ok(encoded)
}

/// Hash a struct according to EIP-712
///
/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    let obj = value.as_object().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })?;
    hash_struct_fields(type_name, obj, types)
}

/// [`hash_struct`] over an already-unwrapped field map
pub fn hash_struct_fields(
    type_name: &str,
    values: &Map<String, Value>,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    Ok(keccak256(&encode_data(type_name, values, types)?))
}

/// Encode one field value into its 32-byte slot
pub fn encode_field(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    if let Some((element_type, expected_len)) = split_array_type(type_name)? {
        return encode_array(type_name, element_type, expected_len, value, types);
    }

    match type_name {
        "string" => Ok(keccak256(expect_str(type_name, value)?.as_bytes())),
        "bytes" => Ok(keccak256(&parse_hex(expect_str(type_name, value)?)?)),
        _ if types.contains_key(type_name) => hash_struct(type_name, value, types),
        _ => encode_atomic(type_name, value),
    }
}

/// Arrays hash the concatenation of their element encodings
fn encode_array(
    type_name: &str,
    element_type: &str,
    expected_len: Option<usize>,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    let items = value.as_array().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })?;

    if let Some(len) = expected_len {
        if items.len() != len {
            return Err(Eip712Error::InvalidValue {
                type_name: type_name.to_string(),
                value: format!("expected {} elements, got {}", len, items.len()),
            });
        }
    }

    let mut encoded = Vec::with_capacity(32 * items.len());
    for item in items {
        encoded.extend_from_slice(&encode_field(element_type, item, types)?);
    }

    Ok(keccak256(&encoded))
}

/// Encode an atomic (fixed-size) value
fn encode_atomic(type_name: &str, value: &Value) -> Result<[u8; 32], Eip712Error> {
    let mut result = [0u8; 32];

    // address - 20 bytes, left-padded to 32
    if type_name == "address" {
        let addr: Address = expect_str(type_name, value)?
            .parse()
            .map_err(|e: crate::types::ParseAddressError| Eip712Error::InvalidAddress(e.0))?;
        result[12..].copy_from_slice(addr.as_bytes());
        return Ok(result);
    }

    if type_name == "bool" {
        let b = value.as_bool().ok_or_else(|| invalid_value(type_name, value))?;
        result[31] = u8::from(b);
        return Ok(result);
    }

    if let Some(bits) = type_name.strip_prefix("uint") {
        let bits = parse_bit_width(type_name, bits)?;
        let n = parse_uint(type_name, value)?;
        if n.bits() > bits {
            return Err(Eip712Error::InvalidValue {
                type_name: type_name.to_string(),
                value: format!("{} does not fit in {} bits", n, bits),
            });
        }
        for (i, slot) in result.iter_mut().rev().enumerate() {
            *slot = n.byte(i);
        }
        return Ok(result);
    }

    if let Some(bits) = type_name.strip_prefix("int") {
        let bits = parse_bit_width(type_name, bits)?;
        let n = parse_int(type_name, value)?;
        if bits < 128 {
            let bound = 1i128 << (bits - 1);
            if n < -bound || n >= bound {
                return Err(Eip712Error::InvalidValue {
                    type_name: type_name.to_string(),
                    value: format!("{} does not fit in {} bits", n, bits),
                });
            }
        }
        // Two's complement, sign-extended to 256 bits
        if n < 0 {
            result = [0xff; 32];
        }
        result[16..].copy_from_slice(&n.to_be_bytes());
        return Ok(result);
    }

    // bytesN (fixed-size bytes, right-padded)
    if let Some(size) = type_name.strip_prefix("bytes") {
        let size: usize = size
            .parse()
            .map_err(|_| Eip712Error::InvalidType(type_name.to_string()))?;
        if size == 0 || size > 32 {
            return Err(Eip712Error::InvalidType(type_name.to_string()));
        }

        let bytes = parse_hex(expect_str(type_name, value)?)?;
        if bytes.len() > size {
            return Err(Eip712Error::InvalidValue {
                type_name: type_name.to_string(),
                value: format!("bytes too long: {} > {}", bytes.len(), size),
            });
        }

        result[..bytes.len()].copy_from_slice(&bytes);
        return Ok(result);
    }

    Err(Eip712Error::InvalidType(type_name.to_string()))
}

fn parse_bit_width(type_name: &str, bits: &str) -> Result<usize, Eip712Error> {
    match bits.parse::<usize>() {
        Ok(n) if n > 0 && n <= 256 && n % 8 == 0 => Ok(n),
        _ => Err(Eip712Error::InvalidType(type_name.to_string())),
    }
}

/// Parse an unsigned integer from a JSON number, decimal string or `0x` hex string
fn parse_uint(type_name: &str, value: &Value) -> Result<U256, Eip712Error> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| invalid_value(type_name, value)),
        Value::String(s) => {
            let s = s.trim();
            let parsed = if let Some(hex_digits) =
                s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
            {
                if hex_digits.is_empty() {
                    None
                } else {
                    U256::from_str_radix(hex_digits, 16).ok()
                }
            } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                U256::from_dec_str(s).ok()
            } else {
                None
            };
            parsed.ok_or_else(|| invalid_value(type_name, value))
        }
        _ => Err(invalid_value(type_name, value)),
    }
}

/// Parse a signed integer from a JSON number or decimal string
fn parse_int(type_name: &str, value: &Value) -> Result<i128, Eip712Error> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| invalid_value(type_name, value)),
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| invalid_value(type_name, value)),
        _ => Err(invalid_value(type_name, value)),
    }
}

/// Parse a hex string (with or without 0x prefix)
fn parse_hex(s: &str) -> Result<Vec<u8>, Eip712Error> {
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    hex::decode(s).map_err(|e| Eip712Error::EncodingError(format!("invalid hex: {}", e)))
}

fn expect_str<'a>(type_name: &str, value: &'a Value) -> Result<&'a str, Eip712Error> {
    value.as_str().ok_or_else(|| invalid_value(type_name, value))
}

fn invalid_value(type_name: &str, value: &Value) -> Eip712Error {
    Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}
