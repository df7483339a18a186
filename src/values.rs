use std::fmt;

use ethereum_types::{H160, H256, U256};
use serde::{Serialize, Serializer};

use crate::types::Type;

/// A decoded event parameter value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Value {
    Uint(U256, usize),
    /// Two's complement word as found on chain.
    Int(U256, usize),
    Address(H160),
    Bool(bool),
    FixedBytes(Vec<u8>),
    /// Keccak-256 digest of an indexed dynamic value.
    Hash(H256),
}

impl Value {
    /// Decodes one 32-byte ABI word as a value of type `ty`.
    pub fn decode_word(ty: &Type, word: &[u8; 32]) -> Result<Value, &'static str> {
        let value = match ty {
            Type::Uint(size) => match U256::from_big_endian(word) {
                v if v.bits() <= *size => Value::Uint(v, *size),
                _ => return Err("unsigned integer exceeds its declared width"),
            },

            Type::Int(size) => Value::Int(U256::from_big_endian(word), *size),

            Type::Address => Value::Address(H160::from_slice(&word[12..])),

            Type::Bool => match U256::from_big_endian(word) {
                v if v.is_zero() => Value::Bool(false),
                v if v == U256::one() => Value::Bool(true),
                _ => return Err("boolean word is neither 0 nor 1"),
            },

            Type::FixedBytes(size) => match word.get(..*size) {
                Some(bytes) => Value::FixedBytes(bytes.to_vec()),
                None => return Err("fixed bytes wider than a word"),
            },

            // Indexed dynamic values are stored as their hash.
            Type::Bytes | Type::String => Value::Hash(H256::from(*word)),
        };

        Ok(value)
    }

    /// Encodes the value as one 32-byte ABI word.
    pub fn encode_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];

        match self {
            Value::Uint(v, _) | Value::Int(v, _) => v.to_big_endian(&mut word),
            Value::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
            Value::Bool(b) => word[31] = *b as u8,
            Value::FixedBytes(bytes) => {
                let len = bytes.len().min(32);
                word[..len].copy_from_slice(&bytes[..len]);
            }
            Value::Hash(hash) => word = hash.to_fixed_bytes(),
        }

        word
    }

    /// Whether the value can be encoded as a parameter of type `ty`.
    pub fn fits(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Uint(v, size), Type::Uint(ty_size)) => {
                size == ty_size && v.bits() <= *ty_size
            }
            (Value::Int(_, size), Type::Int(ty_size)) => size == ty_size,
            (Value::Address(_), Type::Address) => true,
            (Value::Bool(_), Type::Bool) => true,
            (Value::FixedBytes(bytes), Type::FixedBytes(size)) => bytes.len() == *size,
            (Value::Hash(_), Type::Bytes) | (Value::Hash(_), Type::String) => true,
            _ => false,
        }
    }

    /// Returns the address if this is an address value.
    pub fn as_address(&self) -> Option<H160> {
        match self {
            Value::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the raw word if this is an integer value.
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            Value::Uint(v, _) | Value::Int(v, _) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(v, _) => write!(f, "{}", v),
            Value::Int(v, _) if v.bit(255) => {
                let (magnitude, _) = (!*v).overflowing_add(U256::one());
                write!(f, "-{}", magnitude)
            }
            Value::Int(v, _) => write!(f, "{}", v),
            Value::Address(addr) => write!(f, "{:#x}", addr),
            Value::Bool(b) => write!(f, "{}", b),
            Value::FixedBytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Hash(hash) => write!(f, "{:#x}", hash),
        }
    }
}

// Integers are serialized as decimal strings so that JSON consumers never
// round them through a float.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            _ => serializer.collect_str(self),
        }
    }
}
