//! Field types shared by the module call messages

use crate::address::TokenId;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Serde helpers for `u128` amounts
///
/// Amounts are written as decimal strings so hosts never route them through
/// a lossy float. Reading accepts a JSON integer (up to `u64::MAX`) or a
/// decimal string.
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U128Visitor;

        impl<'de> de::Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a u128 as integer or decimal string")
            }

            fn visit_u64<E>(self, value: u64) -> Result<u128, E>
            where
                E: de::Error,
            {
                Ok(value as u128)
            }

            fn visit_i64<E>(self, value: i64) -> Result<u128, E>
            where
                E: de::Error,
            {
                if value >= 0 {
                    Ok(value as u128)
                } else {
                    Err(E::custom("negative values not allowed"))
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<u128, E>
            where
                E: de::Error,
            {
                // `str::parse` would also take a leading '+'
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(E::custom(format!("invalid decimal amount '{}'", value)));
                }
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(U128Visitor)
    }
}

/// An amount of a specific bank token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(deny_unknown_fields)]
pub struct Coins {
    #[serde(with = "amount")]
    pub amount: u128,
    pub token_id: TokenId,
}

/// 32-byte credential identifier, written as `0x`-prefixed hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CredentialId(pub [u8; 32]);

impl Serialize for CredentialId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for CredentialId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| de::Error::custom("credential id must start with 0x"))?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(stripped, &mut bytes).map_err(de::Error::custom)?;
        Ok(CredentialId(bytes))
    }
}
