//! Bech32m text encoding for rollup addresses and token ids
//!
//! Both identifiers are fixed-length byte strings on the wire and bech32m
//! strings in call documents. Only the canonical (lowercase, zero-padded)
//! text form is accepted, so each identifier has exactly one spelling.

use crate::error::WasmHubError;
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32m, Hrp};
use borsh::{BorshDeserialize, BorshSerialize};
use k256::ecdsa::VerifyingKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Human-readable part of rollup addresses
pub const ADDRESS_HRP: &str = "sov";
/// Human-readable part of token ids
pub const TOKEN_ID_HRP: &str = "token_";

pub const ADDRESS_LEN: usize = 20;
pub const TOKEN_ID_LEN: usize = 32;

/// Encode raw bytes as a bech32m string with the given prefix
pub fn encode_bech32m(hrp: &str, data: &[u8]) -> Result<String, WasmHubError> {
    let hrp = Hrp::parse(hrp)
        .map_err(|e| WasmHubError::malformed(format!("Invalid bech32 prefix: {}", e)))?;
    bech32::encode::<Bech32m>(hrp, data)
        .map_err(|e| WasmHubError::malformed(format!("Bech32m encoding failed: {}", e)))
}

/// Decode a bech32m string, checking its prefix and payload length
pub fn decode_bech32m<const N: usize>(
    expected_hrp: &str,
    encoded: &str,
) -> Result<[u8; N], WasmHubError> {
    let checked = CheckedHrpstring::new::<Bech32m>(encoded)
        .map_err(|e| WasmHubError::malformed(format!("Invalid bech32m '{}': {}", encoded, e)))?;

    let expected = Hrp::parse(expected_hrp)
        .map_err(|e| WasmHubError::malformed(format!("Invalid bech32 prefix: {}", e)))?;
    if checked.hrp() != expected {
        return Err(WasmHubError::malformed(format!(
            "Expected '{}' prefix in '{}'",
            expected_hrp, encoded
        )));
    }

    let data: Vec<u8> = checked.byte_iter().collect();
    let bytes: [u8; N] = data.try_into().map_err(|v: Vec<u8>| {
        WasmHubError::malformed(format!(
            "Invalid payload length in '{}': expected {}, got {}",
            encoded,
            N,
            v.len()
        ))
    })?;

    // Uppercase or non-zero padding would give a second spelling of the same bytes
    if encode_bech32m(expected_hrp, &bytes)? != encoded {
        return Err(WasmHubError::malformed(format!(
            "Non-canonical bech32m string '{}'",
            encoded
        )));
    }

    Ok(bytes)
}

macro_rules! bech32_id {
    ($(#[$meta:meta])* $name:ident, $hrp:expr, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = WasmHubError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_bech32m::<$len>($hrp, s).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Prefix and length are fixed, so encoding cannot fail
                match encode_bech32m($hrp, &self.0) {
                    Ok(s) => f.write_str(&s),
                    Err(_) => Err(fmt::Error),
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

bech32_id!(
    /// 20-byte rollup account address (`sov1...`)
    Address,
    ADDRESS_HRP,
    ADDRESS_LEN
);

bech32_id!(
    /// 32-byte bank token id (`token_1...`)
    TokenId,
    TOKEN_ID_HRP,
    TOKEN_ID_LEN
);

impl Address {
    /// Derive the rollup address controlled by a secp256k1 key
    ///
    /// Same derivation as an Ethereum account: the last 20 bytes of the
    /// Keccak-256 hash of the uncompressed public key without its tag byte.
    pub fn from_verifying_key(vk: &VerifyingKey) -> Self {
        let point = vk.to_encoded_point(false);
        let hash = Keccak256::digest(&point.as_bytes()[1..]);

        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&hash[12..]);
        Address(arr)
    }
}

/// Validate an address string
pub fn validate_address(address: &str) -> bool {
    address.parse::<Address>().is_ok()
}
