//! Transaction parameters
//!
//! Chain id, fees and nonce are unbounded unsigned integers on the host side.
//! On the wire each is a 32-byte big-endian word; a value that does not fit
//! is rejected, never truncated.

use crate::error::WasmHubError;
use num_bigint::BigUint;

pub const WORD_LEN: usize = 32;
/// Encoded size of the four parameters
pub const PARAMS_LEN: usize = 4 * WORD_LEN;

/// Per-transaction chain and fee parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxParams {
    pub chain_id: BigUint,
    pub max_priority_fee: BigUint,
    pub max_fee: BigUint,
    pub nonce: BigUint,
}

impl TxParams {
    pub fn new(
        chain_id: impl Into<BigUint>,
        max_priority_fee: impl Into<BigUint>,
        max_fee: impl Into<BigUint>,
        nonce: impl Into<BigUint>,
    ) -> Self {
        TxParams {
            chain_id: chain_id.into(),
            max_priority_fee: max_priority_fee.into(),
            max_fee: max_fee.into(),
            nonce: nonce.into(),
        }
    }

    /// Encode as chain_id, max_priority_fee, max_fee, nonce
    pub fn to_bytes(&self) -> Result<[u8; PARAMS_LEN], WasmHubError> {
        let mut out = [0u8; PARAMS_LEN];
        let fields = [
            ("chain_id", &self.chain_id),
            ("max_priority_fee", &self.max_priority_fee),
            ("max_fee", &self.max_fee),
            ("nonce", &self.nonce),
        ];
        for (chunk, (name, value)) in out.chunks_exact_mut(WORD_LEN).zip(fields) {
            chunk.copy_from_slice(&encode_word(name, value)?);
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8; PARAMS_LEN]) -> Self {
        let mut words = bytes.chunks_exact(WORD_LEN).map(BigUint::from_bytes_be);
        let mut next = || words.next().unwrap_or_default();
        TxParams {
            chain_id: next(),
            max_priority_fee: next(),
            max_fee: next(),
            nonce: next(),
        }
    }
}

/// Encode one parameter as a 32-byte big-endian word
pub fn encode_word(name: &str, value: &BigUint) -> Result<[u8; WORD_LEN], WasmHubError> {
    if value.bits() > (WORD_LEN * 8) as u64 {
        return Err(WasmHubError::invalid_params(format!(
            "{} does not fit in {} bits: {}",
            name,
            WORD_LEN * 8,
            value
        )));
    }

    let be = value.to_bytes_be();
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - be.len()..].copy_from_slice(&be);
    Ok(word)
}

/// Parse a parameter from its text form
///
/// Accepts a decimal string or a `0x`-prefixed hex string. Anything else,
/// including a sign, is rejected.
pub fn parse_word(name: &str, text: &str) -> Result<BigUint, WasmHubError> {
    let (digits, radix) = match text.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(WasmHubError::invalid_params(format!(
            "{} is not an unsigned integer: '{}'",
            name, text
        )));
    }

    BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| {
        WasmHubError::invalid_params(format!("{} is not an unsigned integer: '{}'", name, text))
    })
}
