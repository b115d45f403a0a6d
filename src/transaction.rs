//! Unsigned and signed transaction envelopes
//!
//! Wire layouts (every parameter a 32-byte big-endian word):
//!
//! ```text
//! unsigned: chain_id | max_priority_fee | max_fee | nonce | runtime_msg
//! signed:   chain_id | max_priority_fee | max_fee | nonce | pubkey (33) | signature (65) | runtime_msg
//! ```
//!
//! The runtime message is always the last field and is not length-prefixed.
//! The field order is consumed by every verifier downstream; changing it is a
//! breaking format change.

use crate::address::Address;
use crate::crypto::{self, PublicKey, Signature, PUBLIC_KEY_LEN, SIGNATURE_LEN};
use crate::error::WasmHubError;
use crate::params::{parse_word, TxParams, PARAMS_LEN};
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer};

/// A runtime message with its chain and fee parameters, before signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub params: TxParams,
    pub runtime_msg: Vec<u8>,
}

impl UnsignedTransaction {
    pub fn new(runtime_msg: Vec<u8>, params: TxParams) -> Self {
        UnsignedTransaction {
            params,
            runtime_msg,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WasmHubError> {
        let mut bytes = Vec::with_capacity(PARAMS_LEN + self.runtime_msg.len());
        bytes.extend_from_slice(&self.params.to_bytes()?);
        bytes.extend_from_slice(&self.runtime_msg);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmHubError> {
        let (params, runtime_msg) = split_params(bytes)?;
        Ok(UnsignedTransaction {
            params,
            runtime_msg: runtime_msg.to_vec(),
        })
    }

    /// Parse an unsigned transaction document
    ///
    /// ```json
    /// { "runtimeMsg": "0x0004...", "chainId": 31337, "maxPriorityFee": "0", "maxFee": "100", "nonce": "0x0" }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, WasmHubError> {
        let doc: UnsignedTransactionDoc = serde_json::from_str(json)?;
        let word = |name: &str, value: WordText| match value {
            WordText::Number(n) => Ok(BigUint::from(n)),
            WordText::Negative(n) => Err(WasmHubError::invalid_params(format!(
                "{} is not an unsigned integer: {}",
                name, n
            ))),
            // serde_json reads integers past u64 as floats, losing precision
            WordText::Float(f) => Err(WasmHubError::invalid_params(format!(
                "{} must be an integer of at most 64 bits or a string, got {}",
                name, f
            ))),
            WordText::Text(s) => parse_word(name, &s),
        };

        let params = TxParams {
            chain_id: word("chain_id", doc.chain_id)?,
            max_priority_fee: word("max_priority_fee", doc.max_priority_fee)?,
            max_fee: word("max_fee", doc.max_fee)?,
            nonce: word("nonce", doc.nonce)?,
        };
        Ok(UnsignedTransaction::new(doc.runtime_msg, params))
    }

    /// Digest the sender signs to authorize this transaction
    pub fn signing_hash(&self) -> Result<[u8; 32], WasmHubError> {
        Ok(crypto::signing_hash(&self.to_bytes()?))
    }
}

/// An unsigned transaction bound to its sender's key and signature
///
/// Only constructed after the signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    public_key: PublicKey,
    signature: Signature,
    unsigned: UnsignedTransaction,
}

impl SignedTransaction {
    /// Bind a signature to a transaction, verifying it first
    pub fn new(
        public_key: PublicKey,
        signature: Signature,
        unsigned: UnsignedTransaction,
    ) -> Result<Self, WasmHubError> {
        let unsigned_bytes = unsigned.to_bytes()?;
        if let Err(e) = crypto::verify(&public_key, &signature, &unsigned_bytes) {
            tracing::warn!(
                sender = %public_key.address(),
                error = %e,
                "rejected transaction signature"
            );
            return Err(e);
        }

        Ok(SignedTransaction {
            public_key,
            signature,
            unsigned,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WasmHubError> {
        let msg = &self.unsigned.runtime_msg;
        let mut bytes = Vec::with_capacity(SIGNED_HEADER_LEN + msg.len());
        bytes.extend_from_slice(&self.unsigned.params.to_bytes()?);
        bytes.extend_from_slice(self.public_key.as_bytes());
        bytes.extend_from_slice(self.signature.as_bytes());
        bytes.extend_from_slice(msg);
        Ok(bytes)
    }

    /// Parse a signed transaction and re-verify its signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmHubError> {
        let (params, rest) = split_params(bytes)?;
        if rest.len() < PUBLIC_KEY_LEN + SIGNATURE_LEN {
            return Err(WasmHubError::malformed(format!(
                "Signed transaction too short: {} bytes",
                bytes.len()
            )));
        }

        let (public_key, rest) = rest.split_at(PUBLIC_KEY_LEN);
        let (signature, runtime_msg) = rest.split_at(SIGNATURE_LEN);

        SignedTransaction::new(
            PublicKey::from_bytes(public_key)?,
            Signature::from_bytes(signature)?,
            UnsignedTransaction::new(runtime_msg.to_vec(), params),
        )
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn params(&self) -> &TxParams {
        &self.unsigned.params
    }

    pub fn runtime_msg(&self) -> &[u8] {
        &self.unsigned.runtime_msg
    }

    /// Rollup address of the signer
    pub fn sender(&self) -> Address {
        self.public_key.address()
    }
}

/// Size of everything in a signed transaction except the runtime message
pub const SIGNED_HEADER_LEN: usize = PARAMS_LEN + PUBLIC_KEY_LEN + SIGNATURE_LEN;

fn split_params(bytes: &[u8]) -> Result<(TxParams, &[u8]), WasmHubError> {
    if bytes.len() < PARAMS_LEN {
        return Err(WasmHubError::malformed(format!(
            "Transaction too short: {} bytes",
            bytes.len()
        )));
    }
    let (head, rest) = bytes.split_at(PARAMS_LEN);
    let mut words = [0u8; PARAMS_LEN];
    words.copy_from_slice(head);
    Ok((TxParams::from_bytes(&words), rest))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UnsignedTransactionDoc {
    #[serde(deserialize_with = "deserialize_hex")]
    runtime_msg: Vec<u8>,
    chain_id: WordText,
    max_priority_fee: WordText,
    max_fee: WordText,
    nonce: WordText,
}

/// A parameter as written in JSON
///
/// JSON numbers cover `u64` only. Wider values are written as decimal or
/// `0x` hex strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WordText {
    Number(u64),
    Negative(i64),
    Float(f64),
    Text(String),
}

fn deserialize_hex<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let stripped = s
        .strip_prefix("0x")
        .ok_or_else(|| de::Error::custom("runtimeMsg must be a 0x-prefixed hex string"))?;
    hex::decode(stripped).map_err(de::Error::custom)
}

/// Assemble the canonical unsigned transaction bytes
///
/// Fails only when a parameter does not fit in 256 bits.
pub fn assemble_unsigned(message: &[u8], params: &TxParams) -> Result<Vec<u8>, WasmHubError> {
    let bytes = UnsignedTransaction::new(message.to_vec(), params.clone()).to_bytes()?;
    tracing::debug!(
        chain_id = %params.chain_id,
        nonce = %params.nonce,
        len = bytes.len(),
        "assembled unsigned transaction"
    );
    Ok(bytes)
}

/// Assemble the canonical signed transaction bytes
///
/// The signature must be `pubkey`'s signature over
/// `assemble_unsigned(message, params)`; nothing is returned otherwise.
pub fn assemble_signed(
    pubkey: &[u8],
    signature: &[u8],
    message: &[u8],
    params: &TxParams,
) -> Result<Vec<u8>, WasmHubError> {
    let unsigned = UnsignedTransaction::new(message.to_vec(), params.clone());
    // Overflow is reported before anything about the signature
    unsigned.to_bytes()?;

    let public_key = PublicKey::from_bytes(pubkey)?;
    let signature = Signature::from_bytes(signature)?;
    let tx = SignedTransaction::new(public_key, signature, unsigned)?;
    let bytes = tx.to_bytes()?;

    tracing::debug!(
        sender = %tx.sender(),
        chain_id = %params.chain_id,
        nonce = %params.nonce,
        len = bytes.len(),
        "assembled signed transaction"
    );
    Ok(bytes)
}
