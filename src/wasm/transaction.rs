//! WASM bindings for transaction assembly
//!
//! Chain parameters arrive as JS `BigInt`s and are read through their decimal
//! string, so values wider than 64 bits survive the boundary.

use crate::crypto;
use crate::error::WasmHubError;
use crate::params::{parse_word, TxParams};
use crate::transaction::{self, SignedTransaction, UnsignedTransaction};
use num_bigint::BigUint;
use wasm_bindgen::prelude::*;

fn bigint_to_biguint(name: &str, value: &js_sys::BigInt) -> Result<BigUint, WasmHubError> {
    let text: String = value
        .to_string(10)
        .map_err(|_| WasmHubError::invalid_params(format!("{} is not a BigInt", name)))?
        .into();
    parse_word(name, &text)
}

fn params_from_js(
    chain_id: &js_sys::BigInt,
    max_priority_fee: &js_sys::BigInt,
    max_fee: &js_sys::BigInt,
    nonce: &js_sys::BigInt,
) -> Result<TxParams, WasmHubError> {
    Ok(TxParams {
        chain_id: bigint_to_biguint("chain_id", chain_id)?,
        max_priority_fee: bigint_to_biguint("max_priority_fee", max_priority_fee)?,
        max_fee: bigint_to_biguint("max_fee", max_fee)?,
        nonce: bigint_to_biguint("nonce", nonce)?,
    })
}

/// Build unsigned transaction bytes from a runtime message and parameters
///
/// # Arguments
/// * `runtime_msg` - Encoded runtime call (see `serialize_call`)
/// * `chain_id`, `max_priority_fee`, `max_fee`, `nonce` - Unsigned, at most 256 bits
#[wasm_bindgen]
pub fn new_serialized_unsigned_tx(
    runtime_msg: &[u8],
    chain_id: &js_sys::BigInt,
    max_priority_fee: &js_sys::BigInt,
    max_fee: &js_sys::BigInt,
    nonce: &js_sys::BigInt,
) -> Result<Vec<u8>, WasmHubError> {
    let params = params_from_js(chain_id, max_priority_fee, max_fee, nonce)?;
    transaction::assemble_unsigned(runtime_msg, &params)
}

/// Build unsigned transaction bytes from a JSON document
///
/// ```json
/// {"runtimeMsg":"0x...","chainId":4321,"maxPriorityFee":"0","maxFee":"100000000","nonce":0}
/// ```
#[wasm_bindgen]
pub fn serialize_unsigned_transaction(json: &str) -> Result<Vec<u8>, WasmHubError> {
    UnsignedTransaction::from_json(json)?.to_bytes()
}

/// Digest the sender must sign for the given unsigned transaction bytes
#[wasm_bindgen]
pub fn signing_hash(unsigned_tx: &[u8]) -> Vec<u8> {
    crypto::signing_hash(unsigned_tx).to_vec()
}

/// Build signed transaction bytes
///
/// The signature is verified against `pub_key` over the unsigned transaction
/// built from the same message and parameters; an error is returned otherwise.
#[wasm_bindgen]
pub fn new_serialized_tx(
    pub_key: &[u8],
    signature: &[u8],
    message: &[u8],
    chain_id: &js_sys::BigInt,
    max_priority_fee: &js_sys::BigInt,
    max_fee: &js_sys::BigInt,
    nonce: &js_sys::BigInt,
) -> Result<Vec<u8>, WasmHubError> {
    let params = params_from_js(chain_id, max_priority_fee, max_fee, nonce)?;
    transaction::assemble_signed(pub_key, signature, message, &params)
}

/// Parse and verify signed transaction bytes
///
/// # Returns
/// `{ chainId, maxPriorityFee, maxFee, nonce, sender, runtimeMsg, call }`,
/// where the parameters are BigInts and `call` is the decoded JSON call
/// description, or undefined when the message is not a call this module knows.
#[wasm_bindgen]
pub fn parse_signed_tx(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let tx = SignedTransaction::from_bytes(bytes)?;
    let params = tx.params();
    let call = crate::call::decode_call(tx.runtime_msg())
        .and_then(|call| call.to_json())
        .ok();

    let obj = crate::js_obj!(
        "chainId" => params.chain_id,
        "maxPriorityFee" => params.max_priority_fee,
        "maxFee" => params.max_fee,
        "nonce" => params.nonce,
        "sender" => tx.sender().to_string(),
        "runtimeMsg" => tx.runtime_msg().to_vec(),
        "call" => call,
    )
    .map_err(JsValue::from)?;
    Ok(obj)
}
