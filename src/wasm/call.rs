use crate::call;
use crate::error::WasmHubError;
use wasm_bindgen::prelude::*;

/// Encode a JSON call description into runtime message bytes
///
/// # Arguments
/// * `json` - Call description, e.g. `{"bank":{"freeze":{"token_id":"token_1..."}}}`
#[wasm_bindgen]
pub fn serialize_call(json: &str) -> Result<Vec<u8>, WasmHubError> {
    call::encode_call(json)
}

/// Decode runtime message bytes back into the JSON call description
#[wasm_bindgen]
pub fn deserialize_call(bytes: &[u8]) -> Result<String, WasmHubError> {
    call::decode_call(bytes)?.to_json()
}
