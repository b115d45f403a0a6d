//! Error types for wasm-hub

use core::fmt;
use wasm_bindgen::prelude::*;

/// Main error type for wasm-hub operations
///
/// Every variant is a local validation failure. Nothing is retried and no
/// partial output is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WasmHubError {
    /// Input does not conform to the expected schema or byte layout
    MalformedInput(String),
    /// Input references a module or call the codec does not encode
    UnsupportedVariant(String),
    /// A transaction parameter does not fit its fixed-width encoding
    InvalidParameters(String),
    /// Signature is malformed or does not authenticate the transaction
    InvalidSignature(String),
}

impl WasmHubError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        WasmHubError::MalformedInput(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        WasmHubError::UnsupportedVariant(msg.into())
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        WasmHubError::InvalidParameters(msg.into())
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        WasmHubError::InvalidSignature(msg.into())
    }
}

impl std::error::Error for WasmHubError {}

impl fmt::Display for WasmHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmHubError::MalformedInput(s) => write!(f, "Malformed input: {}", s),
            WasmHubError::UnsupportedVariant(s) => write!(f, "Unsupported variant: {}", s),
            WasmHubError::InvalidParameters(s) => write!(f, "Invalid parameters: {}", s),
            WasmHubError::InvalidSignature(s) => write!(f, "Invalid signature: {}", s),
        }
    }
}

impl From<serde_json::Error> for WasmHubError {
    fn from(err: serde_json::Error) -> Self {
        WasmHubError::MalformedInput(err.to_string())
    }
}

impl From<std::io::Error> for WasmHubError {
    fn from(err: std::io::Error) -> Self {
        // borsh reports every decode failure as an io::Error
        WasmHubError::MalformedInput(err.to_string())
    }
}

impl From<hex::FromHexError> for WasmHubError {
    fn from(err: hex::FromHexError) -> Self {
        WasmHubError::MalformedInput(format!("Invalid hex: {}", err))
    }
}

// REQUIRED: Converts to JS Error with stack trace
impl From<WasmHubError> for JsValue {
    fn from(err: WasmHubError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
