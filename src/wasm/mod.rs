//! WASM bindings for wasm-hub
//!
//! This module contains thin wrappers with #[wasm_bindgen] that delegate
//! to the core Rust implementations. Function names match the host's
//! existing imports, so they are exported without renaming.

pub mod call;
pub mod transaction;
pub mod try_into_js_value;

use wasm_bindgen::prelude::*;

// Re-export WASM functions
pub use call::{deserialize_call, serialize_call};
pub use transaction::{
    new_serialized_tx, new_serialized_unsigned_tx, parse_signed_tx,
    serialize_unsigned_transaction, signing_hash,
};

/// Route Rust panics to `console.error`
///
/// A no-op unless the crate is built with the `console_error_panic_hook`
/// feature.
#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
