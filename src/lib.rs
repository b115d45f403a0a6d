//! wasm-hub: WASM module for rollup hub transaction operations
//!
//! This crate provides:
//! - Runtime call encoding (JSON call description to canonical Borsh bytes)
//! - Unsigned transaction assembly from a runtime message and chain parameters
//! - Signed transaction assembly, gated on signature verification
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`

pub mod address;
pub mod call;
pub mod crypto;
pub mod error;
pub mod params;
pub mod transaction;
pub mod wasm;

// Re-export main types for convenience
pub use address::{validate_address, Address, TokenId};
pub use call::{decode_call, encode_call, RuntimeCall};
pub use crypto::{PublicKey, Signature};
pub use error::WasmHubError;
pub use params::TxParams;
pub use transaction::{
    assemble_signed, assemble_unsigned, SignedTransaction, UnsignedTransaction,
};
