//! secp256k1 keys and signatures for transaction authentication
//!
//! Signers use the Ethereum personal-message convention: the signed digest
//! is Keccak-256 of `"\x19Ethereum Signed Message:\n" ‖ len ‖ msg`, and
//! signatures carry a `v` byte of 27 or 28.

use crate::address::Address;
use crate::error::WasmHubError;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Compressed SEC1 secp256k1 public key length
pub const PUBLIC_KEY_LEN: usize = 33;
/// `r ‖ s ‖ v` recoverable signature length
pub const SIGNATURE_LEN: usize = 65;

/// Ethereum personal-message prefix, followed by the decimal message length
const ETH_MESSAGE_MAGIC: &str = "\x19Ethereum Signed Message:\n";

/// Offset added to the recovery id in the `v` byte
const V_OFFSET: u8 = 27;

/// A secp256k1 public key in its canonical compressed form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LEN],
    key: VerifyingKey,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmHubError> {
        let bytes: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            WasmHubError::malformed(format!(
                "Public key must be {} bytes, got {}",
                PUBLIC_KEY_LEN,
                bytes.len()
            ))
        })?;
        // SEC1 also parses 0x05 "compact" points; only 0x02/0x03 is canonical
        if !matches!(bytes[0], 0x02 | 0x03) {
            return Err(WasmHubError::malformed(format!(
                "Public key must be compressed (0x02 or 0x03 prefix), got 0x{:02x}",
                bytes[0]
            )));
        }
        let key = VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|e| WasmHubError::malformed(format!("Invalid public key: {}", e)))?;
        Ok(PublicKey { bytes, key })
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(key.to_encoded_point(true).as_bytes());
        PublicKey { bytes, key: *key }
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.bytes
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Rollup address controlled by this key
    pub fn address(&self) -> Address {
        Address::from_verifying_key(&self.key)
    }
}

/// A 65-byte recoverable ECDSA signature (`r ‖ s ‖ v`, `v` is 27 or 28)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LEN],
    signature: EcdsaSignature,
    recovery_id: RecoveryId,
}

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmHubError> {
        let bytes: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            WasmHubError::invalid_signature(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            ))
        })?;

        let v = bytes[64];
        let recovery_id = v
            .checked_sub(V_OFFSET)
            .filter(|id| *id <= 1)
            .and_then(RecoveryId::from_byte)
            .ok_or_else(|| {
                WasmHubError::invalid_signature(format!("Invalid recovery byte: {}", v))
            })?;

        let signature = EcdsaSignature::from_slice(&bytes[..64])
            .map_err(|_| WasmHubError::invalid_signature("Invalid signature format"))?;

        // (r, n - s) verifies too; only the low-S form is accepted
        if signature.normalize_s().is_some() {
            return Err(WasmHubError::invalid_signature(
                "Signature s value is not normalized",
            ));
        }

        Ok(Signature {
            bytes,
            signature,
            recovery_id,
        })
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.bytes
    }
}

/// Prefix a message the way Ethereum wallets do for `personal_sign`
pub fn prefix_message(msg: &[u8]) -> Vec<u8> {
    let prefix = format!("{}{}", ETH_MESSAGE_MAGIC, msg.len());
    [prefix.as_bytes(), msg].concat()
}

/// The 32-byte digest a signer signs for `msg`
pub fn signing_hash(msg: &[u8]) -> [u8; 32] {
    Keccak256::digest(prefix_message(msg)).into()
}

/// Check that `signature` is `public_key`'s signature over `msg`
///
/// The key recovered from the signature must equal `public_key`, and the
/// signature must verify under it.
pub fn verify(
    public_key: &PublicKey,
    signature: &Signature,
    msg: &[u8],
) -> Result<(), WasmHubError> {
    let hash = signing_hash(msg);

    let recovered =
        VerifyingKey::recover_from_prehash(&hash, &signature.signature, signature.recovery_id)
            .map_err(|_| WasmHubError::invalid_signature("Failed to recover public key"))?;

    if recovered != public_key.key {
        return Err(WasmHubError::invalid_signature(
            "Signature was not produced by the given public key",
        ));
    }

    public_key
        .key
        .verify_prehash(&hash, &signature.signature)
        .map_err(|e| WasmHubError::invalid_signature(format!("Verification failed: {}", e)))
}

/// Sign `msg` with the personal-message convention
pub fn sign(signing_key: &SigningKey, msg: &[u8]) -> Result<Signature, WasmHubError> {
    let hash = signing_hash(msg);
    let (signature, recovery_id): (EcdsaSignature, RecoveryId) = signing_key
        .sign_prehash(&hash)
        .map_err(|e| WasmHubError::invalid_signature(format!("Signing failed: {}", e)))?;

    let mut bytes = [0u8; SIGNATURE_LEN];
    bytes[..64].copy_from_slice(&signature.to_bytes());
    bytes[64] = recovery_id.to_byte() + V_OFFSET;

    Ok(Signature {
        bytes,
        signature,
        recovery_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_slice(&[seed; 32]).unwrap()
    }

    #[test]
    fn test_prefix_message() {
        assert_eq!(
            prefix_message(b"hello"),
            b"\x19Ethereum Signed Message:\n5hello".to_vec()
        );
    }

    #[test]
    fn test_signing_hash_matches_personal_sign() {
        // keccak256("\x19Ethereum Signed Message:\n0")
        assert_eq!(
            hex::encode(signing_hash(b"")),
            "5f35dce98ba4fba25530a026ed80b2cecdaa31091ba4958b99b52ea1d068adad"
        );
    }

    #[test]
    fn test_sign_then_verify() {
        let sk = signing_key(1);
        let pk = PublicKey::from_verifying_key(sk.verifying_key());
        let sig = sign(&sk, b"message").unwrap();

        assert!(matches!(sig.as_bytes()[64], 27 | 28));
        assert!(verify(&pk, &sig, b"message").is_ok());

        let parsed = Signature::from_bytes(sig.as_bytes()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn test_wrong_message_rejected() {
        let sk = signing_key(1);
        let pk = PublicKey::from_verifying_key(sk.verifying_key());
        let sig = sign(&sk, b"message").unwrap();
        assert!(matches!(
            verify(&pk, &sig, b"other message"),
            Err(WasmHubError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sig = sign(&signing_key(1), b"message").unwrap();
        let other = PublicKey::from_verifying_key(signing_key(2).verifying_key());
        assert!(matches!(
            verify(&other, &sig, b"message"),
            Err(WasmHubError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_format_checks() {
        let sig = sign(&signing_key(3), b"message").unwrap();

        assert!(Signature::from_bytes(&sig.as_bytes()[..64]).is_err());

        for v in [0u8, 1, 26, 29, 31] {
            let mut bytes = *sig.as_bytes();
            bytes[64] = v;
            assert!(matches!(
                Signature::from_bytes(&bytes),
                Err(WasmHubError::InvalidSignature(_))
            ));
        }

        // r = 0 is not a valid scalar
        let mut zero_r = *sig.as_bytes();
        zero_r[..32].fill(0);
        assert!(Signature::from_bytes(&zero_r).is_err());
    }

    #[test]
    fn test_high_s_rejected() {
        let sig = sign(&signing_key(4), b"message").unwrap();
        let r = sig.signature.r().to_bytes();
        let s = (-*sig.signature.s()).to_bytes();
        let high = EcdsaSignature::from_scalars(r, s).unwrap();

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&high.to_bytes());
        bytes[64] = ((sig.as_bytes()[64] - V_OFFSET) ^ 1) + V_OFFSET;
        assert!(matches!(
            Signature::from_bytes(&bytes),
            Err(WasmHubError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_public_key_checks() {
        let pk = PublicKey::from_verifying_key(signing_key(5).verifying_key());
        assert_eq!(PublicKey::from_bytes(pk.as_bytes()).unwrap(), pk);

        let uncompressed = signing_key(5).verifying_key().to_encoded_point(false);
        assert!(PublicKey::from_bytes(uncompressed.as_bytes()).is_err());

        let mut uncompressed_tag = *pk.as_bytes();
        uncompressed_tag[0] = 0x04;
        assert!(matches!(
            PublicKey::from_bytes(&uncompressed_tag),
            Err(WasmHubError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_compact_tag_rejected() {
        // Some of these x coordinates are valid compact points under SEC1
        for seed in 1..=8u8 {
            let pk = PublicKey::from_verifying_key(signing_key(seed).verifying_key());
            let mut compact = *pk.as_bytes();
            compact[0] = 0x05;
            assert!(
                matches!(
                    PublicKey::from_bytes(&compact),
                    Err(WasmHubError::MalformedInput(_))
                ),
                "seed {}",
                seed
            );
        }
    }
}
