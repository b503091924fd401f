use ed25519_dalek::{Signer as _, Verifier as _, VerifyingKey};
use rsa::pkcs1v15;
use rsa::signature::SignatureEncoding;
use rsa::{BigUint, RsaPublicKey};
use sha2::Sha256;

use crate::encoding::base64url_decode;
use crate::error::CryptoError;
use crate::jwk::{PublicJwk, PublicKeyParams};
use crate::keys::KeyMaterial;

/// Sign a message.
///
/// Ed25519 keys produce a 64-byte EdDSA signature, RSA keys an
/// RSASSA-PKCS1-v1_5 signature over SHA-256 (JOSE `RS256`).
pub fn sign(message: &[u8], key: &KeyMaterial) -> Vec<u8> {
    match key {
        KeyMaterial::Ed25519(signing_key) => signing_key.sign(message).to_bytes().to_vec(),
        KeyMaterial::Rsa(private_key) => {
            let signing_key = pkcs1v15::SigningKey::<Sha256>::new((**private_key).clone());
            rsa::signature::Signer::sign(&signing_key, message).to_vec()
        }
    }
}

/// Verify a signature against a public JWK.
pub fn verify(message: &[u8], signature: &[u8], jwk: &PublicJwk) -> Result<(), CryptoError> {
    match &jwk.params {
        PublicKeyParams::Okp { crv, x } => {
            if crv != "Ed25519" {
                return Err(CryptoError::UnsupportedKey(format!(
                    "unsupported OKP curve: {}",
                    crv
                )));
            }
            let key_bytes = base64url_decode(x)?;
            let key_arr: [u8; 32] =
                key_bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyLength {
                        expected: 32,
                        actual: key_bytes.len(),
                    })?;
            let verifying_key = VerifyingKey::from_bytes(&key_arr)
                .map_err(|e| CryptoError::InvalidKeyEncoding(format!("invalid public key: {}", e)))?;
            let signature = ed25519_dalek::Signature::from_slice(signature).map_err(|_| {
                CryptoError::InvalidInput(format!(
                    "signature must be 64 bytes, got {}",
                    signature.len()
                ))
            })?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| CryptoError::SignatureVerificationFailed)
        }
        PublicKeyParams::Rsa { n, e } => {
            let public_key = RsaPublicKey::new(
                BigUint::from_bytes_be(&base64url_decode(n)?),
                BigUint::from_bytes_be(&base64url_decode(e)?),
            )
            .map_err(|e| CryptoError::InvalidKeyEncoding(format!("invalid RSA key: {}", e)))?;
            let verifying_key = pkcs1v15::VerifyingKey::<Sha256>::new(public_key);
            let signature = pkcs1v15::Signature::try_from(signature)
                .map_err(|e| CryptoError::InvalidInput(format!("invalid signature: {}", e)))?;
            rsa::signature::Verifier::verify(&verifying_key, message, &signature)
                .map_err(|_| CryptoError::SignatureVerificationFailed)
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flipped_bit_breaks_signature(
            message in prop::collection::vec(any::<u8>(), 1..256),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let key = KeyMaterial::ed25519_from_seed(&[5u8; 32]);
            let sig = sign(&message, &key);
            let mut tampered = message.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= 1 << bit;
            prop_assert!(verify(&tampered, &sig, &key.public_jwk()).is_err());
        }
    }
}
