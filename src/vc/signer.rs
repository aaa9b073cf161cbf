// src/vc/signer.rs
//! Detached credential signatures.
//!
//! A signature is an HS256 JWT whose payload is the full envelope plus
//! `iat`/`exp` claims. The key is the process-wide shared secret, injected
//! at construction.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::models::credential::CredentialEnvelope;

/// Hours in a 365.25-day year.
const HOURS_PER_YEAR: i64 = 8766;

/// Why a signature token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFailure {
    #[error("malformed signature token")]
    Malformed,
    #[error("signature token expired")]
    Expired,
    #[error("signature does not match")]
    Mismatch,
}

#[derive(Serialize)]
struct SigningClaims<'a> {
    #[serde(flatten)]
    envelope: &'a CredentialEnvelope,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct VerifiedClaims {
    #[serde(flatten)]
    envelope: CredentialEnvelope,
}

/// Signs envelopes and verifies signature tokens under one shared secret.
#[derive(Clone)]
pub struct CredentialSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl CredentialSigner {
    /// Creates a signer whose tokens stay valid for `validity_years`
    /// years of 365.25 days.
    ///
    /// # Errors
    /// Returns [`WalletError::Config`] when the lifetime does not fit a
    /// [`Duration`].
    pub fn new(secret: &[u8], validity_years: i64) -> Result<Self, WalletError> {
        let validity = validity_years
            .checked_mul(HOURS_PER_YEAR)
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                config::ConfigError::Message(format!(
                    "credential validity of {validity_years} years is out of range"
                ))
            })?;
        Ok(Self::with_validity(secret, validity))
    }

    pub fn with_validity(secret: &[u8], validity: Duration) -> Self {
        CredentialSigner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity,
        }
    }

    /// Produces a signature token embedding `envelope`.
    ///
    /// Callers must not assume tokens are deterministic.
    pub fn sign(&self, envelope: &CredentialEnvelope) -> Result<String, WalletError> {
        let now = Utc::now();
        let claims = SigningClaims {
            envelope,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Checks a token's integrity and expiry and returns the embedded envelope.
    ///
    /// Never panics or propagates decoding errors; every rejection is folded
    /// into a [`SignatureFailure`].
    pub fn verify(&self, token: &str) -> Result<CredentialEnvelope, SignatureFailure> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<VerifiedClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.envelope),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => SignatureFailure::Expired,
                ErrorKind::InvalidSignature => SignatureFailure::Mismatch,
                _ => SignatureFailure::Malformed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vc::envelope;
    use serde_json::json;

    fn signer() -> CredentialSigner {
        CredentialSigner::new(b"test-secret", 10).unwrap()
    }

    #[test]
    fn test_sign_then_verify_returns_envelope() {
        let envelope = envelope::build(
            json!({ "studentId": "2024CSE001", "gpa": 8.7, "tags": ["a", "b"] }),
            "https://csvtu.ac.in/registrar",
            "TranscriptCredential",
        );
        let token = signer().sign(&envelope).unwrap();
        assert_eq!(signer().verify(&token), Ok(envelope));
    }

    #[test]
    fn test_wrong_secret_is_mismatch() {
        let envelope = envelope::build(json!({}), "issuer", "Tag");
        let token = signer().sign(&envelope).unwrap();
        let other = CredentialSigner::new(b"another-secret", 10).unwrap();
        assert_eq!(other.verify(&token), Err(SignatureFailure::Mismatch));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let envelope = envelope::build(json!({ "grade": "B" }), "issuer", "Tag");
        let token = signer().sign(&envelope).unwrap();

        let forged = envelope::build(json!({ "grade": "A" }), "issuer", "Tag");
        let forged_token = CredentialSigner::new(b"attacker", 10)
            .unwrap()
            .sign(&forged).unwrap();

        // Swap in the forged payload under the original signature.
        let original: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_token.split('.').collect();
        let spliced = format!("{}.{}.{}", original[0], forged_parts[1], original[2]);

        assert_eq!(signer().verify(&spliced), Err(SignatureFailure::Mismatch));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(signer().verify("demo_signature"), Err(SignatureFailure::Malformed));
        assert_eq!(signer().verify(""), Err(SignatureFailure::Malformed));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = CredentialSigner::with_validity(b"test-secret", Duration::hours(-2));
        let token = expired.sign(&envelope::build(json!({}), "issuer", "Tag")).unwrap();
        assert_eq!(signer().verify(&token), Err(SignatureFailure::Expired));
    }

    #[test]
    fn test_validity_counts_leap_days() {
        let token = signer().sign(&envelope::build(json!({}), "issuer", "Tag")).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let bytes = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).unwrap();
        let claims: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let lifetime = claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap();
        assert_eq!(lifetime, 10 * 8766 * 3600);
    }

    #[test]
    fn test_out_of_range_validity_is_a_config_error() {
        assert!(matches!(
            CredentialSigner::new(b"test-secret", i64::MAX / 2),
            Err(WalletError::Config(_))
        ));
    }
}
