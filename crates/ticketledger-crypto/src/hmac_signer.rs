//! Canonical-JSON HMAC-SHA256 signing, as used for signed charge tokens and
//! account-resolution tokens.
//!
//! `serde_json::Value`'s default `Map` is a `BTreeMap`, so serializing a
//! `Value::Object` already yields keys in sorted order recursively — that is
//! the entire "canonical JSON" requirement here. Signing is therefore
//! insensitive to the field order the caller built the payload in.

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use ticketledger_types::{EngineError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Holds one process-held HMAC secret. `charge_req_key` and
/// `account_validation_key` are each their own `HmacSigner` instance so a
/// compromise of one never lets a client forge the other's tokens.
#[derive(Clone)]
pub struct HmacSigner {
    key: Vec<u8>,
}

impl HmacSigner {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    fn canonical_bytes(value: &Value) -> Vec<u8> {
        // `Value`'s `Object` variant is a BTreeMap by default (the
        // `preserve_order` feature is not enabled anywhere in this
        // workspace), so `to_string` already emits sorted keys at every
        // nesting level.
        serde_json::to_vec(value).expect("Value always serializes")
    }

    fn digest_hex(&self, bytes: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(bytes);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Sign a payload that does not yet carry a `signature` field. Returns
    /// the hex digest to attach as `signature`.
    pub fn sign_value(&self, payload: &Value) -> String {
        self.digest_hex(&Self::canonical_bytes(payload))
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String> {
        let value = serde_json::to_value(payload)
            .map_err(|e| EngineError::internal(format!("signing payload serialization: {e}")))?;
        Ok(self.sign_value(&value))
    }

    /// Verify a payload object that carries a `signature` field: pop it,
    /// recompute over the remainder, compare in constant time.
    pub fn verify_object(&self, payload: &Value) -> Result<()> {
        let Value::Object(map) = payload else {
            return Err(EngineError::SignatureMissing);
        };
        let mut remainder: Map<String, Value> = map.clone();
        let Some(Value::String(signature)) = remainder.remove("signature") else {
            return Err(EngineError::SignatureMissing);
        };
        let expected = self.digest_hex(&Self::canonical_bytes(&Value::Object(remainder)));
        if constant_time_eq_str(&expected, &signature) {
            Ok(())
        } else {
            Err(EngineError::SignatureMismatch)
        }
    }
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_sign_round_trips() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let payload = json!({"amount": "100.00", "user": "u1"});
        let signature = signer.sign_value(&payload);
        let mut signed = payload.clone();
        signed["signature"] = json!(signature);
        assert!(signer.verify_object(&signed).is_ok());
    }

    #[test]
    fn signing_is_insensitive_to_key_insertion_order() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let a = json!({"a": 1, "b": 2, "c": 3});
        let b = json!({"c": 3, "a": 1, "b": 2});
        assert_eq!(signer.sign_value(&a), signer.sign_value(&b));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let payload = json!({"amount": "100.00"});
        let signature = signer.sign_value(&payload);
        let tampered = json!({"amount": "999.00", "signature": signature});
        assert!(signer.verify_object(&tampered).is_err());
    }

    #[test]
    fn missing_signature_is_rejected() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let payload = json!({"amount": "100.00"});
        assert!(signer.verify_object(&payload).is_err());
    }

    #[test]
    fn different_keys_do_not_cross_verify() {
        let charge_key = HmacSigner::new(b"charge-req-key".to_vec());
        let account_key = HmacSigner::new(b"account-validation-key".to_vec());
        let payload = json!({"account_number": "0123456789"});
        let signature = charge_key.sign_value(&payload);
        let mut signed = payload.clone();
        signed["signature"] = json!(signature);
        assert!(account_key.verify_object(&signed).is_err());
    }
}
