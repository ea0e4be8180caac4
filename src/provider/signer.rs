//! Private endpoint authentication.
//!
//! `API-Sign` is `base64(HMAC-SHA512(secret, path ++ SHA256(nonce ++ body)))`
//! with the secret base64 decoded first. Nonces must strictly increase for
//! one key, so requests of one credential set are issued one at a time.

use std::sync::atomic::{AtomicI64, Ordering};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use crate::{clock::Clock, error::Error};

type HmacSha512 = Hmac<Sha512>;

pub const API_KEY_HEADER: &str = "API-Key";
pub const API_SIGN_HEADER: &str = "API-Sign";

#[derive(Clone)]
pub struct RequestSigner {
    mac: HmacSha512,
}

impl RequestSigner {
    pub fn new(private_key_b64: &str) -> Result<Self, Error> {
        let secret = BASE64.decode(private_key_b64.trim()).map_err(|e| {
            Error::InvalidInput(format!("Private key is not valid base64: {}", e))
        })?;
        let mac = HmacSha512::new_from_slice(&secret).map_err(|e| {
            Error::InvalidInput(format!("Private key rejected: {}", e))
        })?;

        Ok(Self { mac })
    }

    pub fn sign(&self, api_path: &str, body: &str, nonce: &str) -> String {
        let mut sha256 = Sha256::new();
        sha256.update(nonce.as_bytes());
        sha256.update(body.as_bytes());
        let digest = sha256.finalize();

        let mut mac = self.mac.clone();
        mac.update(api_path.as_bytes());
        mac.update(&digest);

        BASE64.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequestSigner")
    }
}

/// Millisecond nonces that never repeat or go backwards, even when two
/// requests land in the same millisecond or the wall clock steps back.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicI64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, clock: &dyn Clock) -> i64 {
        let now = clock.now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        now.max(previous + 1)
    }
}
