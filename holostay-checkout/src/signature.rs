use hmac::{Hmac, Mac};
use sha2::Sha256;
use holostay_shared::Masked;

type HmacSha256 = Hmac<Sha256>;

/// Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`
pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("No signature provided")]
    Missing,

    #[error("Invalid signature")]
    Invalid { reason: &'static str },
}

/// Verifies provider webhook signatures against the shared signing secret
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: Masked<String>,
    tolerance_seconds: i64,
}

impl WebhookVerifier {
    pub fn new(secret: Masked<String>) -> Self {
        Self {
            secret,
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }

    pub fn with_tolerance(mut self, seconds: i64) -> Self {
        self.tolerance_seconds = seconds;
        self
    }

    fn mac(&self) -> Result<HmacSha256, SignatureError> {
        HmacSha256::new_from_slice(self.secret.expose().as_bytes())
            .map_err(|_| SignatureError::Invalid { reason: "unusable signing secret" })
    }

    /// MAC over `"{t}.{payload}"`, where `t` is the timestamp text exactly as
    /// it appears in the header
    fn signed_mac(&self, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = self.mac()?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Produce a header value for `payload` signed at `timestamp`
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let t = timestamp.to_string();
        match self.signed_mac(&t, payload) {
            Ok(mac) => format!("t={},v1={}", t, hex::encode(mac.finalize().into_bytes())),
            Err(_) => format!("t={}", t),
        }
    }

    pub fn verify(&self, payload: &[u8], header: Option<&str>, now: i64) -> Result<(), SignatureError> {
        let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(SignatureError::Missing)?;

        let mut raw_timestamp: Option<&str> = None;
        let mut candidates: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => raw_timestamp = Some(value),
                Some(("v1", value)) => {
                    if let Ok(bytes) = hex::decode(value) {
                        candidates.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let raw_timestamp = raw_timestamp.ok_or(SignatureError::Invalid { reason: "missing timestamp" })?;
        let timestamp: i64 = raw_timestamp
            .parse()
            .map_err(|_| SignatureError::Invalid { reason: "malformed timestamp" })?;
        if candidates.is_empty() {
            return Err(SignatureError::Invalid { reason: "no v1 signature" });
        }

        let mac = self.signed_mac(raw_timestamp, payload)?;

        // verify_slice compares in constant time
        let matched = candidates
            .iter()
            .any(|candidate| mac.clone().verify_slice(candidate).is_ok());
        if !matched {
            return Err(SignatureError::Invalid { reason: "signature mismatch" });
        }

        if self.tolerance_seconds > 0 && (now - timestamp).abs() > self.tolerance_seconds {
            return Err(SignatureError::Invalid { reason: "timestamp outside tolerance" });
        }

        Ok(())
    }
}
