use base64::engine::{general_purpose, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::debug;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Intake-Timestamp";
pub const NONCE_HEADER: &str = "X-Intake-Nonce";
pub const SIGNATURE_HEADER: &str = "X-Intake-Signature";

/// Signs outbound intake payloads with a shared secret
#[derive(Clone)]
pub struct IntakeSigner {
    secret: String,
}

impl IntakeSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generate a random nonce for a request
    pub fn generate_nonce() -> String {
        rand::thread_rng().gen_range(10000000..99999999).to_string()
    }

    /// Get current timestamp for a request
    pub fn get_timestamp() -> i64 {
        Utc::now().timestamp()
    }

    /// Signature over `timestamp\nnonce\nbody`: base64 of the hex HMAC-SHA256 digest
    pub fn generate_signature(&self, timestamp: i64, nonce: &str, body: &str) -> String {
        let content = format!("{}\n{}\n{}", timestamp, nonce, body);

        debug!("Signing intake payload of {} bytes", body.len());

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(content.as_bytes());

        let hex_hash = hex::encode(mac.finalize().into_bytes());
        general_purpose::STANDARD.encode(hex_hash.as_bytes())
    }

    /// Headers to attach to a request carrying `body`
    pub fn headers(&self, body: &str) -> [(&'static str, String); 3] {
        let timestamp = Self::get_timestamp();
        let nonce = Self::generate_nonce();
        let signature = self.generate_signature(timestamp, &nonce, body);

        [
            (TIMESTAMP_HEADER, timestamp.to_string()),
            (NONCE_HEADER, nonce),
            (SIGNATURE_HEADER, signature),
        ]
    }
}
