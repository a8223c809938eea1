use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Size in bytes of the random part of verification and reset tokens
pub const SECURE_TOKEN_BYTES: usize = 32;

/// Generate SHA-256 hash of a token string
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Random URL-safe token for links sent by email
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; SECURE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
