use rand::{TryRngCore, rngs::OsRng};

use crate::error::{Error, Result};

/// Number of random bytes behind each state nonce.
const STATE_BYTES: usize = 88;

/// Generate the OAuth `state` anti-forgery nonce: 88 bytes from the OS
/// secure random source, hex-encoded.
///
/// Fails rather than degrades if the OS cannot supply entropy. Each call
/// produces an independent value; the nonce is single-use per attempt.
pub fn generate_state() -> Result<String> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(e.to_string()))?;

    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}
