//! Shared key generation for storage backends.
//!
//! Key format: `{aspect}/{random}`. The random part never derives from the
//! uploaded filename.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tubely_core::models::AspectRatio;

/// Bytes of entropy in every generated key component
pub const KEY_ENTROPY_BYTES: usize = 32;

/// 32 random bytes encoded as URL-safe base64 without padding (43 characters).
pub fn random_key_component() -> String {
    let mut buf = [0u8; KEY_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Generate an object key for a video with the given aspect classification.
pub fn generate_video_key(aspect: AspectRatio) -> String {
    format!("{}/{}", aspect.key_prefix(), random_key_component())
}
