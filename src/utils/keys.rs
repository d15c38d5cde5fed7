use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

use crate::services::media::AspectRatio;

/// 32 random bytes, base64url without padding. Never derived from user input.
pub fn random_asset_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `<aspect>/<random>.mp4`
pub fn video_key(aspect_ratio: AspectRatio) -> String {
    format!("{}/{}.mp4", aspect_ratio, random_asset_id())
}

/// `<random>.<ext>`
pub fn thumbnail_key(extension: &str) -> String {
    format!("{}.{}", random_asset_id(), extension)
}
