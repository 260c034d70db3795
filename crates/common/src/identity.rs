use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of every user tag. This is the whole contract: no UUID syntax is checked.
pub const USER_TAG_LEN: usize = 36;

pub fn is_user_tag(tag: &str) -> bool {
    tag.len() == USER_TAG_LEN
}

/// Computes content tags and hands out unique write tokens.
///
/// Immutable collections are addressed by `digest`, so swapping the algorithm
/// changes every tag but none of the storage logic.
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Canonical digest of `bytes`, usable as a tag.
    fn digest(&self, bytes: &[u8]) -> String;

    /// A fresh token, unique per call. Used to name temporary files.
    fn token(&self) -> String;
}

/// SHA-256 digests rendered as lowercase hex, UUID v4 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Identity;

impl IdentityProvider for Sha256Identity {
    fn digest(&self, bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    fn token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
