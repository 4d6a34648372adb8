//! AES-128 key and expanded key schedule.

use crate::{Block, ROUNDS};

/// Number of bytes in a fully expanded AES-128 key schedule.
pub const EXPANDED_KEY_BYTES: usize = 16 * (ROUNDS + 1);

/// A 128-bit cipher key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aes128Key([u8; 16]);

impl Aes128Key {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Aes128Key {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

/// The eleven round keys of AES-128, round 0 first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKeys([Block; ROUNDS + 1]);

impl RoundKeys {
    pub(crate) fn new(round_keys: [Block; ROUNDS + 1]) -> Self {
        Self(round_keys)
    }

    /// Round key `round` (0..=10).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.0[round]
    }

    /// Flattens the schedule round-major: bytes `16 * r .. 16 * r + 16` hold round key `r`.
    pub fn to_bytes(&self) -> [u8; EXPANDED_KEY_BYTES] {
        let mut out = [0u8; EXPANDED_KEY_BYTES];
        for (chunk, round_key) in out.chunks_exact_mut(16).zip(&self.0) {
            chunk.copy_from_slice(round_key);
        }
        out
    }
}
