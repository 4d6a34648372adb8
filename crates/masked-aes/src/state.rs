//! Masked blocks, masked round keys and the in-flight masked AES state.

use aes_core::round::{INV_SHIFT_ROWS, SHIFT_ROWS};
use aes_core::{Block, RoundKeys, EXPANDED_KEY_BYTES, ROUNDS};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::MaskingError;
use crate::gadgets::Masking;
use crate::shares::Shares;

const BLOCK_BYTES: usize = 16;

/// Logical-to-physical slot map of the masked state.
///
/// Logical index `i` is the column-major AES state position; `slot(i)` is where its share
/// vector is stored. ShiftRows only rewrites this map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Positions([u8; BLOCK_BYTES]);

impl Positions {
    /// Every logical index stored in its own slot.
    pub const fn identity() -> Self {
        let mut map = [0u8; BLOCK_BYTES];
        let mut i = 0;
        while i < BLOCK_BYTES {
            map[i] = i as u8;
            i += 1;
        }
        Self(map)
    }

    /// Physical slot holding logical byte `logical`.
    #[inline]
    pub fn slot(&self, logical: usize) -> usize {
        self.0[logical] as usize
    }

    fn permute(&mut self, sources: &[usize; BLOCK_BYTES]) {
        let old = self.0;
        for (dst, &from) in self.0.iter_mut().zip(sources.iter()) {
            *dst = old[from];
        }
    }

    /// Row `r` rotated left by `r`.
    pub fn shift_rows(&mut self) {
        self.permute(&SHIFT_ROWS);
    }

    /// Row `r` rotated right by `r`.
    pub fn inv_shift_rows(&mut self) {
        self.permute(&INV_SHIFT_ROWS);
    }
}

impl Default for Positions {
    fn default() -> Self {
        Self::identity()
    }
}

/// Sixteen share vectors, one per AES state byte in column-major order.
#[derive(Debug, PartialEq, Eq)]
pub struct MaskedBlock(Vec<Shares>);

impl MaskedBlock {
    /// Wraps exactly 16 share vectors.
    pub fn new(bytes: Vec<Shares>) -> Result<Self, MaskingError> {
        if bytes.len() != BLOCK_BYTES {
            return Err(MaskingError::BlockLength {
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Masks a cleartext block.
    pub fn share<R: RngCore + CryptoRng>(m: &mut Masking<R>, block: &Block) -> Self {
        Self(m.share_bytes(block))
    }

    /// Share vectors in state order.
    pub fn bytes(&self) -> &[Shares] {
        &self.0
    }

    /// Releases the share vectors.
    pub fn into_bytes(self) -> Vec<Shares> {
        self.0
    }

    /// Recombines every byte. Only meaningful at the trusted boundary.
    pub fn unshare(&self) -> Block {
        core::array::from_fn(|i| self.0[i].unshare())
    }
}

/// Fully expanded AES-128 key material as 176 share vectors, round-major.
///
/// One `encrypt` or `decrypt` call consumes the whole set; use [`split`](Self::split) to
/// derive independent sets for several calls.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Shares>")]
pub struct MaskedRoundKeys(Vec<Shares>);

impl TryFrom<Vec<Shares>> for MaskedRoundKeys {
    type Error = MaskingError;

    fn try_from(bytes: Vec<Shares>) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl MaskedRoundKeys {
    /// Wraps exactly 176 share vectors of a uniform share count.
    pub fn new(bytes: Vec<Shares>) -> Result<Self, MaskingError> {
        if bytes.len() != EXPANDED_KEY_BYTES {
            return Err(MaskingError::RoundKeyLength {
                actual: bytes.len(),
            });
        }
        let expected = bytes[0].len();
        if expected < 2 {
            return Err(MaskingError::InvalidShareCount { shares: expected });
        }
        if let Some(odd) = bytes.iter().find(|s| s.len() != expected) {
            return Err(MaskingError::ShareLength {
                expected,
                actual: odd.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Masks an expanded key schedule.
    pub fn share<R: RngCore + CryptoRng>(m: &mut Masking<R>, round_keys: &RoundKeys) -> Self {
        Self(m.share_bytes(&round_keys.to_bytes()))
    }

    /// Share count of the material.
    pub fn shares(&self) -> usize {
        self.0[0].len()
    }

    /// Share vectors, round-major.
    pub fn bytes(&self) -> &[Shares] {
        &self.0
    }

    /// Refreshes every vector through the copy gadget, yielding two independent key sets.
    pub fn split<R: RngCore + CryptoRng>(self, m: &mut Masking<R>) -> (Self, Self) {
        let (first, second) = self.0.into_iter().map(|s| m.copy(s)).unzip();
        (Self(first), Self(second))
    }

    /// Recombines the schedule. Only meaningful at the trusted boundary.
    pub fn unshare(&self) -> [u8; EXPANDED_KEY_BYTES] {
        core::array::from_fn(|i| self.0[i].unshare())
    }

    /// Serializes the key material with `bincode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MaskingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserializes key material with `bincode`, re-checking its shape.
    ///
    /// A well-formed encoding of the wrong shape reports the shape error itself rather than
    /// [`MaskingError::Decode`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MaskingError> {
        let raw: Vec<Shares> = bincode::deserialize(bytes)?;
        Self::new(raw)
    }

    /// Splits into the 11 round keys, round 0 first.
    pub(crate) fn into_rounds(self) -> Vec<Vec<Shares>> {
        let mut bytes = self.0.into_iter();
        (0..=ROUNDS)
            .map(|_| bytes.by_ref().take(BLOCK_BYTES).collect())
            .collect()
    }
}

/// The masked state during one encryption or decryption.
pub(crate) struct MaskedState {
    slots: Vec<Shares>,
    positions: Positions,
}

impl MaskedState {
    pub(crate) fn new(block: MaskedBlock) -> Self {
        Self {
            slots: block.into_bytes(),
            positions: Positions::identity(),
        }
    }

    pub(crate) fn positions_mut(&mut self) -> &mut Positions {
        &mut self.positions
    }

    /// Moves logical byte `logical` out, leaving its slot vacant until [`put`](Self::put).
    pub(crate) fn take(&mut self, logical: usize) -> Shares {
        let slot = self.positions.slot(logical);
        let shares = std::mem::replace(&mut self.slots[slot], Shares::vacant());
        debug_assert!(!shares.is_empty(), "logical byte {logical} taken twice");
        shares
    }

    pub(crate) fn put(&mut self, logical: usize, shares: Shares) {
        let slot = self.positions.slot(logical);
        debug_assert!(self.slots[slot].is_empty(), "logical byte {logical} still occupied");
        self.slots[slot] = shares;
    }

    /// Replaces every byte, in logical order, with `f(byte)`.
    pub(crate) fn update_each(&mut self, mut f: impl FnMut(Shares) -> Shares) {
        for logical in 0..BLOCK_BYTES {
            let shares = self.take(logical);
            self.put(logical, f(shares));
        }
    }

    /// Materializes logical order.
    pub(crate) fn into_block(mut self) -> MaskedBlock {
        MaskedBlock((0..BLOCK_BYTES).map(|i| self.take(i)).collect())
    }
}
