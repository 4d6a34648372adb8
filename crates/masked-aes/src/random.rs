//! Randomness plumbing for gadgets.

use rand::{CryptoRng, RngCore};

/// Wraps an RNG and counts the bytes it hands out.
///
/// Gadgets draw with `fill_bytes`, so the count equals the number of fresh random
/// bytes consumed by the masked computation.
#[derive(Clone, Debug)]
pub struct CountingRng<R> {
    inner: R,
    drawn: u64,
}

impl<R> CountingRng<R> {
    /// Wraps `inner` with a zeroed counter.
    pub fn new(inner: R) -> Self {
        Self { inner, drawn: 0 }
    }

    /// Bytes drawn since creation or the last [`reset`](Self::reset).
    pub fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Zeroes the counter.
    pub fn reset(&mut self) {
        self.drawn = 0;
    }

    /// Returns the wrapped RNG.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.drawn += 4;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.drawn += 8;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.drawn += dest.len() as u64;
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)?;
        self.drawn += dest.len() as u64;
        Ok(())
    }
}

impl<R: CryptoRng> CryptoRng for CountingRng<R> {}

/// Draws `N` fresh bytes.
#[inline]
pub(crate) fn fresh<const N: usize, R: RngCore>(rng: &mut R) -> [u8; N] {
    let mut out = [0u8; N];
    rng.fill_bytes(&mut out);
    out
}
