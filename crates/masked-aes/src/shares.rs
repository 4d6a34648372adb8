//! Share vectors: a byte split into `d` GF(2^8) values whose XOR is the byte.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::MaskingError;

/// A Boolean sharing of one secret byte.
///
/// Move-only: gadgets consume their operands, and the copy gadget is the only way to obtain
/// two usable vectors encoding the same secret.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shares(Vec<u8>);

impl Shares {
    /// Wraps raw shares, checking they match the expected share count.
    pub fn from_vec(shares: Vec<u8>, expected: usize) -> Result<Self, MaskingError> {
        if shares.len() != expected {
            return Err(MaskingError::ShareLength {
                expected,
                actual: shares.len(),
            });
        }
        Ok(Self(shares))
    }

    /// Splits `secret` into `shares` values: `shares - 1` uniform bytes and a last share that
    /// fixes the XOR to `secret`.
    pub(crate) fn random<R: RngCore>(rng: &mut R, secret: u8, shares: usize) -> Self {
        let mut out = vec![0u8; shares];
        let (last, masks) = out.split_last_mut().expect("at least one share");
        rng.fill_bytes(masks);
        *last = masks.iter().fold(secret, |acc, m| acc ^ m);
        Self(out)
    }

    /// Trivial sharing `(value, 0, ..., 0)` of a public constant.
    pub(crate) fn constant(value: u8, shares: usize) -> Self {
        let mut out = vec![0u8; shares];
        out[0] = value;
        Self(out)
    }

    pub(crate) fn from_raw(shares: Vec<u8>) -> Self {
        Self(shares)
    }

    /// Placeholder left behind when a slot's vector has been moved out.
    pub(crate) fn vacant() -> Self {
        Self(Vec::new())
    }

    /// Number of shares.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a vacant placeholder.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw share values.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Recombines the shares. Only meaningful at the trusted boundary.
    pub fn unshare(&self) -> u8 {
        self.0.iter().fold(0, |acc, s| acc ^ s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn sharing_recombines_for_every_byte() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        for shares in 2..=7 {
            for secret in 0..=255u8 {
                let s = Shares::random(&mut rng, secret, shares);
                assert_eq!(s.len(), shares);
                assert_eq!(s.unshare(), secret);
            }
        }
    }

    #[test]
    fn constant_sharing_is_trivial() {
        let c = Shares::constant(0x63, 4);
        assert_eq!(c.as_slice(), &[0x63, 0, 0, 0]);
        assert_eq!(c.unshare(), 0x63);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Shares::from_vec(vec![1, 2, 3], 3).is_ok());
        assert!(matches!(
            Shares::from_vec(vec![1, 2], 3),
            Err(MaskingError::ShareLength {
                expected: 3,
                actual: 2
            })
        ));
    }
}
