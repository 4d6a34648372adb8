//! Composed gadgets on `d` shares.
//!
//! The share vector is cut into the blocks of a [`ShareLayout`]; copy and addition run the
//! matching elementary gadget on each block independently, multiplication accumulates
//! elementary products across the blocks of its second operand under two extra masks.

use aes_core::gf256::add;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::config::{Arity, MaskingConfig, ShareLayout};
use crate::elementary::{add_2, add_3, copy_2, copy_3, mult_2, mult_3};
use crate::error::MaskingError;
use crate::random::fresh;
use crate::shares::Shares;

/// Masking context: a fixed share layout plus the randomness source every gadget draws from.
///
/// Secret operands are taken by value. Once passed to [`add`](Self::add) or
/// [`mult`](Self::mult) a vector is gone; reuse requires [`copy`](Self::copy).
pub struct Masking<R: RngCore + CryptoRng> {
    layout: ShareLayout,
    rng: R,
}

impl<R: RngCore + CryptoRng> Masking<R> {
    /// Creates a context with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::from_layout(rng, ShareLayout::default())
    }

    /// Creates a context with an explicit configuration.
    pub fn with_config(rng: R, config: MaskingConfig) -> Result<Self, MaskingError> {
        Ok(Self::from_layout(rng, ShareLayout::new(config.shares)?))
    }

    fn from_layout(rng: R, layout: ShareLayout) -> Self {
        debug!(
            shares = layout.shares(),
            blocks = layout.blocks().len(),
            add_rand = layout.add_randomness(),
            copy_rand = layout.copy_randomness(),
            mult_rand = layout.mult_randomness(),
            "masking context ready"
        );
        Self { layout, rng }
    }

    /// Share layout in use.
    #[inline]
    pub fn layout(&self) -> &ShareLayout {
        &self.layout
    }

    /// Share count `d`.
    #[inline]
    pub fn shares(&self) -> usize {
        self.layout.shares()
    }

    /// Borrows the randomness source.
    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Mutably borrows the randomness source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Consumes the context and returns its randomness source.
    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Masks `secret` with `d - 1` fresh random bytes.
    pub fn share(&mut self, secret: u8) -> Shares {
        Shares::random(&mut self.rng, secret, self.layout.shares())
    }

    /// Masks every byte of `secrets`.
    pub fn share_bytes(&mut self, secrets: &[u8]) -> Vec<Shares> {
        secrets.iter().map(|&s| self.share(s)).collect()
    }

    /// Checks a vector belongs to this layout.
    pub fn validate(&self, operand: &Shares) -> Result<(), MaskingError> {
        if operand.len() != self.layout.shares() {
            return Err(MaskingError::ShareLength {
                expected: self.layout.shares(),
                actual: operand.len(),
            });
        }
        Ok(())
    }

    #[inline]
    fn check(&self, operand: &Shares) {
        assert_eq!(
            operand.len(),
            self.layout.shares(),
            "share vector does not match the masking layout"
        );
    }

    /// Secure addition `c = a + b`.
    pub fn add(&mut self, a: Shares, b: Shares) -> Shares {
        self.check(&a);
        self.check(&b);
        let (a, b) = (a.as_slice(), b.as_slice());
        let mut c = vec![0u8; self.layout.shares()];
        for block in self.layout.blocks() {
            let s = block.start;
            match block.arity {
                Arity::Two => {
                    let k = add_2(&mut self.rng, [a[s], a[s + 1]], [b[s], b[s + 1]]);
                    c[s..s + 2].copy_from_slice(&k);
                }
                Arity::Three => {
                    let k = add_3(
                        &mut self.rng,
                        [a[s], a[s + 1], a[s + 2]],
                        [b[s], b[s + 1], b[s + 2]],
                    );
                    c[s..s + 3].copy_from_slice(&k);
                }
            }
        }
        Shares::from_raw(c)
    }

    /// Secure copy: two independently remasked vectors encoding the same secret.
    pub fn copy(&mut self, a: Shares) -> (Shares, Shares) {
        self.check(&a);
        let a = a.as_slice();
        let mut d = vec![0u8; self.layout.shares()];
        let mut e = vec![0u8; self.layout.shares()];
        for block in self.layout.blocks() {
            let s = block.start;
            match block.arity {
                Arity::Two => {
                    let (n, k) = copy_2(&mut self.rng, [a[s], a[s + 1]]);
                    d[s..s + 2].copy_from_slice(&n);
                    e[s..s + 2].copy_from_slice(&k);
                }
                Arity::Three => {
                    let (n, k) = copy_3(&mut self.rng, [a[s], a[s + 1], a[s + 2]]);
                    d[s..s + 3].copy_from_slice(&n);
                    e[s..s + 3].copy_from_slice(&k);
                }
            }
        }
        (Shares::from_raw(d), Shares::from_raw(e))
    }

    /// Fans `a` out into `N` independent vectors with a chain of `N - 1` copies:
    /// `copy(a) -> (c0, t0)`, `copy(t0) -> (c1, t1)`, ..., the last copy yielding
    /// `(c[N-2], c[N-1])`. `copies::<1>` returns `a` untouched.
    ///
    /// # Panics
    ///
    /// If `N` is zero, since the operand would be dropped.
    pub fn copies<const N: usize>(&mut self, a: Shares) -> [Shares; N] {
        assert!(N >= 1, "copies needs at least one output");
        let mut rest = Some(a);
        core::array::from_fn(|i| {
            let current = rest.take().expect("copy chain holds a vector until its last output");
            if i + 1 == N {
                current
            } else {
                let (head, tail) = self.copy(current);
                rest = Some(tail);
                head
            }
        })
    }

    /// Secure multiplication `c = a * b` over GF(2^8).
    ///
    /// Output share `p` sums, over every block of `b`, the elementary product of the
    /// broadcast share `a[p]` with that block. Each partial share is blinded by the
    /// call-wide masks `r0`/`r1` before it is folded in; the masks cancel per block.
    pub fn mult(&mut self, a: Shares, b: Shares) -> Shares {
        self.check(&a);
        self.check(&b);
        let [r0, r1] = fresh::<2, _>(&mut self.rng);
        let (a, b) = (a.as_slice(), b.as_slice());
        let mut c = Vec::with_capacity(self.layout.shares());
        for &ap in a {
            let mut acc = 0u8;
            for block in self.layout.blocks() {
                let s = block.start;
                match block.arity {
                    Arity::Two => {
                        let k = mult_2(&mut self.rng, [ap, ap], [b[s], b[s + 1]]);
                        let var0 = add(k[0], r0);
                        acc = add(acc, var0);
                        let var1 = add(k[1], r0);
                        acc = add(acc, var1);
                    }
                    Arity::Three => {
                        let k = mult_3(&mut self.rng, [ap, ap, ap], [b[s], b[s + 1], b[s + 2]]);
                        let var0 = add(k[0], r0);
                        acc = add(acc, var0);
                        let var1 = add(k[1], r1);
                        acc = add(acc, var1);
                        let var2 = add(r0, r1);
                        let var2 = add(k[2], var2);
                        acc = add(acc, var2);
                    }
                }
            }
            c.push(acc);
        }
        Shares::from_raw(c)
    }

    /// `c = a + k` for a public constant, via the trivial sharing `(k, 0, ..., 0)`.
    pub fn add_const(&mut self, k: u8, a: Shares) -> Shares {
        let constant = Shares::constant(k, self.layout.shares());
        self.add(constant, a)
    }

    /// `c = a * k` for a public constant, via the trivial sharing `(k, 0, ..., 0)`.
    pub fn mult_const(&mut self, k: u8, a: Shares) -> Shares {
        let constant = Shares::constant(k, self.layout.shares());
        self.mult(a, constant)
    }
}
