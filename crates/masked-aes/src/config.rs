//! Masking configuration and the block partition of a share vector.

use core::ops::Range;

use crate::error::MaskingError;

/// Share count of the reference build.
pub const DEFAULT_SHARES: usize = 5;

/// Configuration for a masking context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskingConfig {
    /// Number of shares `d` per masked byte.
    pub shares: usize,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            shares: DEFAULT_SHARES,
        }
    }
}

/// Arity of an elementary gadget block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Two-share block.
    Two,
    /// Three-share block, only ever the last block of an odd share count.
    Three,
}

impl Arity {
    /// Number of shares covered by the block.
    pub const fn len(self) -> usize {
        match self {
            Arity::Two => 2,
            Arity::Three => 3,
        }
    }

    /// Random bytes drawn by the elementary addition gadget.
    pub const fn add_randomness(self) -> usize {
        match self {
            Arity::Two => 4,
            Arity::Three => 6,
        }
    }

    /// Random bytes drawn by the elementary copy gadget.
    pub const fn copy_randomness(self) -> usize {
        match self {
            Arity::Two => 2,
            Arity::Three => 6,
        }
    }

    /// Random bytes drawn by the elementary multiplication gadget.
    pub const fn mult_randomness(self) -> usize {
        match self {
            Arity::Two => 4,
            Arity::Three => 10,
        }
    }
}

/// One block of the partition: a contiguous share range handled by one elementary gadget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareBlock {
    /// First share index covered.
    pub start: usize,
    /// Elementary gadget arity for this block.
    pub arity: Arity,
}

impl ShareBlock {
    /// Share indices covered by the block.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.arity.len()
    }
}

/// Partition of `0..d` into `floor(d / 2)` blocks of two shares, the last one widened to
/// three shares when `d` is odd.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareLayout {
    shares: usize,
    blocks: Vec<ShareBlock>,
}

impl ShareLayout {
    /// Builds the partition for `shares` shares.
    pub fn new(shares: usize) -> Result<Self, MaskingError> {
        if shares < 2 {
            return Err(MaskingError::InvalidShareCount { shares });
        }
        let count = shares / 2;
        let blocks = (0..count)
            .map(|j| ShareBlock {
                start: 2 * j,
                arity: if j + 1 == count && shares % 2 == 1 {
                    Arity::Three
                } else {
                    Arity::Two
                },
            })
            .collect();
        Ok(Self { shares, blocks })
    }

    /// Share count `d`.
    #[inline]
    pub fn shares(&self) -> usize {
        self.shares
    }

    /// Blocks in share-index order.
    #[inline]
    pub fn blocks(&self) -> &[ShareBlock] {
        &self.blocks
    }

    /// Random bytes consumed by one composed addition.
    pub fn add_randomness(&self) -> usize {
        self.blocks.iter().map(|b| b.arity.add_randomness()).sum()
    }

    /// Random bytes consumed by one composed copy.
    pub fn copy_randomness(&self) -> usize {
        self.blocks.iter().map(|b| b.arity.copy_randomness()).sum()
    }

    /// Random bytes consumed by one composed multiplication: two accumulation masks plus one
    /// elementary multiplication per (output share, block) pair.
    pub fn mult_randomness(&self) -> usize {
        2 + self.shares
            * self
                .blocks
                .iter()
                .map(|b| b.arity.mult_randomness())
                .sum::<usize>()
    }
}

impl Default for ShareLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SHARES).expect("default share count is valid")
    }
}
