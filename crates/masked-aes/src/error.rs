//! Errors raised at the boundary of the masked domain.

/// Errors returned when configuring masking or handing data across the masked boundary.
#[derive(Debug, thiserror::Error)]
pub enum MaskingError {
    /// The configured share count cannot be partitioned into gadget blocks.
    #[error("share count must be at least 2, got {shares}")]
    InvalidShareCount {
        /// Rejected share count.
        shares: usize,
    },
    /// A share vector does not hold exactly `expected` shares.
    #[error("share vector has {actual} shares, expected {expected}")]
    ShareLength {
        /// Share count of the masking context.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },
    /// A masked block does not hold exactly 16 share vectors.
    #[error("masked block has {actual} bytes, expected 16")]
    BlockLength {
        /// Number of share vectors supplied.
        actual: usize,
    },
    /// Masked round-key material does not hold exactly 176 share vectors.
    #[error("masked round keys have {actual} bytes, expected 176")]
    RoundKeyLength {
        /// Number of share vectors supplied.
        actual: usize,
    },
    /// A serialized key bundle could not be decoded.
    #[error("failed to decode masked round keys")]
    Decode(#[from] bincode::Error),
}
