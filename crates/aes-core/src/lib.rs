//! GF(2^8) primitives and a reference AES-128 for the masked implementation.
//!
//! This crate follows FIPS-197 directly and provides:
//! - Byte-level field arithmetic (XOR addition, table multiplication).
//! - The AES S-box and its inverse.
//! - The AES-128 key schedule and single-block encryption/decryption.
//!
//! Nothing here is masked or constant-time. The masked crate uses it for leaf
//! arithmetic, as its key-schedule collaborator and as a test oracle.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
pub mod gf256;
mod key;
pub mod round;
mod sbox;

pub use crate::cipher::{decrypt_block, encrypt_block, expand_key};
pub use crate::key::{Aes128Key, RoundKeys, EXPANDED_KEY_BYTES};
pub use crate::sbox::{inv_sbox, sbox, INV_SBOX, SBOX};

/// AES block of 16 bytes.
pub type Block = [u8; 16];

/// Number of AES-128 rounds.
pub const ROUNDS: usize = 10;
