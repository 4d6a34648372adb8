//! AES-128 on Boolean-masked data.
//!
//! Every state and key byte is held as a vector of `d` shares whose XOR is the true value.
//! The cipher is built only from gadgets (masked addition, copy and multiplication) composed
//! from elementary two- and three-share circuits, so no intermediate is ever unmasked between
//! [`MaskedBlock::share`] and [`MaskedBlock::unshare`].
//!
//! ```
//! use aes_core::{expand_key, Aes128Key};
//! use masked_aes::{decrypt, encrypt, MaskedBlock, MaskedRoundKeys, Masking};
//! use rand::rngs::OsRng;
//!
//! let mut m = Masking::new(OsRng);
//! let round_keys = expand_key(&Aes128Key::from([0x2b; 16]));
//! let (enc_keys, dec_keys) = MaskedRoundKeys::share(&mut m, &round_keys).split(&mut m);
//!
//! let pt = MaskedBlock::share(&mut m, &[0u8; 16]);
//! let ct = encrypt(&mut m, enc_keys, pt).unwrap();
//! let back = decrypt(&mut m, dec_keys, ct).unwrap();
//! assert_eq!(back.unshare(), [0u8; 16]);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod config;
mod elementary;
mod error;
mod gadgets;
mod linear;
mod random;
mod sbox;
mod shares;
mod state;

pub use crate::cipher::{decrypt, encrypt, Stage};
pub use crate::config::{Arity, MaskingConfig, ShareBlock, ShareLayout, DEFAULT_SHARES};
pub use crate::error::MaskingError;
pub use crate::gadgets::Masking;
pub use crate::random::CountingRng;
pub use crate::sbox::{exp254, inv_sbox, sbox};
pub use crate::shares::Shares;
pub use crate::state::{MaskedBlock, MaskedRoundKeys, Positions};
