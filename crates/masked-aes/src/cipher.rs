//! Masked AES-128 round pipeline.

use aes_core::ROUNDS;
use rand::{CryptoRng, RngCore};
use tracing::trace;

use crate::error::MaskingError;
use crate::gadgets::Masking;
use crate::linear::{inv_mix_columns, inv_shift_rows, mix_columns, shift_rows};
use crate::sbox::{inv_sbox, sbox};
use crate::shares::Shares;
use crate::state::{MaskedBlock, MaskedRoundKeys, MaskedState};

/// Position in the 10-round schedule.
///
/// Both directions walk `Init`, `Round(1)` through `Round(9)`, `Final`, then `Done`; each
/// stage before `Done` consumes exactly one round key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Initial key whitening.
    Init,
    /// One of the nine full rounds.
    Round(usize),
    /// Last round, without (Inv)MixColumns.
    Final,
    /// Terminal.
    Done,
}

impl Stage {
    /// The stage that follows `self`.
    pub fn next(self) -> Self {
        match self {
            Stage::Init => Stage::Round(1),
            Stage::Round(r) if r + 1 < ROUNDS => Stage::Round(r + 1),
            Stage::Round(_) => Stage::Final,
            Stage::Final | Stage::Done => Stage::Done,
        }
    }

    /// Every stage that does work, in order.
    pub fn schedule() -> impl Iterator<Item = Stage> {
        core::iter::successors(Some(Stage::Init), |s| match s.next() {
            Stage::Done => None,
            next => Some(next),
        })
    }
}

fn check_operands<R: RngCore + CryptoRng>(
    m: &Masking<R>,
    round_keys: &MaskedRoundKeys,
    block: &MaskedBlock,
) -> Result<(), MaskingError> {
    if round_keys.shares() != m.shares() {
        return Err(MaskingError::ShareLength {
            expected: m.shares(),
            actual: round_keys.shares(),
        });
    }
    block.bytes().iter().try_for_each(|byte| m.validate(byte))
}

fn add_round_key<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    state: &mut MaskedState,
    round_key: Vec<Shares>,
) {
    let mut key = round_key.into_iter();
    state.update_each(|byte| {
        let k = key.next().expect("round key holds one vector per state byte");
        m.add(byte, k)
    });
}

/// Encrypts one masked block. Consumes the whole round-key set.
pub fn encrypt<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    round_keys: MaskedRoundKeys,
    plaintext: MaskedBlock,
) -> Result<MaskedBlock, MaskingError> {
    check_operands(m, &round_keys, &plaintext)?;
    let mut state = MaskedState::new(plaintext);

    for (stage, round_key) in Stage::schedule().zip(round_keys.into_rounds()) {
        trace!(?stage, "encrypt");
        match stage {
            Stage::Init => {}
            Stage::Round(_) => {
                state.update_each(|byte| sbox(m, byte));
                shift_rows(&mut state);
                mix_columns(m, &mut state);
            }
            Stage::Final => {
                state.update_each(|byte| sbox(m, byte));
                shift_rows(&mut state);
            }
            Stage::Done => unreachable!("schedule stops before Done"),
        }
        add_round_key(m, &mut state, round_key);
    }

    trace!(stage = ?Stage::Done, "encrypt");
    Ok(state.into_block())
}

/// Decrypts one masked block, taking round keys from the last one down.
///
/// Each stage adds its key first, then applies InvMixColumns (full rounds only),
/// InvShiftRows and InvSubBytes; `Final` is the bare round-0 key addition.
pub fn decrypt<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    round_keys: MaskedRoundKeys,
    ciphertext: MaskedBlock,
) -> Result<MaskedBlock, MaskingError> {
    check_operands(m, &round_keys, &ciphertext)?;
    let mut state = MaskedState::new(ciphertext);

    for (stage, round_key) in Stage::schedule().zip(round_keys.into_rounds().into_iter().rev()) {
        trace!(?stage, "decrypt");
        add_round_key(m, &mut state, round_key);
        match stage {
            Stage::Init => {
                inv_shift_rows(&mut state);
                state.update_each(|byte| inv_sbox(m, byte));
            }
            Stage::Round(_) => {
                inv_mix_columns(m, &mut state);
                inv_shift_rows(&mut state);
                state.update_each(|byte| inv_sbox(m, byte));
            }
            Stage::Final => {}
            Stage::Done => unreachable!("schedule stops before Done"),
        }
    }

    trace!(stage = ?Stage::Done, "decrypt");
    Ok(state.into_block())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaskingConfig;
    use crate::random::CountingRng;
    use aes_core::{decrypt_block, encrypt_block, expand_key, Aes128Key, Block};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use rstest::rstest;

    fn masking(shares: usize) -> Masking<CountingRng<ChaCha20Rng>> {
        let rng = CountingRng::new(ChaCha20Rng::from_seed([80u8; 32]));
        Masking::with_config(rng, MaskingConfig { shares }).expect("valid share count")
    }

    #[test]
    fn schedule_has_one_stage_per_round_key() {
        let stages: Vec<_> = Stage::schedule().collect();
        assert_eq!(stages.len(), ROUNDS + 1);
        assert_eq!(stages[0], Stage::Init);
        assert_eq!(stages[1], Stage::Round(1));
        assert_eq!(stages[9], Stage::Round(9));
        assert_eq!(stages[10], Stage::Final);
        assert_eq!(Stage::Final.next(), Stage::Done);
        assert_eq!(Stage::Done.next(), Stage::Done);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    fn encrypt_matches_reference(#[case] shares: usize) {
        let mut m = masking(shares);
        let round_keys = expand_key(&Aes128Key::from([0x2b; 16]));
        let block: Block = core::array::from_fn(|i| (i * 17) as u8);

        let keys = MaskedRoundKeys::share(&mut m, &round_keys);
        let pt = MaskedBlock::share(&mut m, &block);
        let ct = encrypt(&mut m, keys, pt).expect("encrypt");
        assert_eq!(ct.unshare(), encrypt_block(&block, &round_keys));
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    fn decrypt_matches_reference(#[case] shares: usize) {
        let mut m = masking(shares);
        let round_keys = expand_key(&Aes128Key::from([0x4d; 16]));
        let block: Block = core::array::from_fn(|i| (255 - i) as u8);

        let keys = MaskedRoundKeys::share(&mut m, &round_keys);
        let ct = MaskedBlock::share(&mut m, &block);
        let pt = decrypt(&mut m, keys, ct).expect("decrypt");
        assert_eq!(pt.unshare(), decrypt_block(&block, &round_keys));
    }

    #[test]
    fn share_count_mismatch_is_an_error() {
        let mut two = masking(2);
        let mut three = masking(3);
        let round_keys = expand_key(&Aes128Key::from([0u8; 16]));
        let keys = MaskedRoundKeys::share(&mut two, &round_keys);
        let block = MaskedBlock::share(&mut three, &[0u8; 16]);
        assert!(matches!(
            encrypt(&mut three, keys, block),
            Err(MaskingError::ShareLength {
                expected: 3,
                actual: 2
            })
        ));

        let keys = MaskedRoundKeys::share(&mut three, &round_keys);
        let block = MaskedBlock::share(&mut two, &[0u8; 16]);
        assert!(matches!(
            decrypt(&mut three, keys, block),
            Err(MaskingError::ShareLength {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn randomness_does_not_depend_on_data() {
        let mut m = masking(3);
        let layout = m.layout().clone();
        let sbox = 26 * layout.mult_randomness()
            + 25 * layout.copy_randomness()
            + 8 * layout.add_randomness();
        let mix = 4
            * (4 * layout.mult_randomness()
                + 15 * layout.copy_randomness()
                + 15 * layout.add_randomness());
        let expected = 160 * sbox + 9 * mix + 176 * layout.add_randomness();

        for seed in [1u8, 2] {
            let round_keys = expand_key(&Aes128Key::from([seed; 16]));
            let keys = MaskedRoundKeys::share(&mut m, &round_keys);
            let pt = MaskedBlock::share(&mut m, &[seed.wrapping_mul(31); 16]);
            m.rng_mut().reset();
            encrypt(&mut m, keys, pt).expect("encrypt");
            assert_eq!(m.rng().drawn(), expected as u64);
        }
    }
}
