//! AES-128 key schedule and block encryption/decryption.

use crate::key::{Aes128Key, RoundKeys};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::sbox;
use crate::Block;

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

fn sub_rot_word(word: [u8; 4], rcon: u8) -> [u8; 4] {
    [
        sbox(word[1]) ^ rcon,
        sbox(word[2]),
        sbox(word[3]),
        sbox(word[0]),
    ]
}

/// Expands a 128-bit key into 11 round keys.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut words = [[0u8; 4]; 44];
    for (word, chunk) in words.iter_mut().zip(key.as_bytes().chunks_exact(4)) {
        word.copy_from_slice(chunk);
    }

    for i in 4..44 {
        let prev = words[i - 1];
        let temp = if i % 4 == 0 {
            sub_rot_word(prev, RCON[i / 4 - 1])
        } else {
            prev
        };
        let back = words[i - 4];
        words[i] = core::array::from_fn(|j| back[j] ^ temp[j]);
    }

    let mut round_keys = [[0u8; 16]; 11];
    for (round, round_key) in round_keys.iter_mut().enumerate() {
        for (chunk, word) in round_key
            .chunks_exact_mut(4)
            .zip(&words[round * 4..round * 4 + 4])
        {
            chunk.copy_from_slice(word);
        }
    }

    RoundKeys::new(round_keys)
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(0));

    for round in 1..10 {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_keys.get(round));
    }

    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, round_keys.get(10));

    state
}

/// Decrypts a single 16-byte block with pre-expanded round keys.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(10));
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);
    for round in (1..10).rev() {
        add_round_key(&mut state, round_keys.get(round));
        inv_mix_columns(&mut state);
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
    }
    add_round_key(&mut state, round_keys.get(0));

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    const NIST_KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const NIST_PLAIN: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    const NIST_CIPHER: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
        0x5a,
    ];

    #[test]
    fn key_schedule_matches_fips_197_appendix_a() {
        let key = Aes128Key::from([
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ]);
        let round_keys = expand_key(&key);
        assert_eq!(&round_keys.get(1)[..4], &[0xa0, 0xfa, 0xfe, 0x17]);
        assert_eq!(
            round_keys.get(10),
            &[
                0xd0, 0x14, 0xf9, 0xa8, 0xc9, 0xee, 0x25, 0x89, 0xe1, 0x3f, 0x0c, 0xc8, 0xb6, 0x63,
                0x0c, 0xa6,
            ]
        );
        let flat = round_keys.to_bytes();
        assert_eq!(&flat[..16], key.as_bytes());
        assert_eq!(&flat[160..], round_keys.get(10));
    }

    #[test]
    fn encrypt_matches_nist_vector() {
        let round_keys = expand_key(&Aes128Key::from(NIST_KEY));
        assert_eq!(encrypt_block(&NIST_PLAIN, &round_keys), NIST_CIPHER);
    }

    #[test]
    fn decrypt_matches_nist_vector() {
        let round_keys = expand_key(&Aes128Key::from(NIST_KEY));
        assert_eq!(decrypt_block(&NIST_CIPHER, &round_keys), NIST_PLAIN);
    }

    #[test]
    fn encrypt_matches_stallings_vector() {
        let key = Aes128Key::from([
            0x0f, 0x15, 0x71, 0xc9, 0x47, 0xd9, 0xe8, 0x59, 0x0c, 0xb7, 0xad, 0xd6, 0xaf, 0x7f,
            0x67, 0x98,
        ]);
        let plain = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ];
        let cipher = [
            0xff, 0x0b, 0x84, 0x4a, 0x08, 0x53, 0xbf, 0x7c, 0x69, 0x34, 0xab, 0x43, 0x64, 0x14,
            0x8f, 0xb9,
        ];
        assert_eq!(encrypt_block(&plain, &expand_key(&key)), cipher);
    }

    #[test]
    fn encrypt_decrypt_round_trip_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut key_bytes = [0u8; 16];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key_bytes);
            rng.fill_bytes(&mut block);
            let rks = expand_key(&Aes128Key::from(key_bytes));
            let ct = encrypt_block(&block, &rks);
            assert_eq!(decrypt_block(&ct, &rks), block);
        }
    }
}
