//! Unmasked AES round transformations over a column-major 16-byte state.

use crate::gf256::{mul, xtime};
use crate::sbox::{inv_sbox, sbox};
use crate::Block;

/// `SHIFT_ROWS[i]` is the source position that ShiftRows moves into position `i`.
pub const SHIFT_ROWS: [usize; 16] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];

/// `INV_SHIFT_ROWS[i]` is the source position that InvShiftRows moves into position `i`.
pub const INV_SHIFT_ROWS: [usize; 16] = [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];

/// Applies SubBytes to the state in place.
#[inline]
pub fn sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|byte| *byte = sbox(*byte));
}

/// Applies the inverse SubBytes transformation.
#[inline]
pub fn inv_sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|byte| *byte = inv_sbox(*byte));
}

fn permute(state: &mut Block, sources: &[usize; 16]) {
    let src = *state;
    for (dst, &from) in state.iter_mut().zip(sources.iter()) {
        *dst = src[from];
    }
}

/// Performs ShiftRows in place.
#[inline]
pub fn shift_rows(state: &mut Block) {
    permute(state, &SHIFT_ROWS);
}

/// Performs the inverse of ShiftRows in place.
#[inline]
pub fn inv_shift_rows(state: &mut Block) {
    permute(state, &INV_SHIFT_ROWS);
}

fn mix_single_column(col: &mut [u8]) {
    let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
    let t = a0 ^ a1 ^ a2 ^ a3;
    col[0] = xtime(a0 ^ a1) ^ a0 ^ t;
    col[1] = xtime(a1 ^ a2) ^ a1 ^ t;
    col[2] = xtime(a2 ^ a3) ^ a2 ^ t;
    col[3] = xtime(a3 ^ a0) ^ a3 ^ t;
}

fn inv_mix_single_column(col: &mut [u8]) {
    let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
    col[0] = mul(a0, 0x0e) ^ mul(a1, 0x0b) ^ mul(a2, 0x0d) ^ mul(a3, 0x09);
    col[1] = mul(a0, 0x09) ^ mul(a1, 0x0e) ^ mul(a2, 0x0b) ^ mul(a3, 0x0d);
    col[2] = mul(a0, 0x0d) ^ mul(a1, 0x09) ^ mul(a2, 0x0e) ^ mul(a3, 0x0b);
    col[3] = mul(a0, 0x0b) ^ mul(a1, 0x0d) ^ mul(a2, 0x09) ^ mul(a3, 0x0e);
}

/// MixColumns over all four columns.
#[inline]
pub fn mix_columns(state: &mut Block) {
    state.chunks_exact_mut(4).for_each(mix_single_column);
}

/// Inverse MixColumns over all four columns.
#[inline]
pub fn inv_mix_columns(state: &mut Block) {
    state.chunks_exact_mut(4).for_each(inv_mix_single_column);
}

/// Adds (XORs) a round key into the state.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    for (s, k) in state.iter_mut().zip(round_key.iter()) {
        *s ^= *k;
    }
}
