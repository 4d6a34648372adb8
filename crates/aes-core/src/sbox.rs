//! AES S-box tables derived from GF(2^8) inversion and the FIPS-197 affine map.

use crate::gf256::inv;

/// Forward S-box.
pub static SBOX: [u8; 256] = build_sbox();

/// Inverse S-box.
pub static INV_SBOX: [u8; 256] = build_inv_sbox(&build_sbox());

const fn affine(b: u8) -> u8 {
    b ^ b.rotate_left(1) ^ b.rotate_left(2) ^ b.rotate_left(3) ^ b.rotate_left(4) ^ 0x63
}

const fn build_sbox() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = affine(inv(i as u8));
        i += 1;
    }
    table
}

const fn build_inv_sbox(forward: &[u8; 256]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[forward[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Looks up the forward S-box.
#[inline]
pub fn sbox(byte: u8) -> u8 {
    SBOX[byte as usize]
}

/// Looks up the inverse S-box.
#[inline]
pub fn inv_sbox(byte: u8) -> u8 {
    INV_SBOX[byte as usize]
}
