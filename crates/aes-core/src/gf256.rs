//! Arithmetic over GF(2^8) with the AES reduction polynomial `x^8 + x^4 + x^3 + x + 1`.
//!
//! Multiplication is a single lookup into a 256×256 table built at compile time
//! from log/antilog tables with generator `0x03`.

/// Antilog table: `EXP[i] = 3^i` for `i` in `0..255`, with `EXP[255] = EXP[0]`.
const EXP: [u8; 256] = build_exp();

/// Log table: `LOG[3^i] = i`. `LOG[0]` is unused.
const LOG: [u8; 256] = build_log(&EXP);

static MUL_TABLE: [[u8; 256]; 256] = build_mul_table(&EXP, &LOG);

const fn xtime_const(byte: u8) -> u8 {
    let shifted = byte << 1;
    if byte & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

const fn build_exp() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value = 1u8;
    let mut i = 0;
    while i < 255 {
        table[i] = value;
        value ^= xtime_const(value);
        i += 1;
    }
    table[255] = table[0];
    table
}

const fn build_log(exp: &[u8; 256]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const fn build_mul_table(exp: &[u8; 256], log: &[u8; 256]) -> [[u8; 256]; 256] {
    let mut table = [[0u8; 256]; 256];
    let mut a = 1;
    while a < 256 {
        let log_a = log[a] as usize;
        let mut b = 1;
        while b < 256 {
            table[a][b] = exp[(log_a + log[b] as usize) % 255];
            b += 1;
        }
        a += 1;
    }
    table
}

/// Field addition (XOR).
#[inline]
pub const fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field multiplication via the precomputed table.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    MUL_TABLE[a as usize][b as usize]
}

/// Multiplication by `x` (i.e. by `0x02`).
#[inline]
pub const fn xtime(byte: u8) -> u8 {
    xtime_const(byte)
}

/// Multiplicative inverse, with `inv(0) = 0`.
#[inline]
pub const fn inv(a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        EXP[(255 - LOG[a as usize] as usize) % 255]
    }
}
