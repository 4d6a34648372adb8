//! Masked AES S-box and inverse S-box.
//!
//! Inversion is `x^254`. The affine layer is a linearized polynomial
//! `sum_i c_i * x^(2^i) + k`, evaluated Horner-style with squarings:
//! `((((c0*x)^2 + c1*x)^2 + ...)^2 + c7*x) + k`, so the coefficient tables below are the
//! Horner coefficients, not the polynomial ones.

use rand::{CryptoRng, RngCore};

use crate::gadgets::Masking;
use crate::shares::Shares;

/// Horner coefficients of the forward affine map.
const AFFINE: [u8; 8] = [0xcf, 0x16, 0x01, 0x49, 0xcc, 0xa8, 0xee, 0x05];
const AFFINE_CONSTANT: u8 = 0x63;

/// Horner coefficients of the inverse affine map.
const INV_AFFINE: [u8; 8] = [0x93, 0x92, 0xbe, 0x29, 0x49, 0x8b, 0x4f, 0x05];
const INV_AFFINE_CONSTANT: u8 = 0x05;

/// Computes `x^254` (the field inverse, with `0 -> 0`) along the addition chain
/// 1, 2, 4, 8, 9, 18, 19, 27, 54, 108, 127, 254.
///
/// Every power that feeds two multiplications is split with the copy gadget first; a
/// squaring multiplies two copies.
pub fn exp254<R: RngCore + CryptoRng>(m: &mut Masking<R>, x: Shares) -> Shares {
    let [x_copy0, x_copy1, x_copy2, x_copy3] = m.copies(x);

    let tmp = m.mult(x_copy0, x_copy1); // x^2

    let (a, b) = m.copy(tmp);
    let tmp = m.mult(a, b); // x^4

    let (a, b) = m.copy(tmp);
    let tmp = m.mult(a, b); // x^8

    let (tmp_tmp0, tmp_copy2) = m.copy(tmp);
    let tmp = m.mult(x_copy2, tmp_tmp0); // x^9

    let (a, b) = m.copy(tmp);
    let tmp = m.mult(a, b); // x^18

    let res = m.mult(tmp, x_copy3); // x^19

    let (res_copy0, res_copy1) = m.copy(res);
    let tmp2 = m.mult(tmp_copy2, res_copy0); // x^27

    let (a, b) = m.copy(tmp2);
    let tmp = m.mult(a, b); // x^54

    let (a, b) = m.copy(tmp);
    let tmp = m.mult(a, b); // x^108

    let res = m.mult(tmp, res_copy1); // x^127

    let (a, b) = m.copy(res);
    m.mult(a, b) // x^254
}

fn affine<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    x: Shares,
    coefficients: &[u8; 8],
    constant: u8,
) -> Shares {
    let [x0, x1, x2, x3, x4, x5, x6, x7] = m.copies(x);

    let res = m.mult_const(coefficients[0], x0);
    let (a, b) = m.copy(res);
    let mut res = m.mult(a, b);

    for (xi, &ci) in [x1, x2, x3, x4, x5, x6].into_iter().zip(&coefficients[1..7]) {
        let tmp = m.mult_const(ci, xi);
        let tmp2 = m.add(res, tmp);
        let (a, b) = m.copy(tmp2);
        res = m.mult(a, b);
    }

    let tmp = m.mult_const(coefficients[7], x7);
    let tmp2 = m.add(res, tmp);
    m.add_const(constant, tmp2)
}

/// Masked forward S-box: inversion followed by the affine map.
pub fn sbox<R: RngCore + CryptoRng>(m: &mut Masking<R>, x: Shares) -> Shares {
    let inverted = exp254(m, x);
    affine(m, inverted, &AFFINE, AFFINE_CONSTANT)
}

/// Masked inverse S-box: inverse affine map followed by inversion.
pub fn inv_sbox<R: RngCore + CryptoRng>(m: &mut Masking<R>, x: Shares) -> Shares {
    let pre = affine(m, x, &INV_AFFINE, INV_AFFINE_CONSTANT);
    exp254(m, pre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaskingConfig;
    use crate::random::CountingRng;
    use aes_core::gf256;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use rstest::rstest;

    fn masking(shares: usize) -> Masking<CountingRng<ChaCha20Rng>> {
        let rng = CountingRng::new(ChaCha20Rng::from_seed([50u8; 32]));
        Masking::with_config(rng, MaskingConfig { shares }).expect("valid share count")
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    fn exp254_inverts(#[case] shares: usize) {
        let mut m = masking(shares);
        for x in 0..=255u8 {
            let s = m.share(x);
            assert_eq!(exp254(&mut m, s).unshare(), gf256::inv(x), "{x:#04x}");
        }
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn sbox_matches_table(#[case] shares: usize) {
        let mut m = masking(shares);
        for x in 0..=255u8 {
            let s = m.share(x);
            assert_eq!(sbox(&mut m, s).unshare(), aes_core::sbox(x), "{x:#04x}");
        }
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    fn inv_sbox_matches_table(#[case] shares: usize) {
        let mut m = masking(shares);
        for x in 0..=255u8 {
            let s = m.share(x);
            assert_eq!(inv_sbox(&mut m, s).unshare(), aes_core::inv_sbox(x), "{x:#04x}");
        }
    }

    #[test]
    fn sbox_round_trip() {
        let mut m = masking(7);
        for x in [0x00, 0x01, 0x10, 0x53, 0x7f, 0x80, 0xc3, 0xff] {
            let s = m.share(x);
            let y = sbox(&mut m, s);
            assert_eq!(inv_sbox(&mut m, y).unshare(), x);
        }
    }

    #[test]
    fn sbox_randomness_is_fixed() {
        let mut m = masking(5);
        let layout = m.layout().clone();
        // exp254: 11 multiplications, 3 + 8 copies.
        // affine: 8 constant multiplications, 7 squarings, 7 + 7 copies, 8 additions.
        let mults = 11 + 8 + 7;
        let copies = 11 + 14;
        let adds = 8;
        let expected = mults * layout.mult_randomness()
            + copies * layout.copy_randomness()
            + adds * layout.add_randomness();
        let s = m.share(0x42);
        m.rng_mut().reset();
        sbox(&mut m, s);
        assert_eq!(m.rng().drawn(), expected as u64);
    }
}
