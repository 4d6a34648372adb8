//! Elementary gadgets on exactly two or three shares.
//!
//! These are the base circuits of the expanding compiler from Belaïd, Coron, Prouff, Rivain
//! and Taleb, "Random Probing Security: Verification, Composition, Expansion and New
//! Constructions" (CRYPTO 2020). Every intermediate below is a wire of the certified circuit,
//! so the order of the XORs and which random values meet which shares must stay exactly as
//! written even where a shorter expression would give the same result.

use aes_core::gf256::{add, mul};
use rand::RngCore;

use crate::random::fresh;

/// Two-share addition. Draws 4 random bytes.
pub(crate) fn add_2<R: RngCore>(rng: &mut R, a: [u8; 2], b: [u8; 2]) -> [u8; 2] {
    let [r0, r1, r2, r3] = fresh::<4, _>(rng);

    let tmp = add(r0, r2);
    let var0 = add(a[0], tmp);
    let tmp = add(r1, r3);
    let var1 = add(b[0], tmp);
    let c0 = add(var0, var1);

    let tmp = add(r1, r2);
    let var0 = add(a[1], tmp);
    let tmp = add(r0, r3);
    let var1 = add(b[1], tmp);
    let c1 = add(var0, var1);

    [c0, c1]
}

/// Three-share addition. Draws 6 random bytes.
pub(crate) fn add_3<R: RngCore>(rng: &mut R, a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    let [r0, r1, r2, r3, r4, r5] = fresh::<6, _>(rng);

    let var0 = add(r0, r1);
    let var1 = add(a[0], var0);
    let var2 = add(r2, r3);
    let var3 = add(b[0], var2);
    let c0 = add(var1, var3);

    let var4 = add(r2, r4);
    let var5 = add(a[1], var4);
    let var6 = add(r5, r1);
    let var7 = add(b[1], var6);
    let c1 = add(var5, var7);

    let var8 = add(r5, r3);
    let var9 = add(a[2], var8);
    let var10 = add(r0, r4);
    let var11 = add(b[2], var10);
    let c2 = add(var9, var11);

    [c0, c1, c2]
}

/// Two-share copy. Draws 2 random bytes, one per output.
pub(crate) fn copy_2<R: RngCore>(rng: &mut R, a: [u8; 2]) -> ([u8; 2], [u8; 2]) {
    let [r0, r1] = fresh::<2, _>(rng);

    let d = [add(a[0], r0), add(a[1], r0)];
    let e = [add(a[0], r1), add(a[1], r1)];
    (d, e)
}

/// Three-share copy. Draws 6 random bytes, three per output, each used by two shares.
pub(crate) fn copy_3<R: RngCore>(rng: &mut R, a: [u8; 3]) -> ([u8; 3], [u8; 3]) {
    let [r0, r1, r2, r3, r4, r5] = fresh::<6, _>(rng);

    let var0 = add(r0, r1);
    let var1 = add(r1, r2);
    let var2 = add(r2, r0);
    let var3 = add(r3, r4);
    let var4 = add(r4, r5);
    let var5 = add(r5, r3);

    let d = [add(a[0], var0), add(a[1], var1), add(a[2], var2)];
    let e = [add(a[0], var3), add(a[1], var4), add(a[2], var5)];
    (d, e)
}

/// Two-share multiplication. Draws 4 random bytes.
///
/// Only `a[0]` enters the circuit: the composed multiplication always feeds a broadcast
/// share, so both entries of `a` are equal.
pub(crate) fn mult_2<R: RngCore>(rng: &mut R, a: [u8; 2], b: [u8; 2]) -> [u8; 2] {
    debug_assert!(a[0] == a[1], "mult_2 expects a broadcast first operand");
    let [r0, r1, r2, r3] = fresh::<4, _>(rng);

    let u0 = add(a[0], r0);
    let u1 = add(a[0], u0);
    let v0 = add(b[0], r1);
    let v1 = add(b[1], r1);

    let var0 = mul(u0, v0);
    let var1 = mul(u0, v1);
    let tmp1 = add(var0, r2);
    let tmp2 = add(var1, r3);
    let c0 = add(tmp1, tmp2);

    let var2 = mul(u1, v0);
    let var3 = mul(u1, v1);
    let tmp1 = add(var2, r2);
    let tmp2 = add(var3, r3);
    let c1 = add(tmp1, tmp2);

    [c0, c1]
}

/// Three-share multiplication. Draws 10 random bytes.
///
/// Like [`mult_2`], `a` must be a broadcast share.
pub(crate) fn mult_3<R: RngCore>(rng: &mut R, a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    debug_assert!(
        a[0] == a[1] && a[1] == a[2],
        "mult_3 expects a broadcast first operand"
    );
    let [r0, r1, r2, r3, r4, r5, r6, r7, r8, r9] = fresh::<10, _>(rng);

    let tmp = add(r0, r1);
    let u0 = add(a[0], tmp);
    let u00 = add(u0, a[0]);
    let tmp = add(r3, r4);
    let v0 = add(b[0], tmp);

    let var0 = mul(u0, v0);
    let var1 = mul(u00, v0);
    let var2 = add(var0, r6);
    let var3 = add(var1, r7);
    let c0 = add(var2, var3);

    let tmp = add(r1, r2);
    let u1 = add(a[1], tmp);
    let u11 = add(u1, a[1]);
    let tmp = add(r4, r5);
    let v1 = add(b[1], tmp);

    let var0 = mul(u1, v1);
    let var1 = mul(u11, v1);
    let var2 = add(var0, r8);
    let var3 = add(var1, r9);
    let c1 = add(var2, var3);

    let tmp = add(r2, r0);
    let u2 = add(a[2], tmp);
    let u22 = add(u2, a[2]);
    let tmp = add(r5, r3);
    let v2 = add(b[2], tmp);

    let var0 = mul(u2, v2);
    let var1 = mul(u22, v2);
    let tmp = add(r6, r8);
    let var2 = add(var0, tmp);
    let tmp = add(r7, r9);
    let var3 = add(var1, tmp);
    let c2 = add(var2, var3);

    [c0, c1, c2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::CountingRng;
    use aes_core::gf256;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn xor<const N: usize>(v: [u8; N]) -> u8 {
        v.iter().fold(0, |acc, x| acc ^ x)
    }

    fn rng() -> CountingRng<ChaCha20Rng> {
        CountingRng::new(ChaCha20Rng::from_seed([30u8; 32]))
    }

    #[test]
    fn add_gadgets_add() {
        let mut rng = rng();
        for _ in 0..256 {
            let a: [u8; 2] = fresh(&mut rng);
            let b: [u8; 2] = fresh(&mut rng);
            assert_eq!(xor(add_2(&mut rng, a, b)), xor(a) ^ xor(b));
            let a: [u8; 3] = fresh(&mut rng);
            let b: [u8; 3] = fresh(&mut rng);
            assert_eq!(xor(add_3(&mut rng, a, b)), xor(a) ^ xor(b));
        }
    }

    #[test]
    fn copy_gadgets_copy() {
        let mut rng = rng();
        for _ in 0..256 {
            let a: [u8; 2] = fresh(&mut rng);
            let (d, e) = copy_2(&mut rng, a);
            assert_eq!((xor(d), xor(e)), (xor(a), xor(a)));
            let a: [u8; 3] = fresh(&mut rng);
            let (d, e) = copy_3(&mut rng, a);
            assert_eq!((xor(d), xor(e)), (xor(a), xor(a)));
        }
    }

    #[test]
    fn mult_gadgets_multiply_broadcast_share() {
        let mut rng = rng();
        for x in 0..=255u8 {
            let b: [u8; 2] = fresh(&mut rng);
            assert_eq!(xor(mult_2(&mut rng, [x, x], b)), gf256::mul(x, xor(b)));
            let b: [u8; 3] = fresh(&mut rng);
            assert_eq!(xor(mult_3(&mut rng, [x, x, x], b)), gf256::mul(x, xor(b)));
        }
    }

    #[test]
    fn randomness_per_gadget() {
        let mut rng = rng();
        let cases: [(&str, u64, fn(&mut CountingRng<ChaCha20Rng>)); 6] = [
            ("add_2", 4, |r| {
                add_2(r, [1, 2], [3, 4]);
            }),
            ("add_3", 6, |r| {
                add_3(r, [1, 2, 3], [4, 5, 6]);
            }),
            ("copy_2", 2, |r| {
                copy_2(r, [1, 2]);
            }),
            ("copy_3", 6, |r| {
                copy_3(r, [1, 2, 3]);
            }),
            ("mult_2", 4, |r| {
                mult_2(r, [1, 1], [3, 4]);
            }),
            ("mult_3", 10, |r| {
                mult_3(r, [1, 1, 1], [4, 5, 6]);
            }),
        ];
        for (name, expected, run) in cases {
            rng.reset();
            run(&mut rng);
            assert_eq!(rng.drawn(), expected, "{name}");
        }
    }

    #[test]
    fn copies_are_independently_masked() {
        let mut rng = rng();
        let mut collisions = 0;
        for _ in 0..64 {
            let a: [u8; 2] = fresh(&mut rng);
            let (d, e) = copy_2(&mut rng, a);
            collisions += usize::from(d == e);
            let a: [u8; 3] = fresh(&mut rng);
            let (d, e) = copy_3(&mut rng, a);
            collisions += usize::from(d == e);
        }
        assert!(collisions <= 4, "{collisions} copies were share-wise identical");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "broadcast first operand")]
    fn mult_2_rejects_unequal_first_operand() {
        mult_2(&mut rng(), [1, 2], [3, 4]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "broadcast first operand")]
    fn mult_3_rejects_unequal_first_operand() {
        mult_3(&mut rng(), [1, 1, 2], [3, 4, 5]);
    }
}
