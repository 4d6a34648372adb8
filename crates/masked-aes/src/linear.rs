//! Masked AES linear layer.

use rand::{CryptoRng, RngCore};

use crate::gadgets::Masking;
use crate::shares::Shares;
use crate::state::MaskedState;

/// ShiftRows on the slot map; no share vector moves.
#[inline]
pub(crate) fn shift_rows(state: &mut MaskedState) {
    state.positions_mut().shift_rows();
}

/// InvShiftRows on the slot map; no share vector moves.
#[inline]
pub(crate) fn inv_shift_rows(state: &mut MaskedState) {
    state.positions_mut().inv_shift_rows();
}

/// Fresh copies of one column byte. `c[0]` feeds the column sum, `c[1]` and `c[2]`/`c[3]` the
/// neighbouring pair sums and the byte's own term; inverse mixing needs one more, `c[4]`.
type Fan<const N: usize> = [[Shares; N]; 4];

fn take_column<R: RngCore + CryptoRng, const N: usize>(
    m: &mut Masking<R>,
    state: &mut MaskedState,
    col: usize,
) -> Fan<N> {
    core::array::from_fn(|j| {
        let byte = state.take(4 * col + j);
        m.copies::<N>(byte)
    })
}

/// Forward mixing of one column, shared by [`mix_columns`] and [`inv_mix_columns`]:
/// `out[j] = 2 * (s[j] + s[j+1]) + s[j] + t` with `t = s0 + s1 + s2 + s3`.
///
/// Consumes copies 0 through 3 of every byte.
fn mix_column<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    s0: [Shares; 4],
    s1: [Shares; 4],
    s2: [Shares; 4],
    s3: [Shares; 4],
) -> [Shares; 4] {
    let [s0_0, s0_1, s0_2, s0_3] = s0;
    let [s1_0, s1_1, s1_2, s1_3] = s1;
    let [s2_0, s2_1, s2_2, s2_3] = s2;
    let [s3_0, s3_1, s3_2, s3_3] = s3;

    let t = m.add(s0_0, s1_0);
    let tmp = m.add(s2_0, t);
    let t = m.add(s3_0, tmp);
    let [t0, t1, t2, t3] = m.copies(t);

    let output = |m: &mut Masking<R>, pair: (Shares, Shares), own: Shares, t: Shares| {
        let tmp = m.add(pair.0, pair.1);
        let doubled = m.mult_const(2, tmp);
        let tmp = m.add(own, doubled);
        m.add(tmp, t)
    };

    let out0 = output(m, (s0_1, s1_1), s0_2, t0);
    let out1 = output(m, (s1_2, s2_1), s1_3, t1);
    let out2 = output(m, (s2_2, s3_1), s2_3, t2);
    let out3 = output(m, (s3_2, s0_3), s3_3, t3);
    [out0, out1, out2, out3]
}

/// MixColumns over the four columns.
pub(crate) fn mix_columns<R: RngCore + CryptoRng>(m: &mut Masking<R>, state: &mut MaskedState) {
    for col in 0..4 {
        let [s0, s1, s2, s3]: Fan<4> = take_column(m, state, col);
        let out = mix_column(m, s0, s1, s2, s3);
        for (j, byte) in out.into_iter().enumerate() {
            state.put(4 * col + j, byte);
        }
    }
}

/// InvMixColumns over the four columns.
///
/// Computes MixColumns of the column, then folds in `u = 4 * (s0 + s2)`,
/// `v = 4 * (s1 + s3)` and `t = 2 * (u + v)`: `out0 += t + u`, `out1 += t + v`,
/// `out2 += t + u`, `out3 += t + v`.
pub(crate) fn inv_mix_columns<R: RngCore + CryptoRng>(
    m: &mut Masking<R>,
    state: &mut MaskedState,
) {
    for col in 0..4 {
        let fan: Fan<5> = take_column(m, state, col);
        let [[a0, a1, a2, a3, s0_4], [b0, b1, b2, b3, s1_4], [c0, c1, c2, c3, s2_4], [d0, d1, d2, d3, s3_4]] =
            fan;

        let mixed = mix_column(
            m,
            [a0, a1, a2, a3],
            [b0, b1, b2, b3],
            [c0, c1, c2, c3],
            [d0, d1, d2, d3],
        );

        let tmp = m.add(s0_4, s2_4);
        let t = m.mult_const(2, tmp);
        let u = m.mult_const(2, t);

        let tmp = m.add(s1_4, s3_4);
        let t = m.mult_const(2, tmp);
        let v = m.mult_const(2, t);

        let [u0, u1, u2] = m.copies(u);
        let [v0, v1, v2] = m.copies(v);

        let tmp = m.add(u0, v0);
        let t = m.mult_const(2, tmp);
        let t_copies: [Shares; 4] = m.copies(t);

        let extra = [u1, v1, u2, v2];
        for (j, ((out, t), e)) in mixed.into_iter().zip(t_copies).zip(extra).enumerate() {
            let tmp = m.add(out, t);
            state.put(4 * col + j, m.add(e, tmp));
        }
    }
}
