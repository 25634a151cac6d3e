//! Gain, summing and stereo placement primitives.

/*
Equal-Power Panning
===================

A mono signal is placed in the stereo field with a pan position in [-1, 1]:

    x      = (pan + 1) / 2          0 = hard left, 1 = hard right
    left   = cos(x × π/2)
    right  = sin(x × π/2)

left² + right² = 1 at every position, so perceived loudness does not dip as
a source moves across the field. At center both sides get √½ ≈ 0.707.

      1.0 ┤‾‾‾‾‾╲           ╱‾‾‾‾‾
          │      ╲ left   ╱ right
    0.707 ┤        ╲    ╱
          │          ╲╱
      0.0 ┼──────────────────────
         -1          0          +1
*/

use std::f32::consts::FRAC_PI_2;

/// Channel gains for a pan position in [-1, 1].
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

/// Add a mono signal into a stereo pair at a fixed pan position.
#[inline]
pub fn accumulate_panned(left: &mut [f32], right: &mut [f32], mono: &[f32], pan: f32) {
    debug_assert_eq!(left.len(), mono.len());
    debug_assert_eq!(right.len(), mono.len());

    let (gl, gr) = pan_gains(pan);
    for ((l, r), &s) in left.iter_mut().zip(right.iter_mut()).zip(mono) {
        *l += s * gl;
        *r += s * gr;
    }
}

/// Multiply a signal by a per-sample gain curve in place.
#[inline]
pub fn multiply_in_place(signal: &mut [f32], gain: &[f32]) {
    debug_assert_eq!(signal.len(), gain.len());

    for (s, &g) in signal.iter_mut().zip(gain) {
        *s *= g;
    }
}

/// Add signal B into signal A in place.
///
/// Can exceed [-1.0, +1.0]; the master stage is responsible for headroom.
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b) {
        *sa += sb;
    }
}

/// Fold a stereo pair to mono.
#[inline]
pub fn downmix(left: &[f32], right: &[f32], out: &mut [f32]) {
    for ((o, &l), &r) in out.iter_mut().zip(left).zip(right) {
        *o = 0.5 * (l + r);
    }
}
