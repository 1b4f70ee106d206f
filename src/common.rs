// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations

#![allow(missing_docs)]

use arrayvec::ArrayVec;

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident/$lfname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            /// Special implementation for signum, because libm doesn't have it.
            fn signum(self) -> Self;

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            #[inline]
            fn signum(self) -> f64 {
                if self.is_nan() {
                    f64::NAN
                } else {
                    1.0_f64.copysign(self)
                }
            }

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("vecpath requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs/fabsf;
    fn acos(self) -> Self => acos/acosf;
    fn atan(self) -> Self => atan/atanf;
    fn atan2(self, other: Self) -> Self => atan2/atan2f;
    fn ceil(self) -> Self => ceil/ceilf;
    fn cbrt(self) -> Self => cbrt/cbrtf;
    fn copysign(self, sign: Self) -> Self => copysign/copysignf;
    fn cos(self) -> Self => cos/cosf;
    fn hypot(self, other: Self) -> Self => hypot/hypotf;
    fn mul_add(self, a: Self, b: Self) -> Self => fma/fmaf;
    fn powi(self, n: i32) -> Self => pow/powf;
    fn sin(self) -> Self => sin/sinf;
    fn sin_cos(self) -> (Self, Self) => sincos/sincosf;
    fn round(self) -> Self => round/roundf;
    fn sqrt(self) -> Self => sqrt/sqrtf;
    fn tan(self) -> Self => tan/tanf;
}

/// Relative tolerance used when comparing geometric quantities against zero.
///
/// This is 2^-33.
pub const EPSILON: f64 = 1.0 / 8_589_934_592.0;

/// Absolute tolerance for angle and collinearity tests.
pub const ANGLE_EPSILON: f64 = 1e-6;

/// Find real roots of quartic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² + c3 x³ + c4 x⁴ = 0,
/// sorted in increasing order.
///
/// The quartic is depressed and factored into two quadratics through the
/// largest root of Ferrari's resolvent cubic. Each root is then polished by
/// Newton steps on the original equation. If `c4` is zero or so small that
/// the normalized coefficients are not finite, the equation is solved as a
/// cubic.
pub fn solve_quartic(c0: f64, c1: f64, c2: f64, c3: f64, c4: f64) -> ArrayVec<f64, 4> {
    let mut result = ArrayVec::new();
    let c4_recip = c4.recip();
    let a = c3 * c4_recip;
    let b = c2 * c4_recip;
    let c = c1 * c4_recip;
    let d = c0 * c4_recip;
    if !(a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()) {
        // quartic coefficient is zero or nearly so.
        for root in solve_cubic(c0, c1, c2, c3) {
            result.push(root);
        }
        return result;
    }
    // Substitute x = y - a/4 to get y⁴ + p y² + q y + r = 0.
    let a2 = a * a;
    let p = b - 0.375 * a2;
    let q = c - 0.5 * a * b + 0.125 * a2 * a;
    let r = d - 0.25 * a * c + 0.0625 * a2 * b - 3.0 / 256.0 * a2 * a2;
    let shift = -0.25 * a;
    let mut push = |y: f64| {
        let x = polish_monic_quartic(y + shift, a, b, c, d);
        if x.is_finite() && !result.is_full() {
            result.push(x);
        }
    };
    if q.abs() <= 1e-12 * 1f64.max(p.abs()).max(r.abs()) {
        // Biquadratic in y².
        for z in solve_quadratic(r, p, 1.0) {
            if z > 0.0 {
                let y = z.sqrt();
                push(-y);
                push(y);
            } else if z > -1e-12 {
                push(0.0);
            }
        }
    } else {
        // 8m³ + 8p m² + (2p² - 8r) m - q² = 0 always has a positive root
        // when q is nonzero.
        let m = solve_cubic(-q * q, 2.0 * p * p - 8.0 * r, 8.0 * p, 8.0)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        if m > 0.0 {
            let s = (2.0 * m).sqrt();
            let k = q / (2.0 * s);
            for y in solve_quadratic(0.5 * p + m + k, -s, 1.0) {
                push(y);
            }
            for y in solve_quadratic(0.5 * p + m - k, s, 1.0) {
                push(y);
            }
        }
    }
    result.sort_by(f64::total_cmp);
    result
}

/// Newton-polish a root of x⁴ + a x³ + b x² + c x + d, keeping the
/// original value if a step does not improve the residual.
fn polish_monic_quartic(mut x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    let f = |x: f64| (((x + a) * x + b) * x + c) * x + d;
    let df = |x: f64| ((4.0 * x + 3.0 * a) * x + 2.0 * b) * x + c;
    let mut fx = f(x);
    for _ in 0..2 {
        let dfx = df(x);
        if dfx == 0.0 || fx == 0.0 {
            break;
        }
        let next = x - fx / dfx;
        let fnext = f(next);
        if !(fnext.abs() < fx.abs()) {
            break;
        }
        x = next;
        fx = fnext;
    }
    x
}

/// Find real roots of cubic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² + c3 x³ = 0. When `c3` is
/// zero, or small enough that the normalized coefficients overflow, the
/// equation is solved as a quadratic.
///
/// This follows Jim Blinn's "How to Solve a Cubic Equation", as presented
/// in <https://momentsingraphics.de/CubicRoots.html>. Roots are not sorted.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    const ONE_THIRD: f64 = 1. / 3.;
    let inv = c3.recip();
    let (b, c, d) = (c2 * (ONE_THIRD * inv), c1 * (ONE_THIRD * inv), c0 * inv);
    if !(b.is_finite() && c.is_finite() && d.is_finite()) {
        return solve_quadratic(c0, c1, c2).into_iter().collect();
    }
    let mut result = ArrayVec::new();
    // Hessian terms of the normalized cubic x³ + 3b x² + 3c x + d.
    let h0 = (-b).mul_add(b, c);
    let h1 = (-c).mul_add(b, d);
    let h2 = b * d - c * c;
    let disc = 4.0 * h0 * h2 - h1 * h1;
    let depressed = (-2.0 * b).mul_add(h0, h1);
    if disc < 0.0 {
        // One real root.
        let sq = (-0.25 * disc).sqrt();
        let r = -0.5 * depressed;
        result.push((r + sq).cbrt() + (r - sq).cbrt() - b);
    } else if disc == 0.0 {
        let t = (-h0).sqrt().copysign(depressed);
        result.push(t - b);
        result.push(-2.0 * t - b);
    } else {
        // Three real roots, by the trigonometric method.
        let th = disc.sqrt().atan2(-depressed) * ONE_THIRD;
        let (sin, cos) = th.sin_cos();
        let sin3 = sin * 3.0f64.sqrt();
        let scale = 2.0 * (-h0).sqrt();
        for r in [cos, 0.5 * (-cos + sin3), 0.5 * (-cos - sin3)] {
            result.push(scale.mul_add(r, -b));
        }
    }
    result
}

/// Find real roots of quadratic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² = 0.
///
/// If the equation is nearly linear, the root ignoring the quadratic term is
/// returned. In the degenerate case where all coefficients are zero, a single
/// `0.0` is returned.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let sc0 = c0 * c2.recip();
    let sc1 = c1 * c2.recip();
    if !sc0.is_finite() || !sc1.is_finite() {
        // Linear.
        let root = -c0 / c1;
        if root.is_finite() {
            result.push(root);
        } else if c0 == 0.0 && c1 == 0.0 {
            result.push(0.0);
        }
        return result;
    }
    let arg = sc1 * sc1 - 4. * sc0;
    let root1 = if !arg.is_finite() {
        // sc1² overflowed: take the large root of x² + sc1 x = 0 and
        // recover the small one from the product of the roots.
        -sc1
    } else {
        if arg < 0.0 {
            return result;
        } else if arg == 0.0 {
            result.push(-0.5 * sc1);
            return result;
        }
        // The larger root first, avoiding cancellation.
        -0.5 * (sc1 + arg.sqrt().copysign(sc1))
    };
    let root2 = sc0 / root1;
    if root2.is_finite() {
        if root2 > root1 {
            result.push(root1);
            result.push(root2);
        } else {
            result.push(root2);
            result.push(root1);
        }
    } else {
        result.push(root1);
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::common::*;
    use arrayvec::ArrayVec;

    fn verify<const N: usize>(mut roots: ArrayVec<f64, N>, expected: &[f64]) {
        assert_eq!(expected.len(), roots.len(), "roots: {roots:?}");
        let epsilon = 1e-12;
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for i in 0..expected.len() {
            assert!(
                (roots[i] - expected[i]).abs() < epsilon,
                "{} != {}",
                roots[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_solve_cubic() {
        verify(solve_cubic(-5.0, 0.0, 0.0, 1.0), &[5.0f64.cbrt()]);
        verify(solve_cubic(-5.0, -1.0, 0.0, 1.0), &[1.90416085913492]);
        verify(solve_cubic(0.0, -1.0, 0.0, 1.0), &[-1.0, 0.0, 1.0]);
        verify(solve_cubic(-2.0, -3.0, 0.0, 1.0), &[-1.0, 2.0]);
        verify(solve_cubic(2.0, -3.0, 0.0, 1.0), &[-2.0, 1.0]);
        verify(solve_cubic(2.0 + 1e-12, 5.0, 4.0, 1.0), &[-2.0]);
    }

    #[test]
    fn test_solve_cubic_degenerate_leading() {
        verify(solve_cubic(-4.0, 0.0, 1.0, 0.0), &[-2.0, 2.0]);
    }

    #[test]
    fn test_solve_quadratic() {
        verify(
            solve_quadratic(-5.0, 0.0, 1.0),
            &[-(5.0f64.sqrt()), 5.0f64.sqrt()],
        );
        verify(solve_quadratic(5.0, 0.0, 1.0), &[]);
        verify(solve_quadratic(5.0, 1.0, 0.0), &[-5.0]);
        verify(solve_quadratic(1.0, 2.0, 1.0), &[-1.0]);
    }

    #[test]
    fn test_solve_quartic() {
        // (x - 1)(x - 2)(x - 3)(x - 4)
        verify(
            solve_quartic(24.0, -50.0, 35.0, -10.0, 1.0),
            &[1.0, 2.0, 3.0, 4.0],
        );
        // (x² - 1)(x² - 4), no odd terms
        verify(solve_quartic(4.0, 0.0, -5.0, 0.0, 1.0), &[-2.0, -1.0, 1.0, 2.0]);
        verify(solve_quartic(1.0, 0.0, 0.0, 0.0, 1.0), &[]);
        // (x - 0.5)(x + 3)(x² + 1)
        verify(
            solve_quartic(-1.5, 2.5, -0.5, 2.5, 1.0),
            &[-3.0, 0.5],
        );
        // Scaled copy of a monic quartic gives the same roots.
        verify(
            solve_quartic(48.0, -100.0, 70.0, -20.0, 2.0),
            &[1.0, 2.0, 3.0, 4.0],
        );
    }

    #[test]
    fn test_solve_quartic_degenerate_leading() {
        verify(solve_quartic(0.0, -1.0, 0.0, 1.0, 0.0), &[-1.0, 0.0, 1.0]);
    }
}
