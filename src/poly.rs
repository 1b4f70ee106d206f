// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polynomials of dynamic degree, and their real roots.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Add, Mul, Neg, Sub};

use crate::common::{solve_cubic, solve_quadratic, solve_quartic};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Roots closer than this (relative to their magnitude) are merged.
pub const ROOT_TOLERANCE: f64 = 1e-6;

/// Leading coefficients smaller than this, relative to the largest
/// coefficient, are treated as zero.
const LEADING_EPSILON: f64 = 1e-12;

/// A critical point whose value is this small, relative to the magnitude of
/// the terms being summed, is reported as a (double) root.
const TANGENT_EPSILON: f64 = 1e-9;

/// A polynomial with real coefficients.
///
/// Construction with [`Poly::new`] takes coefficients with the highest
/// degree first, the way polynomials are usually written down. Internally
/// the coefficients are stored in increasing order of degree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Poly {
    /// Coefficient of `x^i` is at index `i`.
    coeffs: Vec<f64>,
}

impl Poly {
    /// Create a polynomial from coefficients, highest degree first.
    ///
    /// ```
    /// use vecpath::Poly;
    /// // x² - 3x + 2
    /// let p = Poly::new([1.0, -3.0, 2.0]);
    /// assert_eq!(p.eval(1.0), 0.0);
    /// assert_eq!(p.roots(), vec![1.0, 2.0]);
    /// ```
    pub fn new(coeffs: impl IntoIterator<Item = f64>) -> Poly {
        let mut coeffs: Vec<f64> = coeffs.into_iter().collect();
        coeffs.reverse();
        Poly { coeffs }
    }

    /// Create a polynomial from coefficients, constant term first.
    pub fn from_ascending(coeffs: impl IntoIterator<Item = f64>) -> Poly {
        Poly {
            coeffs: coeffs.into_iter().collect(),
        }
    }

    /// The constant polynomial.
    pub fn constant(c: f64) -> Poly {
        Poly { coeffs: vec![c] }
    }

    /// The coefficients, constant term first.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// The coefficient of `x^i`.
    pub fn coeff(&self, i: usize) -> f64 {
        self.coeffs.get(i).copied().unwrap_or(0.0)
    }

    /// The nominal degree, counting stored coefficients even if they are zero.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Whether every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Whether every coefficient is within `epsilon` of zero.
    pub fn is_zero(&self, epsilon: f64) -> bool {
        self.coeffs.iter().all(|c| c.abs() <= epsilon)
    }

    /// Largest absolute coefficient.
    pub fn max_coeff(&self) -> f64 {
        self.coeffs.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    /// Remove leading coefficients that are negligible compared to the
    /// largest one.
    #[must_use]
    pub fn trim(&self) -> Poly {
        let threshold = self.max_coeff() * LEADING_EPSILON;
        let mut coeffs = self.coeffs.clone();
        while coeffs.last().is_some_and(|c| c.abs() <= threshold) {
            coeffs.pop();
        }
        Poly { coeffs }
    }

    /// Evaluate at `x` using Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Sum of the absolute values of the terms at `x`, a bound on the
    /// scale of round-off in [`Poly::eval`].
    fn magnitude(&self, x: f64) -> f64 {
        let x = x.abs();
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c.abs())
    }

    /// The derivative.
    #[must_use]
    pub fn deriv(&self) -> Poly {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * i as f64)
            .collect();
        Poly { coeffs }
    }

    /// Multiply every coefficient by `s`.
    #[must_use]
    pub fn scale(&self, s: f64) -> Poly {
        Poly {
            coeffs: self.coeffs.iter().map(|c| c * s).collect(),
        }
    }

    /// All real roots, sorted and deduplicated.
    ///
    /// Degrees up to four are solved in closed form. Higher degrees are
    /// solved numerically on the interval bounded by Cauchy's bound, by
    /// bracketing between critical points.
    ///
    /// A polynomial that is identically zero, or whose coefficients are not
    /// finite, has no roots reported.
    pub fn roots(&self) -> Vec<f64> {
        let p = self.trim();
        if !p.is_finite() {
            return Vec::new();
        }
        let mut roots = match p.closed_form_roots() {
            Some(roots) => roots,
            None => {
                let lead = p.coeffs[p.degree()];
                let bound = 1.0
                    + p.coeffs[..p.degree()]
                        .iter()
                        .fold(0.0, |m: f64, c| m.max((c / lead).abs()));
                p.bracketed_roots(-bound, bound)
            }
        };
        finish_roots(&mut roots);
        roots
    }

    /// Real roots in `[min, max]`, sorted and deduplicated.
    ///
    /// Roots that fall outside the interval by no more than the root
    /// tolerance are clamped into it.
    pub fn roots_between(&self, min: f64, max: f64) -> Vec<f64> {
        let p = self.trim();
        if !p.is_finite() || !(min <= max) {
            return Vec::new();
        }
        let slack = ROOT_TOLERANCE * 1f64.max(min.abs()).max(max.abs());
        let (lo, hi) = (min - slack, max + slack);
        let mut roots = match p.closed_form_roots() {
            Some(roots) => roots,
            None => p.bracketed_roots(lo, hi),
        };
        roots.retain(|&x| x >= lo && x <= hi);
        for x in &mut roots {
            *x = x.clamp(min, max);
        }
        finish_roots(&mut roots);
        roots
    }

    /// Roots of a trimmed polynomial of degree at most four.
    fn closed_form_roots(&self) -> Option<Vec<f64>> {
        let c = |i| self.coeff(i);
        Some(match self.coeffs.len() {
            0 | 1 => Vec::new(),
            2 => vec![-c(0) / c(1)],
            3 => solve_quadratic(c(0), c(1), c(2)).to_vec(),
            4 => solve_cubic(c(0), c(1), c(2), c(3)).to_vec(),
            5 => solve_quartic(c(0), c(1), c(2), c(3), c(4)).to_vec(),
            _ => return None,
        })
    }

    /// Roots in `[lower, upper]`, found by bracketing between the critical
    /// points, recursively obtained from the derivative.
    ///
    /// Sign changes are refined with a safeguarded Newton iteration.
    /// Critical points where the polynomial nearly vanishes are also
    /// reported, so that double roots are not lost.
    fn bracketed_roots(&self, lower: f64, upper: f64) -> Vec<f64> {
        let mut out = Vec::new();
        if self.coeffs.len() <= 1 {
            return out;
        }
        if self.coeffs.len() <= 4 {
            if let Some(roots) = self.closed_form_roots() {
                out.extend(roots.into_iter().filter(|&x| x >= lower && x <= upper));
            }
            return out;
        }
        let deriv = self.deriv();
        let mut stops = deriv.bracketed_roots(lower, upper);
        stops.push(upper);
        let mut last = lower;
        let mut last_val = self.eval(last);
        if last_val == 0.0 {
            out.push(last);
        }
        for x in stops {
            if x <= last || x > upper {
                continue;
            }
            let val = self.eval(x);
            if different_signs(last_val, val) && last_val != 0.0 && val != 0.0 {
                out.push(find_root(
                    |x| self.eval(x),
                    |x| deriv.eval(x),
                    last,
                    x,
                    last_val,
                    val,
                    ROOT_TOLERANCE * 1e-3,
                ));
            } else if val.abs() <= TANGENT_EPSILON * self.magnitude(x) {
                out.push(x);
            }
            last = x;
            last_val = val;
        }
        out
    }
}

fn different_signs(x: f64, y: f64) -> bool {
    (x < 0.0) != (y < 0.0)
}

/// Sort, drop non-finite values and merge roots closer than the tolerance.
fn finish_roots(roots: &mut Vec<f64>) {
    roots.retain(|x| x.is_finite());
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|b, a| (*b - *a).abs() <= ROOT_TOLERANCE * 1f64.max(a.abs()));
}

/// Yuksel's safeguarded Newton iteration on a bracketing interval.
///
/// Each step either takes the Newton step or, if it would leave the current
/// bracket, bisects; the bracket shrinks every iteration so convergence is
/// guaranteed.
fn find_root(
    f: impl Fn(f64) -> f64,
    deriv: impl Fn(f64) -> f64,
    mut lower: f64,
    mut upper: f64,
    val_lower: f64,
    val_upper: f64,
    x_error: f64,
) -> f64 {
    if !val_lower.is_finite() || !val_upper.is_finite() {
        return f64::NAN;
    }
    let mut x = lower + (upper - lower) / 2.0;
    let mut step = (upper - lower) / 2.0;
    while step.abs() > x_error && x.is_finite() {
        let val_x = f(x);
        if val_x == 0.0 {
            return x;
        }
        if different_signs(val_lower, val_x) {
            upper = x;
        } else {
            lower = x;
        }
        let mut new_x = x - val_x / deriv(x);
        if !(new_x > lower && new_x < upper) {
            new_x = lower + (upper - lower) / 2.0;
            if new_x == upper || new_x == lower {
                // The bracket is down to adjacent floats.
                return new_x;
            }
        }
        step = new_x - x;
        x = new_x;
    }
    x
}

impl Mul<&Poly> for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        if self.coeffs.is_empty() || rhs.coeffs.is_empty() {
            return Poly::default();
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, c) in self.coeffs.iter().enumerate() {
            for (j, d) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += c * d;
            }
        }
        Poly { coeffs }
    }
}

impl Mul<&Poly> for Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        &self * rhs
    }
}

impl Add<&Poly> for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Poly {
            coeffs: (0..n).map(|i| self.coeff(i) + rhs.coeff(i)).collect(),
        }
    }
}

impl Add<&Poly> for Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        &self + rhs
    }
}

impl Sub<&Poly> for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Poly {
            coeffs: (0..n).map(|i| self.coeff(i) - rhs.coeff(i)).collect(),
        }
    }
}

impl Sub<&Poly> for Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        &self - rhs
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.scale(-1.0)
    }
}
