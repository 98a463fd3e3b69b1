//! Utilities for ITM.
//!
//! These are miscellaneous functions that are functionally pure but also
//! implement well-known algorithms and formulae. Some of them are written out
//! by hand rather than delegated to a library so that results stay
//! reproducible to the last bit against published reference tables.

use num_complex::Complex64;

/// C group of constants for the qerfi approximation.
const QERFI_C: (f64, f64, f64) = (2.515516698, 0.802853, 0.010328);

/// D group of constants for the qerfi approximation.
const QERFI_D: (f64, f64, f64) = (1.432788, 0.189269, 0.001308);

/// The inverse of the standard normal complementary probability function.
///
/// The standard normal complementary function is _Q(x) = 1 / √͞2͞π ∫ e^(-t²/2)_.
/// This inverse is the solution for _x_ to _q = Q(x)_, also noted _Q¯¹(q)_.
///
/// This is used to turn the requested fractions of time, locations and
/// situations into standard normal deviates.
///
/// The implementation is an approximation by [Cecil Hastings][Hastings55],
/// with a maximum error of 4.5 × 10¯⁴. As the approximation is not good past
/// that, the result is rounded to four decimal places. Inputs are not
/// validated: anything outside of _(0, 1)_ is clamped near the extremes.
///
/// In the FORTRAN, this function was called `qerfi`. See `<50>`, `<51>`.
///
/// [Hastings55]: https://press.princeton.edu/titles/1133.html
pub fn inverse_normal_complementary(q: f64) -> f64 {
    let x = 0.5 - q;
    let mut t = (0.5 - x.abs()).max(0.000001);
    t = (-2.0 * t.ln()).sqrt();
    let v = t
        - ((QERFI_C.2 * t + QERFI_C.1) * t + QERFI_C.0)
            / (((QERFI_D.2 * t + QERFI_D.1) * t + QERFI_D.0) * t + 1.0);

    let v = if x < 0.0 { -v } else { v };
    (v * 1e4).round_ties_even() / 1e4
}

/// [`inverse_normal_complementary`] over a sequence, preserving order.
pub fn inverse_normal_complementary_each(fractions: &[f64]) -> Vec<f64> {
    fractions
        .iter()
        .map(|&q| inverse_normal_complementary(q))
        .collect()
}

/// Least-squares linear fit over evenly-spaced data between two points.
///
/// `data` holds samples at `0, interval, 2 × interval, …` and `span` gives the
/// distances between which to fit. Returns _Z₀_ and _Zn_: the fitted line
/// evaluated at the first and at the last sample.
///
/// See ITM section `<53>`.
pub fn least_squares_linear_fit(interval: f64, data: &[f64], span: (f64, f64)) -> (f64, f64) {
    let xn = data.len().saturating_sub(1) as f64;
    let mut xa = fortran_dim(span.0 / interval, 0.0).trunc();
    let mut xb = xn - fortran_dim(xn, span.1 / interval).trunc();

    if xb <= xa {
        xa = fortran_dim(xa, 1.0);
        xb = xn - fortran_dim(xn, xb + 1.0);
    }

    let mut ja = xa as usize;
    let jb = xb as usize;
    let n = jb.saturating_sub(ja);

    xa = xb - xa;
    let mut x = -0.5 * xa;
    xb += x;

    let mut a = 0.5 * (data[ja] + data[jb]);
    let mut b = 0.5 * (data[ja] - data[jb]) * x;

    for _ in 2..=n {
        ja += 1;
        x += 1.0;
        a += data[ja];
        b += data[ja] * x;
    }

    a /= xa;
    b = b * 12.0 / ((xa * xa + 2.0) * xa);

    (a - b * xb, a + b * (xn - xb))
}

/// Fortran-style DIM operation.
pub fn fortran_dim(x: f64, y: f64) -> f64 {
    if x > y {
        x - y
    } else {
        0.0
    }
}

/// Complex division with Smith's scaling.
///
/// Same algorithm as most reference complex libraries (and as the ITM
/// reference tables were computed with), which keeps the ground-impedance
/// terms bit-for-bit comparable.
pub fn complex_quotient(a: Complex64, b: Complex64) -> Complex64 {
    if b.re.abs() >= b.im.abs() {
        let ratio = b.im / b.re;
        let denom = b.re + b.im * ratio;
        Complex64::new((a.re + a.im * ratio) / denom, (a.im - a.re * ratio) / denom)
    } else {
        let ratio = b.re / b.im;
        let denom = b.re * ratio + b.im;
        Complex64::new((a.re * ratio + a.im) / denom, (a.im * ratio - a.re) / denom)
    }
}
