// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Akima spline on a uniform grid starting at zero.
//!
//! # Design
//!
//! - **Local derivatives**: each knot derivative depends on the four nearest
//!   finite-difference slopes only, which suppresses the ringing of global
//!   cubic splines next to plateaus and kinks.
//! - **Global coefficients**: each cubic is stored in powers of the absolute
//!   abscissa `x`, so evaluation is a table lookup followed by Horner's scheme
//!   with no shift into cell-local coordinates.
//! - **Sentinel**: the last grid point carries a constant segment so that the
//!   upper domain boundary can be evaluated without a special case.
//!
//! # References
//!
//! - Akima, J. ACM 17, 589 (1970)
//!   <https://doi.org/10.1145/321607.321609>

use super::MIN_SAMPLES;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

// ============================================================================
// Polynomial pieces
// ============================================================================

/// Cubic polynomial valid on one grid cell.
///
/// ```text
/// p(x) = a + b·x + c·x² + d·x³
/// ```
/// where `x` is the absolute abscissa, not the offset into the cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Segment {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Segment {
    /// Constant polynomial, p(x) = value
    pub const fn constant(value: f64) -> Self {
        Self {
            a: value,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        }
    }

    /// Unique cubic through `(x₀, y₀)` and `(x₁, y₁)` with slopes `t₀` and `t₁`,
    /// where `x₀ = index·dx` and `x₁ = (index + 1)·dx`.
    ///
    /// The 4×4 system is solved in closed form against the absolute abscissa.
    fn hermite(index: usize, dx: f64, (y0, y1): (f64, f64), (t0, t1): (f64, f64)) -> Self {
        let dx3 = dx * dx * dx;

        let x0 = index as f64 * dx;
        let x0_2 = x0 * x0;
        let x0_3 = x0 * x0_2;

        let x1 = (index + 1) as f64 * dx;
        let x1_2 = x1 * x1;
        let x1_3 = x1 * x1_2;

        let d = ((t0 + t1) * (x1 - x0) + 2.0 * (y0 - y1)) / dx3;
        let c = (t1 - t0 + 3.0 * d * (x0_2 - x1_2)) / (2.0 * dx);
        let b = (c * (x0_2 - x1_2) + d * (x0_3 - x1_3) + y1 - y0) / dx;
        let a = y0 - b * x0 - c * x0_2 - d * x0_3;

        Self { a, b, c, d }
    }

    /// Value at `x` using Horner's method
    #[inline(always)]
    pub fn value(&self, x: f64) -> f64 {
        self.a + x * (self.b + x * (self.c + x * self.d))
    }

    /// First derivative at `x`
    #[inline(always)]
    pub fn slope(&self, x: f64) -> f64 {
        self.b + x * (2.0 * self.c + 3.0 * x * self.d)
    }
}

// ============================================================================
// Knot derivative estimation
// ============================================================================

/// Decision table for the derivative at a knot.
///
/// The knot sees the four neighbouring finite-difference slopes
/// `(m₋₂, m₋₁, m₀, m₁)`. Cases are tested in declaration order and the first
/// match wins; later cases assume that earlier ties have been excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KnotSlope {
    /// Flat on the left only: `m₋₂ = m₋₁` and `m₀ ≠ m₁`
    FlatLeft,
    /// Flat on both sides: `m₋₂ = m₋₁` and `m₀ = m₁`
    FlatBoth,
    /// No kink at the knot: `m₋₁ = m₀`
    Straight,
    /// Two plateaus joined at the knot
    Symmetric,
    /// Akima's weighted average
    Weighted,
}

impl KnotSlope {
    fn classify((m_2, m_1, m0, m1): (f64, f64, f64, f64)) -> Self {
        if m_2 == m_1 && m0 != m1 {
            Self::FlatLeft
        } else if m0 == m1 && m_2 == m_1 {
            Self::FlatBoth
        } else if m_1 == m0 {
            Self::Straight
        } else if m_2 == m_1 && m0 == m1 && m0 != m_1 {
            Self::Symmetric
        } else {
            Self::Weighted
        }
    }

    fn derivative(self, (m_2, m_1, m0, m1): (f64, f64, f64, f64)) -> f64 {
        match self {
            Self::FlatLeft => m_1,
            Self::FlatBoth | Self::Straight => m0,
            Self::Symmetric => 0.5 * (m_1 + m0),
            Self::Weighted => {
                let w1 = (m1 - m0).abs();
                let w0 = (m_1 - m_2).abs();
                (m_1 * w1 + m0 * w0) / (w1 + w0)
            }
        }
    }
}

/// Finite-difference slopes padded by linear extrapolation with two values at each end.
///
/// Element `k + 2` holds the slope between samples `k` and `k + 1`, so the
/// four slopes around knot `i` are found at `i..i + 4`.
fn padded_slopes(dx: f64, y: &[f64]) -> Vec<f64> {
    let slopes = y
        .iter()
        .tuple_windows::<(_, _)>()
        .map(|(y0, y1)| (y1 - y0) / dx);
    let n = y.len() - 1;
    let mut padded = Vec::with_capacity(n + 4);
    padded.extend([0.0, 0.0]);
    padded.extend(slopes);

    let left_1 = 2.0 * padded[2] - padded[3];
    let left_2 = 2.0 * left_1 - padded[2];
    padded[1] = left_1;
    padded[0] = left_2;

    let right_1 = 2.0 * padded[n + 1] - padded[n];
    let right_2 = 2.0 * right_1 - padded[n + 1];
    padded.extend([right_1, right_2]);
    padded
}

// ============================================================================
// Spline
// ============================================================================

/// Shape-preserving cubic spline through uniformly spaced samples.
///
/// Sample `i` sits at `x = i·dx`. The spline is immutable once built and can be
/// shared freely between threads.
///
/// # Examples
/// ```
/// use eph::spline::Spline;
/// let spline = Spline::new(0.5, &[0.0, 0.25, 1.0, 2.25, 4.0]);
/// assert_eq!(spline.len(), 5);
/// assert_eq!(spline.domain(), (0.0, 2.0));
/// assert!((spline.evaluate(1.25) - 1.5625).abs() < 1e-12);
/// ```
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Spline {
    /// Inverse grid spacing
    inv_dx: f64,
    /// One cubic per sample; the last one is constant
    segments: Vec<Segment>,
}

impl Spline {
    /// Build the spline from samples `y` spaced `dx` apart.
    ///
    /// # Panics
    /// Panics if `dx` is not positive or if there are no more than
    /// [`MIN_SAMPLES`] samples.
    pub fn new(dx: f64, y: &[f64]) -> Self {
        assert!(dx > 0.0, "grid spacing must be positive, got {}", dx);
        assert!(
            y.len() > MIN_SAMPLES,
            "need more than {} samples, got {}",
            MIN_SAMPLES,
            y.len()
        );

        let tangents: Vec<f64> = padded_slopes(dx, y)
            .into_iter()
            .tuple_windows::<(_, _, _, _)>()
            .map(|m| KnotSlope::classify(m).derivative(m))
            .collect();
        debug_assert_eq!(tangents.len(), y.len());

        let mut segments = Vec::with_capacity(y.len());
        segments.extend(
            y.iter()
                .copied()
                .tuple_windows::<(f64, f64)>()
                .zip(tangents.into_iter().tuple_windows::<(f64, f64)>())
                .enumerate()
                .map(|(i, (values, slopes))| Segment::hermite(i, dx, values, slopes)),
        );
        // y is non-empty, see assertion above
        segments.push(Segment::constant(y[y.len() - 1]));

        Self {
            inv_dx: dx.recip(),
            segments,
        }
    }

    /// Grid spacing, dx
    pub fn spacing(&self) -> f64 {
        self.inv_dx.recip()
    }

    /// Number of samples the spline was built from
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false since a spline needs more than [`MIN_SAMPLES`] samples
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Tabulated interval `[0, (n-1)·dx]`
    pub fn domain(&self) -> (f64, f64) {
        (0.0, (self.len() - 1) as f64 * self.spacing())
    }

    /// Polynomial pieces, one per sample
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Index of the segment covering `x`.
    ///
    /// Abscissas in `[(n-1)·dx, n·dx)` land on the constant sentinel.
    #[inline]
    fn index_at(&self, x: f64) -> usize {
        if !(x >= 0.0) {
            log::error!("spline evaluated at invalid abscissa {}", x);
            panic!("abscissa must be non-negative, got {}", x);
        }
        let index = (x * self.inv_dx) as usize;
        assert!(
            index < self.segments.len(),
            "abscissa {} outside tabulated domain [0, {}]",
            x,
            self.domain().1
        );
        index
    }

    /// Interpolated value at `x`.
    ///
    /// # Panics
    /// Panics if `x` is negative, NaN or beyond the tabulated domain.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.segments[self.index_at(x)].value(x)
    }

    /// First derivative of the interpolant at `x`.
    ///
    /// At the upper domain boundary `(n-1)·dx` this is the end slope of the
    /// last cubic; strictly beyond it the sentinel gives zero.
    ///
    /// # Panics
    /// Panics if `x` is negative, NaN or beyond the tabulated domain.
    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        let mut index = self.index_at(x);
        if index + 1 == self.segments.len() && x <= self.domain().1 {
            index -= 1;
        }
        self.segments[index].slope(x)
    }
}

impl Debug for Spline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spline")
            .field("n_points", &self.len())
            .field("dx", &self.spacing())
            .field("domain", &self.domain())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
