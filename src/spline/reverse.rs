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

//! Inverse evaluation, x(y), by bracket halving.

use super::{Spline, MAX_REVERSE_ITERATIONS, REVERSE_TOLERANCE};

/// Abscissa and the spline value there
#[derive(Clone, Copy, Debug)]
struct Probe {
    x: f64,
    y: f64,
}

impl Probe {
    fn new(spline: &Spline, x: f64) -> Self {
        Self {
            x,
            y: spline.evaluate(x),
        }
    }

    fn matches(&self, target: f64) -> bool {
        (self.y - target).abs() < REVERSE_TOLERANCE
    }
}

/// True if `target` lies between `a` and `b`, in either order
#[inline]
fn brackets(a: f64, target: f64, b: f64) -> bool {
    a.min(b) <= target && target <= a.max(b)
}

impl Spline {
    /// Abscissa where the spline takes the value `target`, or `None` if not found.
    ///
    /// The search starts from the full domain `[0, (n-1)·dx]` and repeatedly keeps
    /// the half whose end values bracket `target`, until a midpoint is within
    /// [`REVERSE_TOLERANCE`] of `target` or [`MAX_REVERSE_ITERATIONS`] halvings
    /// have been made. Increasing and decreasing curves are both handled.
    /// If the curve is not monotonic, any crossing may be returned.
    ///
    /// Returns `None` if `target` is not bracketed by the values at the two
    /// domain ends.
    pub fn checked_reverse(&self, target: f64) -> Option<f64> {
        let (x_min, x_max) = self.domain();
        let mut lower = Probe::new(self, x_min);
        let mut upper = Probe::new(self, x_max);

        if !brackets(lower.y, target, upper.y) {
            return None;
        }
        if let Some(end) = [lower, upper].iter().find(|probe| probe.matches(target)) {
            return Some(end.x);
        }

        let mut middle = Probe::new(self, 0.5 * (lower.x + upper.x));
        for _ in 0..MAX_REVERSE_ITERATIONS {
            if middle.matches(target) {
                return Some(middle.x);
            }
            if brackets(lower.y, target, middle.y) {
                upper = middle;
            } else if brackets(middle.y, target, upper.y) {
                lower = middle;
            } else {
                break;
            }
            middle = Probe::new(self, 0.5 * (lower.x + upper.x));
        }
        None
    }

    /// Abscissa where the spline takes the value `target`.
    ///
    /// Only meaningful where the tabulated function is monotonic.
    ///
    /// # Examples
    /// ```
    /// use eph::spline::Spline;
    /// let energy: Vec<f64> = (0..20).map(|t| 0.5 * (t * t) as f64).collect();
    /// let spline = Spline::new(1.0, &energy);
    /// let temperature = spline.reverse(50.0);
    /// assert!((temperature - 10.0).abs() < 1e-2);
    /// ```
    ///
    /// # Panics
    /// Panics if `target` is outside the range of the curve or if the search
    /// does not converge, see [`Spline::checked_reverse`].
    pub fn reverse(&self, target: f64) -> f64 {
        self.checked_reverse(target).unwrap_or_else(|| {
            log::error!(
                "no abscissa in {:?} where spline equals {}",
                self.domain(),
                target
            );
            panic!("value outside interpolator region: {}", target)
        })
    }
}
