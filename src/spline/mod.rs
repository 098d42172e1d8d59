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

//! ## Spline interpolation on uniform grids
//!
//! Samples `y[i]` at `x = i·dx` are turned into one cubic per grid cell.
//! Knot derivatives are estimated with Akima's local weighting so that the
//! curve does not overshoot next to sharp bends or flat plateaus, and the
//! resulting interpolant is C¹ continuous at all interior knots.
//!
//! The constants below are part of the observable behaviour and are not
//! configurable per call.

mod akima;
mod reverse;

pub use self::akima::{Segment, Spline};

/// Number of samples that a table must *exceed* to be splined.
pub const MIN_SAMPLES: usize = 3;

/// Absolute ordinate tolerance accepted by [`Spline::reverse`].
pub const REVERSE_TOLERANCE: f64 = 1e-3;

/// Maximum number of bracket halvings in [`Spline::reverse`].
pub const MAX_REVERSE_ITERATIONS: usize = 128;
