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

//! # EPH
//!
//! Tabulated response functions for electron-phonon (EPH) coupling models
//! used by particle simulations: pair density contributions ρ(r),
//! coupling strength β(ρ), electronic heat conductivity K(T) and
//! energy-temperature relations E(T).
//!
//! Every curve is stored as a shape-preserving piecewise cubic,
//! see [`spline::Spline`], which evaluates in constant time and can be
//! inverted where the tabulated function is monotonic.
//!
//! ```
//! use eph::spline::Spline;
//! let spline = Spline::new(1.0, &[10.0, 9.0, 8.0, 7.0, 6.0]);
//! assert_eq!(spline.evaluate(2.0), 8.0);
//! assert!((spline.reverse(8.5) - 1.5).abs() < 1e-2);
//! ```

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;

pub mod spline;
pub mod table;

/// Defines a cutoff distance
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self) -> f64 {
        self.cutoff().powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self) -> f64;
}
