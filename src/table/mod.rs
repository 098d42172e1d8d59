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

//! ## Per-element curve tables
//!
//! Tabulated model functions for each chemical element, loaded from text files.
//!
//! - [`Beta`]: pair density ρ(r) and electron-phonon coupling β(ρ)
//! - [`Kappa`]: pair density ρ(r), energy E(T) and heat conductivity K(T)
//!
//! Both files share a layout of whitespace separated values, which may wrap
//! lines freely after the comment header:
//!
//! ```text
//! <comment lines>
//! <n_elements> <name_1> ... <name_n>
//! <n_r> <dr> <n_q> <dq> <r_cutoff>
//! <atomic number of element 1>
//! <n_r values of ρ(r)>
//! <n_q values for each q-curve>
//! <atomic number of element 2>
//! ...
//! ```

use crate::spline::{Spline, MIN_SAMPLES};
use crate::{Cutoff, Vector3};
use anyhow::{anyhow, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod beta;
mod kappa;
mod reader;
pub use self::beta::{Beta, BetaCurves};
pub use self::kappa::{Kappa, KappaCurves};

/// Chemical element described by a table
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Element {
    /// Name or symbol, e.g. "Ni"
    pub name: String,
    /// Atomic number
    pub number: u8,
}

impl Element {
    pub fn new(name: impl Into<String>, number: u8) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

/// Configuration for loading tables
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct TableConfig {
    /// Number of header lines to skip (default: 3)
    pub comment_lines: usize,
    /// Number of points in the ρ(r²) table (default: same as the r-grid)
    pub r_sq_points: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            comment_lines: 3,
            r_sq_points: None,
        }
    }
}

impl TableConfig {
    /// Set number of header lines to skip
    pub fn with_comment_lines(mut self, comment_lines: usize) -> Self {
        self.comment_lines = comment_lines;
        self
    }

    /// Set resolution of the ρ(r²) table
    pub fn with_r_sq_points(mut self, r_sq_points: usize) -> Self {
        self.r_sq_points = Some(r_sq_points);
        self
    }
}

// ============================================================================
// Element slots
// ============================================================================

/// One set of curves per element, addressed by a small integer index.
///
/// Slots are created empty and filled once while a table is being loaded;
/// after that the table is read-only.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct CurveTable<C> {
    slots: Vec<Option<(Element, C)>>,
}

impl<C> CurveTable<C> {
    /// Table with `n` unfilled slots
    pub fn with_slots(n: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(n).collect(),
        }
    }

    /// Fill slot `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range or the slot is already filled.
    pub fn insert(&mut self, index: usize, element: Element, curves: C) {
        let n = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .unwrap_or_else(|| panic!("element index {} out of range (n = {})", index, n));
        assert!(slot.is_none(), "element slot {} is already filled", index);
        *slot = Some((element, curves));
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True if every slot has been filled
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    fn slot(&self, index: usize) -> &(Element, C) {
        match self.slots.get(index) {
            Some(Some(entry)) => entry,
            Some(None) => panic!("curves for element slot {} have not been built", index),
            None => panic!(
                "element index {} out of range (n = {})",
                index,
                self.slots.len()
            ),
        }
    }

    /// Curves of element `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range or the slot is unfilled.
    #[inline]
    pub fn get(&self, index: usize) -> &C {
        &self.slot(index).1
    }

    /// Element stored at `index`
    pub fn element(&self, index: usize) -> &Element {
        &self.slot(index).0
    }

    /// Index of the element called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|(element, _)| element.name == name)
        })
    }

    /// Translate simulation type names into table indices
    pub fn map_types<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.index_of(name)
                    .ok_or_else(|| anyhow!("element '{}' not found in table", name))
            })
            .collect()
    }

    /// Filled slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (&Element, &C)> {
        self.slots
            .iter()
            .flatten()
            .map(|(element, curves)| (element, curves))
    }
}

// ============================================================================
// Pair density
// ============================================================================

/// Density contribution ρ(r) of one neighbour, tabulated in r and in r².
///
/// The r² table avoids a square root in neighbour loops.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PairDensity {
    rho: Spline,
    rho_r_sq: Spline,
}

impl PairDensity {
    /// Spline ρ(r) sampled with spacing `dr` and resample it on a uniform
    /// r² grid of `r_sq_points` points covering `[0, r_cutoff²]`.
    ///
    /// # Panics
    /// Panics on invalid spline input or if `r_cutoff` is not in `(0, (n-1)·dr]`.
    pub fn new(dr: f64, rho: &[f64], r_cutoff: f64, r_sq_points: usize) -> Self {
        assert!(r_cutoff > 0.0, "cutoff must be positive");
        assert!(
            r_sq_points > MIN_SAMPLES,
            "need more than {} points in the r² table",
            MIN_SAMPLES
        );
        let rho = Spline::new(dr, rho);
        let r_max = rho.domain().1;
        assert!(
            r_cutoff <= r_max * (1.0 + 1e-12),
            "cutoff {} outside tabulated range (0, {}]",
            r_cutoff,
            r_max
        );
        let dr_sq = r_cutoff * r_cutoff / (r_sq_points - 1) as f64;
        let resampled: Vec<f64> = (0..r_sq_points)
            .map(|i| rho.evaluate((i as f64 * dr_sq).sqrt().min(r_max)))
            .collect();
        let rho_r_sq = Spline::new(dr_sq, &resampled);
        Self { rho, rho_r_sq }
    }

    /// Density at distance `r`
    #[inline]
    pub fn rho(&self, r: f64) -> f64 {
        self.rho.evaluate(r)
    }

    /// dρ/dr at distance `r`
    #[inline]
    pub fn d_rho(&self, r: f64) -> f64 {
        self.rho.derivative(r)
    }

    /// Density at squared distance `r_sq`
    #[inline]
    pub fn rho_r_sq(&self, r_sq: f64) -> f64 {
        self.rho_r_sq.evaluate(r_sq)
    }
}

/// Local electronic density from surrounding atoms
pub trait SiteDensity: Cutoff {
    /// Pair density of element `index`
    fn pair_density(&self, index: usize) -> &PairDensity;

    /// Sum of ρ(r²) over neighbours given as (element index, separation vector).
    /// Neighbours at or beyond the cutoff do not contribute.
    fn site_density<I>(&self, neighbours: I) -> f64
    where
        I: IntoIterator<Item = (usize, Vector3)>,
    {
        let cutoff_squared = self.cutoff_squared();
        neighbours
            .into_iter()
            .map(|(index, separation)| (index, separation.norm_squared()))
            .filter(|(_, r_sq)| *r_sq < cutoff_squared)
            .map(|(index, r_sq)| self.pair_density(index).rho_r_sq(r_sq))
            .sum()
    }
}
