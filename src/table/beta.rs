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

//! Electron-phonon coupling table, `.beta` files.

use super::reader::read_table;
use super::{CurveTable, Element, PairDensity, SiteDensity, TableConfig};
use crate::spline::Spline;
use crate::Cutoff;
use anyhow::{bail, Context, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Curves of a single element in a [`Beta`] table
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct BetaCurves {
    /// Density contribution ρ(r)
    pub density: PairDensity,
    /// Coupling strength β(ρ)
    pub beta: Spline,
    /// Friction prefactor α(ρ) = √β(ρ)
    pub alpha: Spline,
}

/// Electron-phonon coupling strength as a function of the local electronic density.
///
/// Each element contributes ρ(r) to the density at neighbouring sites, and the
/// coupling of an atom follows from the density at its own site through β(ρ).
///
/// # Examples
/// ```
/// use eph::table::{Beta, SiteDensity, TableConfig};
/// use eph::Vector3;
/// let file = "\
/// Ni with linear density and quadratic coupling,
/// three lines of free text
/// before the data
/// 1 Ni
/// 5 1.0 5 0.5 4.0
/// 28
/// 4 3 2 1 0
/// 0 0.25 1 2.25 4
/// ";
/// let config = TableConfig::default().with_r_sq_points(1000);
/// let beta = Beta::from_reader(file.as_bytes(), &config).unwrap();
/// let ni = beta.index_of("Ni").unwrap();
/// let rho = beta.site_density([(ni, Vector3::new(1.0, 0.0, 0.0))]);
/// assert!((rho - 3.0).abs() < 1e-2);
/// assert!((beta.beta(ni, 1.5) - 2.25).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Beta {
    /// Locality cutoff for ρ(r)
    r_cutoff: f64,
    /// Largest tabulated site density
    rho_cutoff: f64,
    elements: CurveTable<BetaCurves>,
}

impl Beta {
    /// Load a `.beta` file
    pub fn from_file(path: impl AsRef<Path>, config: &TableConfig) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(BufReader::new(file), config)
            .with_context(|| format!("cannot load beta table {}", path.display()))
    }

    /// Load from any buffered reader using the layout described in [`crate::table`].
    ///
    /// Each element has a single q-curve, β(ρ), tabulated with spacing `dq`.
    pub fn from_reader(reader: impl BufRead, config: &TableConfig) -> Result<Self> {
        let (header, raw) = read_table(reader, config, &["β(ρ)"])?;
        let r_sq_points = config.r_sq_points.unwrap_or(header.n_r);

        let mut elements = CurveTable::with_slots(raw.len());
        for (index, raw) in raw.into_iter().enumerate() {
            let beta = &raw.curves[0];
            if let Some(negative) = beta.iter().find(|value| **value < 0.0) {
                bail!(
                    "negative coupling {} for element {}",
                    negative,
                    raw.element.name
                );
            }
            let alpha: Vec<f64> = beta.iter().map(|value| value.sqrt()).collect();
            let curves = BetaCurves {
                density: PairDensity::new(header.dr, &raw.rho, header.r_cutoff, r_sq_points),
                beta: Spline::new(header.dq, beta),
                alpha: Spline::new(header.dq, &alpha),
            };
            elements.insert(index, raw.element, curves);
        }
        log::debug!(
            "beta table: r_cutoff = {}, rho_cutoff = {}",
            header.r_cutoff,
            header.q_max()
        );

        Ok(Self {
            r_cutoff: header.r_cutoff,
            rho_cutoff: header.q_max(),
            elements,
        })
    }

    /// Number of elements in the table
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Element stored at `index`
    pub fn element(&self, index: usize) -> &Element {
        self.elements.element(index)
    }

    /// Table index of the element called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.elements.index_of(name)
    }

    /// Table indices for a list of simulation type names
    pub fn map_types<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        self.elements.map_types(names)
    }

    /// Largest tabulated site density
    pub fn rho_cutoff(&self) -> f64 {
        self.rho_cutoff
    }

    /// All curves of element `index`
    pub fn curves(&self, index: usize) -> &BetaCurves {
        self.elements.get(index)
    }

    /// Density contribution of element `index` at distance `r`
    #[inline]
    pub fn rho(&self, index: usize, r: f64) -> f64 {
        self.curves(index).density.rho(r)
    }

    /// dρ/dr of element `index` at distance `r`
    #[inline]
    pub fn d_rho(&self, index: usize, r: f64) -> f64 {
        self.curves(index).density.d_rho(r)
    }

    /// Density contribution of element `index` at squared distance `r_sq`
    #[inline]
    pub fn rho_r_sq(&self, index: usize, r_sq: f64) -> f64 {
        self.curves(index).density.rho_r_sq(r_sq)
    }

    /// Coupling strength of element `index` at site density `rho`
    #[inline]
    pub fn beta(&self, index: usize, rho: f64) -> f64 {
        self.curves(index).beta.evaluate(rho)
    }

    /// dβ/dρ of element `index` at site density `rho`
    #[inline]
    pub fn d_beta(&self, index: usize, rho: f64) -> f64 {
        self.curves(index).beta.derivative(rho)
    }

    /// √β of element `index` at site density `rho`
    #[inline]
    pub fn alpha(&self, index: usize, rho: f64) -> f64 {
        self.curves(index).alpha.evaluate(rho)
    }
}

impl Cutoff for Beta {
    fn cutoff(&self) -> f64 {
        self.r_cutoff
    }
}

impl SiteDensity for Beta {
    fn pair_density(&self, index: usize) -> &PairDensity {
        &self.curves(index).density
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;
    use approx::assert_relative_eq;

    /// Ni: ρ = 5 - 2r, β = 1.6ρ²; Fe: ρ = 2.5 - r, β = 0.8ρ
    const BETA: &str = "\
# two elements
#
#
2 Ni Fe
6 0.5 5 0.25 2.5
28
5 4 3 2 1 0
0 0.1 0.4 0.9 1.6
26
2.5 2 1.5 1 0.5 0
0 0.2 0.4 0.6 0.8
";

    fn load() -> Beta {
        let config = TableConfig::default().with_r_sq_points(400);
        Beta::from_reader(BETA.as_bytes(), &config).unwrap()
    }

    #[test]
    fn test_header() {
        let beta = load();
        assert_eq!(beta.n_elements(), 2);
        assert_eq!(beta.element(1), &Element::new("Fe", 26));
        assert_eq!(beta.cutoff(), 2.5);
        assert_eq!(beta.cutoff_squared(), 6.25);
        assert_eq!(beta.rho_cutoff(), 1.0);
        assert_eq!(beta.map_types(&["Fe", "Ni"]).unwrap(), vec![1, 0]);
        assert!(beta.map_types(&["Cu"]).is_err());
    }

    #[test]
    fn test_density() {
        let beta = load();
        assert_relative_eq!(beta.rho(0, 1.25), 2.5, epsilon = 1e-12);
        assert_relative_eq!(beta.d_rho(0, 1.25), -2.0, epsilon = 1e-12);
        assert_relative_eq!(beta.rho(1, 1.25), 1.25, epsilon = 1e-12);
        assert_relative_eq!(beta.rho_r_sq(0, 1.0), 3.0, epsilon = 1e-4);
        assert_relative_eq!(beta.rho_r_sq(1, 2.25), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_coupling() {
        let beta = load();
        assert_relative_eq!(beta.beta(0, 0.6), 1.6 * 0.36, epsilon = 1e-12);
        assert_relative_eq!(beta.d_beta(0, 0.6), 3.2 * 0.6, epsilon = 1e-12);
        assert_relative_eq!(beta.alpha(0, 0.6), 1.6_f64.sqrt() * 0.6, epsilon = 1e-9);
        assert_relative_eq!(beta.beta(1, 0.3), 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_site_density() {
        let beta = load();
        let neighbours = [
            (0, Vector3::new(1.0, 0.0, 0.0)),
            (1, Vector3::new(0.0, 1.5, 0.0)),
            (1, Vector3::new(3.0, 0.0, 0.0)),
            (0, Vector3::new(0.0, 0.0, 2.5)),
        ];
        assert_relative_eq!(beta.site_density(neighbours), 4.0, epsilon = 1e-4);
        assert_eq!(beta.site_density(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_negative_coupling_is_rejected() {
        let table = BETA.replace("0 0.2 0.4", "0 -0.2 0.4");
        let err = Beta::from_reader(table.as_bytes(), &TableConfig::default()).unwrap_err();
        assert!(err.to_string().contains("negative coupling -0.2 for element Fe"));
    }

    #[test]
    fn test_missing_file() {
        let err = Beta::from_file("no/such/file.beta", &TableConfig::default()).unwrap_err();
        assert!(err.to_string().contains("cannot open no/such/file.beta"));
    }
}
