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

//! Electronic heat table, `.kappa` files.

use super::reader::read_table;
use super::{CurveTable, Element, PairDensity, SiteDensity, TableConfig};
use crate::spline::Spline;
use crate::Cutoff;
use anyhow::{Context, Result};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Curves of a single element in a [`Kappa`] table
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct KappaCurves {
    /// Density contribution ρ(r) used to weight heat exchange
    pub density: PairDensity,
    /// Electronic energy per atom, E(T)
    pub energy: Spline,
    /// Electronic heat conductivity, K(T)
    pub conductivity: Spline,
}

/// Electronic energy and heat conductivity as functions of electronic temperature.
///
/// Atoms carry their electronic energy as state; the temperature is recovered
/// by inverting E(T), which therefore must increase with T.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Kappa {
    /// Locality cutoff for ρ(r)
    r_cutoff: f64,
    /// Largest tabulated temperature
    temperature_max: f64,
    elements: CurveTable<KappaCurves>,
}

impl Kappa {
    /// Load a `.kappa` file
    pub fn from_file(path: impl AsRef<Path>, config: &TableConfig) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(BufReader::new(file), config)
            .with_context(|| format!("cannot load kappa table {}", path.display()))
    }

    /// Load from any buffered reader using the layout described in [`crate::table`].
    ///
    /// Each element has two q-curves on a temperature grid with spacing `dq`:
    /// first E(T), then K(T).
    pub fn from_reader(reader: impl BufRead, config: &TableConfig) -> Result<Self> {
        let (header, raw) = read_table(reader, config, &["E(T)", "K(T)"])?;
        let r_sq_points = config.r_sq_points.unwrap_or(header.n_r);

        let mut elements = CurveTable::with_slots(raw.len());
        for (index, raw) in raw.into_iter().enumerate() {
            let (energy, conductivity) = (&raw.curves[0], &raw.curves[1]);
            if !energy.iter().tuple_windows::<(_, _)>().all(|(e0, e1)| e1 > e0) {
                log::warn!(
                    "E(T) of {} is not strictly increasing; temperatures may be ambiguous",
                    raw.element.name
                );
            }
            let curves = KappaCurves {
                density: PairDensity::new(header.dr, &raw.rho, header.r_cutoff, r_sq_points),
                energy: Spline::new(header.dq, energy),
                conductivity: Spline::new(header.dq, conductivity),
            };
            elements.insert(index, raw.element, curves);
        }
        log::debug!(
            "kappa table: r_cutoff = {}, temperature_max = {}",
            header.r_cutoff,
            header.q_max()
        );

        Ok(Self {
            r_cutoff: header.r_cutoff,
            temperature_max: header.q_max(),
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

    /// Largest tabulated temperature
    pub fn temperature_max(&self) -> f64 {
        self.temperature_max
    }

    /// All curves of element `index`
    pub fn curves(&self, index: usize) -> &KappaCurves {
        self.elements.get(index)
    }

    /// Density contribution of element `index` at squared distance `r_sq`
    #[inline]
    pub fn rho_r_sq(&self, index: usize, r_sq: f64) -> f64 {
        self.curves(index).density.rho_r_sq(r_sq)
    }

    /// Electronic energy of element `index` at temperature `t`
    #[inline]
    pub fn energy(&self, index: usize, t: f64) -> f64 {
        self.curves(index).energy.evaluate(t)
    }

    /// Electronic heat capacity dE/dT of element `index` at temperature `t`
    #[inline]
    pub fn heat_capacity(&self, index: usize, t: f64) -> f64 {
        self.curves(index).energy.derivative(t)
    }

    /// Electronic temperature of element `index` holding `energy`.
    ///
    /// # Panics
    /// Panics if `energy` is outside the tabulated E(T) range.
    #[inline]
    pub fn temperature(&self, index: usize, energy: f64) -> f64 {
        self.curves(index).energy.reverse(energy)
    }

    /// Heat conductivity of element `index` at temperature `t`
    #[inline]
    pub fn conductivity(&self, index: usize, t: f64) -> f64 {
        self.curves(index).conductivity.evaluate(t)
    }
}

impl Cutoff for Kappa {
    fn cutoff(&self) -> f64 {
        self.r_cutoff
    }
}

impl SiteDensity for Kappa {
    fn pair_density(&self, index: usize) -> &PairDensity {
        &self.curves(index).density
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::REVERSE_TOLERANCE;
    use crate::Vector3;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Cu: ρ = 4 - r, E = 5·10⁻⁵ T², K = 0.1 + 10⁻³ T
    const KAPPA: &str = "\
# single element
#
#
1 Cu
5 1.0 11 100.0 4.0
29
4 3 2 1 0
0 0.5 2 4.5 8 12.5 18 24.5 32 40.5 50
0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 1.0 1.1
";

    fn load() -> Kappa {
        let config = TableConfig::default().with_r_sq_points(1000);
        Kappa::from_reader(KAPPA.as_bytes(), &config).unwrap()
    }

    #[test]
    fn test_header() {
        let kappa = load();
        assert_eq!(kappa.n_elements(), 1);
        assert_eq!(kappa.element(0), &Element::new("Cu", 29));
        assert_eq!(kappa.index_of("Cu"), Some(0));
        assert_eq!(kappa.cutoff(), 4.0);
        assert_eq!(kappa.temperature_max(), 1000.0);
    }

    #[test]
    fn test_energy_and_temperature() {
        let kappa = load();
        assert_relative_eq!(kappa.energy(0, 400.0), 8.0, epsilon = 1e-9);
        assert_relative_eq!(kappa.energy(0, 250.0), 3.125, epsilon = 1e-9);
        assert_relative_eq!(kappa.heat_capacity(0, 400.0), 0.04, epsilon = 1e-9);
        assert_abs_diff_eq!(kappa.temperature(0, 8.0), 400.0, epsilon = 0.1);
        for t in [120.0, 333.0, 871.0] {
            let energy = kappa.energy(0, t);
            let t_back = kappa.temperature(0, energy);
            assert!((kappa.energy(0, t_back) - energy).abs() < REVERSE_TOLERANCE);
        }
    }

    #[test]
    #[should_panic(expected = "value outside interpolator region")]
    fn test_energy_out_of_range_panics() {
        load().temperature(0, 60.0);
    }

    #[test]
    fn test_conductivity() {
        let kappa = load();
        assert_relative_eq!(kappa.conductivity(0, 250.0), 0.35, epsilon = 1e-9);
    }

    #[test]
    fn test_site_density() {
        let kappa = load();
        let neighbours = [
            (0, Vector3::new(1.0, 1.0, 0.0)),
            (0, Vector3::new(0.0, 0.0, 3.0)),
            (0, Vector3::new(0.0, 0.0, 5.0)),
        ];
        let expected = 4.0 - 2.0_f64.sqrt() + 1.0;
        assert_relative_eq!(kappa.site_density(neighbours), expected, epsilon = 1e-4);
        assert_relative_eq!(kappa.rho_r_sq(0, 9.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_conductivity() {
        let table = KAPPA.replace("0.9 1.0 1.1\n", "\n");
        let err = Kappa::from_reader(table.as_bytes(), &TableConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("reading K(T) of Cu"));
    }
}
