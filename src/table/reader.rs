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

//! Reader for the shared text layout of `.beta` and `.kappa` files.

use super::{Element, TableConfig};
use crate::spline::MIN_SAMPLES;
use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;
use std::str::FromStr;

/// Whitespace separated tokens tagged with their line number
struct Tokens {
    tokens: std::vec::IntoIter<(usize, String)>,
}

impl Tokens {
    fn new(reader: impl BufRead, comment_lines: usize) -> Result<Self> {
        let mut tokens = Vec::new();
        for (index, line) in reader.lines().enumerate().skip(comment_lines) {
            let line = line.with_context(|| format!("cannot read line {}", index + 1))?;
            tokens.extend(
                line.split_whitespace()
                    .map(|token| (index + 1, token.to_string())),
            );
        }
        Ok(Self {
            tokens: tokens.into_iter(),
        })
    }

    fn parse<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let (line, token) = self
            .tokens
            .next()
            .ok_or_else(|| anyhow!("unexpected end of table while reading {}", what))?;
        token
            .parse()
            .with_context(|| format!("line {}: invalid {} '{}'", line, what, token))
    }

    fn values(&mut self, count: usize, what: &str) -> Result<Vec<f64>> {
        (0..count).map(|_| self.parse(what)).collect()
    }

    fn finish(mut self) -> Result<()> {
        match self.tokens.next() {
            Some((line, token)) => bail!("line {}: unexpected trailing value '{}'", line, token),
            None => Ok(()),
        }
    }
}

/// Grid description shared by all elements in a file
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Header {
    pub names: Vec<String>,
    /// Number of points in ρ(r)
    pub n_r: usize,
    /// Spacing of ρ(r)
    pub dr: f64,
    /// Number of points in each q-curve
    pub n_q: usize,
    /// Spacing of each q-curve
    pub dq: f64,
    pub r_cutoff: f64,
}

impl Header {
    fn read(tokens: &mut Tokens) -> Result<Self> {
        let n_elements: usize = tokens.parse("number of elements")?;
        if n_elements == 0 {
            bail!("no elements found in table");
        }
        let names = (0..n_elements)
            .map(|_| tokens.parse("element name"))
            .collect::<Result<Vec<String>>>()?;

        let header = Self {
            names,
            n_r: tokens.parse("number of r points")?,
            dr: tokens.parse("r spacing")?,
            n_q: tokens.parse("number of curve points")?,
            dq: tokens.parse("curve spacing")?,
            r_cutoff: tokens.parse("cutoff")?,
        };
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if self.n_r <= MIN_SAMPLES || self.n_q <= MIN_SAMPLES {
            bail!(
                "tables need more than {} points, got {} and {}",
                MIN_SAMPLES,
                self.n_r,
                self.n_q
            );
        }
        if !(self.dr > 0.0 && self.dq > 0.0) {
            bail!("grid spacings must be positive, got {} and {}", self.dr, self.dq);
        }
        let r_max = (self.n_r - 1) as f64 * self.dr;
        if !(self.r_cutoff > 0.0 && self.r_cutoff <= r_max) {
            bail!(
                "cutoff {} outside tabulated range (0, {}]",
                self.r_cutoff,
                r_max
            );
        }
        Ok(())
    }

    /// Upper end of the q-grid
    pub fn q_max(&self) -> f64 {
        (self.n_q - 1) as f64 * self.dq
    }
}

/// Tabulated values for one element
#[derive(Clone, Debug, PartialEq)]
pub(super) struct RawCurves {
    pub element: Element,
    /// ρ(r) on the r-grid
    pub rho: Vec<f64>,
    /// q-curves in file order
    pub curves: Vec<Vec<f64>>,
}

/// Read a table where each element carries ρ(r) followed by `curve_names.len()` q-curves
pub(super) fn read_table(
    reader: impl BufRead,
    config: &TableConfig,
    curve_names: &[&str],
) -> Result<(Header, Vec<RawCurves>)> {
    if let Some(points) = config.r_sq_points {
        if points <= MIN_SAMPLES {
            bail!("r² table needs more than {} points, got {}", MIN_SAMPLES, points);
        }
    }
    let mut tokens = Tokens::new(reader, config.comment_lines)?;
    let header = Header::read(&mut tokens)?;

    let elements = header
        .names
        .iter()
        .map(|name| -> Result<RawCurves> {
            let number = tokens.parse("atomic number")?;
            let rho = tokens
                .values(header.n_r, "density value")
                .with_context(|| format!("reading ρ(r) of {}", name))?;
            let curves = curve_names
                .iter()
                .map(|curve| {
                    tokens
                        .values(header.n_q, "curve value")
                        .with_context(|| format!("reading {} of {}", curve, name))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(RawCurves {
                element: Element::new(name.as_str(), number),
                rho,
                curves,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tokens.finish()?;
    log::debug!(
        "read table with {} element(s): {} r-points (dr = {}), {} q-points (dq = {}), cutoff {}",
        elements.len(),
        header.n_r,
        header.dr,
        header.n_q,
        header.dq,
        header.r_cutoff
    );
    Ok((header, elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# comment
# comment
# comment
2 A B
4 1.0 5 0.5 3.0
1 0 1 2 3
  5 6 7 8 9
2
9 8 7 6
4 3 2 1 0
";

    #[test]
    fn test_read_table() {
        let (header, elements) =
            read_table(TABLE.as_bytes(), &TableConfig::default(), &["q"]).unwrap();
        assert_eq!(header.names, ["A", "B"]);
        assert_eq!((header.n_r, header.n_q), (4, 5));
        assert_eq!(header.q_max(), 2.0);
        assert_eq!(elements[0].element, Element::new("A", 1));
        assert_eq!(elements[0].rho, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(elements[0].curves, [vec![5.0, 6.0, 7.0, 8.0, 9.0]]);
        assert_eq!(elements[1].element.number, 2);
        assert_eq!(elements[1].curves[0], [4.0, 3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_comment_lines() {
        let table = TABLE.replacen("# comment\n", "", 2);
        let config = TableConfig::default().with_comment_lines(1);
        assert!(read_table(table.as_bytes(), &config, &["q"]).is_ok());
    }

    #[test]
    fn test_premature_end() {
        let err = read_table(TABLE.as_bytes(), &TableConfig::default(), &["q", "p"]).unwrap_err();
        assert!(format!("{:#}", err).contains("unexpected end of table"));
    }

    #[test]
    fn test_trailing_values() {
        let table = format!("{}42\n", TABLE);
        let err = read_table(table.as_bytes(), &TableConfig::default(), &["q"]).unwrap_err();
        assert!(err.to_string().contains("trailing value '42'"));
    }

    #[test]
    fn test_invalid_number() {
        let table = TABLE.replace("5 6 7", "5 x 7");
        let err = read_table(table.as_bytes(), &TableConfig::default(), &["q"]).unwrap_err();
        assert!(format!("{:#}", err).contains("line 7: invalid curve value 'x'"));
    }

    #[test]
    fn test_invalid_header() {
        let config = TableConfig::default();
        for (from, to, message) in [
            ("4 1.0 5", "3 1.0 5", "need more than 3 points"),
            ("4 1.0 5 0.5", "4 -1.0 5 0.5", "spacings must be positive"),
            ("0.5 3.0", "0.5 3.5", "outside tabulated range"),
            ("2 A B", "0 A B", "no elements"),
        ] {
            let table = TABLE.replace(from, to);
            let err = read_table(table.as_bytes(), &config, &["q"]).unwrap_err();
            assert!(err.to_string().contains(message), "{}", err);
        }
    }

    #[test]
    fn test_too_few_r_sq_points() {
        let config = TableConfig::default().with_r_sq_points(3);
        assert!(read_table(TABLE.as_bytes(), &config, &["q"]).is_err());
    }
}
