// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Query-side types: approximation modes, thresholds and bound pairs.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::lossy::CountAndError;

/// Which point of an item's `[lower, upper]` interval a query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Approximation {
    /// The tracked count; never overstates the true frequency.
    #[default]
    Lower,
    /// Tracked count plus error; never understates the true frequency.
    Upper,
    /// Midpoint of the two bounds.
    Median,
}

impl Approximation {
    /// Returns the mode's textual name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Approximation::Lower => "lower",
            Approximation::Upper => "upper",
            Approximation::Median => "median",
        }
    }

    /// Applies this mode to an entry.
    pub fn apply(self, entry: &CountAndError) -> f64 {
        match self {
            Approximation::Lower => entry.lower() as f64,
            Approximation::Upper => entry.upper() as f64,
            Approximation::Median => entry.median(),
        }
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Approximation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lower" => Ok(Approximation::Lower),
            "upper" => Ok(Approximation::Upper),
            "median" => Ok(Approximation::Median),
            _ => Err(Error::unsupported_approximation(s)),
        }
    }
}

/// Conversion into an [`Approximation`], failing with
/// [`ErrorKind::UnsupportedApproximation`](crate::error::ErrorKind::UnsupportedApproximation)
/// for unknown modes.
pub trait ToApproximation {
    /// Resolves the approximation mode.
    fn to_approximation(&self) -> Result<Approximation, Error>;
}

impl ToApproximation for Approximation {
    fn to_approximation(&self) -> Result<Approximation, Error> {
        Ok(*self)
    }
}

impl ToApproximation for &str {
    fn to_approximation(&self) -> Result<Approximation, Error> {
        self.parse()
    }
}

impl ToApproximation for String {
    fn to_approximation(&self) -> Result<Approximation, Error> {
        self.parse()
    }
}

/// Threshold for frequent item queries.
///
/// # Examples
///
/// ```
/// use lossycount::lossy::Threshold;
///
/// assert_eq!(Threshold::from(0.05), Threshold::Relative(0.05));
/// assert_eq!(Threshold::from(20.0), Threshold::Absolute(20.0));
/// assert_eq!(Threshold::Relative(0.05).resolve(0.01, 1000), 50.0);
/// assert_eq!(Threshold::Epsilon.resolve(0.01, 1000), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Threshold {
    /// The counter's own `eps`, taken relative to the stream length.
    #[default]
    Epsilon,
    /// A fraction of the stream length.
    Relative(f64),
    /// An absolute occurrence count.
    Absolute(f64),
}

impl Threshold {
    /// Resolves the threshold to an occurrence count for a stream of `total` items.
    pub fn resolve(self, eps: f64, total: u64) -> f64 {
        match self {
            Threshold::Epsilon => eps * total as f64,
            Threshold::Relative(fraction) => fraction * total as f64,
            Threshold::Absolute(count) => count,
        }
    }
}

/// Values below 1 are relative frequencies, everything else is a count.
impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        if value < 1.0 {
            Threshold::Relative(value)
        } else {
            Threshold::Absolute(value)
        }
    }
}

impl From<u64> for Threshold {
    fn from(value: u64) -> Self {
        Threshold::Absolute(value as f64)
    }
}

impl From<Option<f64>> for Threshold {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Threshold::Epsilon, Threshold::from)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("eps") {
            return Ok(Threshold::Epsilon);
        }
        let value = s.parse::<f64>().map_err(|err| {
            Error::invalid_configuration("threshold must be a number or \"eps\"")
                .with_context("threshold", s)
                .set_source(err)
        })?;
        if value.is_nan() {
            return Err(Error::invalid_configuration("threshold must not be NaN"));
        }
        Ok(Threshold::from(value))
    }
}

/// Lower and upper bounds on an item's true frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Never exceeds the true frequency.
    pub lower: u64,
    /// Never falls below the true frequency.
    pub upper: u64,
}

impl Bounds {
    /// Returns true if `count` lies within the bounds.
    pub fn contains(&self, count: u64) -> bool {
        self.lower <= count && count <= self.upper
    }

    /// Returns `upper - lower`.
    pub fn width(&self) -> u64 {
        self.upper - self.lower
    }
}

impl From<CountAndError> for Bounds {
    fn from(entry: CountAndError) -> Self {
        Bounds {
            lower: entry.lower(),
            upper: entry.upper(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_approximation_modes() {
        assert_eq!("lower".parse::<Approximation>().unwrap(), Approximation::Lower);
        assert_eq!("Upper".parse::<Approximation>().unwrap(), Approximation::Upper);
        assert_eq!("MEDIAN".parse::<Approximation>().unwrap(), Approximation::Median);

        let err = "foobar".parse::<Approximation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedApproximation);
        assert!(err.to_string().contains("approx: foobar"));
    }

    #[test]
    fn parse_threshold() {
        assert_eq!("eps".parse::<Threshold>().unwrap(), Threshold::Epsilon);
        assert_eq!("0.25".parse::<Threshold>().unwrap(), Threshold::Relative(0.25));
        assert_eq!("1".parse::<Threshold>().unwrap(), Threshold::Absolute(1.0));
        assert_eq!(Threshold::from(None), Threshold::Epsilon);

        let err = "lots".parse::<Threshold>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(std::error::Error::source(&err).is_some());
        assert!("NaN".parse::<Threshold>().is_err());
    }

    #[test]
    fn bounds_from_entry() {
        let bounds = Bounds::from(CountAndError { count: 5, error: 2 });
        assert_eq!(bounds, Bounds { lower: 5, upper: 7 });
        assert_eq!(bounds.width(), 2);
        assert!(bounds.contains(6));
        assert!(!bounds.contains(8));
    }
}
