//! Tenor labels ("1W", "18M", "10Y").
//!
//! A [`Tenor`] is a maturity label attached to a curve point. Labels are
//! ordered by their approximate year fraction, which drives the neighbour
//! logic of the market-data simulator and the display order of risk.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::TenorError;

/// Unit of a tenor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenorUnit {
    /// Calendar days (`D`)
    Day,
    /// Weeks (`W`)
    Week,
    /// Months (`M`)
    Month,
    /// Years (`Y`)
    Year,
}

impl TenorUnit {
    /// Returns the single-letter code.
    pub fn code(&self) -> char {
        match self {
            TenorUnit::Day => 'D',
            TenorUnit::Week => 'W',
            TenorUnit::Month => 'M',
            TenorUnit::Year => 'Y',
        }
    }

    fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'D' => Some(TenorUnit::Day),
            'W' => Some(TenorUnit::Week),
            'M' => Some(TenorUnit::Month),
            'Y' => Some(TenorUnit::Year),
            _ => None,
        }
    }
}

/// A maturity label such as `3M` or `2Y`.
///
/// # Examples
///
/// ```
/// use rates_core::types::Tenor;
///
/// let t: Tenor = "18M".parse().unwrap();
/// assert_eq!(t.to_string(), "18M");
/// assert!((t.years() - 1.5).abs() < 1e-12);
///
/// assert!("5Q".parse::<Tenor>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    count: u32,
    unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from its parts.
    pub fn new(count: u32, unit: TenorUnit) -> Self {
        Self { count, unit }
    }

    /// Number of units.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Unit of the tenor.
    #[inline]
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Approximate year fraction used for ordering.
    ///
    /// W = n/52, M = n/12, Y = n, D = n/365.
    pub fn years(&self) -> f64 {
        let n = f64::from(self.count);
        match self.unit {
            TenorUnit::Day => n / 365.0,
            TenorUnit::Week => n / 52.0,
            TenorUnit::Month => n / 12.0,
            TenorUnit::Year => n,
        }
    }

    /// Compares two tenors by year fraction.
    pub fn cmp_by_years(&self, other: &Tenor) -> Ordering {
        self.years().total_cmp(&other.years())
    }
}

impl FromStr for Tenor {
    type Err = TenorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let unknown = || TenorError::UnknownUnit {
            label: s.to_string(),
        };

        let code = label.chars().last().ok_or_else(unknown)?;
        let unit = TenorUnit::from_code(code).ok_or_else(unknown)?;
        let digits = &label[..label.len() - code.len_utf8()];
        let count = digits
            .parse::<u32>()
            .map_err(|_| TenorError::InvalidCount {
                label: s.to_string(),
            })?;

        Ok(Tenor { count, unit })
    }
}

impl TryFrom<String> for Tenor {
    type Error = TenorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.code())
    }
}

/// Sorts labels by tenor year fraction; unparsable labels go last,
/// alphabetically.
///
/// ```
/// use rates_core::types::tenor::compare_labels;
///
/// let mut labels = vec!["2Y", "ZZ", "1W", "6M", "AA"];
/// labels.sort_by(|a, b| compare_labels(a, b));
/// assert_eq!(labels, vec!["1W", "6M", "2Y", "AA", "ZZ"]);
/// ```
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<Tenor>(), b.parse::<Tenor>()) {
        (Ok(ta), Ok(tb)) => ta.cmp_by_years(&tb),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
