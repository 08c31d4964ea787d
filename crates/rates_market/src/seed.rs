//! Default seed curve.

use rates_core::market_data::TermStructure;
use rates_core::types::TenorError;

/// USD SOFR benchmark quotes in percent, 1W to 40Y.
pub const USD_SOFR_PERCENT: [(&str, f64); 31] = [
    ("1W", 5.309),
    ("2W", 5.312),
    ("3W", 5.314),
    ("1M", 5.318),
    ("2M", 5.351),
    ("3M", 5.382),
    ("4M", 5.410),
    ("5M", 5.435),
    ("6M", 5.452),
    ("7M", 5.467),
    ("8M", 5.471),
    ("9M", 5.470),
    ("10M", 5.467),
    ("11M", 5.457),
    ("12M", 5.445),
    ("18M", 5.208),
    ("2Y", 4.990),
    ("3Y", 4.650),
    ("4Y", 4.458),
    ("5Y", 4.352),
    ("6Y", 4.291),
    ("7Y", 4.250),
    ("8Y", 4.224),
    ("9Y", 4.210),
    ("10Y", 4.201),
    ("12Y", 4.198),
    ("15Y", 4.199),
    ("20Y", 4.153),
    ("25Y", 4.047),
    ("30Y", 3.941),
    ("40Y", 3.719),
];

/// The USD SOFR seed curve stored as decimals.
///
/// ```
/// use rates_market::seed::usd_sofr_seed;
///
/// let seed = usd_sofr_seed();
/// assert_eq!(seed.len(), 31);
/// assert_eq!(seed.labels()[0], "1W");
/// assert_eq!(seed.labels()[30], "40Y");
/// ```
pub fn usd_sofr_seed() -> TermStructure {
    // Labels are static and unique, so parsing cannot fail
    match TermStructure::from_percent(&USD_SOFR_PERCENT) {
        Ok(curve) => curve,
        Err(err) => unreachable!("static seed curve is malformed: {err}"),
    }
}

/// Builds a seed curve from percent quotes, e.g. a configured override.
pub fn seed_from_percent(points: &[(&str, f64)]) -> Result<TermStructure, TenorError> {
    TermStructure::from_percent(points)
}
