//! Immutable market snapshots.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::term_structure::TermStructure;

/// Immutable copy of a [`TermStructure`] at one instant.
///
/// Cloning a snapshot shares the underlying curve; nothing can mutate it
/// afterwards, so a baseline snapshot can be handed to concurrent readers.
///
/// ```
/// use rates_core::market_data::{MarketSnapshot, TermStructure};
///
/// let mut live = TermStructure::from_labels(&[("1Y", 0.05)]).unwrap();
/// let baseline = MarketSnapshot::capture(&live);
/// live.set_rate_at(0, 0.051);
/// assert_eq!(baseline.curve().rates(), vec![0.05]);
/// ```
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    curve: Arc<TermStructure>,
    taken_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Copies `curve` and stamps it with the current time.
    pub fn capture(curve: &TermStructure) -> Self {
        Self::at(curve.clone(), Utc::now())
    }

    /// Wraps an owned curve with an explicit timestamp.
    pub fn at(curve: TermStructure, taken_at: DateTime<Utc>) -> Self {
        Self {
            curve: Arc::new(curve),
            taken_at,
        }
    }

    /// The captured curve.
    #[inline]
    pub fn curve(&self) -> &TermStructure {
        &self.curve
    }

    /// Capture time.
    #[inline]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Capture time in epoch milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        self.taken_at.timestamp_millis()
    }
}

impl From<TermStructure> for MarketSnapshot {
    fn from(curve: TermStructure) -> Self {
        Self::at(curve, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_curve() {
        let snap = MarketSnapshot::from(TermStructure::from_labels(&[("1Y", 0.05)]).unwrap());
        let copy = snap.clone();
        assert!(Arc::ptr_eq(&snap.curve, &copy.curve));
        assert_eq!(snap.timestamp_ms(), copy.timestamp_ms());
    }
}
