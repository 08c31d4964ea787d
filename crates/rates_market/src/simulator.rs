//! Correlated, shape-preserving tick simulator.
//!
//! Each tick moves exactly one tenor of the simulated curve:
//!
//! 1. Pick the target tenor (given, else uniformly at random)
//! 2. Advance the persistent AR(1) global factor:
//!    `factor ← (1 − κ)·factor + N(0,1)`
//! 3. Compose the shock `σ·(ρ·factor + sqrt(1 − ρ²)·N(0,1))`, with σ converted
//!    from basis points into the curve's [`RateUnit`](rates_core::market_data::RateUnit)
//! 4. Clip the shocked rate into the band spanned by its neighbours ± margin
//! 5. Round to 1e-6 and store
//!
//! The global factor makes successive moves correlated across tenors and
//! time (parallel-shift-like drift), while the neighbour clip keeps the
//! curve shape plausible.
//!
//! State is an explicit [`SimulatorState`] value. Callers sharing one state
//! must serialise their ticks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rates_core::market_data::{MarketSnapshot, TermStructure};
use rates_core::types::Tenor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimulatorError;
use crate::seed::usd_sofr_seed;

/// Decimal places kept on a stored rate.
const STORE_PRECISION: f64 = 1e6;

/// Parameters of one tick.
///
/// # Example
///
/// ```
/// use rates_market::SimulatorParams;
///
/// let params = SimulatorParams::default().with_rho(0.85).with_sigma_bps(4.0);
/// assert!(params.validate().is_ok());
/// assert!(SimulatorParams::default().with_rho(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorParams {
    /// Weight of the global factor in the shock (ρ ∈ [0, 1])
    pub rho: f64,
    /// Shock size in basis points (σ ≥ 0)
    pub sigma_bps: f64,
    /// AR(1) pull of the global factor towards zero (κ ∈ [0, 1])
    pub mean_reversion: f64,
    /// Slack beyond the neighbour band in basis points (≥ 0)
    pub margin_bps: f64,
    /// Tenor to move; a random tenor when `None`
    pub target: Option<Tenor>,
}

impl Default for SimulatorParams {
    fn default() -> Self {
        Self {
            rho: 0.9,
            sigma_bps: 5.0,
            mean_reversion: 0.02,
            margin_bps: 3.0,
            target: None,
        }
    }
}

impl SimulatorParams {
    /// Set the correlation weight.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Set the shock size in basis points.
    pub fn with_sigma_bps(mut self, sigma_bps: f64) -> Self {
        self.sigma_bps = sigma_bps;
        self
    }

    /// Set the AR(1) mean reversion.
    pub fn with_mean_reversion(mut self, mean_reversion: f64) -> Self {
        self.mean_reversion = mean_reversion;
        self
    }

    /// Set the neighbour-band slack in basis points.
    pub fn with_margin_bps(mut self, margin_bps: f64) -> Self {
        self.margin_bps = margin_bps;
        self
    }

    /// Pin the moved tenor.
    pub fn with_target(mut self, target: Tenor) -> Self {
        self.target = Some(target);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        unit_interval("rho", self.rho)?;
        unit_interval("mean_reversion", self.mean_reversion)?;
        non_negative("sigma_bps", self.sigma_bps)?;
        non_negative("margin_bps", self.margin_bps)?;
        Ok(())
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), SimulatorError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulatorError::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<(), SimulatorError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulatorError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        });
    }
    Ok(())
}

/// Mutable simulator state: the seed, the current curve and the AR(1) factor.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorState {
    seed: TermStructure,
    current: TermStructure,
    global_factor: f64,
}

impl SimulatorState {
    /// Starts a state at `seed` with a zero global factor.
    pub fn new(seed: TermStructure) -> Self {
        Self {
            current: seed.clone(),
            seed,
            global_factor: 0.0,
        }
    }

    /// Curve the state was created from.
    pub fn seed(&self) -> &TermStructure {
        &self.seed
    }

    /// Current simulated curve.
    pub fn current(&self) -> &TermStructure {
        &self.current
    }

    /// Current AR(1) factor.
    pub fn global_factor(&self) -> f64 {
        self.global_factor
    }

    /// Restores the seed curve exactly and zeroes the factor.
    pub fn reset(&mut self) {
        self.current = self.seed.clone();
        self.global_factor = 0.0;
    }

    /// Immutable copy of the current curve.
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot::capture(&self.current)
    }
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new(usd_sofr_seed())
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Moved tenor
    pub tenor: Tenor,
    /// Rate before the move
    pub previous: f64,
    /// Stored rate after the move
    pub rate: f64,
    /// Band the move was clipped into
    pub band: (f64, f64),
}

/// Band a rate at `index` may move within.
///
/// - single point: own value ± margin
/// - first point: right neighbour ± margin
/// - last point: left neighbour ± margin
/// - interior: `[min(left, right) − margin, max(left, right) + margin]`
///
/// ```
/// use rates_market::neighbor_band;
///
/// let rates = [0.05, 0.06, 0.07];
/// let (lo, hi) = neighbor_band(&rates, 1, 0.001);
/// assert!((lo - 0.049).abs() < 1e-12 && (hi - 0.071).abs() < 1e-12);
/// ```
pub fn neighbor_band(rates: &[f64], index: usize, margin: f64) -> (f64, f64) {
    let n = rates.len();
    if n == 1 {
        return (rates[0] - margin, rates[0] + margin);
    }
    if index == 0 {
        let right = rates[1];
        return (right - margin, right + margin);
    }
    if index == n - 1 {
        let left = rates[n - 2];
        return (left - margin, left + margin);
    }
    let (left, right) = (rates[index - 1], rates[index + 1]);
    (left.min(right) - margin, left.max(right) + margin)
}

/// Rounds a clipped rate to the storage grid without leaving `band`.
///
/// The rounded value is clamped into the band shrunk inward to the grid. A
/// band narrower than one grid step keeps the clipped value unrounded.
fn store_in_band(clipped: f64, band: (f64, f64)) -> f64 {
    let lo = (band.0 * STORE_PRECISION).ceil() / STORE_PRECISION;
    let hi = (band.1 * STORE_PRECISION).floor() / STORE_PRECISION;
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return clipped;
    }
    let rounded = ((clipped * STORE_PRECISION).round() / STORE_PRECISION).clamp(lo, hi);
    if rounded < band.0 || rounded > band.1 {
        clipped
    } else {
        rounded
    }
}

/// Advances `state` by one tick.
///
/// All inputs are checked before anything is mutated: an unknown target, an
/// empty curve or invalid parameters leave the state untouched.
///
/// The new rate always lies inside the neighbour band. A target that
/// already sits outside its band is pulled onto the nearest bound even when
/// the shock is zero (`rho = sigma = 0`); only a rate inside its band is
/// left exactly unchanged by a zero shock.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use rates_market::{tick, SimulatorParams, SimulatorState};
///
/// let mut state = SimulatorState::default();
/// let mut rng = StdRng::seed_from_u64(7);
/// let moved = tick(&mut state, &SimulatorParams::default(), &mut rng).unwrap();
/// assert_eq!(state.current().rate(&moved.tenor), Some(moved.rate));
/// ```
pub fn tick<R: Rng + ?Sized>(
    state: &mut SimulatorState,
    params: &SimulatorParams,
    rng: &mut R,
) -> Result<Tick, SimulatorError> {
    params.validate()?;
    let n = state.current.len();
    if n == 0 {
        return Err(SimulatorError::EmptyCurve);
    }

    let index = match &params.target {
        Some(tenor) => state
            .current
            .index_of(tenor)
            .ok_or_else(|| SimulatorError::UnknownTenor {
                label: tenor.to_string(),
            })?,
        None => rng.gen_range(0..n),
    };

    state.global_factor =
        (1.0 - params.mean_reversion) * state.global_factor + rng.sample::<f64, _>(StandardNormal);

    let local: f64 = rng.sample(StandardNormal);
    let bp = state.current.unit().basis_point();
    let sigma = params.sigma_bps * bp;
    let idiosyncratic = (1.0 - params.rho * params.rho).max(0.0).sqrt();
    let shock = sigma * (params.rho * state.global_factor + idiosyncratic * local);

    let rates = state.current.rates();
    let previous = rates[index];
    let band = neighbor_band(&rates, index, params.margin_bps * bp);
    let clipped = (previous + shock).clamp(band.0, band.1);
    // An unmoved rate keeps its stored value bit for bit
    let rate = if clipped == previous {
        previous
    } else {
        store_in_band(clipped, band)
    };

    let tenor = state.current.points()[index].tenor;
    state.current.set_rate_at(index, rate);
    debug!(
        tenor = %tenor,
        previous,
        rate,
        factor = state.global_factor,
        "Simulated tick"
    );

    Ok(Tick {
        tenor,
        previous,
        rate,
        band,
    })
}

/// Simulator bundling a state, default parameters and a seeded RNG.
///
/// # Example
///
/// ```
/// use rates_market::MarketDataSimulator;
///
/// let mut sim = MarketDataSimulator::default().with_rng_seed(42);
/// for _ in 0..10 {
///     sim.tick().unwrap();
/// }
/// sim.reset();
/// assert_eq!(sim.curve(), sim.state().seed());
/// assert_eq!(sim.state().global_factor(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct MarketDataSimulator {
    state: SimulatorState,
    params: SimulatorParams,
    rng: StdRng,
}

impl MarketDataSimulator {
    /// Creates a simulator seeded from entropy.
    pub fn new(seed: TermStructure) -> Self {
        Self {
            state: SimulatorState::new(seed),
            params: SimulatorParams::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes the random stream reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replaces the default tick parameters.
    pub fn with_params(mut self, params: SimulatorParams) -> Self {
        self.params = params;
        self
    }

    /// Current tick parameters.
    pub fn params(&self) -> &SimulatorParams {
        &self.params
    }

    /// Underlying state.
    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    /// Current simulated curve.
    pub fn curve(&self) -> &TermStructure {
        self.state.current()
    }

    /// Advances one tick with the default parameters.
    pub fn tick(&mut self) -> Result<Tick, SimulatorError> {
        tick(&mut self.state, &self.params, &mut self.rng)
    }

    /// Advances one tick on a given tenor.
    pub fn tick_tenor(&mut self, tenor: Tenor) -> Result<Tick, SimulatorError> {
        let params = self.params.clone().with_target(tenor);
        tick(&mut self.state, &params, &mut self.rng)
    }

    /// Advances one tick and returns a copy of the whole updated curve.
    pub fn next_snapshot(&mut self) -> Result<(Tick, MarketSnapshot), SimulatorError> {
        let moved = self.tick()?;
        Ok((moved, self.state.snapshot()))
    }

    /// Restores the seed curve and zeroes the global factor.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Default for MarketDataSimulator {
    fn default() -> Self {
        Self::new(usd_sofr_seed())
    }
}
