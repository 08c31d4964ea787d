//! Property tests for the tick simulator.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rates_core::market_data::TermStructure;
use rates_core::types::Tenor;
use rates_market::{neighbor_band, tick, usd_sofr_seed, SimulatorParams, SimulatorState};

fn three_point() -> TermStructure {
    TermStructure::from_labels(&[("1Y", 0.05), ("2Y", 0.06), ("5Y", 0.07)]).unwrap()
}

#[test]
fn test_zero_rho_zero_sigma_leaves_target_unchanged() {
    let mut state = SimulatorState::default();
    let five_y: Tenor = "5Y".parse().unwrap();
    let before = state.current().rate(&five_y).unwrap();

    // Build up a non-zero factor first
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..25 {
        tick(&mut state, &SimulatorParams::default().with_target("1W".parse().unwrap()), &mut rng)
            .unwrap();
    }
    assert_ne!(state.global_factor(), 0.0);

    let params = SimulatorParams::default()
        .with_rho(0.0)
        .with_sigma_bps(0.0)
        .with_target(five_y);
    let moved = tick(&mut state, &params, &mut rng).unwrap();
    assert_eq!(moved.rate, before);
    assert_eq!(state.current().rate(&five_y), Some(before));
}

#[test]
fn test_zero_shock_pulls_out_of_band_target_onto_bound() {
    // 1Y at 5% sits below its band around the 2Y neighbour
    let mut state = SimulatorState::new(three_point());
    let params = SimulatorParams::default()
        .with_rho(0.0)
        .with_sigma_bps(0.0)
        .with_target("1Y".parse().unwrap());
    let mut rng = StdRng::seed_from_u64(1);
    let moved = tick(&mut state, &params, &mut rng).unwrap();

    assert_eq!(moved.previous, 0.05);
    assert_ne!(moved.rate, moved.previous);
    assert!(moved.rate >= moved.band.0 && moved.rate <= moved.band.1);
    assert!((moved.rate - 0.0597).abs() < 1e-12);
}

#[test]
fn test_wide_shocks_never_escape_band() {
    let params = SimulatorParams::default()
        .with_sigma_bps(500.0)
        .with_margin_bps(0.25)
        .with_target("1Y".parse().unwrap());
    for seed in 0..200 {
        let mut state = SimulatorState::new(three_point());
        let mut rng = StdRng::seed_from_u64(seed);
        let moved = tick(&mut state, &params, &mut rng).unwrap();
        assert!(
            moved.rate >= moved.band.0 && moved.rate <= moved.band.1,
            "seed {}: rate {} outside {:?}",
            seed,
            moved.rate,
            moved.band
        );
    }
}

#[test]
fn test_reset_restores_seed_exactly() {
    let mut state = SimulatorState::default();
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..200 {
        tick(&mut state, &SimulatorParams::default(), &mut rng).unwrap();
    }
    assert_ne!(state.current(), &usd_sofr_seed());

    state.reset();
    assert_eq!(state.current(), &usd_sofr_seed());
    assert_eq!(state.global_factor(), 0.0);
}

#[test]
fn test_single_tenor_curve_bounds_around_own_value() {
    let seed = TermStructure::from_labels(&[("5Y", 0.04)]).unwrap();
    let mut state = SimulatorState::new(seed);
    let params = SimulatorParams::default().with_sigma_bps(100.0).with_margin_bps(2.0);
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let prior = state.current().rates()[0];
        let moved = tick(&mut state, &params, &mut rng).unwrap();
        assert_eq!(moved.band, (prior - 0.0002, prior + 0.0002));
        assert!(moved.rate >= moved.band.0 && moved.rate <= moved.band.1);
    }
}

#[test]
fn test_end_tenors_bound_against_one_neighbour() {
    let mut state = SimulatorState::new(three_point());
    let mut rng = StdRng::seed_from_u64(8);
    let big = SimulatorParams::default().with_sigma_bps(500.0).with_margin_bps(1.0);

    let moved = tick(&mut state, &big.clone().with_target("1Y".parse().unwrap()), &mut rng)
        .unwrap();
    let two_y = state.current().rates()[1];
    assert_eq!(moved.band, (two_y - 0.0001, two_y + 0.0001));
    assert!(moved.rate >= moved.band.0 && moved.rate <= moved.band.1);

    let moved = tick(&mut state, &big.with_target("5Y".parse().unwrap()), &mut rng).unwrap();
    let two_y = state.current().rates()[1];
    assert_eq!(moved.band, (two_y - 0.0001, two_y + 0.0001));
    assert!(moved.rate >= moved.band.0 && moved.rate <= moved.band.1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_moved_tenor_inside_band(
        seed in any::<u64>(),
        rho in 0.0f64..=1.0,
        sigma_bps in 0.0f64..50.0,
        kappa in 0.0f64..=1.0,
        margin_bps in 0.0f64..10.0,
        steps in 1usize..60,
    ) {
        let mut state = SimulatorState::default();
        let params = SimulatorParams {
            rho,
            sigma_bps,
            mean_reversion: kappa,
            margin_bps,
            target: None,
        };
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..steps {
            let rates = state.current().rates();
            let moved = tick(&mut state, &params, &mut rng).unwrap();
            let index = state.current().index_of(&moved.tenor).unwrap();
            let (lo, hi) = neighbor_band(&rates, index, margin_bps * 1e-4);
            prop_assert_eq!(moved.band, (lo, hi));
            prop_assert!(moved.rate >= lo && moved.rate <= hi);
        }
    }

    #[test]
    fn prop_only_one_tenor_moves(seed in any::<u64>()) {
        let mut state = SimulatorState::default();
        let before = state.current().rates();
        let mut rng = StdRng::seed_from_u64(seed);
        let moved = tick(&mut state, &SimulatorParams::default(), &mut rng).unwrap();
        let index = state.current().index_of(&moved.tenor).unwrap();
        for (i, (a, b)) in before.iter().zip(state.current().rates()).enumerate() {
            if i != index {
                prop_assert_eq!(*a, b);
            }
        }
    }
}
