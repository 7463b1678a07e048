use std::thread;

use crossbeam::channel::bounded;
use fxhash::FxHashMap;
use ordered_float::OrderedFloat;
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    calculator::{pick_outcome_angle, sector_from_outcome},
    params::Params,
    wheel::Wheel,
};

/// Upper-tail chi-square critical values at alpha = 0.05, indexed by degrees
/// of freedom 1..=7 (sector counts 2..=8).
const CHI_SQUARE_CRIT_05: [f64; 7] = [3.841, 5.991, 7.815, 9.488, 11.070, 12.592, 14.067];

// Per-worker seed diffusion (SplitMix64 increment), so adjacent worker ids
// don't start SmallRng from adjacent states.
const SEED_MIX: u64 = 0x9E3779B97F4A7C15;

/// Multi-threaded spin harness: runs many spins through the calculator and
/// aggregates where they land.
pub struct Simulation {
    wheel: Wheel,
    /// Forced landing sector, or a negative sentinel for free spins.
    forced: i32,
    /// Base seed; every run with the same seed and thread count reproduces
    /// the same histogram.
    seed: u64,
    params: Params,
}

/// Aggregated results of one simulation run.
#[derive(Debug)]
pub struct SimulationReport {
    pub trials: usize,
    /// Landing histogram keyed by decoded sector index. Keyed by a map, not
    /// a Vec, since an out-of-range forced index decodes to an out-of-range
    /// key.
    pub counts: FxHashMap<i32, u64>,
    /// Chi-square statistic vs. the uniform expectation; only meaningful for
    /// free spins.
    pub chi_square: Option<f64>,
    /// Whether the free-spin histogram passes the 0.05 uniformity check.
    pub uniform: Option<bool>,
    /// Sector whose count strays furthest from expectation (free spins).
    pub worst_sector: Option<i32>,
    /// For forced runs, whether every trial landed on the forced sector.
    pub forced_hit: Option<bool>,
}

impl Simulation {
    pub fn new(wheel: Wheel, forced: i32, seed: u64, params: Params) -> Simulation {
        Simulation {
            wheel,
            forced,
            seed,
            params,
        }
    }

    /// Runs the configured number of trials across worker threads and
    /// aggregates the landing histogram.
    pub fn run(&self) -> SimulationReport {
        let n_threads = self.params.n_threads.max(1);
        let trials = self.params.trials;
        let span = self.wheel.span();
        let forced = self.forced;
        let print_progress = self.params.print_progress;

        log::debug!(
            "Simulating {} spins over {} threads (span {:.2}, forced {})",
            trials,
            n_threads,
            span,
            forced
        );

        // Channel to receive per-worker histograms
        let (res_tx, res_rx) = bounded::<FxHashMap<i32, u64>>(n_threads);

        let mut thrs = Vec::new();
        for worker in 0..n_threads {
            // Split trials evenly; first worker absorbs the remainder
            let mut share = trials / n_threads;
            if worker == 0 {
                share += trials % n_threads;
            }
            let seed = self.seed ^ (worker as u64).wrapping_mul(SEED_MIX);
            let res_tx = res_tx.clone();

            let thr_handle = thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut counts: FxHashMap<i32, u64> = FxHashMap::default();
                for t in 0..share {
                    let outcome = pick_outcome_angle(&mut rng, forced, span);
                    let landed = sector_from_outcome(outcome, span);
                    *counts.entry(landed).or_insert(0) += 1;

                    if print_progress > 0 && t % print_progress == 0 {
                        log::trace!("worker {}: {}/{} spins", worker, t, share);
                    }
                }
                res_tx.send(counts).unwrap();
            });
            thrs.push(thr_handle);
        }
        drop(res_tx);

        // Merge worker histograms
        let mut counts: FxHashMap<i32, u64> = FxHashMap::default();
        for _ in 0..n_threads {
            for (landed, n) in res_rx.recv().unwrap() {
                *counts.entry(landed).or_insert(0) += n;
            }
        }
        for thr in thrs {
            thr.join().unwrap();
        }

        self.build_report(counts)
    }

    fn build_report(&self, counts: FxHashMap<i32, u64>) -> SimulationReport {
        let trials = self.params.trials;
        let n = self.wheel.n_sectors();

        if self.forced >= 0 {
            let hits = counts.get(&self.forced).copied().unwrap_or(0);
            return SimulationReport {
                trials,
                counts,
                chi_square: None,
                uniform: None,
                worst_sector: None,
                forced_hit: Some(hits as usize == trials),
            };
        }

        let stat = chi_square(&counts, n, trials);
        let uniform = stat <= CHI_SQUARE_CRIT_05[n - 2];
        let expected = trials as f64 / n as f64;
        let worst = (0..n as i32)
            .max_by_key(|i| {
                let observed = counts.get(i).copied().unwrap_or(0) as f64;
                OrderedFloat((observed - expected).abs())
            })
            .unwrap();

        SimulationReport {
            trials,
            counts,
            chi_square: Some(stat),
            uniform: Some(uniform),
            worst_sector: Some(worst),
            forced_hit: None,
        }
    }
}

/// Chi-square statistic of a landing histogram against the uniform
/// expectation over `n` sectors.
fn chi_square(counts: &FxHashMap<i32, u64>, n: usize, trials: usize) -> f64 {
    let expected = trials as f64 / n as f64;
    (0..n as i32)
        .map(|i| {
            let observed = counts.get(&i).copied().unwrap_or(0) as f64;
            let d = observed - expected;
            d * d / expected
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_PARAMS;

    fn test_params(trials: usize) -> Params {
        Params {
            trials,
            n_threads: 2,
            ..*DEFAULT_PARAMS
        }
    }

    #[test]
    fn chi_square_is_zero_on_a_perfect_histogram() {
        let mut counts = FxHashMap::default();
        for i in 0..4 {
            counts.insert(i, 250);
        }
        assert_eq!(chi_square(&counts, 4, 1000), 0.0);
    }

    #[test]
    fn chi_square_blows_up_on_a_loaded_wheel() {
        let mut counts = FxHashMap::default();
        counts.insert(0, 700);
        counts.insert(1, 100);
        counts.insert(2, 100);
        counts.insert(3, 100);
        // Expected 250 each; statistic is way past the df=3 critical value
        assert!(chi_square(&counts, 4, 1000) > CHI_SQUARE_CRIT_05[2]);
    }

    #[test]
    fn free_spins_land_roughly_uniform() {
        for n in 2..=8 {
            let wheel = Wheel::with_sectors(n).unwrap();
            let sim = Simulation::new(wheel, -1, 42, test_params(10_000));
            let report = sim.run();
            let stat = report.chi_square.unwrap();
            // Loose bound: far above the df<=7 critical values, but any real
            // bias at 10k trials lands in the hundreds
            assert!(stat < 30.0, "n={} chi_square={}", n, stat);
            assert_eq!(report.counts.values().sum::<u64>(), 10_000);
        }
    }

    #[test]
    fn forced_spins_always_land_on_the_forced_sector() {
        let wheel = Wheel::with_sectors(6).unwrap();
        let sim = Simulation::new(wheel, 3, 7, test_params(1000));
        let report = sim.run();
        assert_eq!(report.forced_hit, Some(true));
        assert_eq!(report.counts.get(&3).copied(), Some(1000));
        assert_eq!(report.counts.len(), 1);
    }

    #[test]
    fn out_of_range_forced_index_shows_up_out_of_range() {
        let wheel = Wheel::with_sectors(4).unwrap();
        let sim = Simulation::new(wheel, 10, 7, test_params(100));
        let report = sim.run();
        assert_eq!(report.counts.get(&10).copied(), Some(100));
        assert_eq!(report.forced_hit, Some(true));
    }

    #[test]
    fn same_seed_reproduces_the_same_histogram() {
        let wheel = Wheel::with_sectors(5).unwrap();
        let a = Simulation::new(wheel.clone(), -1, 12345, test_params(2000)).run();
        let b = Simulation::new(wheel, -1, 12345, test_params(2000)).run();
        assert_eq!(a.counts, b.counts);
    }
}
