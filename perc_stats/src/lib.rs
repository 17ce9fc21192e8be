#![forbid(unsafe_code)]

////////////////////////////////////////////////////////////////////////////////

use log::{debug, info};
use perc::Percolation;
use rand::Rng;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("number of trials must be positive")]
    InvalidTrials,
    #[error(transparent)]
    Model(#[from] perc::Error),
}

////////////////////////////////////////////////////////////////////////////////

/// Source of uniformly random site coordinates.
pub trait SiteSampler {
    /// Draws a uniformly random integer in `[lo, hi)`.
    fn uniform(&mut self, lo: usize, hi: usize) -> usize;
}

/// Adapts any [`rand`] generator into a [`SiteSampler`].
pub struct RngSampler<R>(pub R);

impl<R: Rng> SiteSampler for RngSampler<R> {
    fn uniform(&mut self, lo: usize, hi: usize) -> usize {
        self.0.gen_range(lo..hi)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Summary statistics over the per-trial percolation thresholds.
///
/// With a single trial the Bessel-corrected standard deviation divides by
/// zero; `stddev` and both confidence bounds are `NaN` in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercolationStats {
    mean: f64,
    stddev: f64,
    confidence_lo: f64,
    confidence_hi: f64,
    trials: usize,
}

impl PercolationStats {
    fn from_thresholds(thresholds: &[f64]) -> Self {
        let trials = thresholds.len();
        let mean = thresholds.iter().sum::<f64>() / trials as f64;
        let stddev = (thresholds
            .iter()
            .map(|threshold| (threshold - mean).powi(2))
            .sum::<f64>()
            / (trials - 1) as f64)
            .sqrt();
        let margin = 1.96 * stddev / (trials as f64).sqrt();
        Self {
            mean,
            stddev,
            confidence_lo: mean - margin,
            confidence_hi: mean + margin,
            trials,
        }
    }

    /// Sample mean of the thresholds.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Bessel-corrected sample standard deviation (`NaN` for one trial).
    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    /// Low endpoint of the 95% confidence interval (`NaN` for one trial).
    pub fn confidence_lo(&self) -> f64 {
        self.confidence_lo
    }

    /// High endpoint of the 95% confidence interval (`NaN` for one trial).
    pub fn confidence_hi(&self) -> f64 {
        self.confidence_hi
    }

    /// Number of trials the statistics were computed over.
    pub fn trials(&self) -> usize {
        self.trials
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Runs one experiment: opens uniformly random sites on a fresh n-by-n grid
/// until it percolates, then returns the fraction of sites that were opened.
/// Repeated draws of an already-open site are tolerated. At least one site
/// is always opened, so the fraction lies in `(0, 1]` even on a 1x1 grid,
/// whose sentinels meet before any site opens.
pub fn run_trial<S: SiteSampler>(n: usize, sampler: &mut S) -> Result<f64, Error> {
    let mut model = Percolation::new(n)?;
    loop {
        let row = sampler.uniform(1, n + 1);
        let col = sampler.uniform(1, n + 1);
        model.open(row, col)?;
        if model.percolates() {
            break;
        }
    }
    Ok(model.number_of_open_sites() as f64 / (n * n) as f64)
}

/// Runs `trials` experiments sequentially against the given sampler and
/// aggregates the thresholds. Deterministic when the sampler is.
pub fn run_with<S: SiteSampler>(
    n: usize,
    trials: usize,
    sampler: &mut S,
) -> Result<PercolationStats, Error> {
    validate(n, trials)?;
    let mut thresholds = Vec::with_capacity(trials);
    for trial in 0..trials {
        let threshold = run_trial(n, sampler)?;
        debug!("trial {}/{}: threshold {}", trial + 1, trials, threshold);
        thresholds.push(threshold);
    }
    Ok(PercolationStats::from_thresholds(&thresholds))
}

/// Runs `trials` independent experiments on the rayon thread pool, each with
/// its own thread-local generator, and aggregates the thresholds.
pub fn run(n: usize, trials: usize) -> Result<PercolationStats, Error> {
    validate(n, trials)?;
    info!("estimating percolation threshold: {n}x{n} grid, {trials} trials");
    let thresholds = (0..trials)
        .into_par_iter()
        .map(|_| run_trial(n, &mut RngSampler(rand::thread_rng())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PercolationStats::from_thresholds(&thresholds))
}

fn validate(n: usize, trials: usize) -> Result<(), Error> {
    if n == 0 {
        return Err(perc::Error::InvalidSize.into());
    }
    if trials == 0 {
        return Err(Error::InvalidTrials);
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::*;

    struct Script(VecDeque<usize>);

    impl Script {
        fn new(values: &[usize]) -> Self {
            Self(values.iter().copied().collect())
        }
    }

    impl SiteSampler for Script {
        fn uniform(&mut self, _lo: usize, _hi: usize) -> usize {
            self.0.pop_front().expect("script exhausted")
        }
    }

    #[test]
    fn zero_grid_size_fails_before_any_trial() {
        assert!(matches!(
            run(0, 5),
            Err(Error::Model(perc::Error::InvalidSize))
        ));
    }

    #[test]
    fn zero_trials_fails_before_any_trial() {
        assert!(matches!(run(5, 0), Err(Error::InvalidTrials)));
        let mut sampler = Script::new(&[]);
        assert!(matches!(
            run_with(5, 0, &mut sampler),
            Err(Error::InvalidTrials)
        ));
    }

    #[test]
    fn scripted_trial_stops_at_percolation() {
        // (1, 1) then (2, 1) opens the left column of a 2x2 grid
        let mut sampler = Script::new(&[1, 1, 2, 1]);
        let threshold = run_trial(2, &mut sampler).unwrap();
        assert_eq!(threshold, 0.5);
    }

    #[test]
    fn scripted_trial_tolerates_repeated_sites() {
        let mut sampler = Script::new(&[1, 1, 1, 1, 2, 1]);
        let threshold = run_trial(2, &mut sampler).unwrap();
        assert_eq!(threshold, 0.5);
    }

    #[test]
    fn one_by_one_trial_opens_its_only_site() {
        // the sentinels already meet on a 1x1 grid, but a trial still has
        // to open the single site before declaring percolation
        let mut sampler = Script::new(&[1, 1]);
        let threshold = run_trial(1, &mut sampler).unwrap();
        assert_eq!(threshold, 1.0);
        assert!(threshold > 0.0 && threshold <= 1.0);
    }

    #[test]
    fn one_by_one_run_yields_unit_mean_and_nan_sentinel() {
        let mut sampler = Script::new(&[1, 1]);
        let stats = run_with(1, 1, &mut sampler).unwrap();
        assert_eq!(stats.trials(), 1);
        assert_eq!(stats.mean(), 1.0);
        assert!(stats.stddev().is_nan());
        assert!(stats.confidence_lo().is_nan());
        assert!(stats.confidence_hi().is_nan());
    }

    #[test]
    fn single_trial_statistics_use_nan_sentinel() {
        let mut sampler = Script::new(&[1, 1, 2, 1]);
        let stats = run_with(2, 1, &mut sampler).unwrap();
        assert_eq!(stats.trials(), 1);
        assert_eq!(stats.mean(), 0.5);
        assert!(stats.stddev().is_nan());
        assert!(stats.confidence_lo().is_nan());
        assert!(stats.confidence_hi().is_nan());
    }

    #[test]
    fn statistics_on_known_sample() {
        let stats = PercolationStats::from_thresholds(&[0.4, 0.5, 0.6]);
        assert_eq!(stats.trials(), 3);
        assert!((stats.mean() - 0.5).abs() < 1e-12);
        assert!((stats.stddev() - 0.1).abs() < 1e-12);
        let margin = 1.96 * 0.1 / 3f64.sqrt();
        assert!((stats.confidence_lo() - (0.5 - margin)).abs() < 1e-12);
        assert!((stats.confidence_hi() - (0.5 + margin)).abs() < 1e-12);
    }

    #[test]
    fn parallel_run_produces_plausible_estimate() {
        let stats = run(8, 16).unwrap();
        assert_eq!(stats.trials(), 16);
        assert!(stats.mean() > 0.0 && stats.mean() <= 1.0);
        assert!(stats.stddev().is_finite());
        assert!(stats.confidence_lo() <= stats.mean());
        assert!(stats.confidence_hi() >= stats.mean());
    }
}
