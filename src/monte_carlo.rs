//! # Monte Carlo estimation
//!
//! Independent cross-check of the linearized propagation: every input of an
//! [`UncertainModel`] that carries a non-zero error is drawn from `N(nominal, σ)`, the
//! model is evaluated on the plain draw, and the empirical distribution of the results
//! is summarized by its mean and population standard deviation.
//!
//! Inputs with σ = 0 (plain or exact values) are passed through untouched, never
//! sampled.
//!
//! ## Reproducibility
//!
//! The random generator is injected by the caller. [`MonteCarloParams::rng`] builds a
//! [`StdRng`] from the configured seed, or from OS entropy when no seed is set; two runs
//! with the same seed and parameters give identical summaries.
//!
//! ```rust,no_run
//! use alphadipole::model::DipoleFit;
//! use alphadipole::monte_carlo::{monte_carlo_estimate, MonteCarloParams};
//! use alphadipole::prediction::{SightLine, SightLinePrediction};
//!
//! let target = SightLine::he2217_2818().unwrap();
//! let fit = DipoleFit::king2012_dipole_monopole();
//! let model = SightLinePrediction::new(&fit, &target).unwrap();
//!
//! let params = MonteCarloParams::builder().n_draws(50_000).seed(1).build().unwrap();
//! let mut rng = params.rng();
//! let summary = monte_carlo_estimate(&model, &params, &mut rng).unwrap();
//! println!("{summary}");
//! ```
use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{
    alpha_errors::AlphaError,
    constants::DEFAULT_MC_DRAWS,
    model::UncertainModel,
    uncertain::UncertainValue,
};

/// Settings of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloParams {
    /// Number of draws, at least 2.
    pub n_draws: usize,
    /// Seed of the generator returned by [`MonteCarloParams::rng`]; `None` uses OS
    /// entropy.
    pub seed: Option<u64>,
}

impl MonteCarloParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MonteCarloParamsBuilder {
        MonteCarloParamsBuilder::new()
    }

    /// A generator for this run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        MonteCarloParams {
            n_draws: DEFAULT_MC_DRAWS,
            seed: None,
        }
    }
}

/// Builder for [`MonteCarloParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloParamsBuilder {
    params: MonteCarloParams,
}

impl MonteCarloParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_draws(mut self, v: usize) -> Self {
        self.params.n_draws = v;
        self
    }

    pub fn seed(mut self, v: u64) -> Self {
        self.params.seed = Some(v);
        self
    }

    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` if `n_draws < 2`: a standard deviation needs
    ///   at least two draws
    pub fn build(self) -> Result<MonteCarloParams, AlphaError> {
        if self.params.n_draws < 2 {
            return Err(AlphaError::validation(format!(
                "n_draws must be at least 2, got {}",
                self.params.n_draws
            )));
        }
        Ok(self.params)
    }
}

/// Empirical summary of the Monte Carlo draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloSummary {
    pub mean: f64,
    /// Population standard deviation (divides by `n_draws`).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub n_draws: usize,
}

impl MonteCarloSummary {
    /// Summarize a set of model values.
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` for an empty set or a non-finite value
    pub fn from_samples(samples: &[f64]) -> Result<Self, AlphaError> {
        if samples.is_empty() {
            return Err(AlphaError::validation("no Monte Carlo samples to summarize"));
        }
        if let Some(bad) = samples.iter().find(|v| !v.is_finite()) {
            return Err(AlphaError::validation(format!(
                "non-finite Monte Carlo sample {bad}"
            )));
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(MonteCarloSummary {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            n_draws: samples.len(),
        })
    }

    /// The summary as `mean ± std_dev`.
    pub fn to_uncertain(&self) -> Result<UncertainValue, AlphaError> {
        UncertainValue::new(self.mean, self.std_dev)
    }
}

impl fmt::Display for MonteCarloSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monte Carlo da/a: {:.4e}", self.mean)?;
        writeln!(f, "Monte Carlo error: {:.4e}", self.std_dev)?;
        write!(
            f,
            "Range over {} draws: [{:.4e}, {:.4e}]",
            self.n_draws, self.min, self.max
        )
    }
}

/// Lazy sequence of model values at random draws of the inputs.
///
/// Samplers are built once; each call to `next` draws one value per uncertain input
/// and evaluates the model. The iterator is infinite, callers `take` what they need.
///
/// Return
/// ------
/// * `Err(AlphaError::NoiseInjectionError)` if a sampler cannot be built
/// * each item is the model value at one draw, or the evaluation error
pub fn draws_iter<'a, M, R>(
    model: &'a M,
    rng: &'a mut R,
) -> Result<impl Iterator<Item = Result<f64, AlphaError>> + 'a, AlphaError>
where
    M: UncertainModel + ?Sized + 'a,
    R: Rng + ?Sized + 'a,
{
    let inputs = model.inputs();
    let samplers = inputs
        .iter()
        .map(|input| {
            if input.std_dev() > 0.0 {
                Normal::new(input.nominal(), input.std_dev()).map(Some)
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut point: Vec<f64> = inputs.iter().map(|input| input.nominal()).collect();

    Ok(std::iter::from_fn(move || {
        for (slot, sampler) in point.iter_mut().zip(&samplers) {
            if let Some(normal) = sampler {
                *slot = normal.sample(&mut *rng);
            }
        }
        Some(model.evaluate_plain(&point))
    }))
}

/// Estimate the distribution of the model output by Monte Carlo.
///
/// Arguments
/// ---------
/// * `model`: function of uncertain inputs
/// * `params`: number of draws
/// * `rng`: random generator, e.g. [`MonteCarloParams::rng`]
///
/// Return
/// ------
/// * `Ok(MonteCarloSummary)` over `params.n_draws` draws
/// * `Err(AlphaError)` if a draw fails to evaluate (e.g. a sampled redshift below
///   zero) or a sampler cannot be built
pub fn monte_carlo_estimate<M, R>(
    model: &M,
    params: &MonteCarloParams,
    rng: &mut R,
) -> Result<MonteCarloSummary, AlphaError>
where
    M: UncertainModel + ?Sized,
    R: Rng + ?Sized,
{
    if params.n_draws < 2 {
        return Err(AlphaError::validation(format!(
            "n_draws must be at least 2, got {}",
            params.n_draws
        )));
    }

    let sampled: Vec<&str> = model
        .input_names()
        .into_iter()
        .zip(model.inputs())
        .filter(|(_, input)| input.std_dev() > 0.0)
        .map(|(name, _)| name)
        .collect();

    let samples = draws_iter(model, rng)?
        .take(params.n_draws)
        .collect::<Result<Vec<f64>, _>>()?;
    let summary = MonteCarloSummary::from_samples(&samples)?;

    tracing::debug!(
        n_draws = params.n_draws,
        sampled = ?sampled,
        mean = summary.mean,
        std_dev = summary.std_dev,
        "monte carlo estimate"
    );

    Ok(summary)
}
