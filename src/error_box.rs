//! # Error box
//!
//! The crudest of the three estimators: evaluate the model at every combination of
//! `{x − σ, x, x + σ}` over its uncertain inputs and read the error off the extremes,
//!
//! ```text
//! upper = max − nominal        lower = nominal − min        error = (upper + lower) / 2
//! ```
//!
//! For `n` uncertain inputs this costs `3ⁿ` evaluations. Unlike the linearized error it
//! does not assume the inputs are independent, so it overestimates the spread; it is a
//! quick bracket rather than a standard error.
use std::fmt;

use itertools::Itertools;

use crate::{alpha_errors::AlphaError, model::UncertainModel};

/// Extremes of a model over the ±1σ grid of its inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBox {
    pub nominal: f64,
    pub min: f64,
    pub max: f64,
    pub n_evaluations: usize,
}

impl ErrorBox {
    /// `max − nominal`
    pub fn upper(&self) -> f64 {
        self.max - self.nominal
    }

    /// `nominal − min`
    pub fn lower(&self) -> f64 {
        self.nominal - self.min
    }

    /// Average of the upper and lower excursions.
    pub fn error(&self) -> f64 {
        0.5 * (self.upper() + self.lower())
    }
}

impl fmt::Display for ErrorBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4e} +{:.4e} / -{:.4e} (error {:.4e}, {} evaluations)",
            self.nominal,
            self.upper(),
            self.lower(),
            self.error(),
            self.n_evaluations
        )
    }
}

/// Evaluate `model` on the `{x − σ, x, x + σ}` grid of its uncertain inputs.
///
/// Inputs without error keep their nominal value. With no uncertain input the box
/// collapses to the nominal value.
///
/// Return
/// ------
/// * `Err(AlphaError)` if any grid point fails to evaluate or gives a non-finite value
pub fn error_box_estimate<M>(model: &M) -> Result<ErrorBox, AlphaError>
where
    M: UncertainModel + ?Sized,
{
    let inputs = model.inputs();
    let nominal_point: Vec<f64> = inputs.iter().map(|input| input.nominal()).collect();
    let nominal = model.evaluate_plain(&nominal_point)?;

    let axes: Vec<Vec<f64>> = inputs
        .iter()
        .map(|input| {
            let (x, sigma) = (input.nominal(), input.std_dev());
            if sigma > 0.0 {
                vec![x - sigma, x, x + sigma]
            } else {
                vec![x]
            }
        })
        .collect();

    let mut bounds = ErrorBox {
        nominal,
        min: nominal,
        max: nominal,
        n_evaluations: 1,
    };
    if axes.is_empty() {
        return Ok(bounds);
    }

    bounds.n_evaluations = 0;
    for point in axes.into_iter().multi_cartesian_product() {
        let value = model.evaluate_plain(&point)?;
        if !value.is_finite() {
            return Err(AlphaError::validation(format!(
                "model value is not finite at {point:?}"
            )));
        }
        bounds.min = bounds.min.min(value);
        bounds.max = bounds.max.max(value);
        bounds.n_evaluations += 1;
    }

    tracing::debug!(
        n_evaluations = bounds.n_evaluations,
        min = bounds.min,
        max = bounds.max,
        "error box"
    );

    Ok(bounds)
}
