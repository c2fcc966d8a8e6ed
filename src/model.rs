//! # Dipole models of Δα/α
//!
//! The spatial models fitted by King et al. (2012) to the VLT + Keck many-multiplet
//! sample. With θ the angle between a sight line and the dipole pole:
//!
//! | Variant | Prediction | Paper |
//! |---------|------------|-------|
//! | [`DipoleModel::DipoleOnly`] | `A·cos θ` | §5.3 |
//! | [`DipoleModel::DipoleMonopole`] | `A·cos θ + m` | eq. 15 |
//! | [`DipoleModel::ZDipoleMonopole`] | `A·z^β·cos θ + m` | eq. 18 |
//! | [`DipoleModel::RDipoleMonopole`] | `A·r·cos θ + m` | eq. 19 |
//! | [`DipoleModel::RDipoleOnly`] | `A·r·cos θ` | eq. 20 |
//!
//! `z` is the absorber redshift and `r` its look-back distance in Glyr. For the redshift
//! model `A` is a prefactor, for the distance models an amplitude per Glyr.
//!
//! ## Evaluation
//!
//! A model and its [`ModelParameters`] form a [`ModelEvaluation`], which implements the
//! [`UncertainModel`] trait shared by every estimator of this crate:
//!
//! - [`UncertainModel::propagate`]: first-order analytic propagation,
//! - [`crate::monte_carlo::monte_carlo_estimate`]: Gaussian sampling,
//! - [`crate::error_box::error_box_estimate`]: extremes over the ±1σ grid.
//!
//! ```rust
//! use alphadipole::model::{DipoleModel, ModelParameters};
//! use alphadipole::uncertain::Number;
//!
//! let params = ModelParameters::builder()
//!     .amplitude(Number::uncertain(0.97e-5, 0.21e-5).unwrap())
//!     .theta(1.025_947_945_5)
//!     .monopole(Number::uncertain(-0.178e-5, 0.084e-5).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let prediction = DipoleModel::DipoleMonopole.evaluate(&params).unwrap();
//! assert!((prediction.nominal() - 3.2474e-6).abs() < 1e-9);
//! ```
use std::fmt;
use std::str::FromStr;

use crate::{
    alpha_errors::AlphaError,
    sky_position::{wrapped_sky_position, UncertainSkyPosition},
    uncertain::{propagate, Number, UncertainValue},
};

/// The spatial model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DipoleModel {
    DipoleOnly,
    DipoleMonopole,
    ZDipoleMonopole,
    RDipoleMonopole,
    RDipoleOnly,
}

impl DipoleModel {
    pub const ALL: [DipoleModel; 5] = [
        DipoleModel::DipoleOnly,
        DipoleModel::DipoleMonopole,
        DipoleModel::ZDipoleMonopole,
        DipoleModel::RDipoleMonopole,
        DipoleModel::RDipoleOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DipoleModel::DipoleOnly => "dipole_only",
            DipoleModel::DipoleMonopole => "dipole_monopole",
            DipoleModel::ZDipoleMonopole => "z_dipole_monopole",
            DipoleModel::RDipoleMonopole => "r_dipole_monopole",
            DipoleModel::RDipoleOnly => "r_dipole_only",
        }
    }

    pub fn equation(&self) -> &'static str {
        match self {
            DipoleModel::DipoleOnly => "A cos(theta)",
            DipoleModel::DipoleMonopole => "A cos(theta) + m",
            DipoleModel::ZDipoleMonopole => "A z^beta cos(theta) + m",
            DipoleModel::RDipoleMonopole => "A r cos(theta) + m",
            DipoleModel::RDipoleOnly => "A r cos(theta)",
        }
    }

    /// Names of the plain inputs expected by [`DipoleModel::formula`], in order.
    pub fn input_names(&self) -> &'static [&'static str] {
        match self {
            DipoleModel::DipoleOnly => &["amplitude", "theta"],
            DipoleModel::DipoleMonopole => &["amplitude", "theta", "monopole"],
            DipoleModel::ZDipoleMonopole => &["amplitude", "theta", "monopole", "redshift", "beta"],
            DipoleModel::RDipoleMonopole => &["amplitude", "theta", "monopole", "radial_distance"],
            DipoleModel::RDipoleOnly => &["amplitude", "theta", "radial_distance"],
        }
    }

    pub fn uses_monopole(&self) -> bool {
        !matches!(self, DipoleModel::DipoleOnly | DipoleModel::RDipoleOnly)
    }

    pub fn needs_redshift(&self) -> bool {
        matches!(self, DipoleModel::ZDipoleMonopole)
    }

    pub fn needs_radial_distance(&self) -> bool {
        matches!(self, DipoleModel::RDipoleMonopole | DipoleModel::RDipoleOnly)
    }

    /// Evaluate the model on plain inputs laid out as [`DipoleModel::input_names`].
    ///
    /// Arguments
    /// ---------
    /// * `x`: amplitude, theta (radians), then the variant specific inputs
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` on a wrong number of inputs or a negative
    ///   redshift
    pub fn formula(&self, x: &[f64]) -> Result<f64, AlphaError> {
        let expected = self.input_names().len();
        if x.len() != expected {
            return Err(AlphaError::validation(format!(
                "{} expects {expected} inputs, got {}",
                self.name(),
                x.len()
            )));
        }

        let dipole = x[0] * x[1].cos();
        let value = match self {
            DipoleModel::DipoleOnly => dipole,
            DipoleModel::DipoleMonopole => dipole + x[2],
            DipoleModel::ZDipoleMonopole => {
                let (z, beta) = (x[3], x[4]);
                if z < 0.0 {
                    return Err(AlphaError::validation(format!(
                        "redshift must be non-negative, got {z}"
                    )));
                }
                x[0] * z.powf(beta) * x[1].cos() + x[2]
            }
            DipoleModel::RDipoleMonopole => x[0] * x[3] * x[1].cos() + x[2],
            DipoleModel::RDipoleOnly => x[0] * x[2] * x[1].cos(),
        };
        Ok(value)
    }

    /// Evaluate the model with linearized error propagation.
    ///
    /// Returns `Number::Plain` when every parameter is plain.
    pub fn evaluate(&self, params: &ModelParameters) -> Result<Number, AlphaError> {
        ModelEvaluation::new(*self, params.clone())?.propagate()
    }

    /// Evaluate the model at the nominal parameter values.
    pub fn evaluate_plain(&self, params: &ModelParameters) -> Result<f64, AlphaError> {
        let evaluation = ModelEvaluation::new(*self, params.clone())?;
        let nominal: Vec<f64> = evaluation.inputs().iter().map(Number::nominal).collect();
        evaluation.evaluate_plain(&nominal)
    }
}

impl fmt::Display for DipoleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DipoleModel {
    type Err = AlphaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DipoleModel::ALL
            .into_iter()
            .find(|m| m.name() == s.trim())
            .ok_or_else(|| AlphaError::validation(format!("unknown model '{s}'")))
    }
}

/// Inputs of one model evaluation.
///
/// Fields not used by a variant are ignored; a variant missing a field it needs is
/// rejected when the evaluation is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelParameters {
    pub amplitude: Number,
    /// Angle to the dipole pole, radians.
    pub theta: Number,
    pub monopole: Number,
    pub redshift: Option<Number>,
    pub beta: Option<Number>,
    /// Look-back distance, Glyr.
    pub radial_distance: Option<Number>,
}

impl ModelParameters {
    pub fn builder() -> ModelParametersBuilder {
        ModelParametersBuilder::new()
    }
}

/// Builder for [`ModelParameters`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ModelParametersBuilder {
    params: ModelParameters,
}

impl ModelParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amplitude(mut self, v: impl Into<Number>) -> Self {
        self.params.amplitude = v.into();
        self
    }

    pub fn theta(mut self, v: impl Into<Number>) -> Self {
        self.params.theta = v.into();
        self
    }

    pub fn monopole(mut self, v: impl Into<Number>) -> Self {
        self.params.monopole = v.into();
        self
    }

    pub fn redshift(mut self, v: impl Into<Number>) -> Self {
        self.params.redshift = Some(v.into());
        self
    }

    pub fn beta(mut self, v: impl Into<Number>) -> Self {
        self.params.beta = Some(v.into());
        self
    }

    pub fn radial_distance(mut self, v: impl Into<Number>) -> Self {
        self.params.radial_distance = Some(v.into());
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * every nominal value is finite
    /// * `redshift >= 0` and `radial_distance >= 0` when given
    pub fn build(self) -> Result<ModelParameters, AlphaError> {
        let p = &self.params;
        p.amplitude.validate("amplitude")?;
        p.theta.validate("theta")?;
        p.monopole.validate("monopole")?;
        if let Some(beta) = p.beta {
            beta.validate("beta")?;
        }
        for (name, value) in [("redshift", p.redshift), ("radial_distance", p.radial_distance)] {
            if let Some(v) = value {
                v.validate(name)?;
                if v.nominal() < 0.0 {
                    return Err(AlphaError::validation(format!(
                        "{name} must be non-negative, got {}",
                        v.nominal()
                    )));
                }
            }
        }
        Ok(self.params)
    }
}

/// A function of uncertain inputs, evaluated on plain values.
///
/// This is the seam between the models and the estimators: analytic propagation,
/// Monte Carlo sampling and the error box all work from `inputs` and
/// `evaluate_plain`.
pub trait UncertainModel {
    /// Inputs in the order expected by [`UncertainModel::evaluate_plain`].
    fn inputs(&self) -> Vec<Number>;

    /// Labels of the inputs, same order as [`UncertainModel::inputs`].
    fn input_names(&self) -> Vec<&'static str>;

    fn evaluate_plain(&self, x: &[f64]) -> Result<f64, AlphaError>;

    /// First-order propagation of the input errors through the whole function.
    fn propagate(&self) -> Result<Number, AlphaError> {
        propagate(|x| self.evaluate_plain(x), &self.inputs())
    }
}

/// A model variant bound to its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEvaluation {
    model: DipoleModel,
    params: ModelParameters,
}

/// Check the variant specific inputs shared by direct and sight-line evaluations.
pub(crate) fn check_model_inputs(
    model: DipoleModel,
    redshift: Option<Number>,
    beta: Option<Number>,
    radial_distance: Option<Number>,
) -> Result<(), AlphaError> {
    if model.needs_redshift() {
        let z = redshift.ok_or_else(|| {
            AlphaError::validation(format!("{model} needs a redshift"))
        })?;
        let beta =
            beta.ok_or_else(|| AlphaError::validation(format!("{model} needs a beta exponent")))?;
        if z.nominal() < 0.0 {
            return Err(AlphaError::validation(format!(
                "redshift must be non-negative, got {}",
                z.nominal()
            )));
        }
        if beta.std_dev() > 0.0 && z.nominal() <= 0.0 {
            return Err(AlphaError::validation(format!(
                "derivative of z^beta with respect to beta needs ln(z), invalid for z = {}",
                z.nominal()
            )));
        }
    }
    if model.needs_radial_distance() {
        let r = radial_distance.ok_or_else(|| {
            AlphaError::validation(format!("{model} needs a radial distance"))
        })?;
        if r.nominal() < 0.0 {
            return Err(AlphaError::validation(format!(
                "radial_distance must be non-negative, got {}",
                r.nominal()
            )));
        }
    }
    Ok(())
}

impl ModelEvaluation {
    /// Bind a model to its parameters.
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` if the variant needs a redshift, beta or
    ///   radial distance that is missing, or if `z ≤ 0` while beta is uncertain
    pub fn new(model: DipoleModel, params: ModelParameters) -> Result<Self, AlphaError> {
        check_model_inputs(model, params.redshift, params.beta, params.radial_distance)?;
        Ok(ModelEvaluation { model, params })
    }

    pub fn model(&self) -> DipoleModel {
        self.model
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }
}

impl UncertainModel for ModelEvaluation {
    fn inputs(&self) -> Vec<Number> {
        let p = &self.params;
        let mut inputs = vec![p.amplitude, p.theta];
        if self.model.uses_monopole() {
            inputs.push(p.monopole);
        }
        if self.model.needs_redshift() {
            inputs.extend(p.redshift);
            inputs.extend(p.beta);
        }
        if self.model.needs_radial_distance() {
            inputs.extend(p.radial_distance);
        }
        inputs
    }

    fn input_names(&self) -> Vec<&'static str> {
        self.model.input_names().to_vec()
    }

    fn evaluate_plain(&self, x: &[f64]) -> Result<f64, AlphaError> {
        self.model.formula(x)
    }
}

/// One published fit: the model variant, the dipole pole and the fitted amplitudes.
///
/// The pole is given as right ascension in hours and declination in degrees, each with
/// its 1σ error. Asymmetric published errors are averaged.
#[derive(Debug, Clone, PartialEq)]
pub struct DipoleFit {
    pub model: DipoleModel,
    /// Right ascension of the pole, hours.
    pub ra: Number,
    /// Declination of the pole, degrees.
    pub dec: Number,
    /// Dipole amplitude (prefactor for the redshift model, per Glyr for the distance
    /// models).
    pub amplitude: Number,
    pub monopole: Number,
    pub beta: Option<Number>,
}

const fn uv(nominal: f64, std_dev: f64) -> Number {
    Number::Uncertain(UncertainValue::from_parts(nominal, std_dev))
}

impl DipoleFit {
    /// Dipole without monopole, King et al. (2012) §5.3.
    pub fn king2012_dipole() -> Self {
        DipoleFit {
            model: DipoleModel::DipoleOnly,
            ra: uv(17.4, 0.9),
            dec: uv(-58.0, 9.0),
            // +0.22 / -0.20
            amplitude: uv(1.02e-5, 0.21e-5),
            monopole: Number::Plain(0.0),
            beta: None,
        }
    }

    /// Dipole plus monopole, eq. 15.
    pub fn king2012_dipole_monopole() -> Self {
        DipoleFit {
            model: DipoleModel::DipoleMonopole,
            ra: uv(17.3, 1.0),
            dec: uv(-61.0, 10.0),
            // +0.22 / -0.20
            amplitude: uv(0.97e-5, 0.21e-5),
            monopole: uv(-0.178e-5, 0.084e-5),
            beta: None,
        }
    }

    /// Redshift dependent dipole plus monopole, eq. 18.
    pub fn king2012_z_dipole_monopole() -> Self {
        DipoleFit {
            model: DipoleModel::ZDipoleMonopole,
            ra: uv(17.5, 1.0),
            dec: uv(-62.0, 10.0),
            // +0.28 / -0.26
            amplitude: uv(0.81e-5, 0.27e-5),
            monopole: uv(-0.184e-5, 0.085e-5),
            beta: Some(uv(0.46, 0.49)),
        }
    }

    /// Distance dependent dipole plus monopole, eq. 19. Amplitude per Glyr.
    pub fn king2012_r_dipole_monopole() -> Self {
        DipoleFit {
            model: DipoleModel::RDipoleMonopole,
            ra: uv(17.5, 1.0),
            dec: uv(-62.0, 10.0),
            amplitude: uv(1.1e-6, 0.2e-6),
            monopole: uv(-0.187e-5, 0.084e-5),
            beta: None,
        }
    }

    /// All published fits, in the order of the paper.
    pub fn king2012_all() -> Vec<Self> {
        vec![
            Self::king2012_dipole(),
            Self::king2012_dipole_monopole(),
            Self::king2012_z_dipole_monopole(),
            Self::king2012_r_dipole_monopole(),
        ]
    }

    /// The pole position, with its errors converted to radians.
    pub fn dipole_position(&self) -> Result<UncertainSkyPosition, AlphaError> {
        wrapped_sky_position(self.ra, self.dec)
    }

    /// Copy of the fit with every parameter error set to zero.
    pub fn nominal(&self) -> Self {
        let plain = |n: Number| Number::Plain(n.nominal());
        DipoleFit {
            model: self.model,
            ra: plain(self.ra),
            dec: plain(self.dec),
            amplitude: plain(self.amplitude),
            monopole: plain(self.monopole),
            beta: self.beta.map(plain),
        }
    }
}

impl fmt::Display for DipoleFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.model, self.model.equation())?;
        writeln!(
            f,
            "  pole      = {:.1}h ± {:.1}h, {:.1}° ± {:.1}°",
            self.ra.nominal(),
            self.ra.std_dev(),
            self.dec.nominal(),
            self.dec.std_dev()
        )?;
        writeln!(f, "  amplitude = {:.3}", self.amplitude)?;
        if self.model.uses_monopole() {
            writeln!(f, "  monopole  = {:.3}", self.monopole)?;
        }
        if let Some(beta) = self.beta {
            writeln!(f, "  beta      = {:.2} ± {:.2}", beta.nominal(), beta.std_dev())?;
        }
        Ok(())
    }
}
