//! # Sight-line predictions
//!
//! Ties the geometry and the models together: for a [`SightLine`] (a quasar absorber
//! with its position, redshift and look-back distance) and a [`DipoleFit`], compute θ
//! and the predicted Δα/α.
//!
//! Two propagation paths are available:
//!
//! * [`predict`] differentiates **one** function of every uncertain input (pole RA/DEC,
//!   target RA/DEC, amplitude, monopole, beta, redshift, distance). A quantity used in
//!   several places is treated as one variable.
//! * [`DipoleFit::model_parameters`] first propagates the coordinate errors into an
//!   uncertain θ and then feeds θ to the model. To first order both paths agree,
//!   since θ is the only place the coordinates enter.
//!
//! [`SightLinePrediction`] implements [`UncertainModel`] over the joint inputs, so the
//! Monte Carlo and error-box estimators sample the coordinates directly.
use std::fmt;

use crate::{
    alpha_errors::AlphaError,
    constants::{GLyr, RADEG},
    model::{check_model_inputs, DipoleFit, ModelParameters, UncertainModel},
    separation::{separation_radians, uncertain_separation},
    sky_position::{sky_position, UncertainSkyPosition},
    uncertain::Number,
};

/// A measured Δα/α with its statistical and systematic errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub stat_error: f64,
    pub sys_error: f64,
}

impl Measurement {
    pub fn new(value: f64, stat_error: f64, sys_error: f64) -> Self {
        Measurement {
            value,
            stat_error,
            sys_error,
        }
    }
}

/// The direction to an observed absorber and what is known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct SightLine {
    pub name: String,
    pub position: UncertainSkyPosition,
    pub redshift: Option<Number>,
    /// Look-back distance, Glyr.
    pub radial_distance: Option<Number>,
    pub measurement: Option<Measurement>,
}

impl SightLine {
    pub fn new(name: impl Into<String>, position: impl Into<UncertainSkyPosition>) -> Self {
        SightLine {
            name: name.into(),
            position: position.into(),
            redshift: None,
            radial_distance: None,
            measurement: None,
        }
    }

    pub fn with_redshift(mut self, z: impl Into<Number>) -> Self {
        self.redshift = Some(z.into());
        self
    }

    pub fn with_radial_distance(mut self, r: impl Into<Number>) -> Self {
        self.radial_distance = Some(r.into());
        self
    }

    pub fn with_measurement(mut self, measurement: Measurement) -> Self {
        self.measurement = Some(measurement);
        self
    }

    /// HE 2217−2818, the absorber of Molaro et al. (2013) used as the worked example.
    pub fn he2217_2818() -> Result<Self, AlphaError> {
        let position = sky_position("22h20m06.757", "-28d03m23.34")?;
        let distance: GLyr = 9.757;
        Ok(SightLine::new("HE2217-2818", position)
            .with_redshift(1.6919)
            .with_radial_distance(distance)
            .with_measurement(Measurement::new(-1.0904e-6, 2.35e-6, 1.6549e-6)))
    }
}

/// A published fit evaluated along one sight line.
///
/// Inputs are laid out as `[target ra, target dec, pole ra, pole dec]` (radians)
/// followed by the model inputs without θ.
#[derive(Debug, Clone)]
pub struct SightLinePrediction<'a> {
    fit: &'a DipoleFit,
    target: &'a SightLine,
    pole: UncertainSkyPosition,
}

const N_COORDINATES: usize = 4;

impl<'a> SightLinePrediction<'a> {
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` if the fit needs a redshift, beta or
    ///   distance the sight line (or the fit) does not provide
    /// * `Err(AlphaError::RangeError)` if the pole declination is out of range
    pub fn new(fit: &'a DipoleFit, target: &'a SightLine) -> Result<Self, AlphaError> {
        check_model_inputs(fit.model, target.redshift, fit.beta, target.radial_distance)?;
        Ok(SightLinePrediction {
            fit,
            target,
            pole: fit.dipole_position()?,
        })
    }

    pub fn fit(&self) -> &DipoleFit {
        self.fit
    }

    pub fn target(&self) -> &SightLine {
        self.target
    }

    pub fn pole(&self) -> &UncertainSkyPosition {
        &self.pole
    }
}

impl UncertainModel for SightLinePrediction<'_> {
    fn inputs(&self) -> Vec<Number> {
        let model = self.fit.model;
        let mut inputs = vec![
            self.target.position.ra(),
            self.target.position.dec(),
            self.pole.ra(),
            self.pole.dec(),
            self.fit.amplitude,
        ];
        if model.uses_monopole() {
            inputs.push(self.fit.monopole);
        }
        if model.needs_redshift() {
            inputs.extend(self.target.redshift);
            inputs.extend(self.fit.beta);
        }
        if model.needs_radial_distance() {
            inputs.extend(self.target.radial_distance);
        }
        inputs
    }

    fn input_names(&self) -> Vec<&'static str> {
        let mut names = vec!["target_ra", "target_dec", "dipole_ra", "dipole_dec"];
        names.extend(
            self.fit
                .model
                .input_names()
                .iter()
                .filter(|name| **name != "theta"),
        );
        names
    }

    fn evaluate_plain(&self, x: &[f64]) -> Result<f64, AlphaError> {
        let n_model = self.fit.model.input_names().len();
        if x.len() != N_COORDINATES + n_model - 1 {
            return Err(AlphaError::validation(format!(
                "sight-line prediction expects {} inputs, got {}",
                N_COORDINATES + n_model - 1,
                x.len()
            )));
        }

        let theta = separation_radians(x[0], x[1], x[2], x[3]);

        // amplitude, theta, then the rest of the model inputs
        let mut model_inputs = [0.0; 6];
        model_inputs[0] = x[N_COORDINATES];
        model_inputs[1] = theta;
        model_inputs[2..n_model].copy_from_slice(&x[N_COORDINATES + 1..]);
        self.fit.model.formula(&model_inputs[..n_model])
    }
}

/// θ and Δα/α predicted along a sight line, with propagated errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Separation between target and pole, radians.
    pub theta: Number,
    pub value: Number,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Separation angle between dipole and target: {:.3} degrees or {:.5} radians.",
            self.theta.nominal() / RADEG,
            self.theta.nominal()
        )?;
        write!(f, "Predicted da/a: {:.4}", self.value)
    }
}

/// Predict Δα/α along `target` under `fit`, propagating every input error jointly.
///
/// Arguments
/// ---------
/// * `fit`: published fit, pole and amplitudes possibly uncertain
/// * `target`: sight line, position possibly uncertain
///
/// Return
/// ------
/// * `Ok(Prediction)` with θ from [`uncertain_separation`] and Δα/α from the joint
///   propagation
/// * `Err(AlphaError)` if an input the model needs is missing or invalid
pub fn predict(fit: &DipoleFit, target: &SightLine) -> Result<Prediction, AlphaError> {
    let evaluation = SightLinePrediction::new(fit, target)?;
    let theta = uncertain_separation(&target.position, evaluation.pole())?;
    let value = evaluation.propagate()?;

    tracing::debug!(
        sight_line = %target.name,
        model = %fit.model,
        theta = theta.nominal(),
        value = %value,
        "sight-line prediction"
    );

    Ok(Prediction { theta, value })
}

impl DipoleFit {
    /// Model parameters for `target`, with θ propagated from the coordinate errors.
    ///
    /// The result can be fed to [`crate::model::DipoleModel::evaluate`]; this is the
    /// two-stage equivalent of [`predict`].
    pub fn model_parameters(&self, target: &SightLine) -> Result<ModelParameters, AlphaError> {
        let theta = uncertain_separation(&target.position, &self.dipole_position()?)?;
        let mut builder = ModelParameters::builder()
            .amplitude(self.amplitude)
            .theta(theta)
            .monopole(self.monopole);
        if let Some(z) = target.redshift {
            builder = builder.redshift(z);
        }
        if let Some(beta) = self.beta {
            builder = builder.beta(beta);
        }
        if let Some(r) = target.radial_distance {
            builder = builder.radial_distance(r);
        }
        builder.build()
    }
}

#[cfg(test)]
mod test_prediction {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dipole_monopole_full_pipeline() {
        let target = SightLine::he2217_2818().unwrap();
        let fit = DipoleFit::king2012_dipole_monopole();

        let prediction = predict(&fit, &target).unwrap();
        assert_relative_eq!(prediction.theta.nominal(), 1.025_947_945_5, epsilon = 1e-9);
        assert_relative_eq!(prediction.value.nominal(), 3.247_397_8e-6, max_relative = 1e-6);
        assert_relative_eq!(prediction.value.std_dev(), 1.732_19e-6, max_relative = 1e-3);
    }

    #[test]
    fn test_two_stage_agrees_with_joint() {
        let target = SightLine::he2217_2818().unwrap();
        let fit = DipoleFit::king2012_dipole_monopole();

        let joint = predict(&fit, &target).unwrap().value;
        let params = fit.model_parameters(&target).unwrap();
        let staged = fit.model.evaluate(&params).unwrap();

        assert_relative_eq!(joint.nominal(), staged.nominal(), max_relative = 1e-12);
        assert_relative_eq!(joint.std_dev(), staged.std_dev(), max_relative = 1e-4);
    }

    #[test]
    fn test_other_fits() {
        let target = SightLine::he2217_2818().unwrap();

        let z = predict(&DipoleFit::king2012_z_dipole_monopole(), &target).unwrap();
        assert_relative_eq!(z.theta.nominal() / RADEG, 57.338, epsilon = 1e-3);
        assert_relative_eq!(z.value.nominal(), 3.7276e-6, max_relative = 1e-3);

        let r = predict(&DipoleFit::king2012_r_dipole_monopole(), &target).unwrap();
        assert_relative_eq!(r.value.nominal(), 3.9222e-6, max_relative = 1e-3);

        let d = predict(&DipoleFit::king2012_dipole(), &target).unwrap();
        assert_relative_eq!(d.value.nominal(), 5.3810e-6, max_relative = 1e-3);
    }

    #[test]
    fn test_nominal_fit_is_plain() {
        let target = SightLine::he2217_2818().unwrap();
        let fit = DipoleFit::king2012_dipole_monopole().nominal();
        let prediction = predict(&fit, &target).unwrap();
        assert!(matches!(prediction.value, Number::Plain(_)));
        assert!(matches!(prediction.theta, Number::Plain(_)));
    }

    #[test]
    fn test_missing_redshift() {
        let target = SightLine::new("no z", sky_position(1.0, 2.0).unwrap());
        assert!(matches!(
            predict(&DipoleFit::king2012_z_dipole_monopole(), &target),
            Err(AlphaError::ValidationError(_))
        ));
        assert!(predict(&DipoleFit::king2012_dipole_monopole(), &target).is_ok());
    }

    #[test]
    fn test_negative_radial_distance() {
        let target = SightLine::he2217_2818().unwrap().with_radial_distance(-9.757);
        let fit = DipoleFit::king2012_r_dipole_monopole();

        let joint = predict(&fit, &target);
        let staged = fit.model_parameters(&target);
        assert!(matches!(joint, Err(AlphaError::ValidationError(_))));
        assert!(matches!(staged, Err(AlphaError::ValidationError(_))));
    }

    #[test]
    fn test_input_layout() {
        let target = SightLine::he2217_2818().unwrap();
        let fit = DipoleFit::king2012_z_dipole_monopole();
        let evaluation = SightLinePrediction::new(&fit, &target).unwrap();
        assert_eq!(
            evaluation.input_names(),
            vec![
                "target_ra",
                "target_dec",
                "dipole_ra",
                "dipole_dec",
                "amplitude",
                "monopole",
                "redshift",
                "beta"
            ]
        );
        assert_eq!(evaluation.inputs().len(), 8);
        assert!(evaluation.evaluate_plain(&[0.0; 3]).is_err());
    }
}
