//! # Prediction vs measurement
//!
//! Decides whether a predicted Δα/α is consistent with a measurement carrying a
//! statistical and a systematic error. The statistical errors of prediction and
//! measurement add in quadrature; the systematic error is treated as a band that shifts
//! the difference both ways:
//!
//! ```text
//! total  = sqrt(σ_pred² + σ_stat²)
//! best   = |pred − measured| − σ_sys
//! worst  = |pred − measured| + σ_sys
//! ```
//!
//! If `best < 0` the two agree within the systematic error. Otherwise the report gives
//! `best / total` and `worst / total` as the range of sigma distances.
use std::fmt;

use crate::{alpha_errors::AlphaError, prediction::Measurement, uncertain::UncertainValue};

/// Outcome of [`compare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementComparison {
    pub predicted: UncertainValue,
    pub measured: f64,
    pub stat_error: f64,
    pub sys_error: f64,
    /// `sqrt(σ_pred² + σ_stat²)`
    pub total_statistical_error: f64,
    pub best_difference: f64,
    pub worst_difference: f64,
    pub within_systematic_error: bool,
    /// `best_difference / total_statistical_error`, only when outside the systematic band.
    pub best_sigma: Option<f64>,
    /// `worst_difference / total_statistical_error`, only when outside the systematic band.
    pub worst_sigma: Option<f64>,
}

impl MeasurementComparison {
    /// `sqrt(σ_stat² + σ_sys²)`, the total error of the measurement alone.
    pub fn measurement_total_error(&self) -> f64 {
        self.stat_error.hypot(self.sys_error)
    }

    /// Measurement total error and prediction error in quadrature.
    pub fn combined_total_error(&self) -> f64 {
        self.measurement_total_error().hypot(self.predicted.std_dev())
    }
}

fn check_error(name: &str, value: f64) -> Result<(), AlphaError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AlphaError::validation(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Compare a prediction with a measurement.
///
/// Arguments
/// ---------
/// * `predicted`: predicted value and its error
/// * `measured`: measured value
/// * `stat_error`: statistical error of the measurement
/// * `sys_error`: systematic error of the measurement
///
/// Return
/// ------
/// * `Err(AlphaError::ValidationError)` for a non-finite prediction or input, a negative error, or a
///   zero total statistical error when sigma distances are needed
pub fn compare(
    predicted: UncertainValue,
    measured: f64,
    stat_error: f64,
    sys_error: f64,
) -> Result<MeasurementComparison, AlphaError> {
    if !predicted.nominal().is_finite() || !predicted.std_dev().is_finite() {
        return Err(AlphaError::validation(format!(
            "predicted value must be finite, got {} ± {}",
            predicted.nominal(),
            predicted.std_dev()
        )));
    }
    if !measured.is_finite() {
        return Err(AlphaError::validation(format!(
            "measured value must be finite, got {measured}"
        )));
    }
    check_error("statistical error", stat_error)?;
    check_error("systematic error", sys_error)?;

    let total_statistical_error = predicted.std_dev().hypot(stat_error);
    let difference = (predicted.nominal() - measured).abs();
    let best_difference = difference - sys_error;
    let worst_difference = difference + sys_error;
    let within_systematic_error = best_difference < 0.0;

    let (best_sigma, worst_sigma) = if within_systematic_error {
        (None, None)
    } else {
        if total_statistical_error == 0.0 {
            return Err(AlphaError::validation(
                "sigma distance undefined with zero total statistical error",
            ));
        }
        (
            Some(best_difference / total_statistical_error),
            Some(worst_difference / total_statistical_error),
        )
    };

    Ok(MeasurementComparison {
        predicted,
        measured,
        stat_error,
        sys_error,
        total_statistical_error,
        best_difference,
        worst_difference,
        within_systematic_error,
        best_sigma,
        worst_sigma,
    })
}

impl Measurement {
    /// [`compare`] against this measurement.
    pub fn compare(&self, predicted: UncertainValue) -> Result<MeasurementComparison, AlphaError> {
        compare(predicted, self.value, self.stat_error, self.sys_error)
    }
}

impl fmt::Display for MeasurementComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicted da/a: {:.4e}", self.predicted.nominal())?;
        writeln!(f, "Error: {:.4e}", self.predicted.std_dev())?;
        writeln!(f, "Measured da/a: {:.4e}", self.measured)?;
        writeln!(f, "Statistical error: {:.4e}", self.stat_error)?;
        writeln!(f, "Systematic error: {:.4e}", self.sys_error)?;
        writeln!(
            f,
            "Total statistical error (in quad): {:.4e}",
            self.total_statistical_error
        )?;
        match (self.best_sigma, self.worst_sigma) {
            (Some(best), Some(worst)) => {
                writeln!(f, "Best sigmas away: {best:.2}")?;
                writeln!(f, "Worst sigmas away: {worst:.2}")?;
            }
            _ => writeln!(f, "Within systematic error")?,
        }
        writeln!(
            f,
            "Measurement total error: {:.4e}",
            self.measurement_total_error()
        )?;
        write!(f, "Combined total error: {:.4e}", self.combined_total_error())
    }
}

#[cfg(test)]
mod test_comparison {
    use super::*;
    use crate::uncertain::Number;
    use approx::assert_relative_eq;

    #[test]
    fn test_he2217_comparison() {
        let predicted = UncertainValue::new(3.247_397_8e-6, 1.374_86e-6).unwrap();
        let c = compare(predicted, -1.0904e-6, 2.35e-6, 1.6549e-6).unwrap();

        assert_relative_eq!(c.total_statistical_error, 2.722_63e-6, max_relative = 1e-5);
        assert_relative_eq!(c.best_difference, 2.682_9e-6, max_relative = 1e-4);
        assert_relative_eq!(c.worst_difference, 5.992_7e-6, max_relative = 1e-4);
        assert!(!c.within_systematic_error);
        assert_relative_eq!(c.best_sigma.unwrap(), 0.9854, epsilon = 1e-3);
        assert_relative_eq!(c.worst_sigma.unwrap(), 2.2011, epsilon = 1e-3);
        assert_relative_eq!(
            c.measurement_total_error(),
            (2.35e-6_f64).hypot(1.6549e-6),
            max_relative = 1e-12
        );

        let report = c.to_string();
        assert!(report.contains("Best sigmas away: 0.99"));
        assert!(report.contains("Worst sigmas away: 2.20"));
    }

    #[test]
    fn test_within_systematic_error() {
        let predicted = UncertainValue::new(1.0e-6, 0.5e-6).unwrap();
        let c = compare(predicted, 0.0, 1.0e-6, 2.0e-6).unwrap();
        assert!(c.within_systematic_error);
        assert_eq!(c.best_sigma, None);
        assert_eq!(c.worst_sigma, None);
        assert!(c.to_string().contains("Within systematic error"));
    }

    #[test]
    fn test_sigma_ordering() {
        let predicted = UncertainValue::new(5.0, 1.0).unwrap();
        let c = compare(predicted, 0.0, 1.0, 0.5).unwrap();
        assert!(c.best_sigma.unwrap() <= c.worst_sigma.unwrap());
        assert!(c.best_difference <= c.worst_difference);
    }

    #[test]
    fn test_invalid_inputs() {
        let predicted = UncertainValue::new(1.0, 0.1).unwrap();
        assert!(compare(predicted, f64::NAN, 0.1, 0.1).is_err());
        assert!(compare(predicted, 0.0, -0.1, 0.1).is_err());
        assert!(compare(predicted, 0.0, 0.1, f64::INFINITY).is_err());

        let exact = UncertainValue::exact(1.0).unwrap();
        assert!(matches!(
            compare(exact, 0.0, 0.0, 0.0),
            Err(AlphaError::ValidationError(_))
        ));
        // inside the band no sigma is needed
        assert!(compare(exact, 0.9, 0.0, 0.5).unwrap().within_systematic_error);
    }

    #[test]
    fn test_non_finite_prediction() {
        assert!(UncertainValue::exact(f64::NAN).is_err());
        assert!(UncertainValue::try_from(Number::Plain(f64::NAN)).is_err());
        assert!(UncertainValue::try_from(Number::Plain(f64::INFINITY)).is_err());

        // arithmetic overflow is caught at the comparison
        let huge = Number::uncertain(1.0e300, 1.0).unwrap();
        let overflowed = huge * huge;
        assert!(overflowed.nominal().is_infinite());
        let Number::Uncertain(predicted) = overflowed else {
            panic!("uncertain operands give an uncertain product");
        };
        assert!(matches!(
            compare(predicted, -1.0904e-6, 2.35e-6, 1.6549e-6),
            Err(AlphaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_measurement_helper() {
        let m = Measurement::new(-1.0904e-6, 2.35e-6, 1.6549e-6);
        let predicted = UncertainValue::new(3.2474e-6, 1.3749e-6).unwrap();
        assert_eq!(
            m.compare(predicted).unwrap(),
            compare(predicted, -1.0904e-6, 2.35e-6, 1.6549e-6).unwrap()
        );
    }
}
