//! # Values with standard errors and first-order propagation
//!
//! This module provides the numeric layer shared by the geometry and the physical
//! models: a value may be **plain** (exact) or **uncertain** (nominal ± one standard
//! deviation), and every function of the pipeline accepts both.
//!
//! ## Public API
//!
//! - [`UncertainValue`] – nominal value and symmetric standard error (σ ≥ 0).
//! - [`Number`] – `Plain(f64) | Uncertain(UncertainValue)`, with `+ - × neg cos powf`
//!   overloaded. Operators treat their operands as **independent** (correlation-free
//!   combination).
//! - [`propagate`] / [`wrap`] – lift an arbitrary plain function `f(&[f64])` to
//!   `Number` arguments. The output is `Plain` when every argument is plain; otherwise
//!   it is `Uncertain` with
//!
//!   ```text
//!   σ_f = sqrt( Σᵢ (∂f/∂xᵢ · σᵢ)² )
//!   ```
//!
//!   where the partials are two-sided finite differences at the nominal point. Because
//!   the whole function is differentiated at once, an input used several times inside
//!   `f` is correctly treated as a single variable.
//!
//! ## Zero error
//!
//! An `Uncertain` value with σ = 0 behaves as an exact constant: it is never
//! differentiated, never sampled, and contributes nothing to the output error. It still
//! marks the output as `Uncertain`, so the return type only depends on the argument
//! kinds.
//!
//! ## Example
//!
//! ```rust
//! use alphadipole::uncertain::{propagate, Number};
//!
//! let amplitude = Number::uncertain(0.97e-5, 0.21e-5).unwrap();
//! let theta = Number::from(1.0259);
//! let monopole = Number::uncertain(-0.178e-5, 0.084e-5).unwrap();
//!
//! let analytic = amplitude * theta.cos() + monopole;
//! let wrapped = propagate(
//!     |x| Ok(x[0] * x[1].cos() + x[2]),
//!     &[amplitude, theta, monopole],
//! )
//! .unwrap();
//! assert!((analytic.std_dev() - wrapped.std_dev()).abs() < 1e-12);
//! ```
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::{alpha_errors::AlphaError, constants::STEP_SIZE};

/// A nominal value with a one-standard-deviation symmetric uncertainty.
///
/// The constructors only accept a finite nominal value and a finite σ ≥ 0. Arithmetic
/// on [`Number`] does not re-check its result, so an overflowing expression can still
/// carry an infinite nominal value; [`propagate`] and `compare` reject those.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertainValue {
    nominal: f64,
    std_dev: f64,
}

impl UncertainValue {
    /// Create a new uncertain value.
    ///
    /// Arguments
    /// ---------
    /// * `nominal`: central value, must be finite
    /// * `std_dev`: standard error, must be finite and non-negative
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` on NaN, infinite, or negative inputs
    pub fn new(nominal: f64, std_dev: f64) -> Result<Self, AlphaError> {
        if !nominal.is_finite() {
            return Err(AlphaError::validation(format!(
                "nominal value must be finite, got {nominal}"
            )));
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(AlphaError::validation(format!(
                "standard error must be finite and non-negative, got {std_dev}"
            )));
        }
        Ok(UncertainValue { nominal, std_dev })
    }

    /// An exact value (σ = 0).
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` if `nominal` is NaN or infinite
    pub fn exact(nominal: f64) -> Result<Self, AlphaError> {
        UncertainValue::new(nominal, 0.0)
    }

    /// Literal constructor for constants known to satisfy the invariants.
    pub(crate) const fn from_parts(nominal: f64, std_dev: f64) -> Self {
        UncertainValue { nominal, std_dev }
    }

    /// Create a value from asymmetric errors `+plus / -minus`, using their average as
    /// the symmetric standard error.
    pub fn from_asymmetric(nominal: f64, plus: f64, minus: f64) -> Result<Self, AlphaError> {
        if !plus.is_finite() || !minus.is_finite() || plus < 0.0 || minus < 0.0 {
            return Err(AlphaError::validation(format!(
                "asymmetric errors must be finite and non-negative, got +{plus}/-{minus}"
            )));
        }
        UncertainValue::new(nominal, 0.5 * (plus + minus))
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn is_exact(&self) -> bool {
        self.std_dev == 0.0
    }

    /// σ / |nominal|, infinite for a zero nominal value.
    pub fn relative_error(&self) -> f64 {
        if self.nominal == 0.0 {
            f64::INFINITY
        } else {
            self.std_dev / self.nominal.abs()
        }
    }
}

impl fmt::Display for UncertainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*e}+/-{:.*e}", p, self.nominal, p, self.std_dev),
            None => write!(f, "{:e}+/-{:e}", self.nominal, self.std_dev),
        }
    }
}

/// A plain number or an uncertain one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Plain(f64),
    Uncertain(UncertainValue),
}

impl Number {
    /// Shorthand for `Number::Uncertain(UncertainValue::new(nominal, std_dev)?)`.
    pub fn uncertain(nominal: f64, std_dev: f64) -> Result<Self, AlphaError> {
        UncertainValue::new(nominal, std_dev).map(Number::Uncertain)
    }

    pub fn nominal(&self) -> f64 {
        match self {
            Number::Plain(v) => *v,
            Number::Uncertain(u) => u.nominal,
        }
    }

    /// Standard error, zero for plain numbers.
    pub fn std_dev(&self) -> f64 {
        match self {
            Number::Plain(_) => 0.0,
            Number::Uncertain(u) => u.std_dev,
        }
    }

    pub fn is_uncertain(&self) -> bool {
        matches!(self, Number::Uncertain(_))
    }

    /// Check that the nominal value is finite.
    pub(crate) fn validate(&self, name: &str) -> Result<(), AlphaError> {
        if self.nominal().is_finite() {
            Ok(())
        } else {
            Err(AlphaError::validation(format!(
                "{name} must be finite, got {}",
                self.nominal()
            )))
        }
    }

    /// Apply a one-argument function with known derivative.
    fn unary(self, value: f64, derivative: f64) -> Number {
        match self {
            Number::Plain(_) => Number::Plain(value),
            Number::Uncertain(u) => Number::Uncertain(UncertainValue {
                nominal: value,
                std_dev: (derivative * u.std_dev).abs(),
            }),
        }
    }

    /// Combine two independent operands given the partial derivatives of the result.
    fn binary(self, other: Number, value: f64, d_self: f64, d_other: f64) -> Number {
        if !self.is_uncertain() && !other.is_uncertain() {
            return Number::Plain(value);
        }
        let a = if self.std_dev() == 0.0 {
            0.0
        } else {
            d_self * self.std_dev()
        };
        let b = if other.std_dev() == 0.0 {
            0.0
        } else {
            d_other * other.std_dev()
        };
        Number::Uncertain(UncertainValue {
            nominal: value,
            std_dev: a.hypot(b),
        })
    }

    pub fn cos(self) -> Number {
        let x = self.nominal();
        self.unary(x.cos(), -x.sin())
    }

    pub fn sin(self) -> Number {
        let x = self.nominal();
        self.unary(x.sin(), x.cos())
    }

    /// `self ^ exponent` with both sides possibly uncertain.
    ///
    /// ∂/∂base = β·x^(β−1) and ∂/∂β = x^β·ln(x). The logarithm requires a positive
    /// base whenever the exponent is uncertain.
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::ValidationError)` for a non-positive base with an uncertain
    ///   exponent, or when the result is not finite (e.g. negative base, fractional
    ///   exponent)
    pub fn powf(self, exponent: Number) -> Result<Number, AlphaError> {
        let x = self.nominal();
        let beta = exponent.nominal();

        if exponent.std_dev() > 0.0 && x <= 0.0 {
            return Err(AlphaError::validation(format!(
                "derivative of x^beta with respect to beta needs ln(x), invalid for x = {x}"
            )));
        }

        let value = x.powf(beta);
        if !value.is_finite() {
            return Err(AlphaError::validation(format!(
                "{x}^{beta} is not a finite real number"
            )));
        }

        let d_base = if self.std_dev() > 0.0 {
            beta * x.powf(beta - 1.0)
        } else {
            0.0
        };
        let d_exponent = if exponent.std_dev() > 0.0 {
            value * x.ln()
        } else {
            0.0
        };
        if !d_base.is_finite() {
            return Err(AlphaError::validation(format!(
                "derivative of x^beta is not finite at x = {x}, beta = {beta}"
            )));
        }

        Ok(self.binary(exponent, value, d_base, d_exponent))
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Plain(0.0)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Plain(v)
    }
}

impl From<UncertainValue> for Number {
    fn from(u: UncertainValue) -> Self {
        Number::Uncertain(u)
    }
}

impl TryFrom<Number> for UncertainValue {
    type Error = AlphaError;

    fn try_from(n: Number) -> Result<Self, Self::Error> {
        match n {
            Number::Plain(v) => UncertainValue::exact(v),
            Number::Uncertain(u) => UncertainValue::new(u.nominal, u.std_dev),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Plain(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$e}"),
                None => write!(f, "{v:e}"),
            },
            Number::Uncertain(u) => fmt::Display::fmt(u, f),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        self.binary(rhs, self.nominal() + rhs.nominal(), 1.0, 1.0)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self.binary(rhs, self.nominal() - rhs.nominal(), 1.0, -1.0)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        let (a, b) = (self.nominal(), rhs.nominal());
        self.binary(rhs, a * b, b, a)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        self.unary(-self.nominal(), -1.0)
    }
}

impl Add<f64> for Number {
    type Output = Number;

    fn add(self, rhs: f64) -> Number {
        self + Number::Plain(rhs)
    }
}

impl Mul<f64> for Number {
    type Output = Number;

    fn mul(self, rhs: f64) -> Number {
        self * Number::Plain(rhs)
    }
}

impl Mul<Number> for f64 {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        Number::Plain(self) * rhs
    }
}

/// Evaluate `f` on `Number` arguments with first-order error propagation.
///
/// Arguments
/// ---------
/// * `f`: plain function of the nominal values, in the same order as `args`
/// * `args`: plain or uncertain arguments
///
/// Return
/// ------
/// * `Ok(Number::Plain)` if every argument is plain
/// * `Ok(Number::Uncertain)` otherwise, with σ from two-sided finite differences taken
///   only along arguments that carry a non-zero error
/// * `Err(AlphaError::ValidationError)` if an argument, the nominal result, or a partial
///   derivative is not finite; errors returned by `f` are forwarded unchanged
///
/// The step along argument `xᵢ` is `√ε·|xᵢ|`, or `√ε` when `xᵢ = 0`.
pub fn propagate<F>(f: F, args: &[Number]) -> Result<Number, AlphaError>
where
    F: Fn(&[f64]) -> Result<f64, AlphaError>,
{
    for (i, arg) in args.iter().enumerate() {
        arg.validate(&format!("argument {i}"))?;
    }

    let mut point: Vec<f64> = args.iter().map(Number::nominal).collect();
    let nominal = f(&point)?;
    if !nominal.is_finite() {
        return Err(AlphaError::validation(format!(
            "function value is not finite at {point:?}"
        )));
    }

    if !args.iter().any(Number::is_uncertain) {
        return Ok(Number::Plain(nominal));
    }

    let mut variance = 0.0;
    for (i, arg) in args.iter().enumerate() {
        let sigma = arg.std_dev();
        if sigma == 0.0 {
            continue;
        }

        let x = point[i];
        let h = if x == 0.0 {
            STEP_SIZE
        } else {
            STEP_SIZE * x.abs()
        };
        let (x_up, x_down) = (x + h, x - h);

        point[i] = x_up;
        let up = f(&point)?;
        point[i] = x_down;
        let down = f(&point)?;
        point[i] = x;

        let derivative = (up - down) / (x_up - x_down);
        if !derivative.is_finite() {
            return Err(AlphaError::validation(format!(
                "partial derivative with respect to argument {i} is not finite"
            )));
        }
        variance += (derivative * sigma).powi(2);
    }

    Ok(Number::Uncertain(UncertainValue {
        nominal,
        std_dev: variance.sqrt(),
    }))
}

/// Lift a plain function into one accepting and returning [`Number`]s.
///
/// See [`propagate`] for the semantics of the returned closure.
pub fn wrap<F>(f: F) -> impl Fn(&[Number]) -> Result<Number, AlphaError>
where
    F: Fn(&[f64]) -> Result<f64, AlphaError>,
{
    move |args: &[Number]| propagate(&f, args)
}

#[cfg(test)]
mod test_uncertain {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_invalid_errors() {
        assert!(UncertainValue::new(1.0, -0.1).is_err());
        assert!(UncertainValue::new(1.0, f64::NAN).is_err());
        assert!(UncertainValue::new(f64::INFINITY, 0.1).is_err());
        assert!(UncertainValue::new(1.0, 0.0).is_ok());
    }

    #[test]
    fn test_asymmetric_average() {
        let a = UncertainValue::from_asymmetric(0.97e-5, 0.22e-5, 0.20e-5).unwrap();
        assert_relative_eq!(a.std_dev(), 0.21e-5, max_relative = 1e-12);
        assert!(UncertainValue::from_asymmetric(1.0, -0.1, 0.1).is_err());
    }

    #[test]
    fn test_operators() {
        let a = Number::uncertain(2.0, 0.3).unwrap();
        let b = Number::uncertain(5.0, 0.4).unwrap();

        let sum = a + b;
        assert_relative_eq!(sum.nominal(), 7.0);
        assert_relative_eq!(sum.std_dev(), 0.5, epsilon = 1e-15);

        let diff = a - b;
        assert_relative_eq!(diff.nominal(), -3.0);
        assert_relative_eq!(diff.std_dev(), 0.5, epsilon = 1e-15);

        let prod = a * b;
        assert_relative_eq!(prod.nominal(), 10.0);
        assert_relative_eq!(prod.std_dev(), (5.0_f64 * 0.3).hypot(2.0 * 0.4));

        let neg = -a;
        assert_relative_eq!(neg.nominal(), -2.0);
        assert_relative_eq!(neg.std_dev(), 0.3);

        let c = Number::uncertain(1.0, 0.1).unwrap().cos();
        assert_relative_eq!(c.nominal(), 1.0_f64.cos());
        assert_relative_eq!(c.std_dev(), 1.0_f64.sin() * 0.1);
    }

    #[test]
    fn test_plain_stays_plain() {
        let a = Number::from(2.0);
        let b = Number::from(3.0);
        assert_eq!(a * b + 1.0, Number::Plain(7.0));
        assert_eq!(a.cos(), Number::Plain(2.0_f64.cos()));
        assert_eq!(a.powf(b).unwrap(), Number::Plain(8.0));
    }

    #[test]
    fn test_powf_exponent_derivative() {
        let z = Number::from(1.6919);
        let beta = Number::uncertain(0.46, 0.49).unwrap();
        let p = z.powf(beta).unwrap();
        let expected = 1.6919_f64.powf(0.46);
        assert_relative_eq!(p.nominal(), expected);
        assert_relative_eq!(p.std_dev(), expected * 1.6919_f64.ln() * 0.49);

        assert!(matches!(
            Number::from(0.0).powf(beta),
            Err(AlphaError::ValidationError(_))
        ));
        assert!(matches!(
            Number::from(-1.0).powf(Number::from(0.5)),
            Err(AlphaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_propagate_linear_is_exact_quadrature() {
        let args = [
            Number::uncertain(1.0, 0.1).unwrap(),
            Number::uncertain(-4.0, 0.2).unwrap(),
            Number::from(10.0),
        ];
        let out = propagate(|x| Ok(3.0 * x[0] - 2.0 * x[1] + x[2]), &args).unwrap();
        assert_relative_eq!(out.nominal(), 21.0);
        assert_relative_eq!(out.std_dev(), (0.3_f64).hypot(0.4), max_relative = 1e-6);
    }

    #[test]
    fn test_propagate_matches_operators() {
        let amplitude = Number::uncertain(0.97e-5, 0.21e-5).unwrap();
        let theta = Number::uncertain(1.0259, 0.05).unwrap();
        let monopole = Number::uncertain(-0.178e-5, 0.084e-5).unwrap();

        let by_ops = amplitude * theta.cos() + monopole;
        let by_wrap = wrap(|x: &[f64]| Ok(x[0] * x[1].cos() + x[2]))(&[
            amplitude, theta, monopole,
        ])
        .unwrap();

        assert_relative_eq!(by_ops.nominal(), by_wrap.nominal());
        assert_relative_eq!(by_ops.std_dev(), by_wrap.std_dev(), max_relative = 1e-6);
    }

    #[test]
    fn test_propagate_shared_variable() {
        // x - x is exactly zero with zero error when differentiated as one function
        let x = Number::uncertain(3.0, 0.5).unwrap();
        let out = propagate(|v| Ok(v[0] - v[0]), &[x]).unwrap();
        assert_eq!(out.nominal(), 0.0);
        assert_eq!(out.std_dev(), 0.0);
    }

    #[test]
    fn test_propagate_zero_error_is_exact() {
        let f = |x: &[f64]| Ok(x[0].sin() * x[1]);
        let plain = propagate(f, &[Number::from(0.3), Number::from(2.0)]).unwrap();
        let degenerate = propagate(
            f,
            &[
                Number::Uncertain(UncertainValue::exact(0.3).unwrap()),
                Number::from(2.0),
            ],
        )
        .unwrap();

        assert!(matches!(plain, Number::Plain(_)));
        assert!(matches!(degenerate, Number::Uncertain(_)));
        assert_eq!(plain.nominal(), degenerate.nominal());
        assert_eq!(degenerate.std_dev(), 0.0);
    }

    #[test]
    fn test_propagate_rejects_non_finite() {
        let err = propagate(|x| Ok(x[0].ln()), &[Number::uncertain(-1.0, 0.1).unwrap()]);
        assert!(matches!(err, Err(AlphaError::ValidationError(_))));

        let err = propagate(|x| Ok(x[0]), &[Number::Plain(f64::NAN)]);
        assert!(matches!(err, Err(AlphaError::ValidationError(_))));
    }

    #[test]
    fn test_display() {
        let u = UncertainValue::new(3.2474e-6, 1.3749e-6).unwrap();
        assert_eq!(format!("{u:.2}"), "3.25e-6+/-1.37e-6");
        assert_eq!(format!("{:.1}", Number::Plain(1500.0)), "1.5e3");
    }
}
