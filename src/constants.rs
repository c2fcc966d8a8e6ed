//! # Constants and type definitions for alphadipole
//!
//! This module centralizes the **unit conversions**, **numerical tolerances**, and
//! **type aliases** shared by the geometry, propagation and estimation modules.
//!
//! ## Overview
//!
//! - Angle conversions (hours ↔ degrees ↔ radians)
//! - Finite-difference step used by the analytic propagation
//! - Default sizes for the Monte Carlo estimator
//! - Unit-bearing aliases used in public signatures

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Hours → degrees
pub const HOUR_TO_DEG: f64 = 15.0;

// -------------------------------------------------------------------------------------------------
// Numerical settings
// -------------------------------------------------------------------------------------------------

/// Relative step of the two-sided finite differences, √ε of an f64.
pub const STEP_SIZE: f64 = 1.490_116_119_384_765_6e-8;

/// Default number of Monte Carlo draws
pub const DEFAULT_MC_DRAWS: usize = 100_000;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in hours of right ascension
pub type Hour = f64;
/// Distance in billions of light years
pub type GLyr = f64;
