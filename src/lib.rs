//! Predicted Δα/α along quasar sight lines under the King et al. (2012) spatial
//! dipole models, with linearized, Monte Carlo and error-box uncertainty estimates.
pub mod alpha_errors;
pub mod catalog;
pub mod comparison;
pub mod constants;
pub mod conversion;
pub mod error_box;
pub mod model;
pub mod monte_carlo;
pub mod prediction;
pub mod separation;
pub mod sky_position;
pub mod uncertain;
