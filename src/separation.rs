//! # Great-circle separation
//!
//! The separation θ between two directions with unit vectors `u₁`, `u₂` is
//!
//! ```text
//! θ = atan2(|u₁ × u₂|, u₁ · u₂)
//! ```
//!
//! which is well conditioned at every angle (unlike `acos(u₁ · u₂)` near 0 and π) and
//! agrees with the haversine formula. Swapping the arguments only flips the sign of the
//! cross product, so the result is exactly symmetric, and identical positions give
//! exactly zero.
//!
//! Everywhere in this crate θ is taken as `separation(target, dipole)`.
use crate::{
    alpha_errors::AlphaError,
    constants::Radian,
    sky_position::{unit_vector, SkyPosition, UncertainSkyPosition},
    uncertain::{propagate, Number},
};

/// Great-circle angle between two positions, in `[0, π]` radians.
pub fn angular_separation(a: &SkyPosition, b: &SkyPosition) -> Radian {
    separation_radians(a.ra(), a.dec(), b.ra(), b.dec())
}

/// Separation between raw equatorial angles (radians).
///
/// No range check is done, so this is usable on sampled or perturbed coordinates; a
/// declination past a pole is read as the position folded back across it.
pub fn separation_radians(ra1: Radian, dec1: Radian, ra2: Radian, dec2: Radian) -> Radian {
    let u1 = unit_vector(ra1, dec1);
    let u2 = unit_vector(ra2, dec2);
    u1.cross(&u2).norm().atan2(u1.dot(&u2))
}

/// Separation with the coordinate errors of both positions propagated into θ.
///
/// Arguments
/// ---------
/// * `target`: position of the sight line
/// * `dipole`: position of the dipole pole
///
/// Return
/// ------
/// * `Number::Plain` when neither position carries an error, `Number::Uncertain`
///   otherwise (radians)
///
/// At θ = 0 the separation is not differentiable and the linearized error collapses to
/// zero; use the Monte Carlo estimator there.
pub fn uncertain_separation(
    target: &UncertainSkyPosition,
    dipole: &UncertainSkyPosition,
) -> Result<Number, AlphaError> {
    propagate(
        |x| Ok(separation_radians(x[0], x[1], x[2], x[3])),
        &[target.ra(), target.dec(), dipole.ra(), dipole.dec()],
    )
}
