//! # Sky positions
//!
//! A [`SkyPosition`] is one point of the celestial sphere, stored in radians with the
//! right ascension wrapped to `[0, 2π)` and the declination in `[-π/2, π/2]`.
//!
//! ## Input conventions
//!
//! Coordinates are given as a [`Coordinate`]: either a string (see
//! [`crate::conversion`] for the accepted sexagesimal forms) or a number.
//! Following the usual catalog convention, **right ascension is read in hours** and
//! **declination in degrees**:
//!
//! ```rust
//! use alphadipole::sky_position::sky_position;
//!
//! let qso = sky_position("22h20m06.757", "-28d03m23.34").unwrap();
//! let dipole = sky_position(17.3, -61.0).unwrap();
//! assert!((dipole.ra_hours() - 17.3).abs() < 1e-12);
//! # let _ = qso;
//! ```
//!
//! Use [`SkyPosition::from_degrees`] when the right ascension is in decimal degrees.
//!
//! ## Uncertain positions
//!
//! [`wrapped_sky_position`] lifts the constructor to [`Number`] arguments (RA in hours,
//! DEC in degrees) and returns an [`UncertainSkyPosition`] whose components carry the
//! propagated errors in radians.
use std::fmt;

use nalgebra::Vector3;

use crate::{
    alpha_errors::AlphaError,
    constants::{Degree, Hour, Radian, DPI, HOUR_TO_DEG, RADEG, RADH},
    conversion::{dec_sdms_prec, parse_dec_to_deg, parse_ra_to_hours, ra_hms_prec},
    uncertain::{propagate, Number, UncertainValue},
};

/// A coordinate as supplied by the user: sexagesimal/decimal text or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Text(String),
    Value(f64),
}

impl From<&str> for Coordinate {
    fn from(s: &str) -> Self {
        Coordinate::Text(s.to_string())
    }
}

impl From<String> for Coordinate {
    fn from(s: String) -> Self {
        Coordinate::Text(s)
    }
}

impl From<f64> for Coordinate {
    fn from(v: f64) -> Self {
        Coordinate::Value(v)
    }
}

impl Coordinate {
    fn to_hours(&self) -> Result<Hour, AlphaError> {
        match self {
            Coordinate::Text(s) => parse_ra_to_hours(s),
            Coordinate::Value(v) => Ok(*v),
        }
    }

    fn to_degrees(&self) -> Result<Degree, AlphaError> {
        match self {
            Coordinate::Text(s) => parse_dec_to_deg(s),
            Coordinate::Value(v) => Ok(*v),
        }
    }
}

fn check_declination(dec: Degree) -> Result<(), AlphaError> {
    if !dec.is_finite() {
        return Err(AlphaError::validation(format!(
            "declination must be finite, got {dec}"
        )));
    }
    if !(-90.0..=90.0).contains(&dec) {
        return Err(AlphaError::RangeError {
            quantity: "declination",
            value: dec,
            min: -90.0,
            max: 90.0,
        });
    }
    Ok(())
}

/// One point on the celestial sphere (equatorial coordinates, radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    ra: Radian,
    dec: Radian,
}

impl SkyPosition {
    /// Build a position from right ascension in hours and declination in degrees.
    ///
    /// Return
    /// ------
    /// * `Err(AlphaError::RangeError)` if the declination is outside `[-90°, 90°]`
    /// * `Err(AlphaError::ValidationError)` if a coordinate is not finite
    pub fn from_hours_degrees(ra: Hour, dec: Degree) -> Result<Self, AlphaError> {
        if !ra.is_finite() {
            return Err(AlphaError::validation(format!(
                "right ascension must be finite, got {ra}"
            )));
        }
        check_declination(dec)?;
        Ok(SkyPosition {
            ra: (ra * RADH).rem_euclid(DPI),
            dec: dec * RADEG,
        })
    }

    /// Build a position from right ascension and declination both in decimal degrees.
    pub fn from_degrees(ra: Degree, dec: Degree) -> Result<Self, AlphaError> {
        Self::from_hours_degrees(ra / HOUR_TO_DEG, dec)
    }

    /// Right ascension in radians, in `[0, 2π)`.
    pub fn ra(&self) -> Radian {
        self.ra
    }

    /// Declination in radians, in `[-π/2, π/2]`.
    pub fn dec(&self) -> Radian {
        self.dec
    }

    pub fn ra_hours(&self) -> Hour {
        self.ra / RADH
    }

    pub fn ra_degrees(&self) -> Degree {
        self.ra_hours() * HOUR_TO_DEG
    }

    pub fn dec_degrees(&self) -> Degree {
        self.dec / RADEG
    }

    /// Direction cosines `[cos δ cos α, cos δ sin α, sin δ]`.
    pub fn unit_vector(&self) -> Vector3<f64> {
        unit_vector(self.ra, self.dec)
    }
}

/// Direction cosines of raw equatorial angles.
///
/// The angles are not range checked: a declination past a pole gives the same vector as
/// the position folded back across that pole with the right ascension shifted by 12h.
pub(crate) fn unit_vector(ra: Radian, dec: Radian) -> Vector3<f64> {
    let (sin_ra, cos_ra) = ra.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();
    Vector3::new(cos_ra * cos_dec, sin_ra * cos_dec, sin_dec)
}

impl fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        let (h, m, s) = ra_hms_prec(self.ra_hours(), precision);
        let (sign, d, dm, ds) = dec_sdms_prec(self.dec_degrees(), precision.saturating_sub(1));
        let ra_width = if precision > 0 { precision + 3 } else { 2 };
        let dec_precision = precision.saturating_sub(1);
        let dec_width = if dec_precision > 0 {
            dec_precision + 3
        } else {
            2
        };
        write!(
            f,
            "{h:02}h{m:02}m{s:0ra_width$.precision$}s {sign}{d:02}d{dm:02}m{ds:0dec_width$.dec_precision$}s"
        )
    }
}

/// Build a [`SkyPosition`] from flexible coordinate inputs.
///
/// Arguments
/// ---------
/// * `right_ascension`: sexagesimal string (`"22h20m06.757"`) or number, in hours
/// * `declination`: sexagesimal string (`"-28d03m23.34"`) or number, in degrees
///
/// Return
/// ------
/// * `Err(AlphaError::ParseError)` for malformed strings
/// * `Err(AlphaError::RangeError)` for a declination outside `[-90°, 90°]`
pub fn sky_position(
    right_ascension: impl Into<Coordinate>,
    declination: impl Into<Coordinate>,
) -> Result<SkyPosition, AlphaError> {
    let ra = right_ascension.into().to_hours()?;
    let dec = declination.into().to_degrees()?;
    SkyPosition::from_hours_degrees(ra, dec)
}

/// A sky position whose components may carry uncertainties (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertainSkyPosition {
    ra: Number,
    dec: Number,
}

impl UncertainSkyPosition {
    /// Right ascension in radians, nominal wrapped to `[0, 2π)`.
    pub fn ra(&self) -> Number {
        self.ra
    }

    /// Declination in radians.
    pub fn dec(&self) -> Number {
        self.dec
    }

    /// The position at the nominal values.
    pub fn nominal(&self) -> SkyPosition {
        SkyPosition {
            ra: self.ra.nominal(),
            dec: self.dec.nominal(),
        }
    }

    /// Parse sexagesimal/decimal coordinates and attach errors (hours and degrees).
    ///
    /// A zero error keeps the component plain.
    pub fn parse(
        right_ascension: impl Into<Coordinate>,
        ra_error: Hour,
        declination: impl Into<Coordinate>,
        dec_error: Degree,
    ) -> Result<Self, AlphaError> {
        let ra = right_ascension.into().to_hours()?;
        let dec = declination.into().to_degrees()?;
        let ra = if ra_error == 0.0 {
            Number::Plain(ra)
        } else {
            Number::uncertain(ra, ra_error)?
        };
        let dec = if dec_error == 0.0 {
            Number::Plain(dec)
        } else {
            Number::uncertain(dec, dec_error)?
        };
        wrapped_sky_position(ra, dec)
    }
}

impl From<SkyPosition> for UncertainSkyPosition {
    fn from(p: SkyPosition) -> Self {
        UncertainSkyPosition {
            ra: Number::Plain(p.ra),
            dec: Number::Plain(p.dec),
        }
    }
}

impl fmt::Display for UncertainSkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nominal())?;
        if self.ra.std_dev() > 0.0 || self.dec.std_dev() > 0.0 {
            write!(
                f,
                " (±{:.2}h, ±{:.2}°)",
                self.ra.std_dev() / RADH,
                self.dec.std_dev() / RADEG
            )?;
        }
        Ok(())
    }
}

/// [`sky_position`] lifted to uncertain right ascension (hours) and declination
/// (degrees).
///
/// The components are converted to radians through [`propagate`], so their errors are
/// the linearized errors of the conversion. Only the nominal declination is range
/// checked; the error interval may extend past a pole.
///
/// With zero-error inputs the nominal position equals `sky_position(ra, dec)`.
pub fn wrapped_sky_position(
    right_ascension: Number,
    declination: Number,
) -> Result<UncertainSkyPosition, AlphaError> {
    right_ascension.validate("right ascension")?;
    check_declination(declination.nominal())?;

    let ra = propagate(|x| Ok(x[0] * RADH), &[right_ascension])?;
    let dec = propagate(|x| Ok(x[0] * RADEG), &[declination])?;

    // Wrap after propagation: the wrap is not differentiable at 0h.
    let ra = match ra {
        Number::Plain(v) => Number::Plain(v.rem_euclid(DPI)),
        Number::Uncertain(u) => {
            Number::Uncertain(UncertainValue::new(u.nominal().rem_euclid(DPI), u.std_dev())?)
        }
    };

    Ok(UncertainSkyPosition { ra, dec })
}
