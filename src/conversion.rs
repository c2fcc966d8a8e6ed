//! # Sexagesimal coordinate parsing and formatting
//!
//! Right ascension is read in **hours**, declination in **degrees**. Both accept:
//!
//! ```text
//! Letter markers:   22h20m06.757   22h20m06.757s   17h12m   -28d03m23.34   -61d03m
//! Separated:        22 20 06.757   -28:03:23.34    17 12
//! Decimal:          17.3           -61.0
//! ```
//!
//! A sign is only valid at the front (`-28d03m`, not `28d-03m`). When a lower-order
//! field follows, the higher-order one must be an integer, and minutes/seconds must
//! lie in `[0, 60)`.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    alpha_errors::AlphaError,
    constants::{Degree, Hour},
};

static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?xi)
        ^\s*
        (?P<sign>[+-])?\s*
        (?P<major>\d+(?:\.\d*)?)\s*
        (?P<unit>[hd°])\s*
        (?:
            (?P<minor>\d+(?:\.\d*)?)\s*['m]\s*
            (?:
                (?P<second>\d+(?:\.\d*)?)\s*(?:s|"|'')?
            )?
        )?
        \s*$
        "#,
    )
    .expect("marker regex is valid")
});

static SEPARATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*
        (?P<sign>[+-])?\s*
        (?P<major>\d+(?:\.\d*)?|\.\d+)
        (?:
            [\s:]+(?P<minor>\d+(?:\.\d*)?)
            (?:
                [\s:]+(?P<second>\d+(?:\.\d*)?)
            )?
        )?
        \s*$
        "#,
    )
    .expect("separated regex is valid")
});

/// Which sexagesimal family a string is read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SexagesimalUnit {
    Hours,
    Degrees,
}

impl SexagesimalUnit {
    fn accepts_marker(self, marker: &str) -> bool {
        match self {
            SexagesimalUnit::Hours => marker.eq_ignore_ascii_case("h"),
            SexagesimalUnit::Degrees => marker.eq_ignore_ascii_case("d") || marker == "°",
        }
    }
}

fn parse_field(caps: &Captures, name: &str, input: &str) -> Result<Option<f64>, AlphaError> {
    caps.name(name)
        .map(|m| {
            m.as_str()
                .parse::<f64>()
                .map_err(|_| AlphaError::ParseError(format!("invalid {name} field in '{input}'")))
        })
        .transpose()
}

/// Combine the captured fields into a signed decimal value in the major unit.
fn combine_fields(caps: &Captures, input: &str) -> Result<f64, AlphaError> {
    let sign = match caps.name("sign").map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };

    let major = parse_field(caps, "major", input)?
        .ok_or_else(|| AlphaError::ParseError(format!("missing leading field in '{input}'")))?;
    let minor = parse_field(caps, "minor", input)?;
    let second = parse_field(caps, "second", input)?;

    if minor.is_some() && major.fract() != 0.0 {
        return Err(AlphaError::ParseError(format!(
            "fractional leading field followed by minutes in '{input}'"
        )));
    }
    if let Some(m) = minor {
        if m >= 60.0 {
            return Err(AlphaError::ParseError(format!(
                "minutes must be below 60 in '{input}'"
            )));
        }
        if second.is_some() && m.fract() != 0.0 {
            return Err(AlphaError::ParseError(format!(
                "fractional minutes followed by seconds in '{input}'"
            )));
        }
    }
    if let Some(s) = second {
        if s >= 60.0 {
            return Err(AlphaError::ParseError(format!(
                "seconds must be below 60 in '{input}'"
            )));
        }
    }

    Ok(sign * (major + minor.unwrap_or(0.0) / 60.0 + second.unwrap_or(0.0) / 3600.0))
}

fn parse_sexagesimal(input: &str, unit: SexagesimalUnit) -> Result<f64, AlphaError> {
    if let Some(caps) = MARKER_REGEX.captures(input) {
        let marker = caps.name("unit").map(|m| m.as_str()).unwrap_or_default();
        if !unit.accepts_marker(marker) {
            return Err(AlphaError::ParseError(format!(
                "unexpected unit marker '{marker}' in '{input}'"
            )));
        }
        return combine_fields(&caps, input);
    }

    if let Some(caps) = SEPARATED_REGEX.captures(input) {
        return combine_fields(&caps, input);
    }

    Err(AlphaError::ParseError(format!(
        "'{}' is not a sexagesimal or decimal angle",
        input.trim()
    )))
}

/// Parse a right ascension string to decimal hours.
///
/// Arguments
/// ---------
/// * `ra`: right ascension, e.g. `"22h20m06.757"`, `"22 20 06.757"` or `"17.3"`
///
/// Returns
/// -------
/// * `Ok(Hour)` the signed right ascension in hours, not yet wrapped to `[0, 24)`
/// * `Err(AlphaError::ParseError)` if the string is malformed
pub fn parse_ra_to_hours(ra: &str) -> Result<Hour, AlphaError> {
    parse_sexagesimal(ra, SexagesimalUnit::Hours)
}

/// Parse a declination string to decimal degrees.
///
/// Arguments
/// ---------
/// * `dec`: declination, e.g. `"-28d03m23.34"`, `"-28 03 23.34"` or `"-61.0"`
///
/// Returns
/// -------
/// * `Ok(Degree)` the signed declination in degrees (range is checked by the caller)
/// * `Err(AlphaError::ParseError)` if the string is malformed
pub fn parse_dec_to_deg(dec: &str) -> Result<Degree, AlphaError> {
    parse_sexagesimal(dec, SexagesimalUnit::Degrees)
}

/// Split decimal hours into `(h, m, s)`, rounding seconds to `precision` digits and
/// carrying into minutes/hours when the rounding reaches 60.
pub(crate) fn ra_hms_prec(hours: Hour, precision: usize) -> (u32, u32, f64) {
    let scale = 10f64.powi(precision as i32);
    let total_seconds = (hours.rem_euclid(24.0) * 3600.0 * scale).round() / scale;
    let total_seconds = total_seconds % (24.0 * 3600.0);

    let h = (total_seconds / 3600.0).floor();
    let m = ((total_seconds - h * 3600.0) / 60.0).floor();
    let s = total_seconds - h * 3600.0 - m * 60.0;
    (h as u32, m as u32, s.max(0.0))
}

/// Split signed degrees into `(sign, d, m, s)` with the same rounding rules as
/// [`ra_hms_prec`].
pub(crate) fn dec_sdms_prec(degrees: Degree, precision: usize) -> (char, u32, u32, f64) {
    let sign = if degrees < 0.0 { '-' } else { '+' };
    let scale = 10f64.powi(precision as i32);
    let total_seconds = (degrees.abs() * 3600.0 * scale).round() / scale;

    let d = (total_seconds / 3600.0).floor();
    let m = ((total_seconds - d * 3600.0) / 60.0).floor();
    let s = total_seconds - d * 3600.0 - m * 60.0;
    (sign, d as u32, m as u32, s.max(0.0))
}

#[cfg(test)]
mod test_conversion {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ra_to_hours() {
        let expected = 22.0 + 20.0 / 60.0 + 6.757 / 3600.0;
        assert_relative_eq!(parse_ra_to_hours("22h20m06.757").unwrap(), expected);
        assert_relative_eq!(parse_ra_to_hours("22h20m06.757s").unwrap(), expected);
        assert_relative_eq!(parse_ra_to_hours("22 20 06.757").unwrap(), expected);
        assert_relative_eq!(parse_ra_to_hours("22:20:06.757").unwrap(), expected);
        assert_relative_eq!(parse_ra_to_hours("17h12m").unwrap(), 17.2);
        assert_relative_eq!(parse_ra_to_hours("17.3").unwrap(), 17.3);
        assert_relative_eq!(parse_ra_to_hours(" 17H ").unwrap(), 17.0);
    }

    #[test]
    fn test_dec_to_deg() {
        let expected = -(28.0 + 3.0 / 60.0 + 23.34 / 3600.0);
        assert_relative_eq!(parse_dec_to_deg("-28d03m23.34").unwrap(), expected);
        assert_relative_eq!(parse_dec_to_deg("-28 03 23.34").unwrap(), expected);
        assert_relative_eq!(parse_dec_to_deg("-28:03:23.34").unwrap(), expected);
        assert_relative_eq!(parse_dec_to_deg("-28°03'23.34\"").unwrap(), expected);
        assert_relative_eq!(parse_dec_to_deg("-61d03m").unwrap(), -(61.0 + 3.0 / 60.0));
        assert_relative_eq!(parse_dec_to_deg("+15.0").unwrap(), 15.0);
        assert_relative_eq!(parse_dec_to_deg("-00 30 00").unwrap(), -0.5);
    }

    #[test]
    fn test_malformed_strings() {
        for bad in [
            "",
            "abc",
            "22h-20m",
            "22h20m06.757x",
            "1 2 3 4",
            "12h61m",
            "12 30 60",
            "12.5h30m",
            "12h30.5m10s",
        ] {
            assert!(
                matches!(parse_ra_to_hours(bad), Err(AlphaError::ParseError(_))),
                "'{bad}' should not parse"
            );
        }
        // unit markers must match the coordinate
        assert!(parse_ra_to_hours("22d20m").is_err());
        assert!(parse_dec_to_deg("-28h03m").is_err());
    }

    #[test]
    fn test_sexagesimal_split() {
        let (h, m, s) = ra_hms_prec(22.0 + 20.0 / 60.0 + 6.757 / 3600.0, 3);
        assert_eq!((h, m), (22, 20));
        assert_relative_eq!(s, 6.757, epsilon = 1e-9);

        // rounding carries into the next minute
        let (h, m, s) = ra_hms_prec(1.0 + 59.0 / 60.0 + 59.9999 / 3600.0, 2);
        assert_eq!((h, m), (2, 0));
        assert_relative_eq!(s, 0.0, epsilon = 1e-9);

        let (sign, d, m, s) = dec_sdms_prec(-(28.0 + 3.0 / 60.0 + 23.34 / 3600.0), 2);
        assert_eq!((sign, d, m), ('-', 28, 3));
        assert_relative_eq!(s, 23.34, epsilon = 1e-9);
    }
}
