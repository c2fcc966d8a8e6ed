//! # Sight-line catalogs
//!
//! Reads a list of [`SightLine`]s from CSV. The expected header is
//!
//! ```text
//! name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
//! ```
//!
//! * `ra` / `dec` accept every form of [`crate::sky_position::sky_position`]
//!   (`22h20m06.757`, `22 20 06.757`, `17.3`), RA in hours, DEC in degrees;
//! * `redshift`, `radial_distance` (Glyr) and the three measurement columns may be left
//!   empty; a measurement needs all three of `measured`, `stat_error` and `sys_error`;
//! * lines starting with `#` are skipped and fields are trimmed.
use std::fs::File;
use std::io::Read;

use camino::Utf8Path;
use serde::Deserialize;

use crate::{
    alpha_errors::AlphaError,
    prediction::{Measurement, SightLine},
    sky_position::sky_position,
};

#[derive(Debug, Deserialize)]
struct SightLineRecord {
    name: String,
    ra: String,
    dec: String,
    redshift: Option<f64>,
    radial_distance: Option<f64>,
    measured: Option<f64>,
    stat_error: Option<f64>,
    sys_error: Option<f64>,
}

fn check_non_negative(name: &str, column: &str, value: f64) -> Result<(), AlphaError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AlphaError::validation(format!(
            "sight line '{name}': {column} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

impl TryFrom<SightLineRecord> for SightLine {
    type Error = AlphaError;

    fn try_from(record: SightLineRecord) -> Result<Self, Self::Error> {
        let position = sky_position(record.ra.as_str(), record.dec.as_str())?;
        let mut sight_line = SightLine::new(record.name, position);

        if let Some(z) = record.redshift {
            check_non_negative(&sight_line.name, "redshift", z)?;
            sight_line = sight_line.with_redshift(z);
        }
        if let Some(r) = record.radial_distance {
            check_non_negative(&sight_line.name, "radial_distance", r)?;
            sight_line = sight_line.with_radial_distance(r);
        }

        match (record.measured, record.stat_error, record.sys_error) {
            (Some(value), Some(stat), Some(sys)) => {
                sight_line = sight_line.with_measurement(Measurement::new(value, stat, sys));
            }
            (None, None, None) => {}
            _ => {
                return Err(AlphaError::validation(format!(
                    "sight line '{}' has an incomplete measurement: measured, stat_error and sys_error go together",
                    sight_line.name
                )))
            }
        }

        Ok(sight_line)
    }
}

/// Read sight lines from any CSV source.
///
/// Return
/// ------
/// * `Err(AlphaError::CsvError)` for malformed CSV or non-numeric optional columns
/// * `Err(AlphaError::ParseError | RangeError)` for an invalid coordinate
/// * `Err(AlphaError::ValidationError)` for an incomplete measurement or a negative
///   redshift or radial distance
pub fn read_sight_lines_from_reader<R: Read>(reader: R) -> Result<Vec<SightLine>, AlphaError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    csv_reader
        .deserialize::<SightLineRecord>()
        .map(|record| SightLine::try_from(record?))
        .collect()
}

/// Read sight lines from a CSV file.
///
/// Arguments
/// ---------
/// * `path`: path to the catalog
///
/// Return
/// ------
/// * `Err(AlphaError::IoError)` if the file cannot be opened, otherwise as
///   [`read_sight_lines_from_reader`]
pub fn read_sight_lines(path: &Utf8Path) -> Result<Vec<SightLine>, AlphaError> {
    let file = File::open(path)?;
    let sight_lines = read_sight_lines_from_reader(file)?;
    tracing::info!(path = %path, count = sight_lines.len(), "loaded sight-line catalog");
    Ok(sight_lines)
}

#[cfg(test)]
mod test_catalog {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_read_from_reader() {
        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
# the worked example
HE2217-2818, 22h20m06.757, -28d03m23.34, 1.6919, 9.757, -1.0904e-6, 2.35e-6, 1.6549e-6
pole, 17.3, -61.0, , , , ,
";
        let lines = read_sight_lines_from_reader(data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 2);

        let he = &lines[0];
        assert_eq!(he.name, "HE2217-2818");
        assert_relative_eq!(he.position.nominal().dec_degrees(), -28.056483, epsilon = 1e-6);
        assert_eq!(he.redshift.map(|z| z.nominal()), Some(1.6919));
        assert_eq!(
            he.measurement,
            Some(Measurement::new(-1.0904e-6, 2.35e-6, 1.6549e-6))
        );

        let pole = &lines[1];
        assert_eq!(pole.redshift, None);
        assert_eq!(pole.radial_distance, None);
        assert_eq!(pole.measurement, None);
    }

    #[test]
    fn test_incomplete_measurement() {
        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
bad, 1.0, 2.0, , , -1e-6, 2e-6,
";
        assert!(matches!(
            read_sight_lines_from_reader(data.as_bytes()),
            Err(AlphaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_negative_distances() {
        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
bad, 1.0, 2.0, 1.2, -9.757, , ,
";
        assert!(matches!(
            read_sight_lines_from_reader(data.as_bytes()),
            Err(AlphaError::ValidationError(_))
        ));

        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
bad, 1.0, 2.0, -0.5, , , ,
";
        assert!(matches!(
            read_sight_lines_from_reader(data.as_bytes()),
            Err(AlphaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_coordinates() {
        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
bad, 1.0, -95.0, , , , ,
";
        assert!(matches!(
            read_sight_lines_from_reader(data.as_bytes()),
            Err(AlphaError::RangeError { .. })
        ));

        let data = "\
name,ra,dec,redshift,radial_distance,measured,stat_error,sys_error
bad, 1.0, 2.0, high, , , ,
";
        assert!(matches!(
            read_sight_lines_from_reader(data.as_bytes()),
            Err(AlphaError::CsvError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_sight_lines(Utf8Path::new("does/not/exist.csv")),
            Err(AlphaError::IoError(_))
        ));
    }
}
