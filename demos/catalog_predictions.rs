use std::env;

use alphadipole::alpha_errors::AlphaError;
use alphadipole::catalog::read_sight_lines;
use alphadipole::model::DipoleFit;
use alphadipole::prediction::predict;
use camino::Utf8PathBuf;
use tracing_subscriber::EnvFilter;

/// Print the dipole+monopole prediction for every sight line of a CSV catalog.
///
/// Usage:
///   catalog_predictions [CATALOG.csv]
/// Example:
///   catalog_predictions tests/data/sight_lines.csv
fn main() -> Result<(), AlphaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = env::args()
        .nth(1)
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| Utf8PathBuf::from("tests/data/sight_lines.csv"));

    let sight_lines = read_sight_lines(&path)?;
    let fit = DipoleFit::king2012_dipole_monopole();

    println!(
        "{:<28} {:>10} {:>12} {:>12} {:>8}",
        "name", "theta[deg]", "da/a", "error", "sigma"
    );
    for target in &sight_lines {
        let prediction = predict(&fit, target)?;
        let sigma = match target.measurement {
            Some(m) => match m.compare(prediction.value.try_into()?)?.best_sigma {
                Some(best) => format!("{best:.2}"),
                None => "within".to_string(),
            },
            None => "-".to_string(),
        };
        println!(
            "{:<28} {:>10.3} {:>12.4e} {:>12.4e} {:>8}",
            target.name,
            prediction.theta.nominal().to_degrees(),
            prediction.value.nominal(),
            prediction.value.std_dev(),
            sigma
        );
    }

    Ok(())
}
