use std::env;

use alphadipole::alpha_errors::AlphaError;
use alphadipole::comparison::MeasurementComparison;
use alphadipole::error_box::error_box_estimate;
use alphadipole::model::{DipoleFit, UncertainModel};
use alphadipole::monte_carlo::{monte_carlo_estimate, MonteCarloParams};
use alphadipole::prediction::{predict, SightLine, SightLinePrediction};
use tracing_subscriber::EnvFilter;

/// Predict Δα/α along HE 2217−2818 for every published fit and compare with the
/// Molaro et al. (2013) measurement.
///
/// Usage:
///   he2217_prediction [N_DRAWS] [SEED]
/// Example:
///   RUST_LOG=debug he2217_prediction 100000 42
fn main() -> Result<(), AlphaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let mut builder = MonteCarloParams::builder();
    if let Some(n) = args.first() {
        let n_draws = n
            .parse()
            .map_err(|_| AlphaError::ValidationError(format!("invalid draw count '{n}'")))?;
        builder = builder.n_draws(n_draws);
    }
    if let Some(s) = args.get(1) {
        let seed = s
            .parse()
            .map_err(|_| AlphaError::ValidationError(format!("invalid seed '{s}'")))?;
        builder = builder.seed(seed);
    }
    let mc_params = builder.build()?;

    let target = SightLine::he2217_2818()?;
    println!("{}: {}\n", target.name, target.position);

    for fit in DipoleFit::king2012_all() {
        println!("{fit}");

        let prediction = predict(&fit, &target)?;
        println!("{prediction}");

        let model = SightLinePrediction::new(&fit, &target)?;
        let mut rng = mc_params.rng();
        let summary = monte_carlo_estimate(&model, &mc_params, &mut rng)?;
        println!("{summary}");

        let bounds = error_box_estimate(&model)?;
        println!("Error box: {bounds}");
        println!("Analytic check: {:.4}", model.propagate()?);

        if let Some(measurement) = target.measurement {
            let comparison: MeasurementComparison =
                measurement.compare(prediction.value.try_into()?)?;
            println!("\n{comparison}");
        }
        println!("\n{}", "=".repeat(60));
    }

    Ok(())
}
