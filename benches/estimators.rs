use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use alphadipole::error_box::error_box_estimate;
use alphadipole::model::{DipoleFit, UncertainModel};
use alphadipole::monte_carlo::{monte_carlo_estimate, MonteCarloParams};
use alphadipole::prediction::{SightLine, SightLinePrediction};
use alphadipole::sky_position::sky_position;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("sky_position/sexagesimal", |b| {
        b.iter(|| sky_position(black_box("22h20m06.757"), black_box("-28d03m23.34")))
    });
}

fn bench_estimators(c: &mut Criterion) {
    let target = SightLine::he2217_2818().unwrap();
    let fit = DipoleFit::king2012_dipole_monopole();
    let model = SightLinePrediction::new(&fit, &target).unwrap();

    c.bench_function("estimators/analytic", |b| {
        b.iter(|| black_box(&model).propagate())
    });

    c.bench_function("estimators/error_box", |b| {
        b.iter(|| error_box_estimate(black_box(&model)))
    });

    let params = MonteCarloParams::builder().n_draws(10_000).build().unwrap();
    c.bench_function("estimators/monte_carlo_10k", |b| {
        let mut rng = StdRng::seed_from_u64(0xA1FA);
        b.iter(|| monte_carlo_estimate(black_box(&model), &params, &mut rng))
    });
}

criterion_group!(benches, bench_parse, bench_estimators);
criterion_main!(benches);
