use alphadipole::{
    model::DipoleFit,
    monte_carlo::MonteCarloParams,
    prediction::SightLine,
    sky_position::{sky_position, SkyPosition},
};

pub const THETA_HE2217: f64 = 1.025_947_945_5;
pub const PREDICTED_HE2217: f64 = 3.247_397_8e-6;

pub fn he2217() -> SightLine {
    SightLine::he2217_2818().expect("HE2217-2818 position parses")
}

pub fn he2217_position() -> SkyPosition {
    sky_position("22h20m06.757", "-28d03m23.34").expect("valid position")
}

pub fn dipole_monopole() -> DipoleFit {
    DipoleFit::king2012_dipole_monopole()
}

pub fn seeded_params(n_draws: usize, seed: u64) -> MonteCarloParams {
    MonteCarloParams::builder()
        .n_draws(n_draws)
        .seed(seed)
        .build()
        .expect("valid Monte Carlo parameters")
}
