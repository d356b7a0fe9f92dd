//! Seeded random-number streams for the simulation.
//!
//! Each stochastic concern (arrivals, jitter, urgency) gets its own `StdRng`
//! stream derived from the run seed, the same way the device simulators each
//! take an offset of a shared seed — so that changing one concern's draw
//! count never perturbs another's sequence. Initial battery SoC at station
//! startup is *not* drawn from a stream: spec.md §4.2 fixes it by a closed-form
//! formula over battery index, so there's no fourth stream here.

use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug)]
pub struct RngStreams {
    pub arrivals: StdRng,
    pub jitter: StdRng,
    pub urgency: StdRng,
}

impl RngStreams {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            arrivals: StdRng::seed_from_u64(seed),
            jitter: StdRng::seed_from_u64(seed.wrapping_add(1)),
            urgency: StdRng::seed_from_u64(seed.wrapping_add(2)),
        }
    }
}

/// Draws a sample from an exponential distribution with the given mean,
/// via inverse-CDF sampling over a uniform draw.
pub fn exponential_draw(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = rng.random_range(1e-12..1.0);
    -mean * u.ln()
}

/// Box-Muller Gaussian draw, matching the device simulators' own helper.
pub fn gaussian_noise(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return mean;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z0 * std_dev
}
