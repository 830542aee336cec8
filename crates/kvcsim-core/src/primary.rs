//! Beam generation.
//!
//! One primary per event, fired along +z from a configurable vertex. The
//! momentum can be smeared with a Gaussian whose FWHM is a fraction of the
//! nominal momentum. The event's beam record stores the kinetic energy
//! `sqrt(m² + p²) − m`.

use glam::DVec3;
use log::info;
use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::event::{EventAggregator, RunSink};
use crate::particle::Species;
use crate::units::FWHM_TO_SIGMA;

/// Default vertex (mm), upstream of the radiator.
pub const DEFAULT_VERTEX: DVec3 = DVec3::new(0.0, 0.0, -100.0);

/// The primary handed to the transport kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Primary {
    pub species: Species,
    /// GeV/c.
    pub momentum: DVec3,
    /// mm.
    pub position: DVec3,
    /// GeV.
    pub kinetic_energy: f64,
}

#[derive(Debug, Clone)]
pub struct PrimaryGenerator {
    species: Species,
    momentum_gev: f64,
    /// Fractional FWHM of the momentum spread.
    momentum_spread: Option<f64>,
    vertex: DVec3,
    /// Transverse vertex σ (mm).
    sigma_xy: (f64, f64),
}

impl PrimaryGenerator {
    /// Pencil beam of `species` at `momentum_gev`, no smearing.
    pub fn new(species: Species, momentum_gev: f64) -> Result<Self> {
        if !momentum_gev.is_finite() || momentum_gev <= 0.0 {
            return Err(Error::invalid(
                "momentum",
                format!("beam momentum must be positive, got {momentum_gev}"),
            ));
        }
        Ok(Self {
            species,
            momentum_gev,
            momentum_spread: None,
            vertex: DEFAULT_VERTEX,
            sigma_xy: (0.0, 0.0),
        })
    }

    /// Keys: `particle`, `momentum` (GeV/c), optional `momentum_spread`,
    /// `beam_x/y/z` and `beam_sigma_x/y`.
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        let species: Species = config.get("particle").parse()?;
        let mut generator = Self::new(species, config.get_double("momentum"))?;

        if config.has("momentum_spread") {
            let spread = non_negative(config, "momentum_spread")?;
            generator = generator.with_momentum_spread(spread);
        }
        generator.vertex = DVec3::new(
            config.double_or("beam_x", DEFAULT_VERTEX.x),
            config.double_or("beam_y", DEFAULT_VERTEX.y),
            config.double_or("beam_z", DEFAULT_VERTEX.z),
        );
        generator.sigma_xy = (
            non_negative(config, "beam_sigma_x")?,
            non_negative(config, "beam_sigma_y")?,
        );

        info!(
            "beam: {} at {} GeV/c{}",
            generator.species,
            generator.momentum_gev,
            generator
                .momentum_spread
                .map(|s| format!(" ({:.1}% FWHM)", s * 100.0))
                .unwrap_or_default()
        );
        Ok(generator)
    }

    pub fn with_momentum_spread(mut self, fwhm_fraction: f64) -> Self {
        self.momentum_spread = Some(fwhm_fraction);
        self
    }

    pub fn with_vertex(mut self, vertex: DVec3) -> Self {
        self.vertex = vertex;
        self
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn momentum_gev(&self) -> f64 {
        self.momentum_gev
    }

    /// Draw one primary without touching any event state.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Primary {
        let p = match self.momentum_spread {
            Some(spread) if spread > 0.0 => {
                gaussian(self.momentum_gev, self.momentum_gev * spread * FWHM_TO_SIGMA, rng).max(0.0)
            }
            _ => self.momentum_gev,
        };
        let position = DVec3::new(
            gaussian(self.vertex.x, self.sigma_xy.0, rng),
            gaussian(self.vertex.y, self.sigma_xy.1, rng),
            self.vertex.z,
        );
        Primary {
            species: self.species,
            momentum: DVec3::Z * p,
            position,
            kinetic_energy: self.species.kinetic_energy(p),
        }
    }

    /// Draw the event's primary and record its kinematics.
    pub fn generate<S: RunSink>(
        &self,
        aggregator: &mut EventAggregator<S>,
        rng: &mut dyn RngCore,
    ) -> Primary {
        let primary = self.sample(rng);
        aggregator.set_beam_kinematics(primary.kinetic_energy, primary.momentum, primary.position);
        primary
    }
}

fn non_negative(config: &ConfigStore, key: &str) -> Result<f64> {
    let v = config.double_or(key, 0.0);
    if !v.is_finite() || v < 0.0 {
        return Err(Error::invalid(key, format!("must be non-negative, got {v}")));
    }
    Ok(v)
}

fn gaussian(mean: f64, sigma: f64, rng: &mut dyn RngCore) -> f64 {
    if sigma <= 0.0 {
        return mean;
    }
    match Normal::new(mean, sigma) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_kaon_kinetic_energy_recorded() {
        let config = ConfigStore::parse("particle kaon-\nmomentum 0.735\n");
        let generator = PrimaryGenerator::from_config(&config).unwrap();
        let mut agg = EventAggregator::new(MemorySink::default());
        let mut rng = StdRng::seed_from_u64(1);

        agg.begin_event(0);
        let primary = generator.generate(&mut agg, &mut rng);
        let rec = agg.end_event().unwrap();

        let m = 0.493_677_f64;
        let expected = (m * m + 0.735 * 0.735).sqrt() - m;
        assert!((rec.beam.energy_gev - expected).abs() < 1e-12);
        assert_eq!(rec.beam.momentum, DVec3::new(0.0, 0.0, 0.735));
        assert_eq!(rec.beam.position, DEFAULT_VERTEX);
        assert_eq!(primary.species, Species::KaonMinus);
    }

    #[test]
    fn test_momentum_spread_width() {
        let generator = PrimaryGenerator::new(Species::PiPlus, 1.0)
            .unwrap()
            .with_momentum_spread(0.02);
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let ps: Vec<f64> = (0..n).map(|_| generator.sample(&mut rng).momentum.z).collect();
        let mean = ps.iter().sum::<f64>() / n as f64;
        let var = ps.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let expected_sigma = 0.02 * FWHM_TO_SIGMA;
        assert!((mean - 1.0).abs() < 5e-4, "mean {mean}");
        assert!((var.sqrt() - expected_sigma).abs() / expected_sigma < 0.05);
    }

    #[test]
    fn test_vertex_keys() {
        let config = ConfigStore::parse("particle e-\nmomentum 1\nbeam_x 3\nbeam_z -250\n");
        let generator = PrimaryGenerator::from_config(&config).unwrap();
        let p = generator.sample(&mut StdRng::seed_from_u64(0));
        assert_eq!(p.position, DVec3::new(3.0, 0.0, -250.0));
    }

    #[test]
    fn test_invalid_beam_is_fatal() {
        let unknown = ConfigStore::parse("particle graviton\nmomentum 1\n");
        assert!(matches!(
            PrimaryGenerator::from_config(&unknown),
            Err(Error::UnknownParticle(_))
        ));
        let no_momentum = ConfigStore::parse("particle proton\n");
        assert!(PrimaryGenerator::from_config(&no_momentum).is_err());
        let negative_spread = ConfigStore::parse("particle proton\nmomentum 1\nmomentum_spread -0.1\n");
        assert!(PrimaryGenerator::from_config(&negative_spread).is_err());
    }
}
