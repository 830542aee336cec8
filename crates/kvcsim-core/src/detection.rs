//! Detection decision for optical photons arriving at an MPPC.
//!
//! Two mutually exclusive policies implement [`DetectionStrategy`]:
//!
//! - [`SurfaceEfficiencyDetector`]: the kernel's boundary process is
//!   authoritative. A `Detection` status is a hit. A photon refracted into a
//!   sensor without a kernel detection gets one draw against the sensor
//!   surface's tabulated efficiency.
//! - [`PostAbsorptionQeDetector`]: the sensor swallows every photon that
//!   enters it, and an independent draw against the spline QE model decides
//!   whether it counts.
//!
//! The policy is picked once per run from `detection_mode`, so both can be
//! exercised from the same binary. Only one is ever active.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::info;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::geometry::{DetectorLayout, Volume};
use crate::qe::{ChannelCalibration, QE_SCALE_KEY, QuantumEfficiencyModel};

/// Config key selecting the policy.
pub const DETECTION_MODE_KEY: &str = "detection_mode";

/// Optical boundary status reported by the transport kernel for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoundaryStatus {
    #[default]
    Undefined,
    NotAtBoundary,
    SameMaterial,
    StepTooSmall,
    NoRINDEX,
    Transmission,
    FresnelRefraction,
    FresnelReflection,
    TotalInternalReflection,
    LambertianReflection,
    LobeReflection,
    SpikeReflection,
    BackScattering,
    Absorption,
    Detection,
}

impl BoundaryStatus {
    pub fn is_reflection(self) -> bool {
        matches!(
            self,
            Self::FresnelReflection
                | Self::TotalInternalReflection
                | Self::LambertianReflection
                | Self::LobeReflection
                | Self::SpikeReflection
                | Self::BackScattering
        )
    }

    /// Only a Fresnel refraction earns a surface-table draw; a plain
    /// `Transmission` into a sensor is absorbed without one.
    pub fn is_refraction(self) -> bool {
        self == Self::FresnelRefraction
    }
}

/// Outcome for a photon at a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Detected,
    Reflected,
    Absorbed,
}

/// What the pipeline knows about a photon reaching a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// Photon total energy (eV).
    pub energy_ev: f64,
    pub status: BoundaryStatus,
    /// Post-step volume.
    pub volume: Volume,
}

/// A photon detection policy.
pub trait DetectionStrategy: Send + Sync {
    fn mode(&self) -> DetectionMode;

    /// Classify one arrival. `rng` supplies every uniform draw.
    fn decide(&self, arrival: &Arrival, rng: &mut dyn RngCore) -> Decision;
}

/// Which policy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionMode {
    SurfaceEfficiency,
    PostAbsorptionQe,
}

impl DetectionMode {
    /// Read `detection_mode`; absent means post-absorption QE.
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        if !config.has(DETECTION_MODE_KEY) {
            info!("{DETECTION_MODE_KEY} not set, using post-absorption QE");
            return Ok(Self::PostAbsorptionQe);
        }
        config.get(DETECTION_MODE_KEY).parse()
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceEfficiency => write!(f, "surface_efficiency"),
            Self::PostAbsorptionQe => write!(f, "post_absorption_qe"),
        }
    }
}

impl FromStr for DetectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "surface" | "surface_efficiency" | "surface_pde" => Ok(Self::SurfaceEfficiency),
            "qe" | "post_absorption" | "post_absorption_qe" => Ok(Self::PostAbsorptionQe),
            other => Err(Error::invalid(
                DETECTION_MODE_KEY,
                format!("unrecognized detection mode '{other}'"),
            )),
        }
    }
}

/// Kernel boundary efficiency, with a surface-table draw for refractions into
/// a sensor that the kernel did not already detect.
pub struct SurfaceEfficiencyDetector {
    layout: Arc<DetectorLayout>,
    scale: f64,
    calibration: ChannelCalibration,
}

impl SurfaceEfficiencyDetector {
    pub fn new(layout: Arc<DetectorLayout>, scale: f64, calibration: ChannelCalibration) -> Self {
        Self {
            layout,
            scale,
            calibration,
        }
    }

    fn surface_probability(&self, arrival: &Arrival) -> Option<f64> {
        let table = self.layout.surface_efficiency(&arrival.volume)?;
        let scale = self.calibration.scale_for(arrival.volume.copy_no, self.scale);
        Some((table.linear_at(arrival.energy_ev) * scale).clamp(0.0, 1.0))
    }
}

impl DetectionStrategy for SurfaceEfficiencyDetector {
    fn mode(&self) -> DetectionMode {
        DetectionMode::SurfaceEfficiency
    }

    fn decide(&self, arrival: &Arrival, rng: &mut dyn RngCore) -> Decision {
        match arrival.status {
            BoundaryStatus::Detection => Decision::Detected,
            BoundaryStatus::Absorption => Decision::Absorbed,
            s if s.is_reflection() && !arrival.volume.is_sensor() => Decision::Reflected,
            s if s.is_refraction() => match self.surface_probability(arrival) {
                Some(p) if rng.random::<f64>() < p => Decision::Detected,
                Some(_) => Decision::Absorbed,
                None => Decision::Reflected,
            },
            // Anything else that ended up inside a sensor is swallowed by it.
            _ if arrival.volume.is_sensor() => Decision::Absorbed,
            _ => Decision::Reflected,
        }
    }
}

/// Sensor absorbs every entering photon; a QE draw decides detection.
pub struct PostAbsorptionQeDetector {
    model: Arc<QuantumEfficiencyModel>,
    calibration: ChannelCalibration,
}

impl PostAbsorptionQeDetector {
    pub fn new(model: Arc<QuantumEfficiencyModel>, calibration: ChannelCalibration) -> Self {
        Self { model, calibration }
    }

    pub fn model(&self) -> &QuantumEfficiencyModel {
        &self.model
    }

    fn probability(&self, arrival: &Arrival) -> f64 {
        let scale = self
            .calibration
            .scale_for(arrival.volume.copy_no, self.model.scale());
        self.model.evaluate_scaled(arrival.energy_ev, scale)
    }
}

impl DetectionStrategy for PostAbsorptionQeDetector {
    fn mode(&self) -> DetectionMode {
        DetectionMode::PostAbsorptionQe
    }

    fn decide(&self, arrival: &Arrival, rng: &mut dyn RngCore) -> Decision {
        if !arrival.volume.is_sensor() && arrival.status.is_reflection() {
            return Decision::Reflected;
        }
        let qe = self.probability(arrival);
        let u: f64 = rng.random();
        // A zero efficiency never detects, even for u == 0.
        if qe > 0.0 && u <= qe {
            Decision::Detected
        } else {
            Decision::Absorbed
        }
    }
}

/// Build the configured policy.
pub fn build_strategy(
    config: &ConfigStore,
    layout: Arc<DetectorLayout>,
    model: Arc<QuantumEfficiencyModel>,
) -> Result<Box<dyn DetectionStrategy>> {
    let mode = DetectionMode::from_config(config)?;
    let calibration = ChannelCalibration::from_config(config, layout.sensor_count() as i32)?;
    info!("detection mode: {mode}");
    Ok(match mode {
        DetectionMode::SurfaceEfficiency => {
            // Same positivity rule as the QE model; `model` already validated it.
            let scale = if config.has(QE_SCALE_KEY) {
                model.scale()
            } else {
                1.0
            };
            Box::new(SurfaceEfficiencyDetector::new(layout, scale, calibration))
        }
        DetectionMode::PostAbsorptionQe => Box::new(PostAbsorptionQeDetector::new(model, calibration)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VolumeKind;
    use crate::optics::{self, OpticalTable};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn flat_model(value: f64, scale: f64) -> Arc<QuantumEfficiencyModel> {
        let table = OpticalTable::flat("flat", &[1.0, 2.0, 3.0, 4.0], value).unwrap();
        Arc::new(QuantumEfficiencyModel::new(&table, scale).unwrap())
    }

    fn layout_with_efficiency(value: f64) -> Arc<DetectorLayout> {
        let table = OpticalTable::flat("surface", &[1.0, 5.0], value).unwrap();
        Arc::new(DetectorLayout::new(
            glam::DVec3::new(104.0, 120.0, 20.0),
            16,
            crate::geometry::WrapMaterial::Teflon,
            table,
        ))
    }

    fn arrival(status: BoundaryStatus, volume: Volume) -> Arrival {
        Arrival {
            energy_ev: 2.5,
            status,
            volume,
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("surface".parse::<DetectionMode>().unwrap(), DetectionMode::SurfaceEfficiency);
        assert_eq!("QE".parse::<DetectionMode>().unwrap(), DetectionMode::PostAbsorptionQe);
        assert!("both".parse::<DetectionMode>().is_err());
        assert_eq!(
            DetectionMode::from_config(&ConfigStore::new()).unwrap(),
            DetectionMode::PostAbsorptionQe
        );
        let bad = ConfigStore::parse("detection_mode sometimes\n");
        assert!(matches!(
            DetectionMode::from_config(&bad),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_qe_mode_zero_table_never_detects() {
        let det = PostAbsorptionQeDetector::new(flat_model(0.0, 1.0), ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            let d = det.decide(&arrival(BoundaryStatus::FresnelRefraction, Volume::sensor(0)), &mut rng);
            assert_eq!(d, Decision::Absorbed);
        }
    }

    #[test]
    fn test_qe_mode_unit_table_always_detects() {
        let det = PostAbsorptionQeDetector::new(flat_model(1.0, 1.0), ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10_000 {
            let d = det.decide(&arrival(BoundaryStatus::NotAtBoundary, Volume::sensor(9)), &mut rng);
            assert_eq!(d, Decision::Detected);
        }
    }

    #[test]
    fn test_qe_mode_never_reflects_inside_sensor() {
        let det = PostAbsorptionQeDetector::new(flat_model(0.3, 1.0), ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2000 {
            let d = det.decide(&arrival(BoundaryStatus::FresnelReflection, Volume::sensor(1)), &mut rng);
            assert_ne!(d, Decision::Reflected);
        }
    }

    #[test]
    fn test_qe_mode_channel_override() {
        let cal = ChannelCalibration::default().with_override(5, 1e-9);
        let det = PostAbsorptionQeDetector::new(flat_model(1.0, 1.0), cal);
        let mut rng = StdRng::seed_from_u64(4);
        let detected = (0..1000)
            .filter(|_| {
                det.decide(&arrival(BoundaryStatus::FresnelRefraction, Volume::sensor(5)), &mut rng)
                    == Decision::Detected
            })
            .count();
        assert_eq!(detected, 0);
    }

    #[test]
    fn test_surface_mode_kernel_status_is_authoritative() {
        let det = SurfaceEfficiencyDetector::new(layout_with_efficiency(0.0), 1.0, ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(5);
        let sensor = Volume::sensor(2);
        assert_eq!(det.decide(&arrival(BoundaryStatus::Detection, sensor), &mut rng), Decision::Detected);
        assert_eq!(det.decide(&arrival(BoundaryStatus::Absorption, sensor), &mut rng), Decision::Absorbed);
        let air = Volume::from(VolumeKind::Air);
        assert_eq!(
            det.decide(&arrival(BoundaryStatus::FresnelReflection, air), &mut rng),
            Decision::Reflected
        );
        // Refraction into a sensor with zero surface efficiency is absorbed.
        assert_eq!(
            det.decide(&arrival(BoundaryStatus::FresnelRefraction, sensor), &mut rng),
            Decision::Absorbed
        );
    }

    #[test]
    fn test_surface_mode_refraction_draw() {
        let det = SurfaceEfficiencyDetector::new(layout_with_efficiency(1.0), 1.0, ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..1000 {
            assert_eq!(
                det.decide(&arrival(BoundaryStatus::FresnelRefraction, Volume::sensor(0)), &mut rng),
                Decision::Detected
            );
        }
        // Refraction into something that is not a sensor has no surface table.
        assert_eq!(
            det.decide(&arrival(BoundaryStatus::FresnelRefraction, VolumeKind::Radiator.into()), &mut rng),
            Decision::Reflected
        );
    }

    #[test]
    fn test_surface_mode_transmission_is_not_drawn() {
        assert!(!BoundaryStatus::Transmission.is_refraction());
        let det = SurfaceEfficiencyDetector::new(layout_with_efficiency(1.0), 1.0, ChannelCalibration::default());
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            assert_eq!(
                det.decide(&arrival(BoundaryStatus::Transmission, Volume::sensor(0)), &mut rng),
                Decision::Absorbed
            );
        }
    }

    #[test]
    fn test_surface_mode_scale_saturates() {
        let det = SurfaceEfficiencyDetector::new(layout_with_efficiency(0.6), 2.0, ChannelCalibration::default());
        let a = arrival(BoundaryStatus::FresnelRefraction, Volume::sensor(0));
        assert_eq!(det.surface_probability(&a), Some(1.0));
    }

    #[test]
    fn test_build_strategy_from_config() {
        let layout = Arc::new(DetectorLayout::default());
        let model = Arc::new(
            QuantumEfficiencyModel::new(&optics::lookup(optics::MPPC_PDE).unwrap(), 1.0).unwrap(),
        );
        let surface = build_strategy(
            &ConfigStore::parse("detection_mode surface\n"),
            Arc::clone(&layout),
            Arc::clone(&model),
        )
        .unwrap();
        assert_eq!(surface.mode(), DetectionMode::SurfaceEfficiency);

        let qe = build_strategy(&ConfigStore::new(), Arc::clone(&layout), Arc::clone(&model)).unwrap();
        assert_eq!(qe.mode(), DetectionMode::PostAbsorptionQe);

        assert!(build_strategy(&ConfigStore::parse("detection_mode x\n"), layout, model).is_err());
    }
}
