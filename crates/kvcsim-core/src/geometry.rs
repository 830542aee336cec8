//! Detector layout as seen by the detection pipeline.
//!
//! Solid construction belongs to the transport kernel. What the pipeline needs
//! is the identity of each volume the kernel reports, the placement of every
//! MPPC (for local hit coordinates and channel numbers), the efficiency curve
//! on the sensor surface, and which volumes count as dead for trapped-photon
//! accounting.
//!
//! ```text
//!   KvcMotherPV (air, radiator + 20 mm margin)
//!   ├── KvcPV        quartz radiator, centred at the origin
//!   ├── TeflonPV     wrapper shell (or black sheet, see `wrap_material`)
//!   ├── BlacksheetPV outer light-tight shell
//!   └── MppcPV × 4n  sensors on the ±y faces, two rows per face at z = ±5 mm
//! ```

use std::fmt;
use std::str::FromStr;

use glam::{DMat3, DVec3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::optics::{self, OpticalTable};

/// Kind of volume a step point sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeKind {
    World,
    /// Air gap inside the detector box.
    Air,
    /// Quartz radiator.
    Radiator,
    /// Reflective wrapper around the radiator.
    Wrap,
    Blacksheet,
    Sensor,
}

impl VolumeKind {
    /// Map a kernel physical-volume name to its kind.
    pub fn from_volume_name(name: &str) -> Option<Self> {
        match name {
            "World" => Some(Self::World),
            "KvcMotherPV" => Some(Self::Air),
            "KvcPV" => Some(Self::Radiator),
            "TeflonPV" | "WrapPV" => Some(Self::Wrap),
            "BlacksheetPV" => Some(Self::Blacksheet),
            "MppcPV" => Some(Self::Sensor),
            _ => None,
        }
    }

    /// Kernel physical-volume name.
    pub fn volume_name(self) -> &'static str {
        match self {
            Self::World => "World",
            Self::Air => "KvcMotherPV",
            Self::Radiator => "KvcPV",
            Self::Wrap => "TeflonPV",
            Self::Blacksheet => "BlacksheetPV",
            Self::Sensor => "MppcPV",
        }
    }
}

/// A physical volume instance: kind plus copy number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Volume {
    pub kind: VolumeKind,
    #[serde(default)]
    pub copy_no: i32,
}

impl Volume {
    pub fn new(kind: VolumeKind, copy_no: i32) -> Self {
        Self { kind, copy_no }
    }

    pub fn sensor(channel: i32) -> Self {
        Self::new(VolumeKind::Sensor, channel)
    }

    pub fn is_sensor(&self) -> bool {
        self.kind == VolumeKind::Sensor
    }
}

impl From<VolumeKind> for Volume {
    fn from(kind: VolumeKind) -> Self {
        Self::new(kind, 0)
    }
}

/// Material of the radiator wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMaterial {
    Teflon,
    Blacksheet,
}

impl WrapMaterial {
    pub fn reflectivity_table(self) -> &'static str {
        match self {
            Self::Teflon => "teflon_reflectivity",
            Self::Blacksheet => "blacksheet_reflectivity",
        }
    }
}

impl fmt::Display for WrapMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teflon => write!(f, "teflon"),
            Self::Blacksheet => write!(f, "blacksheet"),
        }
    }
}

impl FromStr for WrapMaterial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "teflon" | "ptfe" => Ok(Self::Teflon),
            "blacksheet" | "black_sheet" => Ok(Self::Blacksheet),
            other => Err(Error::invalid(
                "wrap_material",
                format!("unsupported wrapper material '{other}' (expected teflon or blacksheet)"),
            )),
        }
    }
}

/// Position and orientation of one MPPC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPlacement {
    pub channel: i32,
    /// Centre in the world frame (mm).
    pub translation: DVec3,
    /// Local → world rotation.
    pub rotation: DMat3,
}

impl SensorPlacement {
    /// World point → sensor-local frame.
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.rotation.transpose() * (world - self.translation)
    }

    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.rotation * local + self.translation
    }
}

/// Radiator box, sensor array and wrapper as configured for a run.
#[derive(Debug, Clone)]
pub struct DetectorLayout {
    radiator_size: DVec3,
    sensor_size: DVec3,
    wrap: WrapMaterial,
    sensors: Vec<SensorPlacement>,
    sensor_efficiency: OpticalTable,
}

const SENSOR_GAP_MM: f64 = 0.5;
const ROW_Z_MM: f64 = 5.0;

impl DetectorLayout {
    /// Layout from configuration.
    ///
    /// Keys: `kvc_size_x/y/z` (mm, default 104 × 120 × 20), `mppc_per_row`
    /// (default 16), `wrap_material` (default teflon),
    /// `sensor_efficiency_table` (embedded table name, default `mppc_pde`).
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        let radiator_size = DVec3::new(
            config.double_or("kvc_size_x", 104.0),
            config.double_or("kvc_size_y", 120.0),
            config.double_or("kvc_size_z", 20.0),
        );
        if radiator_size.min_element() <= 0.0 {
            return Err(Error::invalid(
                "kvc_size",
                format!("radiator dimensions must be positive, got {radiator_size}"),
            ));
        }
        let per_row = config.int_or("mppc_per_row", 16);
        if !(1..=1024).contains(&per_row) {
            return Err(Error::invalid(
                "mppc_per_row",
                format!("expected 1..=1024 sensors per row, got {per_row}"),
            ));
        }
        let wrap = if config.has("wrap_material") {
            config.get("wrap_material").parse()?
        } else {
            WrapMaterial::Teflon
        };
        let efficiency_name = if config.has("sensor_efficiency_table") {
            config.get("sensor_efficiency_table")
        } else {
            optics::MPPC_PDE.to_string()
        };
        let sensor_efficiency = optics::require(&efficiency_name)?;

        let layout = Self::new(radiator_size, per_row as i32, wrap, sensor_efficiency);
        info!(
            "layout: radiator {:.1}x{:.1}x{:.1} mm, {} MPPCs, {} wrapper",
            radiator_size.x,
            radiator_size.y,
            radiator_size.z,
            layout.sensor_count(),
            wrap
        );
        Ok(layout)
    }

    /// Four rows of `per_row` sensors against the ±y faces of the radiator.
    pub fn new(
        radiator_size: DVec3,
        per_row: i32,
        wrap: WrapMaterial,
        sensor_efficiency: OpticalTable,
    ) -> Self {
        let sensor_size = DVec3::new(6.0, 6.0, 1.0);
        let rotation = DMat3::from_rotation_x(std::f64::consts::FRAC_PI_2);
        let pitch = sensor_size.x + SENSOR_GAP_MM;
        let y_face = radiator_size.y / 2.0 + sensor_size.z / 2.0;

        let mut sensors = Vec::with_capacity(4 * per_row as usize);
        // Row order fixes the copy numbers: upper z+, upper z-, lower z+, lower z-.
        let rows = [(y_face, ROW_Z_MM), (y_face, -ROW_Z_MM), (-y_face, ROW_Z_MM), (-y_face, -ROW_Z_MM)];
        for (row, &(y, z)) in rows.iter().enumerate() {
            for i in 0..per_row {
                let x = -pitch * ((per_row - 1) as f64 / 2.0 - i as f64);
                sensors.push(SensorPlacement {
                    channel: i + row as i32 * per_row,
                    translation: DVec3::new(x, y, z),
                    rotation,
                });
            }
        }

        Self {
            radiator_size,
            sensor_size,
            wrap,
            sensors,
            sensor_efficiency,
        }
    }

    pub fn radiator_size(&self) -> DVec3 {
        self.radiator_size
    }

    pub fn sensor_size(&self) -> DVec3 {
        self.sensor_size
    }

    pub fn wrap_material(&self) -> WrapMaterial {
        self.wrap
    }

    pub fn sensors(&self) -> &[SensorPlacement] {
        &self.sensors
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensor(&self, channel: i32) -> Option<&SensorPlacement> {
        usize::try_from(channel).ok().and_then(|i| self.sensors.get(i))
    }

    /// World point → local frame of sensor `channel`. Unknown channels fall
    /// back to the world coordinates.
    pub fn to_local(&self, channel: i32, world: DVec3) -> DVec3 {
        self.sensor(channel).map_or(world, |s| s.to_local(world))
    }

    /// Tabulated efficiency on the surface of `volume`, if it is a sensor.
    pub fn surface_efficiency(&self, volume: &Volume) -> Option<&OpticalTable> {
        volume.is_sensor().then_some(&self.sensor_efficiency)
    }

    /// Reflectivity curve of the configured wrapper.
    pub fn wrap_reflectivity(&self) -> OpticalTable {
        optics::lookup(self.wrap.reflectivity_table())
            .unwrap_or_else(|| unreachable!("embedded wrapper tables are always present"))
    }

    /// Air gap and wrapper: non-detecting volumes where a lost radiator photon
    /// counts as trapped.
    pub fn is_dead_volume(&self, kind: VolumeKind) -> bool {
        matches!(kind, VolumeKind::Air | VolumeKind::Wrap)
    }
}

impl Default for DetectorLayout {
    fn default() -> Self {
        Self::new(
            DVec3::new(104.0, 120.0, 20.0),
            16,
            WrapMaterial::Teflon,
            optics::lookup(optics::MPPC_PDE)
                .unwrap_or_else(|| unreachable!("embedded MPPC table is always present")),
        )
    }
}
