//! Particle species known to the beam generator.
//!
//! Names follow the transport kernel's particle table (`kaon-`, `anti_proton`,
//! ...). Masses are PDG values in GeV.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// PDG code the kernel assigns to optical photons.
pub const OPTICAL_PHOTON_PDG: i32 = -22;

/// Beam particle species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Electron,
    Positron,
    MuMinus,
    MuPlus,
    PiMinus,
    PiPlus,
    Pi0,
    KaonMinus,
    KaonPlus,
    Kaon0L,
    Proton,
    AntiProton,
    Neutron,
    Deuteron,
    Gamma,
}

impl Species {
    pub const ALL: [Species; 15] = [
        Species::Electron,
        Species::Positron,
        Species::MuMinus,
        Species::MuPlus,
        Species::PiMinus,
        Species::PiPlus,
        Species::Pi0,
        Species::KaonMinus,
        Species::KaonPlus,
        Species::Kaon0L,
        Species::Proton,
        Species::AntiProton,
        Species::Neutron,
        Species::Deuteron,
        Species::Gamma,
    ];

    /// Kernel particle-table name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Electron => "e-",
            Self::Positron => "e+",
            Self::MuMinus => "mu-",
            Self::MuPlus => "mu+",
            Self::PiMinus => "pi-",
            Self::PiPlus => "pi+",
            Self::Pi0 => "pi0",
            Self::KaonMinus => "kaon-",
            Self::KaonPlus => "kaon+",
            Self::Kaon0L => "kaon0L",
            Self::Proton => "proton",
            Self::AntiProton => "anti_proton",
            Self::Neutron => "neutron",
            Self::Deuteron => "deuteron",
            Self::Gamma => "gamma",
        }
    }

    /// Rest mass in GeV.
    pub fn mass_gev(self) -> f64 {
        match self {
            Self::Electron | Self::Positron => 0.000_510_998_95,
            Self::MuMinus | Self::MuPlus => 0.105_658_375_5,
            Self::PiMinus | Self::PiPlus => 0.139_570_39,
            Self::Pi0 => 0.134_976_8,
            Self::KaonMinus | Self::KaonPlus => 0.493_677,
            Self::Kaon0L => 0.497_611,
            Self::Proton | Self::AntiProton => 0.938_272_088_16,
            Self::Neutron => 0.939_565_420_52,
            Self::Deuteron => 1.875_612_942_57,
            Self::Gamma => 0.0,
        }
    }

    pub fn pdg_code(self) -> i32 {
        match self {
            Self::Electron => 11,
            Self::Positron => -11,
            Self::MuMinus => 13,
            Self::MuPlus => -13,
            Self::PiMinus => -211,
            Self::PiPlus => 211,
            Self::Pi0 => 111,
            Self::KaonMinus => -321,
            Self::KaonPlus => 321,
            Self::Kaon0L => 130,
            Self::Proton => 2212,
            Self::AntiProton => -2212,
            Self::Neutron => 2112,
            Self::Deuteron => 1_000_010_020,
            Self::Gamma => 22,
        }
    }

    /// Kinetic energy (GeV) for a momentum magnitude in GeV/c.
    pub fn kinetic_energy(self, momentum_gev: f64) -> f64 {
        let m = self.mass_gev();
        (m * m + momentum_gev * momentum_gev).sqrt() - m
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sp| sp.name() == s)
            .ok_or_else(|| Error::UnknownParticle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kernel_names() {
        assert_eq!("kaon-".parse::<Species>().unwrap(), Species::KaonMinus);
        assert_eq!("anti_proton".parse::<Species>().unwrap(), Species::AntiProton);
        assert!("kaon".parse::<Species>().is_err());
        assert!("".parse::<Species>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for sp in Species::ALL {
            assert_eq!(sp.name().parse::<Species>().unwrap(), sp);
        }
    }

    #[test]
    fn test_kinetic_energy_kaon() {
        let m = 0.493_677;
        let expected = (m * m + 0.735f64 * 0.735).sqrt() - m;
        assert!((Species::KaonMinus.kinetic_energy(0.735) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_massless_kinetic_energy_equals_momentum() {
        assert_eq!(Species::Gamma.kinetic_energy(1.5), 1.5);
    }
}
