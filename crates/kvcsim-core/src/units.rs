//! Unit conventions.
//!
//! Photon energies are in eV, wavelengths in nm, beam energies and momenta in
//! GeV (GeV/c), lengths in mm and times in ns. Nothing converts implicitly;
//! every field name in records carries its unit in the docs.

/// h·c in eV·nm.
pub const HC_EV_NM: f64 = 1239.841_984_332_002_6;

/// FWHM → σ for a Gaussian.
pub const FWHM_TO_SIGMA: f64 = 1.0 / 2.354_820_045_030_949;

/// Photon wavelength (nm) for a photon energy in eV.
pub fn wavelength_nm(energy_ev: f64) -> f64 {
    HC_EV_NM / energy_ev
}

/// Photon energy (eV) for a wavelength in nm.
pub fn energy_ev(wavelength_nm: f64) -> f64 {
    HC_EV_NM / wavelength_nm
}
