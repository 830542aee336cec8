use kvcsim_core::QuantumEfficiencyModel;
use kvcsim_core::units::{energy_ev, wavelength_nm};

pub fn run(
    values: &[f64],
    config_path: Option<&str>,
    overrides: &[String],
    steps: usize,
    wavelength: bool,
) {
    let config = super::load_config(config_path, overrides);
    let model = match QuantumEfficiencyModel::from_config(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let energies = if values.is_empty() {
        energy_grid(model.energy_range(), steps)
    } else if wavelength {
        values.iter().map(|&nm| energy_ev(nm)).collect()
    } else {
        values.to_vec()
    };

    let (lo, hi) = model.energy_range();
    println!(
        "QE curve '{}' (scale {}, tabulated {:.3}-{:.3} eV)",
        model.table_name(),
        model.scale(),
        lo,
        hi
    );
    println!("{}", "=".repeat(60));
    println!("{:>12} {:>14} {:>12} {:>12}", "Energy (eV)", "Lambda (nm)", "Raw", "QE");
    println!("{}", "-".repeat(60));
    for e in energies {
        let clamped = if e < lo || e > hi { " *" } else { "" };
        println!(
            "{:>12.4} {:>14.2} {:>12.5} {:>12.5}{clamped}",
            e,
            wavelength_nm(e),
            model.raw(e),
            model.evaluate(e)
        );
    }
}

/// `steps` evenly spaced energies across `[lo, hi]`, both ends included.
fn energy_grid((lo, hi): (f64, f64), steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![lo],
        n => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_grid_includes_both_ends() {
        let grid = energy_grid((1.5, 3.5), 5);
        assert_eq!(grid, vec![1.5, 2.0, 2.5, 3.0, 3.5]);
        assert_eq!(energy_grid((1.5, 3.5), 1), vec![1.5]);
        assert!(energy_grid((1.5, 3.5), 0).is_empty());
    }
}
