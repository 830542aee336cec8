use kvcsim_core::optics::{self, OPTICAL_TABLES_VERSION, TABLE_NAMES};
use kvcsim_core::units::wavelength_nm;

pub fn run(name: Option<&str>) {
    match name {
        Some(name) => print_table(name),
        None => list_tables(),
    }
}

fn list_tables() {
    println!("Embedded optical tables (version {OPTICAL_TABLES_VERSION})");
    println!("{}", "=".repeat(60));
    println!("{:<26} {:>6} {:>16} {:>8}", "Table", "Points", "Range (eV)", "Max");
    println!("{}", "-".repeat(60));
    for name in TABLE_NAMES {
        let Some(table) = optics::lookup(name) else {
            continue;
        };
        let (lo, hi) = table.range();
        println!(
            "{:<26} {:>6} {:>7.3}-{:<8.3} {:>8.4}",
            name,
            table.len(),
            lo,
            hi,
            table.max_value()
        );
    }
}

fn print_table(name: &str) {
    let table = match optics::require(name) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Known tables: {}", TABLE_NAMES.join(", "));
            std::process::exit(1);
        }
    };
    println!("# {} ({} points)", table.name(), table.len());
    println!("# energy_ev value wavelength_nm");
    for (e, v) in table.energies().iter().zip(table.values()) {
        println!("{e} {v} {:.2}", wavelength_nm(*e));
    }
}
