use exciton_config::prelude::*;

const CONFIG: &str = r#"
n_k_points: 50
n_occupied_total: 13
n_unoccupied_total: 37
n_isdf_vexc: 3
n_isdf_wscr_occupied: 4
n_isdf_wscr_unoccupied: 5
max_lanczos_iterations: 200
omega_range: [1.0, 2.0]
n_omega: 1500
"#;

const SPECTRUM: &str = r#"
spectrum:
  energy_interval: [0.0, 2.5]
  n_sampling: 1000
  peak:
    form: gauss
"#;

fn main() -> Result<(), Error> {
    // gate a full document against the canonical schema
    let doc = serde_yaml::from_str(CONFIG)?;
    let config = Config::new(&doc)?;
    config.validate()?;

    println!(
        "\n-- Loaded Configuration --\n\
        k-points:            {}\n\
        bands (occ + unocc): {} + {}\n\
        omega range:         {}\n\
        CVT iterations:      {} (default)\n\
        seed source:         {}\n",
        config.n_k_points,
        config.n_occupied_total,
        config.n_unoccupied_total,
        config.omega_range,
        config.max_cvt_iterations,
        config.seed_source,
    );

    // load a composite node from its own document
    let doc = serde_yaml::from_str(SPECTRUM)?;
    let mut spectrum = Spectrum::new("spectrum")?;
    spectrum.load(&doc)?;

    println!(
        "-- Loaded Spectrum --\n\
        {}\n\
        {}\n\
        {}\n\
        {}\n",
        spectrum.energy_interval, spectrum.n_sampling, spectrum.peak.width, spectrum.peak.form,
    );

    // malformed documents report the dotted path to the offending field
    let broken = serde_yaml::from_str(
        "spectrum: {energy_interval: [2.5, 0.0], n_sampling: 1000}",
    )?;
    let mut spectrum = Spectrum::new("spectrum")?;
    if let Err(error) = spectrum.load(&broken) {
        println!("-- Expected Failure --\n{error}");
    }

    Ok(())
}
