// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::PathBuf;

use chiplet_carbon::{
    Architecture, CarbonConfig, CoefficientTables, carbon_footprint, embodied_carbon,
    energy_per_inference,
};
use clap::{Parser, ValueEnum};
use log::info;

/// Estimate the carbon footprint of a chiplet-based chip
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Which metric to estimate
    #[arg(long, value_enum, default_value_t = Estimate::Ecf)]
    estimate: Estimate,

    /// Architecture description file (JSON)
    #[arg(long, default_value = "archs/default_arch.json")]
    arch: PathBuf,

    /// Energy per inference in joules (OCF and CF need this or --perf-file)
    #[arg(long)]
    energy: Option<f64>,

    /// Performance file (JSON) mapping network names to energy per inference
    #[arg(long, requires = "dnn", conflicts_with = "energy")]
    perf_file: Option<PathBuf>,

    /// Network whose energy per inference is read from --perf-file
    #[arg(long, requires = "perf_file")]
    dnn: Option<String>,

    /// Carbon parameters (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of coefficient tables to use instead of the built-in ones
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Fab carbon intensity in gCO2/kWh, overriding the configuration
    #[arg(long)]
    ci_fab: Option<f64>,

    /// Operational carbon intensity in gCO2/kWh, overriding the configuration
    #[arg(long)]
    ci_op: Option<f64>,

    /// Enable detailed logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Estimate {
    /// Operational carbon footprint
    #[value(alias = "OCF")]
    Ocf,
    /// Embodied carbon footprint
    #[value(alias = "ECF")]
    Ecf,
    /// Combined carbon footprint
    #[value(alias = "CF")]
    Cf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let mut config = match &cli.config {
        Some(path) => CarbonConfig::from_file(path)?,
        None => CarbonConfig::default(),
    };
    if let Some(ci_fab) = cli.ci_fab {
        config.ci_fab = ci_fab;
    }
    if let Some(ci_op) = cli.ci_op {
        config.ci_op = ci_op;
    }

    let energy = || -> Result<f64, Box<dyn Error>> {
        match (cli.energy, &cli.perf_file, &cli.dnn) {
            (Some(energy), _, _) => Ok(energy),
            (None, Some(perf_file), Some(dnn)) => Ok(energy_per_inference(perf_file, dnn)?),
            _ => Err("energy per inference (--energy, or --perf-file with --dnn) must be \
                      provided for OCF and CF estimates"
                .into()),
        }
    };

    match cli.estimate {
        Estimate::Ocf => {
            let energy = energy()?;
            info!(
                "{energy:.2e} J/inference, {:.0e} inferences/day, {} days",
                config.inferences_per_day, config.lifetime_days
            );
            println!(
                "Total OCF                   = {:.2} gCO2",
                config.operational_carbon(energy)
            );
        }
        Estimate::Ecf | Estimate::Cf => {
            let tables = match &cli.data_dir {
                Some(dir) => CoefficientTables::from_dir(dir)?,
                None => CoefficientTables::builtin()?,
            };
            let arch = Architecture::from_file(&cli.arch)?;
            println!("{} ({}), {} packaging", arch.name, arch.chip_type, arch.technology);

            if cli.estimate == Estimate::Ecf {
                print!("{}", embodied_carbon(&arch, &config, &tables)?);
            } else {
                let footprint = carbon_footprint(&arch, energy()?, &config, &tables)?;
                print!("{}", footprint.embodied);
                print!("{footprint}");
            }
        }
    }

    Ok(())
}
