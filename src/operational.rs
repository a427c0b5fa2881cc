// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::error::{CarbonError, Result, read_to_string};

const JOULES_PER_KWH: f64 = 1000.0 * 3600.0;

/// Name under which a performance file is reported in lookup errors.
const PERF_TABLE: &str = "energy per inference";

/// Reads the energy per inference, in joules, of the network `dnn` from a
/// performance file: a JSON object mapping network names to joules.
pub fn energy_per_inference(perf_file: impl AsRef<Path>, dnn: &str) -> Result<f64> {
    let perf_file = perf_file.as_ref();
    let energies: IndexMap<String, f64> = serde_json::from_str(&read_to_string(perf_file)?)?;
    let energy = energies
        .get(dnn)
        .copied()
        .ok_or_else(|| CarbonError::MissingCoefficient {
            table: PERF_TABLE,
            key: dnn.to_string(),
        })?;
    debug!("{dnn}: {energy:.2e} J/inference from {}", perf_file.display());
    Ok(energy)
}

/// Operational carbon in grams of a chip running `inferences_per_day`
/// inferences of `energy_per_inference` joules each for `lifetime_days`
/// days on electricity of carbon intensity `ci_op` gCO2/kWh.
pub fn operational_carbon(
    energy_per_inference: f64,
    ci_op: f64,
    inferences_per_day: f64,
    lifetime_days: f64,
) -> f64 {
    let carbon_per_inference = energy_per_inference / JOULES_PER_KWH * ci_op;
    let carbon_per_day = carbon_per_inference * inferences_per_day;
    let carbon = carbon_per_day * lifetime_days;

    debug!(
        "operational: {energy_per_inference:.2e} J/inference, {carbon_per_inference:.2e} g/inference, \
         {carbon_per_day:.2e} g/day over {lifetime_days} days"
    );

    carbon
}
