// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, read_to_string};
use crate::operational::operational_carbon;
use crate::packaging::{Packager, PackagingParams, PackagingTechnology};
use crate::tables::GhgAbatement;

/// Parameters of a carbon estimate. Passed explicitly to every
/// computation; nothing here is global.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonConfig {
    /// Carbon intensity of fab electricity, gCO2/kWh. The default is a
    /// coal-heavy grid.
    pub ci_fab: f64,
    /// Carbon intensity of electricity during operation, gCO2/kWh. The
    /// default is wind.
    pub ci_op: f64,
    pub ghg_abatement: GhgAbatement,
    pub inferences_per_day: f64,
    pub lifetime_days: f64,
    pub packaging: PackagingParams,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        CarbonConfig {
            ci_fab: 820.0,
            ci_op: 11.0,
            ghg_abatement: GhgAbatement::Percent95,
            inferences_per_day: 1e9,
            lifetime_days: 5.0 * 365.0,
            packaging: PackagingParams::default(),
        }
    }
}

impl CarbonConfig {
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&read_to_string(path.as_ref())?)
    }

    /// A packager for `technology` using this configuration's packaging
    /// constants and abatement level.
    pub fn packager(&self, technology: PackagingTechnology) -> Packager {
        Packager::new(technology)
            .with_params(self.packaging.clone())
            .with_abatement(self.ghg_abatement)
    }

    /// Lifetime operational carbon, in grams, of a workload consuming
    /// `energy_per_inference` joules per inference.
    pub fn operational_carbon(&self, energy_per_inference: f64) -> f64 {
        operational_carbon(
            energy_per_inference,
            self.ci_op,
            self.inferences_per_day,
            self.lifetime_days,
        )
    }
}
