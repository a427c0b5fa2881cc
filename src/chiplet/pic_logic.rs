// SPDX-License-Identifier: Apache-2.0

use log::debug;

use crate::chiplet::poisson_yield;
use crate::error::Result;
use crate::tables::{CoefficientTables, GhgAbatement};

/// Actuation type assumed when an architecture does not name one.
pub const DEFAULT_ACTUATION: &str = "default";

/// Photonic processes are costed on gas and materials at this CMOS node.
pub const CMOS_EQUIVALENT_NODE: u32 = 65;

/// Fraction of a photonic die that is sensitive to defects.
const SENSITIVE_AREA_FRACTION: f64 = 0.2;
const DEFECT_DENSITY: f64 = 0.1;

/// A photonic integrated circuit die.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotonicChiplet {
    node: u32,
    area: f64,
    actuation: String,
}

impl PhotonicChiplet {
    pub fn new(node: u32, area: f64, actuation: impl AsRef<str>) -> Self {
        PhotonicChiplet {
            node,
            area,
            actuation: actuation.as_ref().to_string(),
        }
    }

    pub fn with_area(&self, area: f64) -> Self {
        PhotonicChiplet {
            area,
            ..self.clone()
        }
    }

    pub fn node(&self) -> u32 {
        self.node
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Phase-shifter actuation type, e.g. `fcd`, `mems`, or `both`.
    pub fn actuation(&self) -> &str {
        &self.actuation
    }

    pub fn fab_yield(&self) -> f64 {
        poisson_yield(self.area * SENSITIVE_AREA_FRACTION, DEFECT_DENSITY)
    }

    pub fn manufacturing_carbon(
        &self,
        tables: &CoefficientTables,
        ci_fab: f64,
        abatement: GhgAbatement,
        fab_yield: Option<f64>,
    ) -> Result<f64> {
        let carbon_energy = ci_fab * tables.photonic_epa().get(&self.actuation)?;
        let carbon_gas = tables.gas(abatement).node(CMOS_EQUIVALENT_NODE)?;
        let carbon_materials = tables.materials().node(CMOS_EQUIVALENT_NODE)?;

        let carbon_per_area = carbon_energy + carbon_gas + carbon_materials;
        let fab_yield = fab_yield.unwrap_or_else(|| self.fab_yield());
        let carbon = carbon_per_area * self.area / fab_yield;

        debug!(
            "{}nm photonic ({} actuation): {:.2} cm2, {:.2} g/cm2, yield {:.2}%, {:.2} g",
            self.node,
            self.actuation,
            self.area,
            carbon_per_area,
            fab_yield * 100.0,
            carbon
        );

        Ok(carbon)
    }
}
