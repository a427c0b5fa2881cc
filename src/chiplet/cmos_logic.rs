// SPDX-License-Identifier: Apache-2.0

use log::debug;

use crate::chiplet::poisson_yield;
use crate::error::Result;
use crate::tables::{CoefficientTables, GhgAbatement};

/// Defect density of a logic die, per cm².
pub const LOGIC_DEFECT_DENSITY: f64 = 0.1;

/// Defect density of a passive interposer, per cm². Interposers have far
/// fewer layers than logic dies and a correspondingly lower defect rate.
pub const INTERPOSER_DEFECT_DENSITY: f64 = 0.2 / 4.0;

/// A CMOS logic die. Also used to model silicon interposers and bridges.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicChiplet {
    node: u32,
    area: f64,
    is_interposer: bool,
    cpa_scaling: f64,
}

impl LogicChiplet {
    /// Creates a logic die of `area` cm² at process node `node` nm.
    pub fn new(node: u32, area: f64) -> Self {
        LogicChiplet {
            node,
            area,
            is_interposer: false,
            cpa_scaling: 1.0,
        }
    }

    /// Creates an interposer of `area` cm² at process node `node` nm.
    pub fn interposer(node: u32, area: f64) -> Self {
        LogicChiplet {
            is_interposer: true,
            ..LogicChiplet::new(node, area)
        }
    }

    /// Returns a copy whose carbon per unit area is multiplied by `factor`.
    pub fn with_cpa_scaling(&self, factor: f64) -> Self {
        LogicChiplet {
            cpa_scaling: factor,
            ..self.clone()
        }
    }

    pub fn with_area(&self, area: f64) -> Self {
        LogicChiplet {
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

    pub fn is_interposer(&self) -> bool {
        self.is_interposer
    }

    pub fn cpa_scaling(&self) -> f64 {
        self.cpa_scaling
    }

    /// Poisson yield of this die.
    pub fn fab_yield(&self) -> f64 {
        let defect_density = if self.is_interposer {
            INTERPOSER_DEFECT_DENSITY
        } else {
            LOGIC_DEFECT_DENSITY
        };
        poisson_yield(self.area, defect_density)
    }

    /// Manufacturing carbon in grams: carbon per area (fab energy, process
    /// gases, and raw materials, scaled by the carbon-per-area scaling
    /// factor) times area, divided by fab yield. `fab_yield` overrides the
    /// Poisson yield when given.
    pub fn manufacturing_carbon(
        &self,
        tables: &CoefficientTables,
        ci_fab: f64,
        abatement: GhgAbatement,
        fab_yield: Option<f64>,
    ) -> Result<f64> {
        let carbon_energy = ci_fab * tables.logic_epa().node(self.node)?;
        let carbon_gas = tables.gas(abatement).node(self.node)?;
        let carbon_materials = tables.materials().node(self.node)?;

        let carbon_per_area = (carbon_energy + carbon_gas + carbon_materials) * self.cpa_scaling;
        let fab_yield = fab_yield.unwrap_or_else(|| self.fab_yield());
        let carbon = carbon_per_area * self.area / fab_yield;

        debug!(
            "{}nm logic{}: {:.2} cm2, {:.2} g/cm2 (energy {:.2}, gas {:.2}, materials {:.2}), yield {:.2}%, {:.2} g",
            self.node,
            if self.is_interposer { " interposer" } else { "" },
            self.area,
            carbon_per_area,
            carbon_energy,
            carbon_gas,
            carbon_materials,
            fab_yield * 100.0,
            carbon
        );

        Ok(carbon)
    }
}
