// SPDX-License-Identifier: Apache-2.0

use log::debug;

use crate::error::Result;
use crate::tables::CoefficientTables;

pub const DRAM_FAB_YIELD: f64 = 0.875;

/// A memory die, sized by capacity rather than area.
#[derive(Clone, Debug, PartialEq)]
pub struct DramChiplet {
    node: u32,
    dram_type: String,
    size_gb: f64,
}

impl DramChiplet {
    /// `dram_type` keys the per-GB carbon table, e.g. `ddr4_10nm`.
    pub fn new(node: u32, dram_type: impl AsRef<str>, size_gb: f64) -> Self {
        DramChiplet {
            node,
            dram_type: dram_type.as_ref().to_string(),
            size_gb,
        }
    }

    pub fn node(&self) -> u32 {
        self.node
    }

    pub fn dram_type(&self) -> &str {
        &self.dram_type
    }

    pub fn size_gb(&self) -> f64 {
        self.size_gb
    }

    /// Manufacturing carbon in grams. The tabulated per-GB figure is
    /// yield-adjusted once to a per-good-GB figure and once more for the
    /// die itself.
    pub fn manufacturing_carbon(
        &self,
        tables: &CoefficientTables,
        fab_yield: Option<f64>,
    ) -> Result<f64> {
        let fab_yield = fab_yield.unwrap_or(DRAM_FAB_YIELD);
        let carbon_per_gb = tables.dram().get(&self.dram_type)? / fab_yield;
        let carbon = carbon_per_gb * self.size_gb / fab_yield;

        debug!(
            "{} DRAM: {} GB at {:.2} g/GB, {:.2} g",
            self.dram_type, self.size_gb, carbon_per_gb, carbon
        );

        Ok(carbon)
    }
}
