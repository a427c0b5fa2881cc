// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use indexmap::IndexMap;
use log::info;

use crate::arch::Architecture;
use crate::config::CarbonConfig;
use crate::error::Result;
use crate::tables::CarbonLookup;

/// Key of the packaging entry in an [`EmbodiedBreakdown`].
pub const PACKAGE: &str = "package";

/// Embodied carbon by component, in grams. Chiplets are grouped by kind;
/// packaging is recorded under [`PACKAGE`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbodiedBreakdown {
    components: IndexMap<String, f64>,
}

impl EmbodiedBreakdown {
    fn add(&mut self, component: &str, carbon: f64) {
        *self.components.entry(component.to_string()).or_insert(0.0) += carbon;
    }

    pub fn get(&self, component: &str) -> Option<f64> {
        self.components.get(component).copied()
    }

    pub fn package(&self) -> f64 {
        self.get(PACKAGE).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.components.values().sum()
    }

    /// Components in the order they were first encountered.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.components
            .iter()
            .map(|(component, carbon)| (component.as_str(), *carbon))
    }
}

impl fmt::Display for EmbodiedBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total ECF                   = {:.2} gCO2", self.total())?;
        for (component, carbon) in self.iter() {
            writeln!(f, "  - {component:<24}: {carbon:.2} gCO2")?;
        }
        Ok(())
    }
}

/// Embodied plus operational carbon of one architecture and workload.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    pub embodied: EmbodiedBreakdown,
    /// Lifetime operational carbon, in grams.
    pub operational: f64,
}

impl Footprint {
    pub fn total(&self) -> f64 {
        self.embodied.total() + self.operational
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total CF                    = {:.2} gCO2", self.total())?;
        writeln!(f, "  - Operational (OCF)       : {:.2} gCO2", self.operational)?;
        writeln!(
            f,
            "  - Embodied (ECF)          : {:.2} gCO2",
            self.embodied.total()
        )
    }
}

/// Manufacturing carbon of every chiplet of `arch` plus the carbon of
/// packaging them.
pub fn embodied_carbon<L: CarbonLookup + ?Sized>(
    arch: &Architecture,
    config: &CarbonConfig,
    lookup: &L,
) -> Result<EmbodiedBreakdown> {
    let mut breakdown = EmbodiedBreakdown::default();

    for chiplet in &arch.chiplets {
        let carbon =
            lookup.manufacturing_carbon(chiplet, config.ci_fab, config.ghg_abatement, None)?;
        breakdown.add(chiplet.kind().tag(), carbon);
    }

    let packaging = config
        .packager(arch.technology.clone())
        .packaging_carbon(&arch.chiplets, config.ci_fab, lookup)?;
    breakdown.add(PACKAGE, packaging);

    info!(
        "{}: embodied carbon {:.2} g at {} gCO2/kWh",
        arch.name,
        breakdown.total(),
        config.ci_fab
    );

    Ok(breakdown)
}

/// Embodied carbon of `arch` plus the lifetime operational carbon of a
/// workload consuming `energy_per_inference` joules per inference.
pub fn carbon_footprint<L: CarbonLookup + ?Sized>(
    arch: &Architecture,
    energy_per_inference: f64,
    config: &CarbonConfig,
    lookup: &L,
) -> Result<Footprint> {
    let embodied = embodied_carbon(arch, config, lookup)?;
    let operational = config.operational_carbon(energy_per_inference);
    Ok(Footprint {
        embodied,
        operational,
    })
}
