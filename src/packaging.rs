// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::chiplet::{Chiplet, LogicChiplet};
use crate::error::{CarbonError, Result};
use crate::layout::{Axis, LayoutResult, estimate_layout};
use crate::tables::{CarbonLookup, GhgAbatement};

mod technology;
pub use technology::PackagingTechnology;

/// The layout estimator works in mm; chiplet areas are in cm².
const MM2_PER_CM2: f64 = 100.0;

/// Constants of the packaging carbon model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingParams {
    /// Yield of each chip-to-substrate or chip-to-chip bond.
    pub bonding_yield: f64,
    /// Process node of the interposer, in nm.
    pub interposer_node: u32,
    /// Shared edge length served by one inter-chiplet interface, in mm.
    pub interface_pitch_mm: f64,
    /// Through-silicon via pitch, in cm.
    pub tsv_pitch_cm: f64,
    /// Through-silicon via cell size, in cm.
    pub tsv_size_cm: f64,
    /// Router logic area per chiplet on an active interposer, in mm².
    pub router_area_mm2: f64,
    /// Redistribution layers of a fan-out package.
    pub rdl_layers: u32,
    /// Back-end-of-line layers of a reference interposer.
    pub beol_layers: u32,
    /// Area of one EMIB bridge, in mm².
    pub emib_bridge_area_mm2: f64,
    /// Process node of an EMIB bridge, in nm.
    pub emib_node: u32,
    /// Packaging carbon assigned to unrecognized technologies, in grams.
    pub fallback_carbon_g: f64,
}

impl Default for PackagingParams {
    fn default() -> Self {
        PackagingParams {
            bonding_yield: 0.99,
            interposer_node: 65,
            interface_pitch_mm: 10.0,
            tsv_pitch_cm: 0.025,
            tsv_size_cm: 0.005,
            router_area_mm2: 4.47,
            rdl_layers: 6,
            beol_layers: 8,
            emib_bridge_area_mm2: 25.0,
            emib_node: 20,
            fallback_carbon_g: 150.0,
        }
    }
}

/// The synthetic interposer spanning every substrate chiplet of a design.
#[derive(Clone, Debug, PartialEq)]
pub struct InterposerEstimate {
    /// Floorplan of the substrate chiplets, in mm.
    pub layout: LayoutResult,
    /// Interposer area, in cm².
    pub area: f64,
    /// Interposer manufacturing carbon, in grams.
    pub carbon: f64,
    /// Number of chiplets on the interposer.
    pub num_chiplets: usize,
}

/// Computes the carbon cost of assembling chiplets with one packaging
/// technology.
#[derive(Clone, Debug)]
pub struct Packager {
    technology: PackagingTechnology,
    params: PackagingParams,
    abatement: GhgAbatement,
}

impl Packager {
    pub fn new(technology: PackagingTechnology) -> Self {
        Packager {
            technology,
            params: PackagingParams::default(),
            abatement: GhgAbatement::default(),
        }
    }

    pub fn with_params(self, params: PackagingParams) -> Self {
        Packager { params, ..self }
    }

    pub fn with_abatement(self, abatement: GhgAbatement) -> Self {
        Packager { abatement, ..self }
    }

    pub fn technology(&self) -> &PackagingTechnology {
        &self.technology
    }

    pub fn params(&self) -> &PackagingParams {
        &self.params
    }

    /// Packaging carbon in grams for assembling `chiplets`, at fab carbon
    /// intensity `ci_fab` (gCO2/kWh).
    ///
    /// Memory dies are not placed on the shared substrate and are ignored
    /// by every rule. All rules other than monolithic and unrecognized
    /// technologies require at least one remaining chiplet.
    pub fn packaging_carbon<L: CarbonLookup + ?Sized>(
        &self,
        chiplets: &[Chiplet],
        ci_fab: f64,
        lookup: &L,
    ) -> Result<f64> {
        let bonding_yield = self.params.bonding_yield;

        let carbon = match &self.technology {
            PackagingTechnology::Monolithic => 0.0,
            PackagingTechnology::Stacked3d => {
                // Stacking does not use the interposer, but its coefficients
                // must still resolve.
                self.estimate_interposer(chiplets, ci_fab, lookup)?;
                self.stacked_carbon(chiplets, ci_fab, lookup)?
            }
            PackagingTechnology::PassiveInterposer => {
                let interposer = self.estimate_interposer(chiplets, ci_fab, lookup)?;
                interposer.carbon / bonding_yield
            }
            PackagingTechnology::ActiveInterposer => {
                let interposer = self.estimate_interposer(chiplets, ci_fab, lookup)?;
                let router_area =
                    self.params.router_area_mm2 / MM2_PER_CM2 * interposer.num_chiplets as f64;
                let router_carbon = interposer.carbon * router_area / interposer.area;
                (interposer.carbon - router_carbon) / bonding_yield
            }
            PackagingTechnology::Rdl => {
                let interposer = self.estimate_interposer(chiplets, ci_fab, lookup)?;
                interposer.carbon * self.params.rdl_layers as f64
                    / self.params.beol_layers as f64
                    / bonding_yield
            }
            PackagingTechnology::Emib => {
                let interposer = self.estimate_interposer(chiplets, ci_fab, lookup)?;
                let bridge_carbon = self.bridge_carbon(ci_fab, lookup)?;
                bridge_carbon * interposer.layout.interface_count() / bonding_yield
            }
            PackagingTechnology::Unrecognized(tag) => self.fallback_carbon(tag),
        };

        info!("{} packaging carbon: {:.2} g", self.technology, carbon);
        Ok(carbon)
    }

    /// Lays out the substrate chiplets and costs an interposer covering
    /// them.
    pub fn estimate_interposer<L: CarbonLookup + ?Sized>(
        &self,
        chiplets: &[Chiplet],
        ci_fab: f64,
        lookup: &L,
    ) -> Result<InterposerEstimate> {
        let areas_mm2 = self
            .substrate(chiplets)?
            .iter()
            .map(|(_, area)| area * MM2_PER_CM2)
            .collect_vec();

        let layout = estimate_layout(&areas_mm2, Axis::X, self.params.interface_pitch_mm);
        let area = layout.area() / MM2_PER_CM2;

        let node = self.params.interposer_node;
        let interposer = LogicChiplet::interposer(node, area)
            .with_cpa_scaling(lookup.cpa_scaling_factor(node)?);
        let carbon = lookup.manufacturing_carbon(&interposer.into(), ci_fab, self.abatement, None)?;

        debug!(
            "interposer: {:.2} x {:.2} mm, {:.2} cm2, {} interfaces, {:.2} g",
            layout.width(),
            layout.height(),
            area,
            layout.interface_count(),
            carbon
        );

        Ok(InterposerEstimate {
            layout,
            area,
            carbon,
            num_chiplets: areas_mm2.len(),
        })
    }

    /// Chiplets placed on the shared substrate, paired with their areas.
    fn substrate<'a>(&self, chiplets: &'a [Chiplet]) -> Result<Vec<(&'a Chiplet, f64)>> {
        let substrate = chiplets
            .iter()
            .filter_map(|chiplet| chiplet.area().map(|area| (chiplet, area)))
            .collect_vec();
        if substrate.is_empty() {
            return Err(CarbonError::EmptyAssembly(self.technology.to_string()));
        }
        Ok(substrate)
    }

    /// Extra die area consumed by TSV keep-out cells on a die of `area`
    /// cm².
    pub fn tsv_overhead(&self, area: f64) -> f64 {
        let tsvs_per_side = (area.sqrt() / self.params.tsv_pitch_cm).floor();
        tsvs_per_side.powi(2) * self.params.tsv_size_cm.powi(2)
    }

    // Each die grows by its TSV overhead. Yield loss compounds over every
    // bonded die.
    fn stacked_carbon<L: CarbonLookup + ?Sized>(
        &self,
        chiplets: &[Chiplet],
        ci_fab: f64,
        lookup: &L,
    ) -> Result<f64> {
        let substrate = self.substrate(chiplets)?;

        let mut overhead_carbon = 0.0;
        for (chiplet, area) in &substrate {
            let planar = lookup.manufacturing_carbon(chiplet, ci_fab, self.abatement, None)?;
            let stacked = lookup.manufacturing_carbon(
                &chiplet.with_area(area + self.tsv_overhead(*area)),
                ci_fab,
                self.abatement,
                None,
            )?;
            overhead_carbon += stacked - planar;
        }

        Ok(overhead_carbon / self.params.bonding_yield.powi(substrate.len() as i32))
    }

    /// Manufacturing carbon of one EMIB bridge, fabricated at the bonding
    /// yield.
    fn bridge_carbon<L: CarbonLookup + ?Sized>(&self, ci_fab: f64, lookup: &L) -> Result<f64> {
        let node = self.params.emib_node;
        let bridge = LogicChiplet::new(node, self.params.emib_bridge_area_mm2 / MM2_PER_CM2)
            .with_cpa_scaling(lookup.cpa_scaling_factor(node)?);
        lookup.manufacturing_carbon(
            &bridge.into(),
            ci_fab,
            self.abatement,
            Some(self.params.bonding_yield),
        )
    }

    fn fallback_carbon(&self, tag: &str) -> f64 {
        warn!(
            "unrecognized packaging technology '{tag}', assuming {} g of packaging carbon",
            self.params.fallback_carbon_g
        );
        self.params.fallback_carbon_g
    }
}

/// Packaging carbon in grams for assembling `chiplets` with `technology`,
/// using the default packaging constants and 95% GHG abatement.
pub fn allocate_packaging_carbon<L: CarbonLookup + ?Sized>(
    chiplets: &[Chiplet],
    ci_fab: f64,
    technology: &PackagingTechnology,
    lookup: &L,
) -> Result<f64> {
    Packager::new(technology.clone()).packaging_carbon(chiplets, ci_fab, lookup)
}
