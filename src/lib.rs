// SPDX-License-Identifier: Apache-2.0

//! Carbon footprint estimation for chiplet-based integrated circuits.
//!
//! Embodied carbon is the sum of each chiplet's manufacturing carbon and the
//! carbon of packaging the chiplets together. Operational carbon is the
//! carbon of the electricity consumed by a workload over the chip's life.

mod arch;
mod chiplet;
mod config;
mod error;
mod footprint;
mod layout;
mod operational;
mod packaging;
mod tables;

pub use arch::Architecture;
pub use chiplet::{
    Chiplet, ChipletFootprint, ChipletKind, DEFAULT_ACTUATION, DramChiplet, LogicChiplet,
    PhotonicChiplet,
};
pub use config::CarbonConfig;
pub use error::{CarbonError, Result};
pub use footprint::{EmbodiedBreakdown, Footprint, PACKAGE, carbon_footprint, embodied_carbon};
pub use layout::{Axis, DEFAULT_INTERFACE_PITCH, LayoutResult, SPLIT_OVERHEAD, estimate_layout};
pub use operational::{energy_per_inference, operational_carbon};
pub use packaging::{
    InterposerEstimate, Packager, PackagingParams, PackagingTechnology,
    allocate_packaging_carbon,
};
pub use tables::{
    CarbonLookup, CoefficientTable, CoefficientTables, GhgAbatement, node_key, parse_node_key,
};
