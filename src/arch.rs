// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::chiplet::{Chiplet, DEFAULT_ACTUATION, DramChiplet, LogicChiplet, PhotonicChiplet};
use crate::error::{CarbonError, Result, read_to_string};
use crate::packaging::PackagingTechnology;
use crate::tables::parse_node_key;

/// A chip described as a set of chiplets and the technology that packages
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Architecture {
    pub name: String,
    pub chip_type: String,
    pub technology: PackagingTechnology,
    pub chiplets: Vec<Chiplet>,
}

#[derive(Deserialize)]
struct ArchDescription {
    name: String,
    #[serde(rename = "type")]
    chip_type: String,
    package: String,
    chiplets: Vec<ChipletEntry>,
}

#[derive(Deserialize)]
struct ChipletEntry {
    #[serde(flatten)]
    spec: ChipletSpec,
    #[serde(default = "one")]
    num_chiplets: usize,
}

fn one() -> usize {
    1
}

fn default_actuation() -> String {
    DEFAULT_ACTUATION.to_string()
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ChipletSpec {
    #[serde(rename = "cmos-logic")]
    CmosLogic { tech: TechNode, area: f64 },
    #[serde(rename = "pic-logic")]
    PicLogic {
        tech: TechNode,
        area: f64,
        #[serde(default = "default_actuation")]
        actuation_type: String,
    },
    #[serde(rename = "dram")]
    Dram {
        tech: TechNode,
        #[serde(rename = "dram-type")]
        dram_type: String,
        #[serde(rename = "size-gb")]
        size_gb: f64,
    },
}

/// Process node given either as a number of nanometres or as a string
/// such as `"7nm"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TechNode {
    Nanometres(u32),
    Tagged(String),
}

impl TechNode {
    fn nanometres(&self) -> Result<u32> {
        match self {
            TechNode::Nanometres(node) => Ok(*node),
            TechNode::Tagged(tag) => parse_node_key(tag).ok_or_else(|| {
                CarbonError::InvalidArchitecture(format!("cannot parse process node '{tag}'"))
            }),
        }
    }
}

fn check_positive(what: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CarbonError::InvalidArchitecture(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

impl ChipletSpec {
    fn to_chiplet(&self) -> Result<Chiplet> {
        Ok(match self {
            ChipletSpec::CmosLogic { tech, area } => {
                LogicChiplet::new(tech.nanometres()?, check_positive("chiplet area", *area)?)
                    .into()
            }
            ChipletSpec::PicLogic {
                tech,
                area,
                actuation_type,
            } => PhotonicChiplet::new(
                tech.nanometres()?,
                check_positive("chiplet area", *area)?,
                actuation_type,
            )
            .into(),
            ChipletSpec::Dram {
                tech,
                dram_type,
                size_gb,
            } => DramChiplet::new(
                tech.nanometres()?,
                dram_type,
                check_positive("DRAM size", *size_gb)?,
            )
            .into(),
        })
    }
}

impl Architecture {
    pub fn new(
        name: impl AsRef<str>,
        chip_type: impl AsRef<str>,
        technology: PackagingTechnology,
        chiplets: Vec<Chiplet>,
    ) -> Self {
        Architecture {
            name: name.as_ref().to_string(),
            chip_type: chip_type.as_ref().to_string(),
            technology,
            chiplets,
        }
    }

    /// Parses a JSON architecture description. Entries with a
    /// `num_chiplets` field are replicated that many times.
    pub fn from_json(json: &str) -> Result<Self> {
        let description: ArchDescription = serde_json::from_str(json)?;

        let mut chiplets = Vec::new();
        for entry in &description.chiplets {
            let chiplet = entry.spec.to_chiplet()?;
            chiplets.extend(std::iter::repeat_n(chiplet, entry.num_chiplets));
        }

        let architecture = Architecture {
            name: description.name,
            chip_type: description.chip_type,
            technology: PackagingTechnology::from_tag(&description.package),
            chiplets,
        };

        debug!(
            "{} (type: {}) with {} chiplets, {} packaging",
            architecture.name,
            architecture.chip_type,
            architecture.chiplets.len(),
            architecture.technology
        );
        for chiplet in &architecture.chiplets {
            debug!("  {chiplet}");
        }

        Ok(architecture)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&read_to_string(path.as_ref())?)
    }

    /// Die areas, in cm², of the chiplets that have one. Memory dies are
    /// skipped.
    pub fn areas(&self) -> Vec<f64> {
        self.chiplets.iter().filter_map(Chiplet::area).collect()
    }
}
