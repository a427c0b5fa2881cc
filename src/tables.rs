// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chiplet::Chiplet;
use crate::error::{CarbonError, Result, read_to_string};

/// Key of the entry for process node `node` nm, e.g. `65nm`.
pub fn node_key(node: u32) -> String {
    format!("{node}nm")
}

static NODE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*(?:nm)?\s*$").unwrap());

/// Parses a process node written as `7`, `7nm`, or `7 nm`.
pub fn parse_node_key(key: &str) -> Option<u32> {
    NODE_KEY_RE
        .captures(key)
        .and_then(|captures| captures[1].parse().ok())
}

/// Percentage of fluorinated process gases abated at the fab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GhgAbatement {
    #[default]
    Percent95,
    Percent99,
}

impl TryFrom<u32> for GhgAbatement {
    type Error = CarbonError;

    fn try_from(percent: u32) -> Result<Self> {
        match percent {
            95 => Ok(GhgAbatement::Percent95),
            99 => Ok(GhgAbatement::Percent99),
            other => Err(CarbonError::UnsupportedAbatement(other)),
        }
    }
}

impl From<GhgAbatement> for u32 {
    fn from(abatement: GhgAbatement) -> u32 {
        match abatement {
            GhgAbatement::Percent95 => 95,
            GhgAbatement::Percent99 => 99,
        }
    }
}

/// One named table of coefficients.
#[derive(Clone, Debug)]
pub struct CoefficientTable {
    name: &'static str,
    entries: IndexMap<String, f64>,
}

impl CoefficientTable {
    fn parse(name: &'static str, json: &str) -> Result<Self> {
        Ok(CoefficientTable {
            name,
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Result<f64> {
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| CarbonError::MissingCoefficient {
                table: self.name,
                key: key.to_string(),
            })
    }

    /// Looks up the entry for process node `node` nm.
    pub fn node(&self, node: u32) -> Result<f64> {
        self.get(&node_key(node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

const LOGIC_EPA: &str = "cmos_logic/epa.json";
const LOGIC_GPA_95: &str = "cmos_logic/gpa_95.json";
const LOGIC_GPA_99: &str = "cmos_logic/gpa_99.json";
const LOGIC_MATERIALS: &str = "cmos_logic/materials.json";
const BEOL_FEOL_SCALING: &str = "cmos_logic/beol_feol_scaling.json";
const PHOTONIC_EPA: &str = "pic_logic/epa.json";
const DRAM: &str = "dram/dram_hynix.json";

/// All tabulated coefficients needed to compute manufacturing carbon.
#[derive(Clone, Debug)]
pub struct CoefficientTables {
    logic_epa: CoefficientTable,
    gpa_95: CoefficientTable,
    gpa_99: CoefficientTable,
    materials: CoefficientTable,
    beol_feol_scaling: CoefficientTable,
    photonic_epa: CoefficientTable,
    dram: CoefficientTable,
}

impl CoefficientTables {
    /// The tables shipped with this crate.
    pub fn builtin() -> Result<Self> {
        Self::load(|file| {
            Ok(match file {
                LOGIC_EPA => include_str!("../data/cmos_logic/epa.json"),
                LOGIC_GPA_95 => include_str!("../data/cmos_logic/gpa_95.json"),
                LOGIC_GPA_99 => include_str!("../data/cmos_logic/gpa_99.json"),
                LOGIC_MATERIALS => include_str!("../data/cmos_logic/materials.json"),
                BEOL_FEOL_SCALING => include_str!("../data/cmos_logic/beol_feol_scaling.json"),
                PHOTONIC_EPA => include_str!("../data/pic_logic/epa.json"),
                DRAM => include_str!("../data/dram/dram_hynix.json"),
                other => unreachable!("no built-in table {other}"),
            }
            .to_string())
        })
    }

    /// Loads tables from a directory laid out like the crate's `data`
    /// directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::load(|file| read_to_string(&dir.join(file)))
    }

    fn load(read: impl Fn(&str) -> Result<String>) -> Result<Self> {
        let table = |file: &'static str| CoefficientTable::parse(file, &read(file)?);
        Ok(CoefficientTables {
            logic_epa: table(LOGIC_EPA)?,
            gpa_95: table(LOGIC_GPA_95)?,
            gpa_99: table(LOGIC_GPA_99)?,
            materials: table(LOGIC_MATERIALS)?,
            beol_feol_scaling: table(BEOL_FEOL_SCALING)?,
            photonic_epa: table(PHOTONIC_EPA)?,
            dram: table(DRAM)?,
        })
    }

    /// Fab energy per area, kWh/cm², by node.
    pub fn logic_epa(&self) -> &CoefficientTable {
        &self.logic_epa
    }

    /// Process gas emissions per area, g/cm², by node.
    pub fn gas(&self, abatement: GhgAbatement) -> &CoefficientTable {
        match abatement {
            GhgAbatement::Percent95 => &self.gpa_95,
            GhgAbatement::Percent99 => &self.gpa_99,
        }
    }

    /// Raw material emissions per area, g/cm², by node.
    pub fn materials(&self) -> &CoefficientTable {
        &self.materials
    }

    /// Carbon-per-area scaling for dies with a reduced layer stack, by node.
    pub fn beol_feol_scaling(&self) -> &CoefficientTable {
        &self.beol_feol_scaling
    }

    /// Photonic fab energy per area, kWh/cm², by actuation type.
    pub fn photonic_epa(&self) -> &CoefficientTable {
        &self.photonic_epa
    }

    /// DRAM emissions per GB, by DRAM type.
    pub fn dram(&self) -> &CoefficientTable {
        &self.dram
    }
}

/// Source of per-chiplet manufacturing carbon.
pub trait CarbonLookup {
    /// Manufacturing carbon of `chiplet` in grams, at fab carbon intensity
    /// `ci_fab` (gCO2/kWh). `fab_yield` replaces the chiplet's own yield
    /// model when given.
    fn manufacturing_carbon(
        &self,
        chiplet: &Chiplet,
        ci_fab: f64,
        abatement: GhgAbatement,
        fab_yield: Option<f64>,
    ) -> Result<f64>;

    /// Carbon-per-area scaling factor for an interposer or bridge built at
    /// process node `node` nm.
    fn cpa_scaling_factor(&self, node: u32) -> Result<f64>;
}

impl CarbonLookup for CoefficientTables {
    fn manufacturing_carbon(
        &self,
        chiplet: &Chiplet,
        ci_fab: f64,
        abatement: GhgAbatement,
        fab_yield: Option<f64>,
    ) -> Result<f64> {
        match chiplet {
            Chiplet::CmosLogic(chiplet) => {
                chiplet.manufacturing_carbon(self, ci_fab, abatement, fab_yield)
            }
            Chiplet::PicLogic(chiplet) => {
                chiplet.manufacturing_carbon(self, ci_fab, abatement, fab_yield)
            }
            Chiplet::Dram(chiplet) => chiplet.manufacturing_carbon(self, fab_yield),
        }
    }

    fn cpa_scaling_factor(&self, node: u32) -> Result<f64> {
        self.beol_feol_scaling.node(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chiplet::{DEFAULT_ACTUATION, DramChiplet, LogicChiplet, PhotonicChiplet};

    #[test]
    fn node_keys() {
        assert_eq!(node_key(65), "65nm");
        assert_eq!(parse_node_key("7nm"), Some(7));
        assert_eq!(parse_node_key(" 14 nm "), Some(14));
        assert_eq!(parse_node_key("28"), Some(28));
        assert_eq!(parse_node_key("7nm-EUV"), None);
    }

    #[test]
    fn abatement_from_percent() {
        assert_eq!(GhgAbatement::try_from(99).unwrap(), GhgAbatement::Percent99);
        assert!(matches!(
            GhgAbatement::try_from(90),
            Err(CarbonError::UnsupportedAbatement(90))
        ));
    }

    #[test]
    fn builtin_tables_cover_reference_nodes() {
        let tables = CoefficientTables::builtin().unwrap();
        for node in [7, 20, 65] {
            tables.logic_epa().node(node).unwrap();
            tables.gas(GhgAbatement::Percent95).node(node).unwrap();
            tables.gas(GhgAbatement::Percent99).node(node).unwrap();
            tables.materials().node(node).unwrap();
            tables.cpa_scaling_factor(node).unwrap();
        }
        assert!(tables.photonic_epa().keys().any(|key| key == "default"));
    }

    #[test]
    fn logic_carbon_formula() {
        let tables = CoefficientTables::builtin().unwrap();
        let chiplet = LogicChiplet::new(7, 1.0);
        let carbon_per_area = 820.0 * tables.logic_epa().node(7).unwrap()
            + tables.gas(GhgAbatement::Percent95).node(7).unwrap()
            + tables.materials().node(7).unwrap();
        let expected = carbon_per_area / (-0.1_f64).exp();
        let carbon = tables
            .manufacturing_carbon(&chiplet.into(), 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        assert!((carbon - expected).abs() < 1e-9);
    }

    #[test]
    fn pic_logic_carbon_formula() {
        let tables = CoefficientTables::builtin().unwrap();
        let chiplet = PhotonicChiplet::new(45, 1.5, "mems");
        // mems actuation energy, with 65 nm gas and materials
        let carbon_per_area = 820.0 * 1.0 + 95.0 + 500.0;
        let expected = carbon_per_area * 1.5 / (-1.5_f64 * 0.2 * 0.1).exp();
        let carbon = tables
            .manufacturing_carbon(&chiplet.into(), 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        assert!((carbon - expected).abs() < 1e-9);

        let default = tables
            .manufacturing_carbon(
                &PhotonicChiplet::new(45, 1.5, DEFAULT_ACTUATION).into(),
                820.0,
                GhgAbatement::Percent95,
                None,
            )
            .unwrap();
        assert!((carbon - default - 820.0 * 0.2 * 1.5 / (-0.03_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn interposer_carbon_formula() {
        let tables = CoefficientTables::builtin().unwrap();
        let interposer: Chiplet = LogicChiplet::interposer(65, 2.0)
            .with_cpa_scaling(tables.cpa_scaling_factor(65).unwrap())
            .into();
        let carbon_per_area = (820.0 * 0.8 + 95.0 + 500.0) * 0.35;
        let expected = carbon_per_area * 2.0 / (-2.0_f64 * 0.05).exp();
        let carbon = tables
            .manufacturing_carbon(&interposer, 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        assert!((carbon - expected).abs() < 1e-9);
    }

    #[test]
    fn yield_override_replaces_poisson_yield() {
        let tables = CoefficientTables::builtin().unwrap();
        let chiplet: Chiplet = LogicChiplet::new(20, 0.25).into();
        let perfect = tables
            .manufacturing_carbon(&chiplet, 820.0, GhgAbatement::Percent95, Some(1.0))
            .unwrap();
        let lossy = tables
            .manufacturing_carbon(&chiplet, 820.0, GhgAbatement::Percent95, Some(0.5))
            .unwrap();
        assert!((lossy - 2.0 * perfect).abs() < 1e-9);
    }

    #[test]
    fn interposer_scaling_reduces_carbon() {
        let tables = CoefficientTables::builtin().unwrap();
        let plain: Chiplet = LogicChiplet::interposer(65, 2.0).into();
        let scaled: Chiplet = LogicChiplet::interposer(65, 2.0)
            .with_cpa_scaling(tables.cpa_scaling_factor(65).unwrap())
            .into();
        let plain = tables
            .manufacturing_carbon(&plain, 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        let scaled = tables
            .manufacturing_carbon(&scaled, 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        assert!(scaled < plain);
    }

    #[test]
    fn dram_yield_applied_twice() {
        let tables = CoefficientTables::builtin().unwrap();
        let chiplet: Chiplet = DramChiplet::new(10, "ddr4_10nm", 8.0).into();
        let carbon = tables
            .manufacturing_carbon(&chiplet, 820.0, GhgAbatement::Percent95, None)
            .unwrap();
        let per_gb = tables.dram().get("ddr4_10nm").unwrap();
        assert!((carbon - per_gb * 8.0 / (0.875 * 0.875)).abs() < 1e-9);
    }

    #[test]
    fn missing_keys_name_the_table() {
        let tables = CoefficientTables::builtin().unwrap();
        let err = tables
            .manufacturing_carbon(
                &LogicChiplet::new(11, 1.0).into(),
                820.0,
                GhgAbatement::Percent95,
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CarbonError::MissingCoefficient { table: LOGIC_EPA, ref key } if key == "11nm"
        ));

        let err = tables
            .manufacturing_carbon(
                &PhotonicChiplet::new(45, 1.0, "thermal").into(),
                820.0,
                GhgAbatement::Percent95,
                None,
            )
            .unwrap_err();
        assert!(err.to_string().contains("'thermal'"));

        let err = tables
            .manufacturing_carbon(
                &DramChiplet::new(10, "ddr9", 1.0).into(),
                820.0,
                GhgAbatement::Percent95,
                None,
            )
            .unwrap_err();
        assert!(err.to_string().contains("dram/dram_hynix.json"));
    }
}
