// SPDX-License-Identifier: Apache-2.0

use std::fmt;

mod cmos_logic;
mod dram;
mod pic_logic;
pub use cmos_logic::LogicChiplet;
pub use dram::DramChiplet;
pub use pic_logic::{DEFAULT_ACTUATION, PhotonicChiplet};

/// Technology family of a chiplet. Selects which coefficient tables its
/// manufacturing carbon is computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChipletKind {
    CmosLogic,
    PicLogic,
    Dram,
}

impl ChipletKind {
    /// Returns the tag used for this kind in architecture descriptions.
    pub fn tag(&self) -> &'static str {
        match self {
            ChipletKind::CmosLogic => "cmos-logic",
            ChipletKind::PicLogic => "pic-logic",
            ChipletKind::Dram => "dram",
        }
    }
}

impl fmt::Display for ChipletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The part of a chiplet that matters for floorplanning the shared
/// substrate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChipletFootprint {
    pub kind: ChipletKind,
    /// Die area in cm².
    pub area: f64,
    pub is_interposer: bool,
}

/// A single die in a multi-chiplet package. Chiplets are immutable; use
/// [`Chiplet::with_area`] to obtain a resized copy.
#[derive(Clone, Debug, PartialEq)]
pub enum Chiplet {
    CmosLogic(LogicChiplet),
    PicLogic(PhotonicChiplet),
    Dram(DramChiplet),
}

impl Chiplet {
    pub fn kind(&self) -> ChipletKind {
        match self {
            Chiplet::CmosLogic(_) => ChipletKind::CmosLogic,
            Chiplet::PicLogic(_) => ChipletKind::PicLogic,
            Chiplet::Dram(_) => ChipletKind::Dram,
        }
    }

    /// Process node in nanometres.
    pub fn node(&self) -> u32 {
        match self {
            Chiplet::CmosLogic(chiplet) => chiplet.node(),
            Chiplet::PicLogic(chiplet) => chiplet.node(),
            Chiplet::Dram(chiplet) => chiplet.node(),
        }
    }

    /// Die area in cm², or `None` for memory dies, which are sized by
    /// capacity and are not assembled on the shared substrate.
    pub fn area(&self) -> Option<f64> {
        self.footprint().map(|footprint| footprint.area)
    }

    pub fn footprint(&self) -> Option<ChipletFootprint> {
        let (area, is_interposer) = match self {
            Chiplet::CmosLogic(chiplet) => (chiplet.area(), chiplet.is_interposer()),
            Chiplet::PicLogic(chiplet) => (chiplet.area(), false),
            Chiplet::Dram(_) => return None,
        };
        Some(ChipletFootprint {
            kind: self.kind(),
            area,
            is_interposer,
        })
    }

    /// Returns a copy of this chiplet with its die area replaced. Memory
    /// dies have no area and are returned unchanged.
    pub fn with_area(&self, area: f64) -> Chiplet {
        match self {
            Chiplet::CmosLogic(chiplet) => Chiplet::CmosLogic(chiplet.with_area(area)),
            Chiplet::PicLogic(chiplet) => Chiplet::PicLogic(chiplet.with_area(area)),
            Chiplet::Dram(_) => self.clone(),
        }
    }
}

impl fmt::Display for Chiplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chiplet ({}, {}nm)", self.kind(), self.node())
    }
}

impl From<LogicChiplet> for Chiplet {
    fn from(chiplet: LogicChiplet) -> Self {
        Chiplet::CmosLogic(chiplet)
    }
}

impl From<PhotonicChiplet> for Chiplet {
    fn from(chiplet: PhotonicChiplet) -> Self {
        Chiplet::PicLogic(chiplet)
    }
}

impl From<DramChiplet> for Chiplet {
    fn from(chiplet: DramChiplet) -> Self {
        Chiplet::Dram(chiplet)
    }
}

/// Poisson die yield for a die of `area` cm² at `defect_density` defects
/// per cm².
pub(crate) fn poisson_yield(area: f64, defect_density: f64) -> f64 {
    (-area * defect_density).exp()
}
