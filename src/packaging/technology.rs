// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the chiplets of a design are assembled into one package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackagingTechnology {
    /// A single die; there is no separate packaging step.
    Monolithic,
    /// Dies stacked on each other and connected with through-silicon vias.
    Stacked3d,
    /// Dies side by side on a passive silicon interposer.
    PassiveInterposer,
    /// Dies side by side on an interposer that carries its own router logic.
    ActiveInterposer,
    /// Fan-out packaging with redistribution layers instead of an interposer.
    Rdl,
    /// Neighbouring dies joined by small embedded silicon bridges.
    Emib,
    /// A tag that names none of the above. Costed at a fixed figure.
    Unrecognized(String),
}

impl PackagingTechnology {
    /// Maps a packaging tag from an architecture description. Unknown tags
    /// are kept as [`PackagingTechnology::Unrecognized`] rather than
    /// rejected.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "monolithic" => PackagingTechnology::Monolithic,
            "3D" => PackagingTechnology::Stacked3d,
            "2.5D-passive" => PackagingTechnology::PassiveInterposer,
            "2.5D-active" => PackagingTechnology::ActiveInterposer,
            "RDL" => PackagingTechnology::Rdl,
            "EMIB" => PackagingTechnology::Emib,
            other => PackagingTechnology::Unrecognized(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            PackagingTechnology::Monolithic => "monolithic",
            PackagingTechnology::Stacked3d => "3D",
            PackagingTechnology::PassiveInterposer => "2.5D-passive",
            PackagingTechnology::ActiveInterposer => "2.5D-active",
            PackagingTechnology::Rdl => "RDL",
            PackagingTechnology::Emib => "EMIB",
            PackagingTechnology::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PackagingTechnology::Unrecognized(_))
    }
}

impl From<&str> for PackagingTechnology {
    fn from(tag: &str) -> Self {
        PackagingTechnology::from_tag(tag)
    }
}

impl From<String> for PackagingTechnology {
    fn from(tag: String) -> Self {
        PackagingTechnology::from_tag(&tag)
    }
}

impl From<PackagingTechnology> for String {
    fn from(technology: PackagingTechnology) -> Self {
        technology.tag().to_string()
    }
}

impl fmt::Display for PackagingTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
