//! Model selectors - closed enumerations dispatched in one place each
//!
//! Codes (`as u8`) are stable: they are what the JS facade passes around.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SandpileError};
use crate::domain::cell::Grain;

/// Toppling rules, named after the papers they come from.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopplingRule {
    #[default]
    Undefined = 0,
    /// Manna / Lin 2010: stochastic, conservative.
    MannaLin2010 = 1,
    /// Bak, Tang, Wiesenfeld 1987: conservative, nominally deterministic.
    BakTangWiesenfeld1987 = 2,
    /// Lin et al. 2006: bulk dissipation at avalanche fronts.
    LinEtal2006 = 3,
    /// Rossum 2011: grains absorbed where the companion field is dense.
    Rossum2011 = 4,
    /// Rossum 2011 companion field: direction-biased single-grain flocking.
    Rossum2011Diss = 5,
}

impl TopplingRule {
    /// Threshold a rule starts with until overridden.
    pub fn default_threshold(self) -> Result<Grain> {
        match self {
            TopplingRule::MannaLin2010 => Ok(2.0),
            TopplingRule::BakTangWiesenfeld1987
            | TopplingRule::LinEtal2006
            | TopplingRule::Rossum2011 => Ok(4.0),
            TopplingRule::Rossum2011Diss => Ok(0.0),
            TopplingRule::Undefined => Err(SandpileError::config("undefined toppling rule")),
        }
    }

    /// Boundary the published model is run with.
    pub fn default_boundary(self) -> Result<BoundaryType> {
        match self {
            TopplingRule::Rossum2011 | TopplingRule::Rossum2011Diss | TopplingRule::LinEtal2006 => {
                Ok(BoundaryType::Periodic)
            }
            TopplingRule::MannaLin2010 => Ok(BoundaryType::Circular),
            TopplingRule::BakTangWiesenfeld1987 => Ok(BoundaryType::WallDissipating),
            TopplingRule::Undefined => Err(SandpileError::config(
                "undefined toppling rule, no default boundary",
            )),
        }
    }

    /// Rules that need the second (dissipation) field.
    pub fn uses_dissipation_field(self) -> bool {
        matches!(self, TopplingRule::Rossum2011 | TopplingRule::Rossum2011Diss)
    }
}

impl TryFrom<u8> for TopplingRule {
    type Error = SandpileError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(TopplingRule::Undefined),
            1 => Ok(TopplingRule::MannaLin2010),
            2 => Ok(TopplingRule::BakTangWiesenfeld1987),
            3 => Ok(TopplingRule::LinEtal2006),
            4 => Ok(TopplingRule::Rossum2011),
            5 => Ok(TopplingRule::Rossum2011Diss),
            _ => Err(SandpileError::config(format!("unknown toppling rule code {code}"))),
        }
    }
}

impl fmt::Display for TopplingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TopplingRule::BakTangWiesenfeld1987 => "BTW1987, deterministic",
            TopplingRule::MannaLin2010 => "Lin2010, stochastic",
            TopplingRule::LinEtal2006 => "Lin2006, bulk-dissipation",
            TopplingRule::Rossum2011 => "Rossum2011, emergent dissipation",
            TopplingRule::Rossum2011Diss => "Rossum2011_diss, emergent dissipation (second field)",
            TopplingRule::Undefined => "undefined",
        };
        f.write_str(label)
    }
}

/// How edge cells find their neighbours.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryType {
    /// "Use the rule's default" when overriding; fatal when resolving neighbours.
    #[default]
    Undefined = 0,
    Periodic = 1,
    Dissipating = 2,
    WallDissipating = 3,
    Circular = 4,
    RandomNeighbours = 5,
    FullyConnected = 6,
}

impl TryFrom<u8> for BoundaryType {
    type Error = SandpileError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(BoundaryType::Undefined),
            1 => Ok(BoundaryType::Periodic),
            2 => Ok(BoundaryType::Dissipating),
            3 => Ok(BoundaryType::WallDissipating),
            4 => Ok(BoundaryType::Circular),
            5 => Ok(BoundaryType::RandomNeighbours),
            6 => Ok(BoundaryType::FullyConnected),
            _ => Err(SandpileError::config(format!("unknown boundary code {code}"))),
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoundaryType::Periodic => "periodic",
            BoundaryType::Dissipating => "dissipating",
            BoundaryType::WallDissipating => "walls and dissipating",
            BoundaryType::Circular => "circular",
            BoundaryType::RandomNeighbours => "random neighbours",
            BoundaryType::FullyConnected => "fully connected",
            BoundaryType::Undefined => "undefined",
        };
        f.write_str(label)
    }
}

/// Order in which a relaxation pass visits cells.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationStrategy {
    /// Every cell, freshly shuffled each pass.
    RandomAll = 0,
    /// `width` randomly chosen cells per pass.
    RandomFraction = 1,
    /// Only cells in the active set.
    #[default]
    FollowActivity = 2,
}

impl TryFrom<u8> for IterationStrategy {
    type Error = SandpileError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(IterationStrategy::RandomAll),
            1 => Ok(IterationStrategy::RandomFraction),
            2 => Ok(IterationStrategy::FollowActivity),
            _ => Err(SandpileError::config(format!("unknown iteration strategy code {code}"))),
        }
    }
}

/// Snapshot projections offered to analysis and plotting.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridValueType {
    Height = 0,
    HeightScaled = 1,
    CriticalCells = 2,
    Dissipation = 3,
    Direction = 4,
    /// 1 when some neighbour is at or above the critical level, else 0.
    NonCriticalNeighbourhood = 5,
    /// Reserved for the multi-resolution analysis; not a per-cell projection.
    OrderParam1 = 6,
}

impl TryFrom<u8> for GridValueType {
    type Error = SandpileError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(GridValueType::Height),
            1 => Ok(GridValueType::HeightScaled),
            2 => Ok(GridValueType::CriticalCells),
            3 => Ok(GridValueType::Dissipation),
            4 => Ok(GridValueType::Direction),
            5 => Ok(GridValueType::NonCriticalNeighbourhood),
            6 => Ok(GridValueType::OrderParam1),
            _ => Err(SandpileError::config(format!("unknown value kind code {code}"))),
        }
    }
}

/// Compass directions. The order is also the neighbour slot order, which the
/// direction-biased rule relies on: do not reorder.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North = 0,
    West = 1,
    South = 2,
    East = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `index` is taken modulo 4.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index & 3]
    }
}
