//! Room types, derived room state, and layout limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogicError;

/// Smallest allowed room, in square metres.
pub const MIN_ROOM_AREA: f64 = 5.0;
/// Smallest allowed floor width, in metres.
pub const MIN_FLOOR_WIDTH: f64 = 5.0;
/// Smallest allowed floor length, in metres.
pub const MIN_FLOOR_LENGTH: f64 = 5.0;

/// Intended purpose of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Study,
    Office,
    Laboratory,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Study, RoomType::Office, RoomType::Laboratory];

    pub fn name(self) -> &'static str {
        match self {
            RoomType::Study => "STUDY",
            RoomType::Office => "OFFICE",
            RoomType::Laboratory => "LABORATORY",
        }
    }

    /// Multiplier applied to a room's base maintenance time.
    pub fn maintenance_factor(self) -> f64 {
        match self {
            RoomType::Study => 1.0,
            RoomType::Office => 1.5,
            RoomType::Laboratory => 2.0,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoomType {
    type Err = LogicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| LogicError::format(format!("unknown room type '{s}'")))
    }
}

/// Operational state of a room, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomState {
    Open,
    Evacuate,
    Maintenance,
    /// Reserved. No combination of inputs produces it.
    Error,
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomState::Open => "OPEN",
            RoomState::Evacuate => "EVACUATE",
            RoomState::Maintenance => "MAINTENANCE",
            RoomState::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Derive a room's state.
///
/// `temperature_hazard` is the hazard level of the room's temperature
/// sensor, if it has one. A fire reading evacuates the room no matter what
/// the flags say; a fire drill outranks maintenance.
pub fn derive_room_state(
    temperature_hazard: Option<u8>,
    fire_drill: bool,
    maintenance: bool,
) -> RoomState {
    if temperature_hazard == Some(100) || fire_drill {
        RoomState::Evacuate
    } else if maintenance {
        RoomState::Maintenance
    } else {
        RoomState::Open
    }
}
