//! Round-robin maintenance scheduling.
//!
//! A floor's maintenance schedule visits an ordered list of rooms, spending
//! [`maintenance_time`] minutes on each before moving on, and wraps back to
//! the start after the last room. [`MaintenanceCursor`] holds the position
//! and timing of that walk; the engine owns the rooms and flags.

use serde::{Deserialize, Serialize};

use crate::error::LogicError;
use crate::room::{RoomType, MIN_ROOM_AREA};

/// Maintenance time for the smallest room, in minutes.
pub const BASE_MAINTENANCE_MINUTES: f64 = 5.0;
/// Extra minutes per square metre above [`MIN_ROOM_AREA`].
pub const MINUTES_PER_EXTRA_SQUARE_METRE: f64 = 0.2;

/// Minutes needed to maintain a room of the given type and area.
///
/// `round((5 + 0.2 * (area - 5)) * factor)` where the area term is only
/// counted above the minimum and the factor depends on the room type.
pub fn maintenance_time(room_type: RoomType, area: f64) -> u32 {
    let extra_area = (area - MIN_ROOM_AREA).max(0.0);
    let minutes = BASE_MAINTENANCE_MINUTES + MINUTES_PER_EXTRA_SQUARE_METRE * extra_area;
    (minutes * room_type.maintenance_factor()).round() as u32
}

/// Check a maintenance room order.
///
/// The order must be non-empty and, when it has more than one entry, no
/// room may follow itself. The first and last entries count as neighbours.
pub fn validate_room_order<T: PartialEq>(order: &[T]) -> Result<(), LogicError> {
    if order.is_empty() {
        return Err(LogicError::invalid("maintenance room order must not be empty"));
    }
    if order.len() == 1 {
        return Ok(());
    }
    for i in 0..order.len() {
        let next = (i + 1) % order.len();
        if order[i] == order[next] {
            return Err(LogicError::invalid(format!(
                "maintenance room order repeats a room at positions {i} and {next}"
            )));
        }
    }
    Ok(())
}

/// What a single minute of maintenance did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStep {
    /// The current room is being evacuated; nothing changed.
    Held,
    /// Work continued on the current room.
    Worked,
    /// The current room finished and the cursor moved on.
    Moved { from: usize, to: usize },
}

/// Position and timing within a maintenance room order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceCursor {
    len: usize,
    current_index: usize,
    elapsed_on_current: u32,
}

impl MaintenanceCursor {
    /// Cursor at the first room of an order with `len` entries.
    pub fn new(len: usize) -> Result<Self, LogicError> {
        if len == 0 {
            return Err(LogicError::invalid("maintenance room order must not be empty"));
        }
        Ok(Self {
            len,
            current_index: 0,
            elapsed_on_current: 0,
        })
    }

    /// Cursor restored from saved state.
    pub fn resume(
        len: usize,
        current_index: usize,
        elapsed_on_current: u32,
    ) -> Result<Self, LogicError> {
        let mut cursor = Self::new(len)?;
        if current_index >= len {
            return Err(LogicError::invalid(format!(
                "maintenance index {current_index} is outside an order of {len} rooms"
            )));
        }
        cursor.current_index = current_index;
        cursor.elapsed_on_current = elapsed_on_current;
        Ok(cursor)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn elapsed_on_current(&self) -> u32 {
        self.elapsed_on_current
    }

    /// Advance by one minute.
    ///
    /// `required_minutes` is the maintenance time of the current room and
    /// `evacuating` whether that room is currently being evacuated, in which
    /// case the minute is lost.
    pub fn step(&mut self, required_minutes: u32, evacuating: bool) -> MaintenanceStep {
        if evacuating {
            return MaintenanceStep::Held;
        }
        if self.elapsed_on_current >= required_minutes {
            self.skip()
        } else {
            self.elapsed_on_current += 1;
            MaintenanceStep::Worked
        }
    }

    /// Abandon the current room and move to the next one.
    pub fn skip(&mut self) -> MaintenanceStep {
        let from = self.current_index;
        self.current_index = (self.current_index + 1) % self.len;
        self.elapsed_on_current = 0;
        MaintenanceStep::Moved {
            from,
            to: self.current_index,
        }
    }
}
