//! Maintenance schedule component.

use std::fmt;

use bms_logic::maintenance::MaintenanceCursor;
use hecs::Entity;

/// A floor's round-robin maintenance walk over its rooms.
///
/// Room numbers are stored next to the handles so the schedule can be
/// displayed and encoded without the world.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceSchedule {
    rooms: Vec<Entity>,
    room_numbers: Vec<u32>,
    cursor: MaintenanceCursor,
}

impl MaintenanceSchedule {
    /// `rooms` and `room_numbers` must be aligned and match the cursor length.
    pub(crate) fn new(
        rooms: Vec<Entity>,
        room_numbers: Vec<u32>,
        cursor: MaintenanceCursor,
    ) -> Self {
        debug_assert_eq!(rooms.len(), room_numbers.len());
        debug_assert_eq!(rooms.len(), cursor.len());
        Self {
            rooms,
            room_numbers,
            cursor,
        }
    }

    pub fn room_order(&self) -> Vec<Entity> {
        self.rooms.clone()
    }

    pub fn room_numbers(&self) -> Vec<u32> {
        self.room_numbers.clone()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.current_index()
    }

    pub fn current_room(&self) -> Entity {
        self.rooms[self.cursor.current_index()]
    }

    pub fn current_room_number(&self) -> u32 {
        self.room_numbers[self.cursor.current_index()]
    }

    /// Minutes spent on the current room so far.
    pub fn current_elapsed(&self) -> u32 {
        self.cursor.elapsed_on_current()
    }

    pub fn cursor(&self) -> MaintenanceCursor {
        self.cursor
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut MaintenanceCursor {
        &mut self.cursor
    }

    pub(crate) fn room_at(&self, index: usize) -> Entity {
        self.rooms[index]
    }
}

impl fmt::Display for MaintenanceSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MaintenanceSchedule: currentRoom=#{}, currentElapsed={}",
            self.current_room_number(),
            self.current_elapsed()
        )
    }
}
