//! Simulated clock delivering one-minute ticks.
//!
//! The clock keeps the items registered with it in registration order and
//! advances each of them once per tick, in that order. There is no way to
//! unregister an item; a schedule replaced on its floor is despawned and its
//! registration is skipped from then on.

use hecs::{Entity, World};

use crate::systems::{advance_maintenance, advance_sensor};

/// Something the clock advances every minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedItem {
    Sensor(Entity),
    MaintenanceSchedule(Entity),
}

impl TimedItem {
    pub fn entity(self) -> Entity {
        match self {
            TimedItem::Sensor(e) | TimedItem::MaintenanceSchedule(e) => e,
        }
    }
}

/// Registry of timed items plus the number of minutes delivered so far.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    items: Vec<TimedItem>,
    minutes: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a clock from saved state.
    pub(crate) fn resume(items: Vec<TimedItem>, minutes: u64) -> Self {
        Self { items, minutes }
    }

    /// Append an item. Duplicates are not checked.
    pub fn register(&mut self, item: TimedItem) {
        self.items.push(item);
    }

    /// Registered items in delivery order.
    pub fn items(&self) -> Vec<TimedItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Minutes delivered since the clock was created.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Advance every registered item by one minute.
    pub fn tick(&mut self, world: &mut World) {
        let world = &*world;
        for item in &self.items {
            match *item {
                TimedItem::Sensor(e) => advance_sensor(world, e),
                TimedItem::MaintenanceSchedule(e) => advance_maintenance(world, e),
            }
        }
        self.minutes += 1;
    }
}
