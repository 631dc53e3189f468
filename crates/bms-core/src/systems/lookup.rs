//! Typed component access by handle.

use bms_logic::sensors::TimedSensor;
use hecs::{Entity, Ref, RefMut, World};

use crate::components::{Building, Floor, MaintenanceSchedule, Room};
use crate::error::BmsError;

macro_rules! lookup {
    ($get:ident, $get_mut:ident, $ty:ty, $what:literal) => {
        #[allow(dead_code)]
        pub(crate) fn $get(world: &World, entity: Entity) -> Result<Ref<'_, $ty>, BmsError> {
            world
                .get::<&$ty>(entity)
                .map_err(|_| BmsError::wrong_entity(entity, $what))
        }

        #[allow(dead_code)]
        pub(crate) fn $get_mut(world: &World, entity: Entity) -> Result<RefMut<'_, $ty>, BmsError> {
            world
                .get::<&mut $ty>(entity)
                .map_err(|_| BmsError::wrong_entity(entity, $what))
        }
    };
}

lookup!(sensor, sensor_mut, TimedSensor, "sensor");
lookup!(room, room_mut, Room, "room");
lookup!(floor, floor_mut, Floor, "floor");
lookup!(building, building_mut, Building, "building");
lookup!(schedule, schedule_mut, MaintenanceSchedule, "maintenance schedule");
