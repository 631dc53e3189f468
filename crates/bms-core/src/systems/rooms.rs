//! Room state derivation and room-level scores.

use bms_logic::room::{derive_room_state, RoomState};
use bms_logic::sensors::{SensorType, TimedSensor};
use hecs::{Entity, World};

use super::lookup;
use crate::error::BmsError;

/// Derive the current state of a room from its temperature reading and flags.
pub fn room_state(world: &World, room: Entity) -> Result<RoomState, BmsError> {
    let room = lookup::room(world, room)?;
    let temperature_hazard = room
        .sensor_of_type(SensorType::Temperature)
        .and_then(|e| world.get::<&TimedSensor>(e).ok().map(|s| s.hazard_level()));
    Ok(derive_room_state(
        temperature_hazard,
        room.fire_drill(),
        room.maintenance(),
    ))
}

/// Hazard level from the room's evaluator, `None` when it has none.
pub fn room_hazard_level(world: &World, room: Entity) -> Result<Option<u8>, BmsError> {
    let room = lookup::room(world, room)?;
    Ok(room.hazard_evaluator().map(|eval| eval.evaluate(world)))
}

/// Average comfort over all of a room's sensors.
///
/// Sensors that do not measure comfort count towards the divisor but add
/// nothing. A room without sensors scores 0.
pub fn room_comfort(world: &World, room: Entity) -> Result<u32, BmsError> {
    let room = lookup::room(world, room)?;
    let sensors = room.sensors();
    if sensors.is_empty() {
        return Ok(0);
    }
    let total: u32 = sensors
        .iter()
        .filter_map(|e| world.get::<&TimedSensor>(*e).ok().and_then(|s| s.comfort_level()))
        .map(u32::from)
        .sum();
    Ok(total / sensors.len() as u32)
}
