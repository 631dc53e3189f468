//! Sensor ticking.

use bms_logic::sensors::TimedSensor;
use hecs::{Entity, World};

/// Deliver one minute to a sensor entity. Unknown handles are ignored.
pub fn advance_sensor(world: &World, sensor: Entity) {
    if let Ok(mut sensor) = world.get::<&mut TimedSensor>(sensor) {
        sensor.advance_one_minute();
    }
}
