//! Component definitions for the simulation world.
//!
//! Sensors are stored as plain [`bms_logic::sensors::TimedSensor`]
//! components. Structure components refer to each other through
//! [`hecs::Entity`] handles; behaviour lives in systems.

mod building;
mod schedule;

pub use building::*;
pub use schedule::*;
