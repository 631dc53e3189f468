//! BMS Core - Building Management Simulation Engine
//!
//! Buildings, floors, rooms, sensors and maintenance schedules live as
//! entities in a `hecs` world owned by a [`Simulation`](engine::Simulation).
//! The simulation's [`Clock`](clock::Clock) delivers one-minute ticks to
//! every registered sensor and schedule in registration order.
//!
//! # Architecture
//!
//! - **Components**: Room, Floor, Building and MaintenanceSchedule data;
//!   sensors are stored as `bms_logic::sensors::TimedSensor` components
//! - **Systems**: functions over the world (ticking, hazard evaluation,
//!   containment rules, fire drills, recommendations)
//! - **Engine**: the `Simulation` driver tying world and clock together
//!
//! # Example
//!
//! ```rust,no_run
//! use bms_core::prelude::*;
//! use bms_logic::room::RoomType;
//! use bms_logic::sensors::TimedSensor;
//!
//! # fn main() -> Result<(), BmsError> {
//! let mut sim = Simulation::new();
//! let building = sim.create_building("Sciences");
//! let floor = sim.create_floor(1, 10.0, 10.0);
//! sim.add_floor(building, floor)?;
//!
//! let room = sim.create_room(101, RoomType::Office, 15.0);
//! sim.add_room(floor, room)?;
//! let temp = sim.install_sensor(TimedSensor::temperature(vec![21, 22, 70])?);
//! sim.add_sensor(room, temp)?;
//!
//! sim.run(60);
//! println!("{}", sim.room_state(room)?);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod components;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod save_file;
pub mod systems;

pub use error::BmsError;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::clock::{Clock, TimedItem};
    pub use crate::components::*;
    pub use crate::engine::Simulation;
    pub use crate::error::BmsError;
    pub use crate::systems::HazardEvaluator;
    pub use hecs::Entity;
}
