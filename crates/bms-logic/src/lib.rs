//! Pure building-management logic.
//!
//! Everything here works on plain data: no ECS world, no clock, no I/O.
//! The engine crate wires these pieces into rooms, floors and buildings and
//! drives them minute by minute.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`sensors`] | Timed sensors, sensor kinds, hazard and comfort levels |
//! | [`hazard`] | Rule-based and weighting-based hazard evaluation |
//! | [`room`] | Room types, derived room state, layout limits |
//! | [`maintenance`] | Maintenance durations, room-order rules, schedule cursor |
//! | [`encoding`] | Save-file line encodings for sensors, evaluators, schedules |
//! | [`error`] | [`LogicError`] |

pub mod encoding;
pub mod error;
pub mod hazard;
pub mod maintenance;
pub mod room;
pub mod sensors;

pub use error::LogicError;
