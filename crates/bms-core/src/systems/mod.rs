//! Systems - logic that operates on components

mod fire_drill;
mod hazard;
mod layout;
pub(crate) mod lookup;
mod maintenance;
mod recommender;
mod rooms;
mod sensors;

pub use fire_drill::*;
pub use hazard::*;
pub use layout::*;
pub use maintenance::*;
pub use recommender::*;
pub use rooms::*;
pub use sensors::*;
