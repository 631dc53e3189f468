//! Containment rules for placing rooms on floors and floors in buildings.

use bms_logic::room::{MIN_FLOOR_LENGTH, MIN_FLOOR_WIDTH, MIN_ROOM_AREA};
use hecs::{Entity, World};

use super::lookup;
use crate::error::BmsError;

/// Total area of the rooms already placed on a floor.
pub fn occupied_area(world: &World, floor: Entity) -> Result<f64, BmsError> {
    let rooms = lookup::floor(world, floor)?.rooms();
    let mut total = 0.0;
    for room in rooms {
        total += lookup::room(world, room)?.area();
    }
    Ok(total)
}

/// Place a room on a floor.
pub fn add_room(world: &World, floor: Entity, room: Entity) -> Result<(), BmsError> {
    let (number, area) = {
        let room = lookup::room(world, room)?;
        (room.number(), room.area())
    };
    if area < MIN_ROOM_AREA {
        return Err(BmsError::invalid(format!(
            "room #{number} has area {area:.2}m^2, below the minimum of {MIN_ROOM_AREA:.2}m^2"
        )));
    }

    let (rooms, floor_area) = {
        let floor = lookup::floor(world, floor)?;
        (floor.rooms(), floor.area())
    };
    let mut occupied = 0.0;
    for existing in &rooms {
        let existing = lookup::room(world, *existing)?;
        if existing.number() == number {
            return Err(BmsError::DuplicateRoom(number));
        }
        occupied += existing.area();
    }
    if occupied + area > floor_area {
        return Err(BmsError::InsufficientSpace(format!(
            "room #{number} needs {area:.2}m^2 but only {:.2}m^2 is free",
            floor_area - occupied
        )));
    }

    lookup::floor_mut(world, floor)?.push_room(room);
    Ok(())
}

/// Add a floor to the top of a building.
///
/// Floors are numbered from 1. Every floor above the ground rests on the
/// floor numbered one below it and may not overhang it.
pub fn add_floor(world: &World, building: Entity, floor: Entity) -> Result<(), BmsError> {
    let (number, width, length) = {
        let floor = lookup::floor(world, floor)?;
        (floor.number(), floor.width(), floor.length())
    };
    if number < 1 {
        return Err(BmsError::invalid(format!("floor number must be >= 1, got {number}")));
    }
    check_dimensions(width, length)?;

    let floors = lookup::building(world, building)?.floors();
    let mut below = None;
    for existing in &floors {
        let existing = lookup::floor(world, *existing)?;
        if existing.number() == number {
            return Err(BmsError::DuplicateFloor(number));
        }
        if existing.number() == number - 1 {
            below = Some((existing.width(), existing.length()));
        }
    }
    if number > 1 {
        let (below_width, below_length) = below.ok_or(BmsError::NoFloorBelow(number))?;
        if width > below_width || length > below_length {
            return Err(BmsError::FloorTooSmall(format!(
                "floor {} is {below_width:.2}m x {below_length:.2}m, too small to support {width:.2}m x {length:.2}m",
                number - 1
            )));
        }
    }

    lookup::building_mut(world, building)?.push_floor(floor);
    Ok(())
}

/// Change a floor's dimensions.
///
/// The floor below must still support it, the floor above must still fit
/// on it, and the rooms already on it must still fit. Nothing changes when
/// a check fails.
pub fn renovate_floor(
    world: &World,
    building: Entity,
    number: i32,
    width: f64,
    length: f64,
) -> Result<(), BmsError> {
    check_dimensions(width, length)?;

    let floors = lookup::building(world, building)?.floors();
    let mut target = None;
    for floor in &floors {
        let f = lookup::floor(world, *floor)?;
        if f.number() == number {
            target = Some(*floor);
        } else if f.number() == number - 1 && (width > f.width() || length > f.length()) {
            return Err(BmsError::FloorTooSmall(format!(
                "floor {} cannot support {width:.2}m x {length:.2}m",
                f.number()
            )));
        } else if f.number() == number + 1 && (f.width() > width || f.length() > length) {
            return Err(BmsError::FloorTooSmall(format!(
                "floor {} would overhang {width:.2}m x {length:.2}m",
                f.number()
            )));
        }
    }
    let target =
        target.ok_or_else(|| BmsError::invalid(format!("building has no floor {number}")))?;

    let occupied = occupied_area(world, target)?;
    if occupied > width * length {
        return Err(BmsError::FloorTooSmall(format!(
            "rooms on floor {number} occupy {occupied:.2}m^2, more than {:.2}m^2",
            width * length
        )));
    }

    lookup::floor_mut(world, target)?.resize(width, length);
    log::info!("renovated floor {number} to {width:.2}m x {length:.2}m");
    Ok(())
}

fn check_dimensions(width: f64, length: f64) -> Result<(), BmsError> {
    if width < MIN_FLOOR_WIDTH || length < MIN_FLOOR_LENGTH {
        return Err(BmsError::invalid(format!(
            "floor dimensions {width:.2}m x {length:.2}m are below the minimum of {MIN_FLOOR_WIDTH:.2}m x {MIN_FLOOR_LENGTH:.2}m"
        )));
    }
    Ok(())
}
