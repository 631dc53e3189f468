//! Fire drill broadcast over floors and buildings.

use bms_logic::room::RoomType;
use hecs::{Entity, World};

use super::lookup;
use crate::error::BmsError;

/// Flag every room on a floor matching `room_type` (all rooms when `None`)
/// for a fire drill. Returns how many rooms were flagged.
pub fn floor_fire_drill(
    world: &World,
    floor: Entity,
    room_type: Option<RoomType>,
) -> Result<usize, BmsError> {
    let rooms = lookup::floor(world, floor)?.rooms();
    let mut flagged = 0;
    for room in rooms {
        let mut room = lookup::room_mut(world, room)?;
        if room_type.map_or(true, |t| room.room_type() == t) {
            room.set_fire_drill(true);
            flagged += 1;
        }
    }
    Ok(flagged)
}

/// Run a fire drill across every floor of a building.
///
/// Fails when the building has no floors or no rooms at all.
pub fn building_fire_drill(
    world: &World,
    building: Entity,
    room_type: Option<RoomType>,
) -> Result<usize, BmsError> {
    let (name, floors) = {
        let b = lookup::building(world, building)?;
        (b.name().to_string(), b.floors())
    };
    if floors.is_empty() {
        return Err(BmsError::FireDrill(format!("building \"{name}\" has no floors")));
    }
    let mut room_count = 0;
    for floor in &floors {
        room_count += lookup::floor(world, *floor)?.rooms().len();
    }
    if room_count == 0 {
        return Err(BmsError::FireDrill(format!("building \"{name}\" has no rooms")));
    }

    let mut flagged = 0;
    for floor in floors {
        flagged += floor_fire_drill(world, floor, room_type)?;
    }
    log::info!("fire drill in \"{name}\": {flagged} rooms evacuating");
    Ok(flagged)
}

/// Clear the fire drill flag on every room of a floor.
pub fn cancel_floor_fire_drill(world: &World, floor: Entity) -> Result<(), BmsError> {
    let rooms = lookup::floor(world, floor)?.rooms();
    for room in rooms {
        lookup::room_mut(world, room)?.set_fire_drill(false);
    }
    Ok(())
}

/// Clear the fire drill flag on every room of a building.
pub fn cancel_building_fire_drill(world: &World, building: Entity) -> Result<(), BmsError> {
    let floors = lookup::building(world, building)?.floors();
    for floor in floors {
        cancel_floor_fire_drill(world, floor)?;
    }
    Ok(())
}
