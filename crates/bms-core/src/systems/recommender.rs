//! Study room recommendation.

use bms_logic::room::{RoomState, RoomType};
use hecs::{Entity, World};

use super::{lookup, room_comfort, room_state};
use crate::error::BmsError;

/// Recommend an open study room in a building.
///
/// Floors are visited bottom up. Each floor's pick is its most comfortable
/// open study room (the first one wins ties). The walk climbs while every
/// floor offers a pick at least as comfortable as the one below, and stops
/// at the last such floor. `None` when the ground floor has no candidate.
pub fn recommend_study_room(world: &World, building: Entity) -> Result<Option<Entity>, BmsError> {
    let floors = lookup::building(world, building)?.floors();
    let mut previous: Option<(Entity, u32)> = None;

    for floor in floors {
        let best = best_study_room(world, floor)?;
        match (previous, best) {
            (None, None) => return Ok(None),
            (Some((room, _)), None) => return Ok(Some(room)),
            (Some((room, prev_comfort)), Some((_, comfort))) if comfort < prev_comfort => {
                return Ok(Some(room));
            }
            (_, Some(pick)) => previous = Some(pick),
        }
    }
    Ok(previous.map(|(room, _)| room))
}

fn best_study_room(world: &World, floor: Entity) -> Result<Option<(Entity, u32)>, BmsError> {
    let rooms = lookup::floor(world, floor)?.rooms();
    let mut best: Option<(Entity, u32)> = None;
    for room in rooms {
        if lookup::room(world, room)?.room_type() != RoomType::Study {
            continue;
        }
        if room_state(world, room)? != RoomState::Open {
            continue;
        }
        let comfort = room_comfort(world, room)?;
        if best.map_or(true, |(_, c)| comfort > c) {
            best = Some((room, comfort));
        }
    }
    Ok(best)
}
