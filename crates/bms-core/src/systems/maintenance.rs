//! Maintenance schedule system - round-robin upkeep of a floor's rooms.
//!
//! The schedule flags one room at a time as under maintenance. Each minute
//! it either works on that room or, once the room's maintenance time has
//! passed, hands the flag on to the next room in its order. Rooms being
//! evacuated stall the schedule until the evacuation ends.

use bms_logic::maintenance::{
    maintenance_time, validate_room_order, MaintenanceCursor, MaintenanceStep,
};
use bms_logic::room::RoomState;
use hecs::{Entity, World};

use super::{lookup, room_state};
use crate::components::MaintenanceSchedule;
use crate::error::BmsError;

/// Build a schedule over `rooms` and flag the first room.
///
/// The order is validated before anything changes. The returned component
/// still has to be spawned and registered with the clock.
pub fn start_maintenance(
    world: &World,
    rooms: Vec<Entity>,
) -> Result<MaintenanceSchedule, BmsError> {
    validate_room_order(&rooms)?;
    let room_numbers = rooms
        .iter()
        .map(|e| lookup::room(world, *e).map(|r| r.number()))
        .collect::<Result<Vec<_>, _>>()?;
    let cursor = MaintenanceCursor::new(rooms.len())?;

    lookup::room_mut(world, rooms[0])?.set_maintenance(true);
    Ok(MaintenanceSchedule::new(rooms, room_numbers, cursor))
}

/// Deliver one minute to a schedule. Unknown handles are ignored, which
/// covers schedules discarded after being replaced.
pub fn advance_maintenance(world: &World, schedule: Entity) {
    let current = match lookup::schedule(world, schedule) {
        Ok(s) => s.current_room(),
        Err(_) => return,
    };
    let required = match lookup::room(world, current) {
        Ok(room) => maintenance_time(room.room_type(), room.area()),
        Err(_) => return,
    };
    let evacuating = matches!(room_state(world, current), Ok(RoomState::Evacuate));

    let step = match lookup::schedule_mut(world, schedule) {
        Ok(mut s) => s.cursor_mut().step(required, evacuating),
        Err(_) => return,
    };
    if let MaintenanceStep::Moved { from, to } = step {
        hand_over(world, schedule, from, to);
    }
}

/// Abandon the current room and move straight to the next one.
pub fn skip_maintenance(world: &World, schedule: Entity) -> Result<(), BmsError> {
    let step = lookup::schedule_mut(world, schedule)?.cursor_mut().skip();
    if let MaintenanceStep::Moved { from, to } = step {
        hand_over(world, schedule, from, to);
    }
    Ok(())
}

/// Clear the flag of the schedule's current room, for a schedule about to
/// be discarded.
pub fn stop_maintenance(world: &World, schedule: Entity) -> Result<(), BmsError> {
    let current = lookup::schedule(world, schedule)?.current_room();
    if let Ok(mut room) = lookup::room_mut(world, current) {
        room.set_maintenance(false);
    }
    Ok(())
}

fn hand_over(world: &World, schedule: Entity, from: usize, to: usize) {
    let (from_room, to_room) = match lookup::schedule(world, schedule) {
        Ok(s) => (s.room_at(from), s.room_at(to)),
        Err(_) => return,
    };
    // Clear before setting so a single-room order keeps its flag.
    if let Ok(mut room) = lookup::room_mut(world, from_room) {
        room.set_maintenance(false);
    }
    if let Ok(mut room) = lookup::room_mut(world, to_room) {
        room.set_maintenance(true);
        log::debug!("maintenance moved to room #{}", room.number());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Room;
    use bms_logic::room::RoomType;

    fn spawn_room(world: &mut World, number: u32, room_type: RoomType, area: f64) -> Entity {
        world.spawn((Room::new(number, room_type, area),))
    }

    fn flagged(world: &World, room: Entity) -> bool {
        world.get::<&Room>(room).unwrap().maintenance()
    }

    #[test]
    fn test_start_flags_first_room() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Office, 15.0);
        let b = spawn_room(&mut world, 102, RoomType::Study, 6.0);
        let schedule = start_maintenance(&world, vec![a, b]).unwrap();
        assert!(flagged(&world, a));
        assert!(!flagged(&world, b));
        assert_eq!(schedule.current_elapsed(), 0);
        assert_eq!(schedule.to_string(), "MaintenanceSchedule: currentRoom=#101, currentElapsed=0");
    }

    #[test]
    fn test_invalid_order_changes_nothing() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Office, 15.0);
        assert!(start_maintenance(&world, vec![a, a]).is_err());
        assert!(start_maintenance(&world, Vec::new()).is_err());
        assert!(!flagged(&world, a));
    }

    #[test]
    fn test_moves_on_tick_after_maintenance_time() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Office, 15.0);
        let b = spawn_room(&mut world, 102, RoomType::Study, 6.0);
        let schedule = start_maintenance(&world, vec![a, b]).unwrap();
        let schedule = world.spawn((schedule,));

        for _ in 0..11 {
            advance_maintenance(&world, schedule);
        }
        assert_eq!(world.get::<&MaintenanceSchedule>(schedule).unwrap().current_elapsed(), 11);
        assert!(flagged(&world, a));

        advance_maintenance(&world, schedule);
        let s = world.get::<&MaintenanceSchedule>(schedule).unwrap();
        assert_eq!(s.current_room(), b);
        assert_eq!(s.current_elapsed(), 0);
        drop(s);
        assert!(!flagged(&world, a));
        assert!(flagged(&world, b));
    }

    #[test]
    fn test_evacuation_stalls_schedule() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Study, 5.0);
        let b = spawn_room(&mut world, 102, RoomType::Study, 5.0);
        let schedule = start_maintenance(&world, vec![a, b]).unwrap();
        let schedule = world.spawn((schedule,));

        advance_maintenance(&world, schedule);
        world.get::<&mut Room>(a).unwrap().set_fire_drill(true);
        for _ in 0..20 {
            advance_maintenance(&world, schedule);
        }
        let s = world.get::<&MaintenanceSchedule>(schedule).unwrap();
        assert_eq!(s.current_room(), a);
        assert_eq!(s.current_elapsed(), 1);
    }

    #[test]
    fn test_skip_ignores_evacuation_and_wraps() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Study, 5.0);
        let b = spawn_room(&mut world, 102, RoomType::Study, 5.0);
        let schedule = start_maintenance(&world, vec![a, b]).unwrap();
        let schedule = world.spawn((schedule,));
        world.get::<&mut Room>(a).unwrap().set_fire_drill(true);

        skip_maintenance(&world, schedule).unwrap();
        assert!(flagged(&world, b));
        assert!(!flagged(&world, a));
        skip_maintenance(&world, schedule).unwrap();
        assert!(flagged(&world, a));
        assert_eq!(world.get::<&MaintenanceSchedule>(schedule).unwrap().current_index(), 0);
    }

    #[test]
    fn test_single_room_keeps_flag() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Study, 5.0);
        let schedule = start_maintenance(&world, vec![a]).unwrap();
        let schedule = world.spawn((schedule,));
        skip_maintenance(&world, schedule).unwrap();
        assert!(flagged(&world, a));
    }

    #[test]
    fn test_stop_clears_current_room() {
        let mut world = World::new();
        let a = spawn_room(&mut world, 101, RoomType::Study, 5.0);
        let schedule = start_maintenance(&world, vec![a]).unwrap();
        let schedule = world.spawn((schedule,));
        stop_maintenance(&world, schedule).unwrap();
        assert!(!flagged(&world, a));
    }
}
