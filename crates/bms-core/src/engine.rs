//! Simulation driver - owns the world and the clock.

use bms_logic::room::{RoomState, RoomType};
use bms_logic::sensors::TimedSensor;
use hecs::{Entity, World};

use crate::clock::{Clock, TimedItem};
use crate::components::*;
use crate::error::BmsError;
use crate::systems::{self, lookup, HazardEvaluator};

/// A building-management simulation.
///
/// Every sensor, room, floor, building and maintenance schedule lives in
/// the simulation's world and is addressed by its [`Entity`] handle. Time
/// only moves through [`Simulation::tick`].
pub struct Simulation {
    world: World,
    clock: Clock,
    buildings: Vec<Entity>,
}

impl Simulation {
    /// Create an empty simulation at minute 0
    pub fn new() -> Self {
        Self {
            world: World::new(),
            clock: Clock::new(),
            buildings: Vec::new(),
        }
    }

    pub(crate) fn from_parts(world: World, clock: Clock, buildings: Vec<Entity>) -> Self {
        Self {
            world,
            clock,
            buildings,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Minutes simulated so far
    pub fn minutes(&self) -> u64 {
        self.clock.minutes()
    }

    /// Advance the whole simulation by one minute.
    pub fn tick(&mut self) {
        self.clock.tick(&mut self.world);
    }

    pub fn run(&mut self, minutes: u64) {
        for _ in 0..minutes {
            self.tick();
        }
    }

    // ---- sensors ----

    /// Put a sensor into the world and register it with the clock.
    pub fn install_sensor(&mut self, sensor: TimedSensor) -> Entity {
        log::debug!("installing {sensor}");
        let entity = self.world.spawn((sensor,));
        self.clock.register(TimedItem::Sensor(entity));
        entity
    }

    /// Copy of a sensor's current state.
    pub fn sensor(&self, sensor: Entity) -> Result<TimedSensor, BmsError> {
        Ok((*lookup::sensor(&self.world, sensor)?).clone())
    }

    // ---- rooms ----

    pub fn create_room(&mut self, number: u32, room_type: RoomType, area: f64) -> Entity {
        self.world.spawn((Room::new(number, room_type, area),))
    }

    /// Copy of a room's current state.
    pub fn room(&self, room: Entity) -> Result<Room, BmsError> {
        Ok((*lookup::room(&self.world, room)?).clone())
    }

    /// Attach an installed sensor to a room.
    ///
    /// Rejects a second sensor of the same kind. Clears the room's hazard
    /// evaluator on success.
    pub fn add_sensor(&mut self, room: Entity, sensor: Entity) -> Result<(), BmsError> {
        let sensor_type = lookup::sensor(&self.world, sensor)?.sensor_type();
        lookup::room_mut(&self.world, room)?.insert_sensor(sensor_type, sensor)
    }

    /// Room's sensor handles in kind order.
    pub fn sensors(&self, room: Entity) -> Result<Vec<Entity>, BmsError> {
        Ok(lookup::room(&self.world, room)?.sensors())
    }

    pub fn room_state(&self, room: Entity) -> Result<RoomState, BmsError> {
        systems::room_state(&self.world, room)
    }

    pub fn set_fire_drill(&mut self, room: Entity, on: bool) -> Result<(), BmsError> {
        lookup::room_mut(&self.world, room)?.set_fire_drill(on);
        Ok(())
    }

    pub fn set_maintenance(&mut self, room: Entity, on: bool) -> Result<(), BmsError> {
        lookup::room_mut(&self.world, room)?.set_maintenance(on);
        Ok(())
    }

    pub fn hazard_evaluator(&self, room: Entity) -> Result<Option<HazardEvaluator>, BmsError> {
        Ok(lookup::room(&self.world, room)?.hazard_evaluator())
    }

    /// Install or clear a room's evaluator.
    ///
    /// The evaluator must read exactly the room's sensors; anything else is
    /// `InvalidArgument` and leaves the room unchanged.
    pub fn set_hazard_evaluator(
        &mut self,
        room: Entity,
        evaluator: Option<HazardEvaluator>,
    ) -> Result<(), BmsError> {
        lookup::room_mut(&self.world, room)?.set_hazard_evaluator(evaluator)
    }

    /// Evaluate the room's hazard evaluator, `None` when it has none.
    pub fn room_hazard_level(&self, room: Entity) -> Result<Option<u8>, BmsError> {
        systems::room_hazard_level(&self.world, room)
    }

    pub fn rule_based_evaluator(&self, sensors: Vec<Entity>) -> Result<HazardEvaluator, BmsError> {
        HazardEvaluator::rule_based(&self.world, sensors)
    }

    pub fn weighting_based_evaluator(
        &self,
        weightings: Vec<(Entity, i32)>,
    ) -> Result<HazardEvaluator, BmsError> {
        HazardEvaluator::weighting_based(&self.world, weightings)
    }

    // ---- floors and buildings ----

    pub fn create_floor(&mut self, number: i32, width: f64, length: f64) -> Entity {
        self.world.spawn((Floor::new(number, width, length),))
    }

    pub fn floor(&self, floor: Entity) -> Result<Floor, BmsError> {
        Ok((*lookup::floor(&self.world, floor)?).clone())
    }

    pub fn add_room(&mut self, floor: Entity, room: Entity) -> Result<(), BmsError> {
        systems::add_room(&self.world, floor, room)
    }

    /// Create a building and track it as part of the simulation.
    pub fn create_building(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.world.spawn((Building::new(name),));
        self.buildings.push(entity);
        entity
    }

    pub fn building(&self, building: Entity) -> Result<Building, BmsError> {
        Ok((*lookup::building(&self.world, building)?).clone())
    }

    /// Buildings in creation order.
    pub fn buildings(&self) -> Vec<Entity> {
        self.buildings.clone()
    }

    pub fn add_floor(&mut self, building: Entity, floor: Entity) -> Result<(), BmsError> {
        systems::add_floor(&self.world, building, floor)
    }

    pub fn renovate_floor(
        &mut self,
        building: Entity,
        number: i32,
        width: f64,
        length: f64,
    ) -> Result<(), BmsError> {
        systems::renovate_floor(&self.world, building, number, width, length)
    }

    // ---- maintenance ----

    /// Start a maintenance schedule over `rooms` that is not tied to a floor.
    pub fn spawn_maintenance_schedule(&mut self, rooms: Vec<Entity>) -> Result<Entity, BmsError> {
        let schedule = systems::start_maintenance(&self.world, rooms)?;
        log::info!("starting maintenance at room #{}", schedule.current_room_number());
        let entity = self.world.spawn((schedule,));
        self.clock.register(TimedItem::MaintenanceSchedule(entity));
        Ok(entity)
    }

    /// Give a floor a maintenance schedule, replacing any existing one.
    ///
    /// Every room in the order must be on the floor. The old schedule's
    /// current room stops being maintained and the old schedule is dropped.
    pub fn create_maintenance_schedule(
        &mut self,
        floor: Entity,
        rooms: Vec<Entity>,
    ) -> Result<Entity, BmsError> {
        let existing = {
            let f = lookup::floor(&self.world, floor)?;
            if let Some(stranger) = rooms.iter().find(|r| !f.contains_room(**r)) {
                return Err(BmsError::invalid(format!(
                    "room {stranger:?} is not on floor {}",
                    f.number()
                )));
            }
            f.maintenance_schedule()
        };
        // Must fail before the old schedule is stopped and despawned below.
        // `start_maintenance` checks the order again for callers that spawn
        // schedules directly.
        bms_logic::maintenance::validate_room_order(&rooms)?;

        if let Some(old) = existing {
            systems::stop_maintenance(&self.world, old)?;
            // The clock skips despawned schedules.
            self.world
                .despawn(old)
                .map_err(|_| BmsError::wrong_entity(old, "maintenance schedule"))?;
            log::info!("replaced maintenance schedule on floor entity {floor:?}");
        }

        let schedule = self.spawn_maintenance_schedule(rooms)?;
        lookup::floor_mut(&self.world, floor)?.set_maintenance_schedule(Some(schedule));
        Ok(schedule)
    }

    pub fn maintenance_schedule(&self, schedule: Entity) -> Result<MaintenanceSchedule, BmsError> {
        Ok((*lookup::schedule(&self.world, schedule)?).clone())
    }

    /// Maintenance time of a room in minutes.
    pub fn maintenance_time(&self, room: Entity) -> Result<u32, BmsError> {
        let room = lookup::room(&self.world, room)?;
        Ok(bms_logic::maintenance::maintenance_time(room.room_type(), room.area()))
    }

    pub fn skip_current_maintenance(&mut self, schedule: Entity) -> Result<(), BmsError> {
        systems::skip_maintenance(&self.world, schedule)
    }

    // ---- utilities ----

    pub fn building_fire_drill(
        &mut self,
        building: Entity,
        room_type: Option<RoomType>,
    ) -> Result<usize, BmsError> {
        systems::building_fire_drill(&self.world, building, room_type)
    }

    pub fn floor_fire_drill(
        &mut self,
        floor: Entity,
        room_type: Option<RoomType>,
    ) -> Result<usize, BmsError> {
        systems::floor_fire_drill(&self.world, floor, room_type)
    }

    pub fn cancel_building_fire_drill(&mut self, building: Entity) -> Result<(), BmsError> {
        systems::cancel_building_fire_drill(&self.world, building)
    }

    pub fn cancel_floor_fire_drill(&mut self, floor: Entity) -> Result<(), BmsError> {
        systems::cancel_floor_fire_drill(&self.world, floor)
    }

    pub fn recommend_study_room(&self, building: Entity) -> Result<Option<Entity>, BmsError> {
        systems::recommend_study_room(&self.world, building)
    }

    // ---- persistence ----

    /// Write a binary snapshot of the whole simulation.
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), BmsError> {
        crate::persistence::save_snapshot(self, writer)
    }

    /// Restore a simulation from a binary snapshot.
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self, BmsError> {
        crate::persistence::load_snapshot(reader)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_registers_with_clock() {
        let mut sim = Simulation::new();
        let s = sim.install_sensor(TimedSensor::noise(vec![40, 50], 2).unwrap());
        assert_eq!(sim.clock().items(), vec![TimedItem::Sensor(s)]);
        sim.run(2);
        assert_eq!(sim.sensor(s).unwrap().current_reading(), 50);
        assert_eq!(sim.minutes(), 2);
    }

    #[test]
    fn test_add_sensor_clears_evaluator() {
        let mut sim = Simulation::new();
        let room = sim.create_room(101, RoomType::Office, 15.0);
        let noise = sim.install_sensor(TimedSensor::noise(vec![67], 1).unwrap());
        sim.add_sensor(room, noise).unwrap();
        let eval = sim.rule_based_evaluator(sim.sensors(room).unwrap()).unwrap();
        sim.set_hazard_evaluator(room, Some(eval)).unwrap();
        assert_eq!(sim.room_hazard_level(room).unwrap(), Some(81));

        let temp = sim.install_sensor(TimedSensor::temperature(vec![22]).unwrap());
        sim.add_sensor(room, temp).unwrap();
        assert_eq!(sim.hazard_evaluator(room).unwrap(), None);
        assert_eq!(sim.room_hazard_level(room).unwrap(), None);
    }

    #[test]
    fn test_duplicate_kind_leaves_room_unchanged() {
        let mut sim = Simulation::new();
        let room = sim.create_room(101, RoomType::Office, 15.0);
        let a = sim.install_sensor(TimedSensor::noise(vec![67], 1).unwrap());
        let b = sim.install_sensor(TimedSensor::noise(vec![30], 1).unwrap());
        sim.add_sensor(room, a).unwrap();
        let eval = sim.rule_based_evaluator(vec![a]).unwrap();
        sim.set_hazard_evaluator(room, Some(eval.clone())).unwrap();

        assert!(matches!(sim.add_sensor(room, b), Err(BmsError::DuplicateSensorKind(_))));
        assert_eq!(sim.sensors(room).unwrap(), vec![a]);
        assert_eq!(sim.hazard_evaluator(room).unwrap(), Some(eval));
    }

    #[test]
    fn test_evaluator_must_read_every_room_sensor() {
        let mut sim = Simulation::new();
        let room = sim.create_room(101, RoomType::Office, 15.0);
        let temp = sim.install_sensor(TimedSensor::temperature(vec![22]).unwrap());
        let noise = sim.install_sensor(TimedSensor::noise(vec![67], 1).unwrap());
        let stray = sim.install_sensor(TimedSensor::noise(vec![30], 1).unwrap());
        sim.add_sensor(room, temp).unwrap();
        sim.add_sensor(room, noise).unwrap();

        let partial = sim.weighting_based_evaluator(vec![(temp, 100)]).unwrap();
        let foreign = sim.rule_based_evaluator(vec![temp, stray]).unwrap();
        let repeated = sim.rule_based_evaluator(vec![temp, temp]).unwrap();
        for eval in [partial, foreign, repeated] {
            assert!(matches!(
                sim.set_hazard_evaluator(room, Some(eval)),
                Err(BmsError::InvalidArgument(_))
            ));
            assert_eq!(sim.hazard_evaluator(room).unwrap(), None);
        }

        let full = sim.rule_based_evaluator(vec![noise, temp]).unwrap();
        sim.set_hazard_evaluator(room, Some(full)).unwrap();
        sim.set_hazard_evaluator(room, None).unwrap();
        assert_eq!(sim.hazard_evaluator(room).unwrap(), None);
    }

    #[test]
    fn test_bad_order_keeps_existing_schedule() {
        let mut sim = Simulation::new();
        let floor = sim.create_floor(1, 10.0, 10.0);
        let a = sim.create_room(101, RoomType::Study, 6.0);
        let b = sim.create_room(102, RoomType::Study, 6.0);
        sim.add_room(floor, a).unwrap();
        sim.add_room(floor, b).unwrap();
        let schedule = sim.create_maintenance_schedule(floor, vec![a, b]).unwrap();
        sim.run(2);

        assert!(matches!(
            sim.create_maintenance_schedule(floor, vec![b, a, b]),
            Err(BmsError::InvalidArgument(_))
        ));
        assert_eq!(sim.floor(floor).unwrap().maintenance_schedule(), Some(schedule));
        assert!(sim.room(a).unwrap().maintenance());
        assert_eq!(sim.maintenance_schedule(schedule).unwrap().current_elapsed(), 2);
    }

    #[test]
    fn test_schedule_must_use_floor_rooms() {
        let mut sim = Simulation::new();
        let floor = sim.create_floor(1, 10.0, 10.0);
        let on_floor = sim.create_room(101, RoomType::Study, 6.0);
        sim.add_room(floor, on_floor).unwrap();
        let elsewhere = sim.create_room(102, RoomType::Study, 6.0);

        assert!(matches!(
            sim.create_maintenance_schedule(floor, vec![on_floor, elsewhere]),
            Err(BmsError::InvalidArgument(_))
        ));
        assert!(!sim.room(on_floor).unwrap().maintenance());
        assert_eq!(sim.floor(floor).unwrap().maintenance_schedule(), None);
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("clock", &self.clock)
            .field("buildings", &self.buildings)
            .finish_non_exhaustive()
    }
}
