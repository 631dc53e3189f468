//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for binary serialization of the entire simulation. Entity
//! handles are replaced by table indices on save and rebuilt on load, and
//! every sensor and cursor is validated again while loading.

use std::collections::HashMap;
use std::io::{Read, Write};

use bms_logic::maintenance::MaintenanceCursor;
use bms_logic::room::RoomType;
use bms_logic::sensors::{SensorKind, TimedSensor};
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, TimedItem};
use crate::components::*;
use crate::engine::Simulation;
use crate::error::BmsError;
use crate::systems::HazardEvaluator;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Minutes delivered by the clock
    pub minutes: u64,
    pub sensors: Vec<SensorRecord>,
    pub rooms: Vec<RoomRecord>,
    pub floors: Vec<FloorRecord>,
    pub schedules: Vec<ScheduleRecord>,
    pub buildings: Vec<BuildingRecord>,
    /// Clock registrations in delivery order
    pub clock: Vec<ClockRecord>,
}

#[derive(Serialize, Deserialize)]
pub struct SensorRecord {
    pub kind: SensorKind,
    pub readings: Vec<i32>,
    pub update_frequency: i32,
    pub elapsed_minutes: u32,
}

#[derive(Serialize, Deserialize)]
pub enum EvaluatorRecord {
    RuleBased(Vec<usize>),
    WeightingBased(Vec<(usize, i32)>),
}

#[derive(Serialize, Deserialize)]
pub struct RoomRecord {
    pub number: u32,
    pub room_type: RoomType,
    pub area: f64,
    pub sensors: Vec<usize>,
    pub evaluator: Option<EvaluatorRecord>,
    pub fire_drill: bool,
    pub maintenance: bool,
}

#[derive(Serialize, Deserialize)]
pub struct FloorRecord {
    pub number: i32,
    pub width: f64,
    pub length: f64,
    pub rooms: Vec<usize>,
    pub maintenance_schedule: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub rooms: Vec<usize>,
    pub current_index: usize,
    pub elapsed_on_current: u32,
}

#[derive(Serialize, Deserialize)]
pub struct BuildingRecord {
    pub name: String,
    pub floors: Vec<usize>,
}

#[derive(Serialize, Deserialize)]
pub enum ClockRecord {
    Sensor(usize),
    MaintenanceSchedule(usize),
}

/// Entity-to-index table for one component type
struct Index(HashMap<Entity, usize>);

impl Index {
    fn get(&self, entity: Entity, what: &str) -> Result<usize, BmsError> {
        self.0
            .get(&entity)
            .copied()
            .ok_or_else(|| BmsError::CorruptSnapshot(format!("dangling {what} handle {entity:?}")))
    }
}

/// Save a simulation to a writer
pub fn save_snapshot<W: Write>(sim: &Simulation, writer: W) -> Result<(), BmsError> {
    let data = capture(sim)?;
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_snapshot<R: Read>(reader: R) -> Result<Simulation, BmsError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(BmsError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    restore(data)
}

fn capture(sim: &Simulation) -> Result<SaveData, BmsError> {
    let world = sim.world();

    let mut sensors = Vec::new();
    let mut sensor_index = HashMap::new();
    for (entity, sensor) in world.query::<&TimedSensor>().iter() {
        sensor_index.insert(entity, sensors.len());
        sensors.push(SensorRecord {
            kind: sensor.kind(),
            readings: sensor.readings().to_vec(),
            update_frequency: sensor.update_frequency(),
            elapsed_minutes: sensor.elapsed_minutes(),
        });
    }
    let sensor_index = Index(sensor_index);

    let room_entities: Vec<Entity> = world.query::<&Room>().iter().map(|(e, _)| e).collect();
    let room_index = Index(room_entities.iter().enumerate().map(|(i, e)| (*e, i)).collect());
    let mut rooms = Vec::with_capacity(room_entities.len());
    for entity in &room_entities {
        let room = crate::systems::lookup::room(world, *entity)?;
        let evaluator = match room.hazard_evaluator() {
            Some(HazardEvaluator::RuleBased { sensors }) => Some(EvaluatorRecord::RuleBased(
                sensors
                    .iter()
                    .map(|e| sensor_index.get(*e, "sensor"))
                    .collect::<Result<_, _>>()?,
            )),
            Some(HazardEvaluator::WeightingBased { weightings }) => {
                Some(EvaluatorRecord::WeightingBased(
                    weightings
                        .iter()
                        .map(|(e, w)| sensor_index.get(*e, "sensor").map(|i| (i, *w)))
                        .collect::<Result<_, _>>()?,
                ))
            }
            None => None,
        };
        rooms.push(RoomRecord {
            number: room.number(),
            room_type: room.room_type(),
            area: room.area(),
            sensors: room
                .sensors()
                .iter()
                .map(|e| sensor_index.get(*e, "sensor"))
                .collect::<Result<_, _>>()?,
            evaluator,
            fire_drill: room.fire_drill(),
            maintenance: room.maintenance(),
        });
    }

    let mut schedules = Vec::new();
    let mut schedule_index = HashMap::new();
    for (entity, schedule) in world.query::<&MaintenanceSchedule>().iter() {
        schedule_index.insert(entity, schedules.len());
        schedules.push(ScheduleRecord {
            rooms: schedule
                .room_order()
                .iter()
                .map(|e| room_index.get(*e, "room"))
                .collect::<Result<_, _>>()?,
            current_index: schedule.current_index(),
            elapsed_on_current: schedule.current_elapsed(),
        });
    }
    let schedule_index = Index(schedule_index);

    let floor_entities: Vec<Entity> = world.query::<&Floor>().iter().map(|(e, _)| e).collect();
    let floor_index = Index(floor_entities.iter().enumerate().map(|(i, e)| (*e, i)).collect());
    let mut floors = Vec::with_capacity(floor_entities.len());
    for entity in &floor_entities {
        let floor = crate::systems::lookup::floor(world, *entity)?;
        floors.push(FloorRecord {
            number: floor.number(),
            width: floor.width(),
            length: floor.length(),
            rooms: floor
                .rooms()
                .iter()
                .map(|e| room_index.get(*e, "room"))
                .collect::<Result<_, _>>()?,
            maintenance_schedule: floor
                .maintenance_schedule()
                .map(|e| schedule_index.get(e, "maintenance schedule"))
                .transpose()?,
        });
    }

    let mut buildings = Vec::new();
    for entity in sim.buildings() {
        let building = crate::systems::lookup::building(world, entity)?;
        buildings.push(BuildingRecord {
            name: building.name().to_string(),
            floors: building
                .floors()
                .iter()
                .map(|e| floor_index.get(*e, "floor"))
                .collect::<Result<_, _>>()?,
        });
    }

    // Replaced schedules are gone from the world; their registrations are
    // dead and dropped here.
    let clock = sim
        .clock()
        .items()
        .into_iter()
        .filter_map(|item| match item {
            TimedItem::Sensor(e) => sensor_index.0.get(&e).map(|i| ClockRecord::Sensor(*i)),
            TimedItem::MaintenanceSchedule(e) => {
                schedule_index.0.get(&e).map(|i| ClockRecord::MaintenanceSchedule(*i))
            }
        })
        .collect();

    Ok(SaveData {
        version: SAVE_VERSION,
        minutes: sim.minutes(),
        sensors,
        rooms,
        floors,
        schedules,
        buildings,
        clock,
    })
}

fn resolve(table: &[Entity], index: usize, what: &str) -> Result<Entity, BmsError> {
    table
        .get(index)
        .copied()
        .ok_or_else(|| BmsError::CorruptSnapshot(format!("{what} index {index} out of range")))
}

fn resolve_all(table: &[Entity], indices: &[usize], what: &str) -> Result<Vec<Entity>, BmsError> {
    indices.iter().map(|i| resolve(table, *i, what)).collect()
}

fn corrupt(e: impl std::fmt::Display) -> BmsError {
    BmsError::CorruptSnapshot(e.to_string())
}

fn restore(data: SaveData) -> Result<Simulation, BmsError> {
    let mut world = World::new();

    let mut sensors = Vec::with_capacity(data.sensors.len());
    for record in data.sensors {
        let sensor = TimedSensor::new(record.kind, record.readings, record.update_frequency)
            .map_err(corrupt)?
            .resume_at(record.elapsed_minutes);
        sensors.push(world.spawn((sensor,)));
    }

    let mut rooms = Vec::with_capacity(data.rooms.len());
    for record in data.rooms {
        let mut room = Room::new(record.number, record.room_type, record.area);
        for sensor in resolve_all(&sensors, &record.sensors, "sensor")? {
            let sensor_type = crate::systems::lookup::sensor(&world, sensor)?.sensor_type();
            room.insert_sensor(sensor_type, sensor).map_err(corrupt)?;
        }
        let evaluator = match record.evaluator {
            Some(EvaluatorRecord::RuleBased(indices)) => Some(
                HazardEvaluator::rule_based(&world, resolve_all(&sensors, &indices, "sensor")?)
                    .map_err(corrupt)?,
            ),
            Some(EvaluatorRecord::WeightingBased(pairs)) => {
                let weightings = pairs
                    .iter()
                    .map(|(i, w)| resolve(&sensors, *i, "sensor").map(|e| (e, *w)))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(HazardEvaluator::weighting_based(&world, weightings).map_err(corrupt)?)
            }
            None => None,
        };
        room.set_hazard_evaluator(evaluator).map_err(corrupt)?;
        room.set_fire_drill(record.fire_drill);
        room.set_maintenance(record.maintenance);
        rooms.push(world.spawn((room,)));
    }

    let mut schedules = Vec::with_capacity(data.schedules.len());
    for record in data.schedules {
        let order = resolve_all(&rooms, &record.rooms, "room")?;
        bms_logic::maintenance::validate_room_order(&order).map_err(corrupt)?;
        let cursor = MaintenanceCursor::resume(
            order.len(),
            record.current_index,
            record.elapsed_on_current,
        )
        .map_err(corrupt)?;
        let numbers = order
            .iter()
            .map(|e| crate::systems::lookup::room(&world, *e).map(|r| r.number()))
            .collect::<Result<Vec<_>, _>>()?;
        schedules.push(world.spawn((MaintenanceSchedule::new(order, numbers, cursor),)));
    }

    let mut floors = Vec::with_capacity(data.floors.len());
    for record in data.floors {
        let mut floor = Floor::new(record.number, record.width, record.length);
        for room in resolve_all(&rooms, &record.rooms, "room")? {
            floor.push_room(room);
        }
        if let Some(i) = record.maintenance_schedule {
            floor.set_maintenance_schedule(Some(resolve(&schedules, i, "maintenance schedule")?));
        }
        floors.push(world.spawn((floor,)));
    }

    let mut buildings = Vec::with_capacity(data.buildings.len());
    for record in data.buildings {
        let mut building = Building::new(record.name);
        for floor in resolve_all(&floors, &record.floors, "floor")? {
            building.push_floor(floor);
        }
        buildings.push(world.spawn((building,)));
    }

    let mut items = Vec::with_capacity(data.clock.len());
    for record in data.clock {
        items.push(match record {
            ClockRecord::Sensor(i) => TimedItem::Sensor(resolve(&sensors, i, "sensor")?),
            ClockRecord::MaintenanceSchedule(i) => {
                TimedItem::MaintenanceSchedule(resolve(&schedules, i, "maintenance schedule")?)
            }
        });
    }

    log::info!(
        "restored snapshot at minute {}: {} sensors, {} rooms, {} buildings",
        data.minutes,
        sensors.len(),
        rooms.len(),
        buildings.len()
    );
    Ok(Simulation::from_parts(world, Clock::resume(items, data.minutes), buildings))
}
