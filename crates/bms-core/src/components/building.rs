//! Building structure components: Room, Floor, Building.

use std::fmt;

use bms_logic::room::RoomType;
use bms_logic::sensors::SensorType;
use hecs::Entity;

use crate::error::BmsError;
use crate::systems::HazardEvaluator;

/// Room component - a numbered space on a floor holding sensors.
///
/// Sensors are kept sorted by kind with at most one sensor per kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    number: u32,
    room_type: RoomType,
    area: f64,
    sensors: Vec<(SensorType, Entity)>,
    hazard_evaluator: Option<HazardEvaluator>,
    fire_drill: bool,
    maintenance: bool,
}

impl Room {
    pub fn new(number: u32, room_type: RoomType, area: f64) -> Self {
        Self {
            number,
            room_type,
            area,
            sensors: Vec::new(),
            hazard_evaluator: None,
            fire_drill: false,
            maintenance: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Floor area in square metres
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Sensor handles in kind order.
    pub fn sensors(&self) -> Vec<Entity> {
        self.sensors.iter().map(|(_, e)| *e).collect()
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensor_of_type(&self, sensor_type: SensorType) -> Option<Entity> {
        self.sensors
            .iter()
            .find(|(t, _)| *t == sensor_type)
            .map(|(_, e)| *e)
    }

    pub fn hazard_evaluator(&self) -> Option<HazardEvaluator> {
        self.hazard_evaluator.clone()
    }

    pub fn fire_drill(&self) -> bool {
        self.fire_drill
    }

    pub fn maintenance(&self) -> bool {
        self.maintenance
    }

    /// Insert a sensor in kind order and drop the evaluator, which no longer
    /// covers the room's full sensor set.
    pub(crate) fn insert_sensor(
        &mut self,
        sensor_type: SensorType,
        sensor: Entity,
    ) -> Result<(), BmsError> {
        match self.sensors.binary_search_by_key(&sensor_type, |(t, _)| *t) {
            Ok(_) => Err(BmsError::DuplicateSensorKind(sensor_type)),
            Err(pos) => {
                self.sensors.insert(pos, (sensor_type, sensor));
                self.hazard_evaluator = None;
                Ok(())
            }
        }
    }

    /// Install or clear the evaluator. It must read exactly this room's
    /// sensors, each once.
    pub(crate) fn set_hazard_evaluator(
        &mut self,
        evaluator: Option<HazardEvaluator>,
    ) -> Result<(), BmsError> {
        if let Some(eval) = &evaluator {
            let reads = eval.sensors();
            let exact = reads.len() == self.sensors.len()
                && self.sensors.iter().all(|(_, e)| reads.contains(e));
            if !exact {
                return Err(BmsError::invalid(format!(
                    "{} evaluator for room #{} must read the room's {} sensors, got {:?}",
                    eval.kind(),
                    self.number,
                    self.sensors.len(),
                    reads
                )));
            }
        }
        self.hazard_evaluator = evaluator;
        Ok(())
    }

    pub(crate) fn set_fire_drill(&mut self, on: bool) {
        self.fire_drill = on;
    }

    pub(crate) fn set_maintenance(&mut self, on: bool) {
        self.maintenance = on;
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room #{}: type={}, area={:.2}m^2, sensors={}",
            self.number,
            self.room_type,
            self.area,
            self.sensors.len()
        )
    }
}

/// Floor component - a rectangular storey holding rooms.
#[derive(Debug, Clone, PartialEq)]
pub struct Floor {
    number: i32,
    width: f64,
    length: f64,
    rooms: Vec<Entity>,
    maintenance_schedule: Option<Entity>,
}

impl Floor {
    pub fn new(number: i32, width: f64, length: f64) -> Self {
        Self {
            number,
            width,
            length,
            rooms: Vec::new(),
            maintenance_schedule: None,
        }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Room handles in the order they were added.
    pub fn rooms(&self) -> Vec<Entity> {
        self.rooms.clone()
    }

    pub fn contains_room(&self, room: Entity) -> bool {
        self.rooms.contains(&room)
    }

    pub fn maintenance_schedule(&self) -> Option<Entity> {
        self.maintenance_schedule
    }

    pub(crate) fn push_room(&mut self, room: Entity) {
        self.rooms.push(room);
    }

    pub(crate) fn resize(&mut self, width: f64, length: f64) {
        self.width = width;
        self.length = length;
    }

    pub(crate) fn set_maintenance_schedule(&mut self, schedule: Option<Entity>) {
        self.maintenance_schedule = schedule;
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Floor #{}: width={:.2}m, length={:.2}m, rooms={}",
            self.number,
            self.width,
            self.length,
            self.rooms.len()
        )
    }
}

/// Building component - a named stack of floors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    name: String,
    floors: Vec<Entity>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            floors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Floor handles in the order they were added, which is bottom up.
    pub fn floors(&self) -> Vec<Entity> {
        self.floors.clone()
    }

    pub(crate) fn push_floor(&mut self, floor: Entity) {
        self.floors.push(floor);
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Building: name=\"{}\", floors={}", self.name, self.floors.len())
    }
}
