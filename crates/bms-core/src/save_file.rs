//! Text save files describing buildings.
//!
//! Buildings follow each other with no separator:
//!
//! ```text
//! General Purpose South
//! 2
//! 1:10.0:10.0:2:101,102
//! 101:STUDY:20.0:2:RuleBased
//! NoiseSensor:3:55,62,70
//! TemperatureSensor:1:21,22,23
//! 102:OFFICE:15.0:0
//! 2:8.0:8.0:0
//! ```
//!
//! The floor line's optional fifth field is its maintenance room order. A
//! room line's optional fifth field names its hazard evaluator; sensors of
//! a `WeightingBased` room carry an `@weight` suffix.
//!
//! Loading builds a fresh [`Simulation`], so a file that fails to load
//! leaves nothing behind.

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Lines;

use bms_logic::encoding::{
    decode_evaluator, decode_room_order, decode_sensor, encode_room_order, encode_sensor,
    encode_weighted_sensor, split_weight,
};
use bms_logic::hazard::EvaluatorKind;
use bms_logic::room::RoomType;
use bms_logic::LogicError;
use hecs::Entity;

use crate::engine::Simulation;
use crate::error::BmsError;
use crate::systems::lookup;

const FIELD_SEPARATOR: char = ':';

/// Read a save file into a new simulation.
pub fn load_save_file<P: AsRef<Path>>(path: P) -> Result<Simulation, BmsError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let sim = parse_save_file(&text)?;
    log::info!(
        "loaded {} buildings from {}",
        sim.buildings().len(),
        path.display()
    );
    Ok(sim)
}

/// Write every building of a simulation to a save file.
pub fn write_save_file<P: AsRef<Path>>(sim: &Simulation, path: P) -> Result<(), BmsError> {
    let path = path.as_ref();
    fs::write(path, encode_buildings(sim)?)?;
    log::info!("saved {} buildings to {}", sim.buildings().len(), path.display());
    Ok(())
}

/// Parse save-file text into a new simulation.
pub fn parse_save_file(text: &str) -> Result<Simulation, BmsError> {
    let mut sim = Simulation::new();
    let mut reader = LineReader::new(text);
    while reader.skip_blank() {
        read_building(&mut sim, &mut reader)?;
    }
    Ok(sim)
}

/// Encode every building of a simulation in save-file form.
pub fn encode_buildings(sim: &Simulation) -> Result<String, BmsError> {
    let world = sim.world();
    let mut out = String::new();
    for building in sim.buildings() {
        let building = lookup::building(world, building)?;
        let floors = building.floors();
        push_line(&mut out, building.name());
        push_line(&mut out, &floors.len().to_string());

        for floor in floors {
            let floor = lookup::floor(world, floor)?;
            let rooms = floor.rooms();
            let mut line = format!(
                "{}:{}:{}:{}",
                floor.number(),
                floor.width(),
                floor.length(),
                rooms.len()
            );
            if let Some(schedule) = floor.maintenance_schedule() {
                let schedule = lookup::schedule(world, schedule)?;
                line.push(FIELD_SEPARATOR);
                line.push_str(&encode_room_order(&schedule.room_numbers()));
            }
            push_line(&mut out, &line);

            for room in rooms {
                encode_room(sim, room, &mut out)?;
            }
        }
    }
    Ok(out)
}

fn encode_room(sim: &Simulation, room: Entity, out: &mut String) -> Result<(), BmsError> {
    let world = sim.world();
    let room = lookup::room(world, room)?;
    let sensors = room.sensors();
    let evaluator = room.hazard_evaluator();

    let mut line = format!(
        "{}:{}:{}:{}",
        room.number(),
        room.room_type(),
        room.area(),
        sensors.len()
    );
    if let Some(eval) = &evaluator {
        line.push(FIELD_SEPARATOR);
        line.push_str(eval.kind().name());
    }
    push_line(out, &line);

    for sensor in sensors {
        let weight = evaluator.as_ref().and_then(|e| e.weight_of(sensor));
        let sensor = lookup::sensor(world, sensor)?;
        match weight {
            Some(w) => push_line(out, &encode_weighted_sensor(&sensor, w)),
            None => push_line(out, &encode_sensor(&sensor)),
        }
    }
    Ok(())
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Line cursor tracking 1-based line numbers for error reports.
struct LineReader<'a> {
    lines: Peekable<Lines<'a>>,
    line_no: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
            line_no: 0,
        }
    }

    /// Skip blank lines; false once the input is exhausted.
    fn skip_blank(&mut self) -> bool {
        while let Some(line) = self.lines.peek() {
            if !line.trim().is_empty() {
                return true;
            }
            self.lines.next();
            self.line_no += 1;
        }
        false
    }

    fn next(&mut self, what: &str) -> Result<(usize, &'a str), BmsError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line.trim()))
            }
            None => Err(BmsError::file_format(
                self.line_no + 1,
                format!("unexpected end of file, expected {what}"),
            )),
        }
    }
}

fn at_line(line: usize) -> impl Fn(BmsError) -> BmsError {
    move |e| match e {
        BmsError::FileFormat { line: 0, reason } => BmsError::FileFormat { line, reason },
        BmsError::FileFormat { .. } | BmsError::Io(_) => e,
        other => BmsError::FileFormat {
            line,
            reason: other.to_string(),
        },
    }
}

fn logic_at(line: usize) -> impl Fn(LogicError) -> BmsError {
    move |e| at_line(line)(e.into())
}

fn parse_field<T: std::str::FromStr>(field: &str, what: &str, line: usize) -> Result<T, BmsError> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| BmsError::file_format(line, format!("invalid {what} '{field}'")))
}

fn read_building(sim: &mut Simulation, reader: &mut LineReader<'_>) -> Result<(), BmsError> {
    let (_, name) = reader.next("building name")?;
    let building = sim.create_building(name);
    let (line, count) = reader.next("floor count")?;
    let floors: usize = parse_field(count, "floor count", line)?;

    for _ in 0..floors {
        let (line, floor) = read_floor(sim, reader)?;
        sim.add_floor(building, floor).map_err(at_line(line))?;
    }
    Ok(())
}

fn read_floor(
    sim: &mut Simulation,
    reader: &mut LineReader<'_>,
) -> Result<(usize, Entity), BmsError> {
    let (line, text) = reader.next("floor line")?;
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if !(4..=5).contains(&fields.len()) {
        return Err(BmsError::file_format(
            line,
            format!("floor line needs 4 or 5 fields, found {}", fields.len()),
        ));
    }
    let number: i32 = parse_field(fields[0], "floor number", line)?;
    let width: f64 = parse_field(fields[1], "floor width", line)?;
    let length: f64 = parse_field(fields[2], "floor length", line)?;
    let room_count: usize = parse_field(fields[3], "room count", line)?;
    let order = match fields.get(4) {
        Some(field) => Some(decode_room_order(field).map_err(logic_at(line))?),
        None => None,
    };

    let floor = sim.create_floor(number, width, length);
    let mut rooms = Vec::with_capacity(room_count);
    for _ in 0..room_count {
        let (room_line, room) = read_room(sim, reader)?;
        sim.add_room(floor, room).map_err(at_line(room_line))?;
        rooms.push(room);
    }

    if let Some(order) = order {
        let mut schedule_rooms = Vec::with_capacity(order.len());
        for number in order {
            let room = rooms
                .iter()
                .copied()
                .find(|r| sim.room(*r).map(|r| r.number() == number).unwrap_or(false))
                .ok_or_else(|| {
                    BmsError::file_format(
                        line,
                        format!("maintenance order names unknown room #{number}"),
                    )
                })?;
            schedule_rooms.push(room);
        }
        sim.create_maintenance_schedule(floor, schedule_rooms)
            .map_err(at_line(line))?;
    }
    Ok((line, floor))
}

fn read_room(
    sim: &mut Simulation,
    reader: &mut LineReader<'_>,
) -> Result<(usize, Entity), BmsError> {
    let (line, text) = reader.next("room line")?;
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if !(4..=5).contains(&fields.len()) {
        return Err(BmsError::file_format(
            line,
            format!("room line needs 4 or 5 fields, found {}", fields.len()),
        ));
    }
    let number: u32 = parse_field(fields[0], "room number", line)?;
    let room_type: RoomType = fields[1].trim().parse().map_err(logic_at(line))?;
    let area: f64 = parse_field(fields[2], "room area", line)?;
    let sensor_count: usize = parse_field(fields[3], "sensor count", line)?;
    let evaluator = match fields.get(4) {
        Some(field) => Some(decode_evaluator(field).map_err(logic_at(line))?),
        None => None,
    };

    let room = sim.create_room(number, room_type, area);
    let mut sensors = Vec::with_capacity(sensor_count);
    for _ in 0..sensor_count {
        let (sensor_line, text) = reader.next("sensor line")?;
        let (encoded, weight) = split_weight(text).map_err(logic_at(sensor_line))?;
        if weight.is_some() && evaluator != Some(EvaluatorKind::WeightingBased) {
            return Err(BmsError::file_format(
                sensor_line,
                "sensor weighting given for a room without a weighting-based evaluator",
            ));
        }
        if weight.is_none() && evaluator == Some(EvaluatorKind::WeightingBased) {
            return Err(BmsError::file_format(
                sensor_line,
                "sensor in a weighting-based room has no weighting",
            ));
        }
        let sensor = decode_sensor(encoded).map_err(logic_at(sensor_line))?;
        let sensor = sim.install_sensor(sensor);
        sim.add_sensor(room, sensor).map_err(at_line(sensor_line))?;
        sensors.push((sensor, weight.unwrap_or(0)));
    }

    let evaluator = match evaluator {
        Some(EvaluatorKind::RuleBased) => {
            Some(sim.rule_based_evaluator(sensors.iter().map(|(s, _)| *s).collect()))
        }
        Some(EvaluatorKind::WeightingBased) => Some(sim.weighting_based_evaluator(sensors)),
        None => None,
    };
    if let Some(evaluator) = evaluator {
        let evaluator = evaluator.map_err(at_line(line))?;
        sim.set_hazard_evaluator(room, Some(evaluator)).map_err(at_line(line))?;
    }
    Ok((line, room))
}
