//! Line encodings used by save files.
//!
//! ```text
//! NoiseSensor:3:55,62,70
//! OccupancySensor:2:12,18,30:30
//! CarbonDioxideSensor:5:702,694,655:600:250
//! TemperatureSensor:1:21,22,23@40        (weighting-based room)
//! 101,102,103                            (maintenance room order)
//! ```
//!
//! Every decoder reports problems as [`LogicError::FileFormat`], including
//! values that decode cleanly but fail a sensor's own range checks.

use crate::error::LogicError;
use crate::hazard::EvaluatorKind;
use crate::sensors::{SensorKind, SensorType, TimedSensor};

const FIELD_SEPARATOR: char = ':';
const LIST_SEPARATOR: char = ',';
const WEIGHT_SEPARATOR: char = '@';

/// Encode a sensor as `Kind:frequency:readings[:extras]`.
pub fn encode_sensor(sensor: &TimedSensor) -> String {
    let mut out = format!(
        "{}{sep}{}{sep}{}",
        sensor.sensor_type().name(),
        sensor.update_frequency(),
        join_list(sensor.readings()),
        sep = FIELD_SEPARATOR
    );
    match sensor.kind() {
        SensorKind::Occupancy { capacity } => {
            out.push(FIELD_SEPARATOR);
            out.push_str(&capacity.to_string());
        }
        SensorKind::CarbonDioxide {
            ideal_value,
            variation_limit,
        } => {
            out.push_str(&format!(
                "{FIELD_SEPARATOR}{ideal_value}{FIELD_SEPARATOR}{variation_limit}"
            ));
        }
        SensorKind::Temperature | SensorKind::Noise => {}
    }
    out
}

/// Encode a sensor followed by its evaluator weighting.
pub fn encode_weighted_sensor(sensor: &TimedSensor, weight: i32) -> String {
    format!("{}{WEIGHT_SEPARATOR}{weight}", encode_sensor(sensor))
}

/// Decode a line produced by [`encode_sensor`].
pub fn decode_sensor(line: &str) -> Result<TimedSensor, LogicError> {
    let fields: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
    let sensor_type = SensorType::from_name(fields[0])
        .ok_or_else(|| LogicError::format(format!("unknown sensor kind '{}'", fields[0])))?;

    let expected = match sensor_type {
        SensorType::Temperature | SensorType::Noise => 3,
        SensorType::Occupancy => 4,
        SensorType::CarbonDioxide => 5,
    };
    if fields.len() != expected {
        return Err(LogicError::format(format!(
            "{} line needs {expected} fields, found {}",
            sensor_type.name(),
            fields.len()
        )));
    }

    let frequency = parse_int(fields[1], "update frequency")?;
    let readings = parse_list(fields[2], "sensor reading")?;
    let kind = match sensor_type {
        SensorType::Temperature => SensorKind::Temperature,
        SensorType::Noise => SensorKind::Noise,
        SensorType::Occupancy => SensorKind::Occupancy {
            capacity: parse_int(fields[3], "capacity")?,
        },
        SensorType::CarbonDioxide => SensorKind::CarbonDioxide {
            ideal_value: parse_int(fields[3], "ideal value")?,
            variation_limit: parse_int(fields[4], "variation limit")?,
        },
    };

    TimedSensor::new(kind, readings, frequency).map_err(|e| LogicError::format(e.to_string()))
}

/// Split a `sensor@weight` line into the sensor part and its weight.
///
/// Lines without a weight return `None` for it.
pub fn split_weight(line: &str) -> Result<(&str, Option<i32>), LogicError> {
    match line.rsplit_once(WEIGHT_SEPARATOR) {
        Some((sensor, weight)) => Ok((sensor, Some(parse_int(weight, "weighting")?))),
        None => Ok((line, None)),
    }
}

/// Decode an evaluator literal.
pub fn decode_evaluator(field: &str) -> Result<EvaluatorKind, LogicError> {
    EvaluatorKind::from_name(field.trim())
        .ok_or_else(|| LogicError::format(format!("unknown hazard evaluator '{field}'")))
}

/// Encode a maintenance room order as comma-separated room numbers.
pub fn encode_room_order(room_numbers: &[u32]) -> String {
    join_list(room_numbers)
}

/// Decode a maintenance room order.
///
/// Only the syntax is checked here; ordering rules are applied when the
/// schedule is created.
pub fn decode_room_order(field: &str) -> Result<Vec<u32>, LogicError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(LogicError::format("maintenance room order is empty"));
    }
    field
        .split(LIST_SEPARATOR)
        .map(|n| {
            n.trim()
                .parse::<u32>()
                .map_err(|_| LogicError::format(format!("invalid room number '{n}'")))
        })
        .collect()
}

fn parse_int(field: &str, what: &str) -> Result<i32, LogicError> {
    field
        .trim()
        .parse::<i32>()
        .map_err(|_| LogicError::format(format!("invalid {what} '{field}'")))
}

fn parse_list(field: &str, what: &str) -> Result<Vec<i32>, LogicError> {
    field.split(LIST_SEPARATOR).map(|v| parse_int(v, what)).collect()
}

fn join_list<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}
