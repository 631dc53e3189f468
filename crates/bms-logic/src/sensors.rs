//! Timed environmental sensors and their hazard/comfort scoring.
//!
//! A [`TimedSensor`] walks through a fixed sequence of raw readings, moving
//! to the next value every `update_frequency` simulated minutes and wrapping
//! back to the start when the sequence runs out. What a raw reading means
//! depends on the [`SensorKind`] it carries:
//!
//! | Kind | Reading | Hazard | Comfort |
//! |------|---------|--------|---------|
//! | `CarbonDioxide` | ppm | stepped 0/25/50/100 | none |
//! | `Noise` | dB | relative loudness vs 70 dB | none |
//! | `Occupancy` | people | share of capacity | free share of capacity |
//! | `Temperature` | °C | 100 at or above 68 | 100 inside 20..=26 |
//!
//! Sensors are plain data. Registering them with a clock and attaching them
//! to rooms happens in the engine crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogicError;

/// Shortest allowed interval between reading updates, in minutes.
pub const MIN_UPDATE_FREQUENCY: i32 = 1;
/// Longest allowed interval between reading updates, in minutes.
pub const MAX_UPDATE_FREQUENCY: i32 = 5;
/// Temperature sensors always update every minute.
pub const TEMPERATURE_UPDATE_FREQUENCY: i32 = 1;
/// Reading (°C) at which a temperature sensor reports a fire.
pub const FIRE_TEMPERATURE: i32 = 68;
/// Reference loudness for noise sensors, in decibels.
pub const NOISE_REFERENCE_DB: f64 = 70.0;

/// Sensor kind tag without parameters.
///
/// Variants are declared in the alphabetical order of their kind names, so
/// the derived `Ord` is the order rooms keep their sensors in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorType {
    CarbonDioxide,
    Noise,
    Occupancy,
    Temperature,
}

impl SensorType {
    pub const ALL: [SensorType; 4] = [
        SensorType::CarbonDioxide,
        SensorType::Noise,
        SensorType::Occupancy,
        SensorType::Temperature,
    ];

    /// Kind name used in encodings and for ordering.
    pub fn name(self) -> &'static str {
        match self {
            SensorType::CarbonDioxide => "CarbonDioxideSensor",
            SensorType::Noise => "NoiseSensor",
            SensorType::Occupancy => "OccupancySensor",
            SensorType::Temperature => "TemperatureSensor",
        }
    }

    pub fn from_name(name: &str) -> Option<SensorType> {
        SensorType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete sensor kind together with its kind-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Noise,
    /// People counter for a room that fits `capacity` people.
    Occupancy { capacity: i32 },
    /// CO2 meter with an ideal concentration and acceptable variation (ppm).
    CarbonDioxide { ideal_value: i32, variation_limit: i32 },
}

impl SensorKind {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            SensorKind::Temperature => SensorType::Temperature,
            SensorKind::Noise => SensorType::Noise,
            SensorKind::Occupancy { .. } => SensorType::Occupancy,
            SensorKind::CarbonDioxide { .. } => SensorType::CarbonDioxide,
        }
    }

    fn validate(&self) -> Result<(), LogicError> {
        match *self {
            SensorKind::Occupancy { capacity } if capacity < 0 => Err(LogicError::invalid(
                format!("occupancy capacity must be >= 0, got {capacity}"),
            )),
            SensorKind::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => {
                if ideal_value <= 0 || variation_limit <= 0 {
                    Err(LogicError::invalid(format!(
                        "CO2 ideal value and variation limit must be > 0, got {ideal_value} and {variation_limit}"
                    )))
                } else if ideal_value < variation_limit {
                    Err(LogicError::invalid(format!(
                        "CO2 ideal value {ideal_value} is below its variation limit {variation_limit}"
                    )))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

/// A sensor whose current reading cycles through a fixed sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSensor {
    kind: SensorKind,
    readings: Vec<i32>,
    update_frequency: i32,
    elapsed_minutes: u32,
    current_index: usize,
}

impl TimedSensor {
    /// Create a sensor positioned on its first reading.
    ///
    /// Fails with [`LogicError::InvalidArgument`] when the frequency is outside
    /// `1..=5`, the readings are empty or contain a negative value, a
    /// temperature sensor is given a frequency other than 1, or the kind's own
    /// parameters are out of range.
    pub fn new(
        kind: SensorKind,
        readings: Vec<i32>,
        update_frequency: i32,
    ) -> Result<Self, LogicError> {
        if !(MIN_UPDATE_FREQUENCY..=MAX_UPDATE_FREQUENCY).contains(&update_frequency) {
            return Err(LogicError::invalid(format!(
                "update frequency must be within {MIN_UPDATE_FREQUENCY}..={MAX_UPDATE_FREQUENCY}, got {update_frequency}"
            )));
        }
        if readings.is_empty() {
            return Err(LogicError::invalid("sensor readings must not be empty"));
        }
        if let Some(bad) = readings.iter().find(|r| **r < 0) {
            return Err(LogicError::invalid(format!(
                "sensor readings must be >= 0, got {bad}"
            )));
        }
        if kind == SensorKind::Temperature && update_frequency != TEMPERATURE_UPDATE_FREQUENCY {
            return Err(LogicError::invalid(format!(
                "temperature sensors update every {TEMPERATURE_UPDATE_FREQUENCY} minute, got {update_frequency}"
            )));
        }
        kind.validate()?;

        Ok(Self {
            kind,
            readings,
            update_frequency,
            elapsed_minutes: 0,
            current_index: 0,
        })
    }

    pub fn temperature(readings: Vec<i32>) -> Result<Self, LogicError> {
        Self::new(SensorKind::Temperature, readings, TEMPERATURE_UPDATE_FREQUENCY)
    }

    pub fn noise(readings: Vec<i32>, update_frequency: i32) -> Result<Self, LogicError> {
        Self::new(SensorKind::Noise, readings, update_frequency)
    }

    pub fn occupancy(
        readings: Vec<i32>,
        update_frequency: i32,
        capacity: i32,
    ) -> Result<Self, LogicError> {
        Self::new(SensorKind::Occupancy { capacity }, readings, update_frequency)
    }

    pub fn carbon_dioxide(
        readings: Vec<i32>,
        update_frequency: i32,
        ideal_value: i32,
        variation_limit: i32,
    ) -> Result<Self, LogicError> {
        Self::new(
            SensorKind::CarbonDioxide {
                ideal_value,
                variation_limit,
            },
            readings,
            update_frequency,
        )
    }

    /// Fast-forward a freshly built sensor to `elapsed_minutes`.
    ///
    /// The reading position is fully determined by the elapsed time, so a
    /// restored sensor is indistinguishable from one ticked that many times.
    pub fn resume_at(mut self, elapsed_minutes: u32) -> Self {
        let updates = elapsed_minutes as usize / self.update_frequency as usize;
        self.elapsed_minutes = elapsed_minutes;
        self.current_index = updates % self.readings.len();
        self
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn sensor_type(&self) -> SensorType {
        self.kind.sensor_type()
    }

    pub fn readings(&self) -> &[i32] {
        &self.readings
    }

    pub fn update_frequency(&self) -> i32 {
        self.update_frequency
    }

    pub fn elapsed_minutes(&self) -> u32 {
        self.elapsed_minutes
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_reading(&self) -> i32 {
        self.readings[self.current_index]
    }

    /// Advance the sensor's clock by one minute, moving to the next reading
    /// (wrapping at the end) whenever the elapsed time is a multiple of the
    /// update frequency.
    pub fn advance_one_minute(&mut self) {
        self.elapsed_minutes += 1;
        if self.elapsed_minutes % self.update_frequency as u32 == 0 {
            self.current_index = (self.current_index + 1) % self.readings.len();
        }
    }

    /// Hazard level in `0..=100` derived from the current reading.
    pub fn hazard_level(&self) -> u8 {
        let reading = self.current_reading();
        match self.kind {
            SensorKind::Temperature => {
                if reading >= FIRE_TEMPERATURE {
                    100
                } else {
                    0
                }
            }
            SensorKind::Noise => {
                let hundredths = loudness_ten_thousandths(reading) / 100.0;
                hundredths.floor().min(100.0) as u8
            }
            SensorKind::Occupancy { capacity } => {
                if reading >= capacity {
                    100
                } else {
                    (100.0 * reading as f64 / capacity as f64).round() as u8
                }
            }
            SensorKind::CarbonDioxide { .. } => match reading {
                r if r < 1000 => 0,
                r if r < 2000 => 25,
                r if r < 5000 => 50,
                _ => 100,
            },
        }
    }

    /// Loudness relative to 70 dB, rounded to four decimal places.
    ///
    /// `None` for anything but a noise sensor.
    pub fn relative_loudness(&self) -> Option<f64> {
        match self.kind {
            SensorKind::Noise => Some(loudness_ten_thousandths(self.current_reading()) / 10_000.0),
            _ => None,
        }
    }

    /// Comfort level in `0..=100`, for the kinds that measure comfort.
    pub fn comfort_level(&self) -> Option<u8> {
        let reading = self.current_reading();
        match self.kind {
            SensorKind::Occupancy { capacity } => {
                if reading >= capacity {
                    Some(0)
                } else {
                    let free = (capacity - reading) as f64;
                    Some((100.0 * free / capacity as f64).round() as u8)
                }
            }
            SensorKind::Temperature => Some(temperature_comfort(reading)),
            SensorKind::Noise | SensorKind::CarbonDioxide { .. } => None,
        }
    }

    pub fn is_comfort_sensor(&self) -> bool {
        matches!(
            self.kind,
            SensorKind::Occupancy { .. } | SensorKind::Temperature
        )
    }
}

/// `2^((reading - 70) / 10)` scaled by 10 000 and rounded, so the value is
/// an exact integer in `f64`.
fn loudness_ten_thousandths(reading: i32) -> f64 {
    let exponent = (reading as f64 - NOISE_REFERENCE_DB) / 10.0;
    (2f64.powf(exponent) * 10_000.0).round()
}

fn temperature_comfort(reading: i32) -> u8 {
    match reading {
        20..=26 => 100,
        r if r <= 15 || r >= 31 => 0,
        r if r > 26 => (100 - (r - 26) * 20) as u8,
        r => (100 - (20 - r) * 20) as u8,
    }
}

impl fmt::Display for TimedSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readings: Vec<String> = self.readings.iter().map(|r| r.to_string()).collect();
        write!(
            f,
            "TimedSensor: freq={}, readings={}, type={}",
            self.update_frequency,
            readings.join(","),
            self.sensor_type()
        )?;
        match self.kind {
            SensorKind::Occupancy { capacity } => write!(f, ", capacity={capacity}"),
            SensorKind::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => write!(f, ", idealPPM={ideal_value}, varLimit={variation_limit}"),
            _ => Ok(()),
        }
    }
}
