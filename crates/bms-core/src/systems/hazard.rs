//! Hazard evaluators bound to sensor entities.

use bms_logic::hazard::{self, EvaluatorKind, SensorHazard};
use bms_logic::sensors::{SensorType, TimedSensor};
use hecs::{Entity, World};

use crate::error::BmsError;

/// A room's hazard evaluation strategy.
///
/// The sensor set is fixed at construction. Evaluation reads the live
/// readings every time and never caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HazardEvaluator {
    RuleBased {
        sensors: Vec<Entity>,
    },
    /// Sensors with their weights, sorted by sensor kind.
    WeightingBased {
        weightings: Vec<(Entity, i32)>,
    },
}

impl HazardEvaluator {
    /// Rule-based evaluator over `sensors`. Every handle must name a sensor.
    pub fn rule_based(world: &World, sensors: Vec<Entity>) -> Result<Self, BmsError> {
        for sensor in &sensors {
            sensor_type_of(world, *sensor)?;
        }
        Ok(HazardEvaluator::RuleBased { sensors })
    }

    /// Weighting-based evaluator.
    ///
    /// Fails when a handle is not a sensor, a sensor is listed twice, a weight
    /// is outside `0..=100`, or the weights do not sum to 100.
    pub fn weighting_based(
        world: &World,
        weightings: Vec<(Entity, i32)>,
    ) -> Result<Self, BmsError> {
        let mut keyed: Vec<(SensorType, Entity, i32)> = Vec::with_capacity(weightings.len());
        for (sensor, weight) in weightings {
            let sensor_type = sensor_type_of(world, sensor)?;
            if keyed.iter().any(|(_, e, _)| *e == sensor) {
                return Err(BmsError::invalid(format!(
                    "sensor {sensor:?} is weighted more than once"
                )));
            }
            keyed.push((sensor_type, sensor, weight));
        }
        let weights: Vec<i32> = keyed.iter().map(|(_, _, w)| *w).collect();
        hazard::validate_weights(&weights)?;

        keyed.sort_by_key(|(t, _, _)| *t);
        Ok(HazardEvaluator::WeightingBased {
            weightings: keyed.into_iter().map(|(_, e, w)| (e, w)).collect(),
        })
    }

    pub fn kind(&self) -> EvaluatorKind {
        match self {
            HazardEvaluator::RuleBased { .. } => EvaluatorKind::RuleBased,
            HazardEvaluator::WeightingBased { .. } => EvaluatorKind::WeightingBased,
        }
    }

    /// Sensor handles the evaluator reads.
    pub fn sensors(&self) -> Vec<Entity> {
        match self {
            HazardEvaluator::RuleBased { sensors } => sensors.clone(),
            HazardEvaluator::WeightingBased { weightings } => {
                weightings.iter().map(|(e, _)| *e).collect()
            }
        }
    }

    /// Weights in sensor-kind order. Empty for a rule-based evaluator.
    pub fn weightings(&self) -> Vec<i32> {
        match self {
            HazardEvaluator::RuleBased { .. } => Vec::new(),
            HazardEvaluator::WeightingBased { weightings } => {
                weightings.iter().map(|(_, w)| *w).collect()
            }
        }
    }

    /// Weight of one sensor, if the evaluator weights it.
    pub fn weight_of(&self, sensor: Entity) -> Option<i32> {
        match self {
            HazardEvaluator::RuleBased { .. } => None,
            HazardEvaluator::WeightingBased { weightings } => {
                weightings.iter().find(|(e, _)| *e == sensor).map(|(_, w)| *w)
            }
        }
    }

    /// Current hazard level in `0..=100`.
    ///
    /// Sensors are never despawned, so every handle resolves; one that does
    /// not is left out of the calculation.
    pub fn evaluate(&self, world: &World) -> u8 {
        match self {
            HazardEvaluator::RuleBased { sensors } => {
                let samples: Vec<SensorHazard> = sensors
                    .iter()
                    .filter_map(|e| sensor_hazard(world, *e))
                    .collect();
                hazard::rule_based_level(&samples)
            }
            HazardEvaluator::WeightingBased { weightings } => {
                let samples: Vec<(u8, i32)> = weightings
                    .iter()
                    .filter_map(|(e, w)| sensor_hazard(world, *e).map(|h| (h.level, *w)))
                    .collect();
                hazard::weighted_level(&samples)
            }
        }
    }
}

/// Current hazard sample of a sensor entity.
pub fn sensor_hazard(world: &World, sensor: Entity) -> Option<SensorHazard> {
    let sensor = world.get::<&TimedSensor>(sensor).ok()?;
    Some(SensorHazard::new(sensor.sensor_type(), sensor.hazard_level()))
}

fn sensor_type_of(world: &World, sensor: Entity) -> Result<SensorType, BmsError> {
    world
        .get::<&TimedSensor>(sensor)
        .map(|s| s.sensor_type())
        .map_err(|_| BmsError::wrong_entity(sensor, "sensor"))
}
