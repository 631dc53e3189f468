//! Seeded demo campus generation.
//!
//! Builds a small campus with randomised reading sequences. The same seed
//! always produces the same campus, so a failing run can be replayed.

use anyhow::{Context, Result};
use bms_core::prelude::*;
use bms_logic::room::RoomType;
use bms_logic::sensors::TimedSensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BUILDINGS: [&str; 2] = ["Forgan Smith", "Hawken Engineering"];
const FLOORS_PER_BUILDING: i32 = 3;
const ROOMS_PER_FLOOR: u32 = 4;

/// Generate the demo campus into a fresh simulation.
pub fn build_campus(seed: u64) -> Result<Simulation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = Simulation::new();

    for name in BUILDINGS {
        let building = sim.create_building(name);
        let mut width = rng.gen_range(18.0..24.0_f64).round();
        let mut length = rng.gen_range(14.0..20.0_f64).round();

        for number in 1..=FLOORS_PER_BUILDING {
            let floor = sim.create_floor(number, width, length);
            sim.add_floor(building, floor)
                .with_context(|| format!("adding floor {number} to {name}"))?;

            let mut rooms = Vec::new();
            for i in 1..=ROOMS_PER_FLOOR {
                let room_number = number as u32 * 100 + i;
                let room_type = RoomType::ALL[rng.gen_range(0..RoomType::ALL.len())];
                let area = rng.gen_range(8.0..20.0_f64).round();
                let room = sim.create_room(room_number, room_type, area);
                sim.add_room(floor, room)
                    .with_context(|| format!("adding room #{room_number}"))?;
                equip_room(&mut sim, room, &mut rng)
                    .with_context(|| format!("equipping room #{room_number}"))?;
                rooms.push(room);
            }

            // Every other room, wrapping, so no room follows itself.
            let order: Vec<Entity> = rooms
                .iter()
                .step_by(2)
                .chain(rooms.iter().skip(1).step_by(2))
                .copied()
                .collect();
            sim.create_maintenance_schedule(floor, order)
                .with_context(|| format!("scheduling maintenance on floor {number} of {name}"))?;

            // Upper floors may shrink but never overhang.
            width -= rng.gen_range(0..=2) as f64;
            length -= rng.gen_range(0..=2) as f64;
        }
    }
    Ok(sim)
}

fn equip_room(sim: &mut Simulation, room: Entity, rng: &mut StdRng) -> Result<()> {
    let mut sensors = Vec::new();

    sensors.push(sim.install_sensor(TimedSensor::temperature(temperature_readings(rng))?));
    if rng.gen_bool(0.7) {
        let readings = (0..rng.gen_range(3..8)).map(|_| rng.gen_range(40..85)).collect();
        sensors.push(sim.install_sensor(TimedSensor::noise(readings, rng.gen_range(1..=5))?));
    }
    if rng.gen_bool(0.6) {
        let capacity = rng.gen_range(10..40);
        let readings = (0..rng.gen_range(3..8)).map(|_| rng.gen_range(0..=capacity + 5)).collect();
        let sensor = TimedSensor::occupancy(readings, rng.gen_range(1..=5), capacity)?;
        sensors.push(sim.install_sensor(sensor));
    }
    if rng.gen_bool(0.5) {
        let readings = (0..rng.gen_range(3..8)).map(|_| rng.gen_range(400..5500)).collect();
        let sensor = TimedSensor::carbon_dioxide(readings, rng.gen_range(1..=5), 600, 250)?;
        sensors.push(sim.install_sensor(sensor));
    }
    for sensor in &sensors {
        sim.add_sensor(room, *sensor)?;
    }

    let evaluator = if rng.gen_bool(0.5) {
        sim.rule_based_evaluator(sensors)?
    } else {
        let weightings = split_weights(sensors.len(), rng);
        sim.weighting_based_evaluator(sensors.into_iter().zip(weightings).collect())?
    };
    sim.set_hazard_evaluator(room, Some(evaluator))?;
    Ok(())
}

/// Comfortable temperatures with the odd fire spike.
fn temperature_readings(rng: &mut StdRng) -> Vec<i32> {
    (0..rng.gen_range(4..12))
        .map(|_| {
            if rng.gen_bool(0.05) {
                rng.gen_range(68..95)
            } else {
                rng.gen_range(16..30)
            }
        })
        .collect()
}

/// `n` non-negative weights summing to 100.
fn split_weights(n: usize, rng: &mut StdRng) -> Vec<i32> {
    let mut remaining = 100;
    let mut weights = Vec::with_capacity(n);
    for i in 0..n {
        let w = if i + 1 == n { remaining } else { rng.gen_range(0..=remaining) };
        remaining -= w;
        weights.push(w);
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_campus() {
        let a = bms_core::save_file::encode_buildings(&build_campus(7).unwrap()).unwrap();
        let b = bms_core::save_file::encode_buildings(&build_campus(7).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_weights_sum() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 1..=4 {
            let w = split_weights(n, &mut rng);
            assert_eq!(w.len(), n);
            assert_eq!(w.iter().sum::<i32>(), 100);
        }
    }
}
