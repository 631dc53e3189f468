//! Integration tests for a ticking building simulation.
//!
//! Exercises: Simulation → Clock → sensors, evaluators, maintenance
//! schedules, fire drills and the study room recommender.

use bms_core::prelude::*;
use bms_logic::room::{RoomState, RoomType};
use bms_logic::sensors::TimedSensor;
use hecs::Entity;

// ── Helpers ────────────────────────────────────────────────────────────

struct Fixture {
    sim: Simulation,
    building: Entity,
    floor: Entity,
    office: Entity,
    study: Entity,
}

/// One floor with an office (101, 15 m²) and a study (102, 6 m²).
fn fixture() -> Fixture {
    let mut sim = Simulation::new();
    let building = sim.create_building("Advanced Engineering");
    let floor = sim.create_floor(1, 10.0, 10.0);
    sim.add_floor(building, floor).unwrap();
    let office = sim.create_room(101, RoomType::Office, 15.0);
    let study = sim.create_room(102, RoomType::Study, 6.0);
    sim.add_room(floor, office).unwrap();
    sim.add_room(floor, study).unwrap();
    Fixture {
        sim,
        building,
        floor,
        office,
        study,
    }
}

fn schedule_state(sim: &Simulation, schedule: Entity) -> (u32, u32) {
    let s = sim.maintenance_schedule(schedule).unwrap();
    (s.current_room_number(), s.current_elapsed())
}

// ── Maintenance ────────────────────────────────────────────────────────

#[test]
fn office_is_maintained_for_eleven_minutes() {
    let mut f = fixture();
    assert_eq!(f.sim.maintenance_time(f.office).unwrap(), 11);
    let schedule = f
        .sim
        .create_maintenance_schedule(f.floor, vec![f.office, f.study])
        .unwrap();
    assert_eq!(f.sim.room_state(f.office).unwrap(), RoomState::Maintenance);

    f.sim.run(11);
    assert_eq!(schedule_state(&f.sim, schedule), (101, 11));

    f.sim.tick();
    assert_eq!(schedule_state(&f.sim, schedule), (102, 0));
    assert_eq!(f.sim.room_state(f.office).unwrap(), RoomState::Open);
    assert_eq!(f.sim.room_state(f.study).unwrap(), RoomState::Maintenance);
    assert_eq!(
        f.sim.maintenance_schedule(schedule).unwrap().to_string(),
        "MaintenanceSchedule: currentRoom=#102, currentElapsed=0"
    );
}

#[test]
fn replacing_a_schedule_clears_the_old_room() {
    let mut f = fixture();
    let first = f.sim.create_maintenance_schedule(f.floor, vec![f.office]).unwrap();
    let second = f.sim.create_maintenance_schedule(f.floor, vec![f.study]).unwrap();

    assert!(!f.sim.room(f.office).unwrap().maintenance());
    assert!(f.sim.room(f.study).unwrap().maintenance());
    assert_eq!(f.sim.floor(f.floor).unwrap().maintenance_schedule(), Some(second));
    assert!(matches!(
        f.sim.maintenance_schedule(first),
        Err(BmsError::WrongEntity { .. })
    ));

    // The discarded schedule stays registered but is never advanced.
    f.sim.run(30);
    assert!(!f.sim.room(f.office).unwrap().maintenance());
}

#[test]
fn fire_drill_stalls_and_skip_moves_on() {
    let mut f = fixture();
    let schedule = f
        .sim
        .create_maintenance_schedule(f.floor, vec![f.office, f.study])
        .unwrap();
    f.sim.run(3);
    f.sim.building_fire_drill(f.building, None).unwrap();
    f.sim.run(50);
    assert_eq!(schedule_state(&f.sim, schedule), (101, 3));
    assert_eq!(f.sim.room_state(f.office).unwrap(), RoomState::Evacuate);

    f.sim.skip_current_maintenance(schedule).unwrap();
    assert_eq!(schedule_state(&f.sim, schedule), (102, 0));

    f.sim.cancel_building_fire_drill(f.building).unwrap();
    assert_eq!(f.sim.room_state(f.study).unwrap(), RoomState::Maintenance);
    assert_eq!(f.sim.room_state(f.office).unwrap(), RoomState::Open);
}

// ── Clock ordering ─────────────────────────────────────────────────────

#[test]
fn schedule_sees_sensor_reading_from_the_same_tick() {
    let mut f = fixture();
    // Registered before the schedule, so its fire reading lands first.
    let temp = f.sim.install_sensor(TimedSensor::temperature(vec![20, 90]).unwrap());
    f.sim.add_sensor(f.office, temp).unwrap();
    let schedule = f.sim.create_maintenance_schedule(f.floor, vec![f.office]).unwrap();

    f.sim.tick();
    // Minute 1: reading is 90, so the schedule held.
    assert_eq!(schedule_state(&f.sim, schedule), (101, 0));
    f.sim.tick();
    assert_eq!(schedule_state(&f.sim, schedule), (101, 1));
}

#[test]
fn schedule_registered_first_misses_the_new_reading() {
    let mut f = fixture();
    let schedule = f.sim.create_maintenance_schedule(f.floor, vec![f.office]).unwrap();
    let temp = f.sim.install_sensor(TimedSensor::temperature(vec![20, 90]).unwrap());
    f.sim.add_sensor(f.office, temp).unwrap();

    f.sim.tick();
    assert_eq!(schedule_state(&f.sim, schedule), (101, 1));
    assert_eq!(
        f.sim.clock().items(),
        vec![TimedItem::MaintenanceSchedule(schedule), TimedItem::Sensor(temp)]
    );
}

// ── Hazards ────────────────────────────────────────────────────────────

#[test]
fn evaluators_follow_the_clock() {
    let mut f = fixture();
    let noise = f.sim.install_sensor(TimedSensor::noise(vec![67, 60], 2).unwrap());
    let occupancy = f.sim.install_sensor(TimedSensor::occupancy(vec![5, 10], 2, 10).unwrap());
    let co2 = f.sim.install_sensor(TimedSensor::carbon_dioxide(vec![2500], 1, 600, 250).unwrap());
    for s in [noise, occupancy, co2] {
        f.sim.add_sensor(f.office, s).unwrap();
    }

    let rule = f.sim.rule_based_evaluator(f.sim.sensors(f.office).unwrap()).unwrap();
    f.sim.set_hazard_evaluator(f.office, Some(rule)).unwrap();
    // mean(50, 81) = 65.5, occupancy 50% -> 32
    assert_eq!(f.sim.room_hazard_level(f.office).unwrap(), Some(32));

    f.sim.run(2);
    // mean(50, 50) = 50, occupancy 100% -> 50
    assert_eq!(f.sim.room_hazard_level(f.office).unwrap(), Some(50));

    let weighted = f
        .sim
        .weighting_based_evaluator(vec![(noise, 50), (occupancy, 25), (co2, 25)])
        .unwrap();
    assert_eq!(weighted.weightings(), vec![25, 50, 25]);
    f.sim.set_hazard_evaluator(f.office, Some(weighted)).unwrap();
    // 50 * 0.25 + 50 * 0.5 + 100 * 0.25 = 62.5
    assert_eq!(f.sim.room_hazard_level(f.office).unwrap(), Some(63));
}

#[test]
fn room_state_is_never_error() {
    let mut f = fixture();
    let temp = f.sim.install_sensor(TimedSensor::temperature(vec![20, 68, 30, 70]).unwrap());
    f.sim.add_sensor(f.study, temp).unwrap();
    f.sim
        .create_maintenance_schedule(f.floor, vec![f.study, f.office])
        .unwrap();
    for minute in 0..60 {
        if minute == 20 {
            f.sim.floor_fire_drill(f.floor, Some(RoomType::Study)).unwrap();
        }
        if minute == 40 {
            f.sim.cancel_floor_fire_drill(f.floor).unwrap();
        }
        for room in [f.office, f.study] {
            assert_ne!(f.sim.room_state(room).unwrap(), RoomState::Error);
        }
        f.sim.tick();
    }
}

// ── Recommender ────────────────────────────────────────────────────────

#[test]
fn recommender_picks_open_study_room() {
    let mut f = fixture();
    let temp = f.sim.install_sensor(TimedSensor::temperature(vec![22]).unwrap());
    f.sim.add_sensor(f.study, temp).unwrap();
    assert_eq!(f.sim.recommend_study_room(f.building).unwrap(), Some(f.study));

    f.sim.set_fire_drill(f.study, true).unwrap();
    assert_eq!(f.sim.recommend_study_room(f.building).unwrap(), None);
}
