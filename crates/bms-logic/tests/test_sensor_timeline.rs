//! Integration tests for sensors feeding hazard evaluation over time.
//!
//! Exercises: TimedSensor → SensorHazard → rule/weighted levels → RoomState
//!
//! All tests are pure logic: no world, no clock.

use bms_logic::encoding::{decode_sensor, encode_sensor};
use bms_logic::hazard::{rule_based_level, weighted_level, SensorHazard};
use bms_logic::maintenance::{maintenance_time, MaintenanceCursor, MaintenanceStep};
use bms_logic::room::{derive_room_state, RoomState, RoomType};
use bms_logic::sensors::TimedSensor;

// ── Helpers ────────────────────────────────────────────────────────────

fn advance(sensors: &mut [TimedSensor]) {
    for s in sensors.iter_mut() {
        s.advance_one_minute();
    }
}

fn samples(sensors: &[TimedSensor]) -> Vec<SensorHazard> {
    sensors
        .iter()
        .map(|s| SensorHazard::new(s.sensor_type(), s.hazard_level()))
        .collect()
}

fn lab_sensors() -> Vec<TimedSensor> {
    vec![
        TimedSensor::carbon_dioxide(vec![800, 1200, 2400], 2, 600, 250).unwrap(),
        TimedSensor::noise(vec![60, 67], 3).unwrap(),
        TimedSensor::temperature(vec![21, 22, 40, 68, 30]).unwrap(),
    ]
}

// ── Evaluation over time ───────────────────────────────────────────────

#[test]
fn rule_based_follows_readings() {
    let mut sensors = lab_sensors();
    let mut levels = Vec::new();
    for _ in 0..5 {
        levels.push(rule_based_level(&samples(&sensors)));
        advance(&mut sensors);
    }
    // minute 3: temperature reaches 68 and short-circuits
    assert_eq!(levels[3], 100);
    assert!(levels.iter().all(|l| *l <= 100));
    // minute 0: mean(co2 0, noise 50, temp 0) = 16
    assert_eq!(levels[0], 16);
}

#[test]
fn weighted_level_tracks_rule_based_shape() {
    let mut sensors = lab_sensors();
    for _ in 0..3 {
        advance(&mut sensors);
    }
    let weights = [20, 30, 50];
    let pairs: Vec<(u8, i32)> = sensors
        .iter()
        .zip(weights)
        .map(|(s, w)| (s.hazard_level(), w))
        .collect();
    // co2 1200 -> 25, noise 67 -> 81, temp 68 -> 100
    // 5 + 24.3 + 50 = 79.3
    assert_eq!(weighted_level(&pairs), 79);
}

#[test]
fn room_state_follows_temperature() {
    let mut temp = TimedSensor::temperature(vec![22, 70, 22]).unwrap();
    let mut states = Vec::new();
    for _ in 0..3 {
        states.push(derive_room_state(Some(temp.hazard_level()), false, true));
        temp.advance_one_minute();
    }
    assert_eq!(
        states,
        vec![RoomState::Maintenance, RoomState::Evacuate, RoomState::Maintenance]
    );
}

// ── Encoding ───────────────────────────────────────────────────────────

#[test]
fn decoded_sensor_replays_the_same_timeline() {
    let original = TimedSensor::occupancy(vec![3, 9, 14, 30, 2], 4, 20).unwrap();
    let mut decoded = decode_sensor(&encode_sensor(&original)).unwrap();
    let mut original = original;
    for _ in 0..40 {
        assert_eq!(decoded.current_reading(), original.current_reading());
        assert_eq!(decoded.hazard_level(), original.hazard_level());
        decoded.advance_one_minute();
        original.advance_one_minute();
    }
}

// ── Maintenance walk ───────────────────────────────────────────────────

#[test]
fn maintenance_walk_visits_rooms_in_order() {
    let rooms = [(RoomType::Study, 5.0), (RoomType::Office, 15.0), (RoomType::Laboratory, 5.0)];
    let mut cursor = MaintenanceCursor::new(rooms.len()).unwrap();
    let mut visits = vec![0usize];
    for _ in 0..100 {
        let (room_type, area) = rooms[cursor.current_index()];
        let required = maintenance_time(room_type, area);
        if let MaintenanceStep::Moved { to, .. } = cursor.step(required, false) {
            visits.push(to);
        }
    }
    // 6 + 12 + 11 = 29 minutes per lap
    assert_eq!(&visits[..7], &[0, 1, 2, 0, 1, 2, 0]);
}
