//! Integration tests for text save files and binary snapshots on disk.

use std::fs;
use std::path::PathBuf;

use bms_core::prelude::*;
use bms_core::save_file::{encode_buildings, load_save_file, write_save_file};
use bms_logic::room::RoomType;
use bms_logic::sensors::TimedSensor;

// ── Helpers ────────────────────────────────────────────────────────────

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bms-core-{}-{name}", std::process::id()))
}

/// Two buildings, one with two floors, a schedule and both evaluator kinds.
fn campus() -> Simulation {
    let mut sim = Simulation::new();

    let main = sim.create_building("Central Library");
    let ground = sim.create_floor(1, 12.0, 10.0);
    let upper = sim.create_floor(2, 12.0, 8.5);
    sim.add_floor(main, ground).unwrap();
    sim.add_floor(main, upper).unwrap();

    let study = sim.create_room(101, RoomType::Study, 20.0);
    let lab = sim.create_room(102, RoomType::Laboratory, 30.5);
    let office = sim.create_room(201, RoomType::Office, 12.0);
    sim.add_room(ground, study).unwrap();
    sim.add_room(ground, lab).unwrap();
    sim.add_room(upper, office).unwrap();

    let temp = sim.install_sensor(TimedSensor::temperature(vec![21, 23, 25]).unwrap());
    let occ = sim.install_sensor(TimedSensor::occupancy(vec![4, 12, 9], 3, 15).unwrap());
    sim.add_sensor(study, temp).unwrap();
    sim.add_sensor(study, occ).unwrap();
    let eval = sim.weighting_based_evaluator(vec![(temp, 75), (occ, 25)]).unwrap();
    sim.set_hazard_evaluator(study, Some(eval)).unwrap();

    let co2 = TimedSensor::carbon_dioxide(vec![900, 1800, 5200], 2, 700, 300).unwrap();
    let co2 = sim.install_sensor(co2);
    let noise = sim.install_sensor(TimedSensor::noise(vec![64, 71], 5).unwrap());
    sim.add_sensor(lab, co2).unwrap();
    sim.add_sensor(lab, noise).unwrap();
    let eval = sim.rule_based_evaluator(vec![co2, noise]).unwrap();
    sim.set_hazard_evaluator(lab, Some(eval)).unwrap();

    sim.create_maintenance_schedule(ground, vec![lab, study]).unwrap();

    let annex = sim.create_building("Annex");
    let annex_floor = sim.create_floor(1, 6.0, 6.0);
    sim.add_floor(annex, annex_floor).unwrap();
    sim
}

// ── Text save files ────────────────────────────────────────────────────

#[test]
fn save_file_round_trip() {
    let sim = campus();
    let path = temp_path("campus.txt");
    write_save_file(&sim, &path).unwrap();
    let loaded = load_save_file(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(encode_buildings(&loaded).unwrap(), encode_buildings(&sim).unwrap());
    assert_eq!(loaded.buildings().len(), 2);

    let main = loaded.building(loaded.buildings()[0]).unwrap();
    assert_eq!(main.to_string(), "Building: name=\"Central Library\", floors=2");
    let ground = loaded.floor(main.floors()[0]).unwrap();
    assert_eq!(ground.to_string(), "Floor #1: width=12.00m, length=10.00m, rooms=2");
    let lab = loaded.room(ground.rooms()[1]).unwrap();
    assert_eq!(lab.to_string(), "Room #102: type=LABORATORY, area=30.50m^2, sensors=2");
    assert!(lab.maintenance());

    let schedule = loaded.maintenance_schedule(ground.maintenance_schedule().unwrap()).unwrap();
    assert_eq!(schedule.room_numbers(), vec![102, 101]);
}

#[test]
fn loaded_sensors_start_from_the_first_reading() {
    let mut sim = campus();
    sim.run(9);
    let text = encode_buildings(&sim).unwrap();
    let loaded = bms_core::save_file::parse_save_file(&text).unwrap();
    assert_eq!(loaded.minutes(), 0);
    for item in loaded.clock().items() {
        if let TimedItem::Sensor(s) = item {
            assert_eq!(loaded.sensor(s).unwrap().current_index(), 0);
        }
    }
}

#[test]
fn partial_evaluator_never_reaches_the_save_file() {
    let mut sim = campus();
    let annex = sim.building(sim.buildings()[1]).unwrap();
    let floor = annex.floors()[0];
    let room = sim.create_room(101, RoomType::Office, 9.0);
    sim.add_room(floor, room).unwrap();
    let temp = sim.install_sensor(TimedSensor::temperature(vec![21]).unwrap());
    let noise = sim.install_sensor(TimedSensor::noise(vec![67], 1).unwrap());
    sim.add_sensor(room, temp).unwrap();
    sim.add_sensor(room, noise).unwrap();

    let weighted = sim.weighting_based_evaluator(vec![(temp, 100)]).unwrap();
    assert!(matches!(
        sim.set_hazard_evaluator(room, Some(weighted)),
        Err(BmsError::InvalidArgument(_))
    ));
    let rule = sim.rule_based_evaluator(vec![noise]).unwrap();
    assert!(matches!(
        sim.set_hazard_evaluator(room, Some(rule)),
        Err(BmsError::InvalidArgument(_))
    ));

    let path = temp_path("partial.txt");
    write_save_file(&sim, &path).unwrap();
    let loaded = load_save_file(&path).unwrap();
    fs::remove_file(&path).ok();
    assert_eq!(encode_buildings(&loaded).unwrap(), encode_buildings(&sim).unwrap());

    let annex = loaded.building(loaded.buildings()[1]).unwrap();
    let reloaded = loaded.floor(annex.floors()[0]).unwrap().rooms()[0];
    assert_eq!(loaded.hazard_evaluator(reloaded).unwrap(), None);
    assert_eq!(loaded.room_hazard_level(reloaded).unwrap(), None);
}

#[test]
fn missing_file_is_an_io_error() {
    let path = temp_path("does-not-exist.txt");
    assert!(matches!(load_save_file(&path), Err(BmsError::Io(_))));
}

#[test]
fn malformed_file_reports_its_line() {
    let path = temp_path("broken.txt");
    fs::write(&path, "Tower\n1\n1:10:10:1\n101:STUDY:ten:0\n").unwrap();
    let result = load_save_file(&path);
    fs::remove_file(&path).ok();
    assert!(matches!(result, Err(BmsError::FileFormat { line: 4, .. })));
}

// ── Binary snapshots ───────────────────────────────────────────────────

#[test]
fn snapshot_resumes_mid_maintenance() {
    let mut sim = campus();
    sim.run(17);
    let path = temp_path("campus.bin");
    sim.save(fs::File::create(&path).unwrap()).unwrap();
    let mut loaded = Simulation::load(fs::File::open(&path).unwrap()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(loaded.minutes(), 17);
    for _ in 0..40 {
        sim.tick();
        loaded.tick();
        assert_eq!(encode_buildings(&loaded).unwrap(), encode_buildings(&sim).unwrap());
        let a = sim.building(sim.buildings()[0]).unwrap().floors()[0];
        let b = loaded.building(loaded.buildings()[0]).unwrap().floors()[0];
        let sa = sim
            .maintenance_schedule(sim.floor(a).unwrap().maintenance_schedule().unwrap())
            .unwrap();
        let sb = loaded
            .maintenance_schedule(loaded.floor(b).unwrap().maintenance_schedule().unwrap())
            .unwrap();
        assert_eq!(sa.to_string(), sb.to_string());
    }
}
