//! BMS Headless Simulation Harness
//!
//! Builds a seeded demo campus (or loads a save file), drives it minute by
//! minute and checks the simulation's invariants along the way.
//! Runs entirely in-process with no rendering.
//!
//! Usage:
//!   cargo run -p bms-simtest
//!   cargo run -p bms-simtest -- --verbose
//!   cargo run -p bms-simtest -- --json --save campus.txt
//!
//! # Environment Variables
//! - `BMS_MINUTES`, `BMS_SEED`, `BMS_SAVE_FILE` – see [`config`]
//! - `RUST_LOG` or `BMS_LOG_LEVEL` – log verbosity (default: `warn`)

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use bms_core::prelude::*;
use bms_core::save_file;
use bms_core::systems::occupied_area;
use bms_logic::maintenance::maintenance_time;
use bms_logic::room::{RoomState, RoomType};
use bms_logic::sensors::SensorType;
use dotenvy::dotenv;
use serde::Serialize;
use tracing_subscriber::filter::EnvFilter;

mod config;
mod demo;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    minutes: u64,
    buildings: usize,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

struct Options {
    verbose: bool,
    json: bool,
    save: Option<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        verbose: false,
        json: false,
        save: None,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--save" => {
                let path = args.next().ok_or_else(|| anyhow!("--save needs a path"))?;
                options.save = Some(PathBuf::from(path));
            }
            other => return Err(anyhow!("unknown argument '{other}'")),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();
    let options = parse_args()?;

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let mut sim = match &cfg.save_file {
        Some(path) => save_file::load_save_file(path)
            .with_context(|| format!("loading save file {}", path.display()))?,
        None => demo::build_campus(cfg.seed).context("building demo campus")?,
    };

    if !options.json {
        println!("=== BMS Simulation Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Structure
    results.extend(validate_structure(&sim, options.json));

    // 2. Sensor cycles
    results.extend(validate_sensor_cycles(&sim, options.json));

    // 3. Ticking run: room states, hazards and maintenance every minute
    results.extend(run_and_validate(&mut sim, cfg.minutes, options.json));

    // 4. Fire drill on a forked copy
    results.extend(validate_fire_drill(&sim, options.json)?);

    // 5. Recommender
    results.extend(validate_recommender(&sim, options.json));

    // 6. Persistence
    results.extend(validate_persistence(&sim, options.json)?);

    if let Some(path) = &options.save {
        save_file::write_save_file(&sim, path)
            .with_context(|| format!("writing save file {}", path.display()))?;
    }

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if options.json {
        let report = Report {
            minutes: sim.minutes(),
            buildings: sim.buildings().len(),
            passed,
            failed,
            results: &results,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || options.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `BMS_LOG_LEVEL` picks the level.
/// Records from the `log` facade used by the library crates are captured
/// too. Output goes to stderr so `--json` stays machine-readable.
fn init_tracing() {
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("BMS_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn section(title: &str, quiet: bool) {
    if !quiet {
        println!("--- {title} ---");
    }
}

fn all_floors(sim: &Simulation) -> Vec<Entity> {
    sim.buildings()
        .into_iter()
        .filter_map(|b| sim.building(b).ok())
        .flat_map(|b| b.floors())
        .collect()
}

fn all_rooms(sim: &Simulation) -> Vec<Entity> {
    all_floors(sim)
        .into_iter()
        .filter_map(|f| sim.floor(f).ok())
        .flat_map(|f| f.rooms())
        .collect()
}

// ── 1. Structure ────────────────────────────────────────────────────────

fn validate_structure(sim: &Simulation, quiet: bool) -> Vec<TestResult> {
    section("Structure", quiet);
    let mut results = Vec::new();

    let rooms = all_rooms(sim);
    results.push(TestResult::new(
        "campus_not_empty",
        !rooms.is_empty(),
        format!("{} buildings, {} rooms", sim.buildings().len(), rooms.len()),
    ));

    let mut overfull = Vec::new();
    for floor in all_floors(sim) {
        if let (Ok(f), Ok(used)) = (sim.floor(floor), occupied_area(sim.world(), floor)) {
            if used > f.area() {
                overfull.push(f.number());
            }
        }
    }
    results.push(TestResult::new(
        "rooms_fit_on_floors",
        overfull.is_empty(),
        format!("overfull floors: {overfull:?}"),
    ));

    let mut unsorted = 0;
    for room in &rooms {
        let kinds: Vec<SensorType> = sim
            .sensors(*room)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| sim.sensor(s).ok().map(|s| s.sensor_type()))
            .collect();
        if kinds.windows(2).any(|w| w[0] >= w[1]) {
            unsorted += 1;
        }
    }
    results.push(TestResult::new(
        "sensors_unique_and_sorted",
        unsorted == 0,
        format!("{unsorted} rooms with unsorted or repeated sensor kinds"),
    ));
    results
}

// ── 2. Sensor cycles ────────────────────────────────────────────────────

fn validate_sensor_cycles(sim: &Simulation, quiet: bool) -> Vec<TestResult> {
    section("Sensor Cycles", quiet);
    let mut checked = 0;
    let mut broken = Vec::new();

    for item in sim.clock().items() {
        let TimedItem::Sensor(entity) = item else {
            continue;
        };
        let Ok(start) = sim.sensor(entity) else {
            continue;
        };
        let mut sensor = start.clone();
        let period = sensor.update_frequency() as usize * sensor.readings().len();
        for _ in 0..period {
            sensor.advance_one_minute();
            if sensor.hazard_level() > 100 {
                broken.push(format!("{sensor}: hazard above 100"));
            }
        }
        if sensor.current_reading() != start.current_reading()
            || sensor.current_index() != start.current_index()
        {
            broken.push(format!("{start}: did not wrap after {period} minutes"));
        }
        checked += 1;
    }

    vec![TestResult::new(
        "sensor_readings_wrap",
        broken.is_empty(),
        if broken.is_empty() {
            format!("{checked} sensors cycle back to their starting reading")
        } else {
            broken.join("; ")
        },
    )]
}

// ── 3. Ticking run ──────────────────────────────────────────────────────

fn run_and_validate(sim: &mut Simulation, minutes: u32, quiet: bool) -> Vec<TestResult> {
    section("Ticking Run", quiet);
    let rooms = all_rooms(sim);
    let floors = all_floors(sim);
    let mut state_errors = Vec::new();
    let mut hazard_errors = Vec::new();
    let mut maintenance_errors = Vec::new();
    let mut evacuations = 0usize;

    for _ in 0..minutes {
        sim.tick();
        let minute = sim.minutes();

        for room in &rooms {
            let Ok(state) = sim.room_state(*room) else {
                continue;
            };
            let Ok(data) = sim.room(*room) else {
                continue;
            };
            if state == RoomState::Error {
                state_errors.push(format!("minute {minute}: room #{} in ERROR", data.number()));
            }
            let fire = data
                .sensor_of_type(SensorType::Temperature)
                .and_then(|s| sim.sensor(s).ok())
                .map_or(false, |s| s.hazard_level() == 100);
            if fire && state != RoomState::Evacuate {
                state_errors.push(format!(
                    "minute {minute}: room #{} has a fire reading but is {state}",
                    data.number()
                ));
            }
            if state == RoomState::Evacuate {
                evacuations += 1;
            }
            if let Ok(Some(level)) = sim.room_hazard_level(*room) {
                if level > 100 {
                    hazard_errors.push(format!(
                        "minute {minute}: room #{} hazard {level}",
                        data.number()
                    ));
                }
            }
        }

        for floor in &floors {
            let Some(schedule) = sim
                .floor(*floor)
                .ok()
                .and_then(|f| f.maintenance_schedule())
            else {
                continue;
            };
            let Ok(schedule) = sim.maintenance_schedule(schedule) else {
                continue;
            };
            let Ok(current) = sim.room(schedule.current_room()) else {
                continue;
            };
            if !current.maintenance() {
                maintenance_errors
                    .push(format!("minute {minute}: {schedule} but room is not flagged"));
            }
            if schedule.current_elapsed() > maintenance_time(current.room_type(), current.area()) {
                maintenance_errors.push(format!("minute {minute}: {schedule} overran"));
            }
        }
    }

    vec![
        TestResult::new(
            "room_states_consistent",
            state_errors.is_empty(),
            if state_errors.is_empty() {
                format!(
                    "{} room-minutes checked, {evacuations} evacuating",
                    rooms.len() * minutes as usize
                )
            } else {
                state_errors.join("; ")
            },
        ),
        TestResult::new(
            "hazard_levels_in_range",
            hazard_errors.is_empty(),
            hazard_errors.join("; "),
        ),
        TestResult::new(
            "maintenance_follows_schedule",
            maintenance_errors.is_empty(),
            if maintenance_errors.is_empty() {
                format!("{} schedules tracked for {minutes} minutes", floors.len())
            } else {
                maintenance_errors.join("; ")
            },
        ),
    ]
}

// ── 4. Fire drill ───────────────────────────────────────────────────────

/// Independent copy of a simulation, via a snapshot round trip.
fn fork(sim: &Simulation) -> Result<Simulation> {
    let mut buf = Vec::new();
    sim.save(&mut buf)?;
    Ok(Simulation::load(buf.as_slice())?)
}

fn validate_fire_drill(sim: &Simulation, quiet: bool) -> Result<Vec<TestResult>> {
    section("Fire Drill", quiet);
    let mut copy = fork(sim)?;
    let mut results = Vec::new();

    let mut drilled = 0;
    for building in copy.buildings() {
        drilled += copy.building_fire_drill(building, None)?;
    }
    let rooms = all_rooms(&copy);
    let evacuating = rooms
        .iter()
        .filter(|r| copy.room_state(**r).ok() == Some(RoomState::Evacuate))
        .count();
    results.push(TestResult::new(
        "drill_evacuates_every_room",
        evacuating == rooms.len() && drilled == rooms.len(),
        format!("{evacuating}/{} rooms evacuating", rooms.len()),
    ));

    let stalled: Vec<_> = all_floors(&copy)
        .into_iter()
        .filter_map(|f| copy.floor(f).ok().and_then(|f| f.maintenance_schedule()))
        .filter_map(|s| copy.maintenance_schedule(s).ok().map(|m| (s, m.to_string())))
        .collect();
    copy.run(30);
    let moved = stalled
        .iter()
        .filter(|(s, before)| {
            let now = copy.maintenance_schedule(*s).map(|m| m.to_string()).ok();
            now.as_ref() != Some(before)
        })
        .count();
    results.push(TestResult::new(
        "drill_stalls_maintenance",
        moved == 0,
        format!("{moved} schedules advanced during the drill"),
    ));

    for building in copy.buildings() {
        copy.cancel_building_fire_drill(building)?;
    }
    let still_drilled = rooms
        .iter()
        .filter(|r| copy.room(**r).map(|r| r.fire_drill()).unwrap_or(false))
        .count();
    results.push(TestResult::new(
        "drill_cancels",
        still_drilled == 0,
        format!("{still_drilled} rooms still flagged"),
    ));
    Ok(results)
}

// ── 5. Recommender ──────────────────────────────────────────────────────

fn validate_recommender(sim: &Simulation, quiet: bool) -> Vec<TestResult> {
    section("Study Room Recommender", quiet);
    let mut results = Vec::new();
    for building in sim.buildings() {
        let name = sim
            .building(building)
            .map(|b| b.name().to_string())
            .unwrap_or_default();
        let (passed, detail) = match sim.recommend_study_room(building) {
            Ok(None) => (true, "no open study room".to_string()),
            Ok(Some(room)) => match (sim.room(room), sim.room_state(room)) {
                (Ok(r), Ok(state)) => (
                    r.room_type() == RoomType::Study && state == RoomState::Open,
                    format!("recommends {r}"),
                ),
                _ => (false, "recommended handle is not a room".to_string()),
            },
            Err(e) => (false, e.to_string()),
        };
        results.push(TestResult::new(&format!("recommend_{name}"), passed, detail));
    }
    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(sim: &Simulation, quiet: bool) -> Result<Vec<TestResult>> {
    section("Persistence", quiet);
    let mut results = Vec::new();

    let encoded = save_file::encode_buildings(sim)?;
    let reparsed = save_file::parse_save_file(&encoded).map(|s| save_file::encode_buildings(&s));
    results.push(match reparsed {
        Ok(Ok(again)) => TestResult::new(
            "save_file_round_trip",
            again == encoded,
            format!("{} lines", encoded.lines().count()),
        ),
        Ok(Err(e)) | Err(e) => TestResult::new("save_file_round_trip", false, e.to_string()),
    });

    let mut original = fork(sim)?;
    let mut restored = fork(&original)?;
    let mut diverged = None;
    for minute in 0..60 {
        original.tick();
        restored.tick();
        let a: Vec<_> = all_rooms(&original).iter().map(|r| original.room_state(*r).ok()).collect();
        let b: Vec<_> = all_rooms(&restored).iter().map(|r| restored.room_state(*r).ok()).collect();
        if a != b {
            diverged = Some(minute);
            break;
        }
    }
    results.push(TestResult::new(
        "snapshot_resumes_identically",
        diverged.is_none() && restored.minutes() == original.minutes(),
        match diverged {
            Some(m) => format!("room states diverged after {m} minutes"),
            None => format!("in step through minute {}", restored.minutes()),
        },
    ));
    Ok(results)
}
