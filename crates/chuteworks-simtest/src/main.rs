//! Chuteworks Headless Simulation Harness
//!
//! Validates disposal-network behavior end to end without a game engine.
//! Runs entirely in-process - no rendering, no networking.
//!
//! Usage:
//!   cargo run -p chuteworks-simtest
//!   cargo run -p chuteworks-simtest -- --verbose

use std::collections::HashSet;

use serde::Deserialize;

use chuteworks_core::layout::NetworkLayout;
use chuteworks_core::prelude::*;
use chuteworks_logic::atmosphere::{GasId, GasMixture};

// ── Network manifest (the same JSON the engine consumes) ────────────────
const MANIFEST_JSON: &str = include_str!("../../../data/network_manifest.json");

#[derive(Debug, Deserialize)]
struct Manifest {
    layouts: Vec<NetworkLayout>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn result(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_owned(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    simple_logger::SimpleLogger::new()
        .with_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init()
        .ok();

    println!("=== Chuteworks Simulation Harness ===\n");

    let manifest: Manifest =
        serde_json::from_str(MANIFEST_JSON).expect("network manifest should parse");

    let mut results = Vec::new();

    // 1. Manifest sanity
    results.extend(validate_manifest(&manifest));

    // 2. Tag API rules
    results.extend(validate_tag_rules());

    // 3. Straight run: no turns, full drain at the far end
    results.extend(validate_straight_run(&manifest));

    // 4. Turn damage at a bend
    results.extend(validate_turn_damage(&manifest));

    // 5. Tag-based sorting
    results.extend(validate_sorting(&manifest));

    // 6. Escape from a closed routing loop
    results.extend(validate_loop_escape(&manifest));

    // 7. Destroyed tube mid-transit
    results.extend(validate_destroyed_tube(&manifest));

    // 8. Save/load round trip mid-transit
    results.extend(validate_save_load(&manifest));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

fn layout<'a>(manifest: &'a Manifest, name: &str) -> &'a NetworkLayout {
    manifest
        .layouts
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("manifest is missing layout '{}'", name))
}

/// Tick until the holder is gone, up to `max_ticks`. Returns ticks used.
fn run_until_gone(engine: &mut DisposalEngine, holder: hecs::Entity, max_ticks: usize) -> usize {
    for tick in 0..max_ticks {
        engine.update(0.05);
        if !engine.world.contains(holder) {
            return tick + 1;
        }
    }
    max_ticks
}

// ── 1. Manifest sanity ──────────────────────────────────────────────────

fn validate_manifest(manifest: &Manifest) -> Vec<TestResult> {
    let mut results = Vec::new();

    results.push(result(
        "manifest.layouts",
        !manifest.layouts.is_empty(),
        format!("{} layouts", manifest.layouts.len()),
    ));

    let names: HashSet<&str> = manifest.layouts.iter().map(|l| l.name.as_str()).collect();
    results.push(result(
        "manifest.unique_names",
        names.len() == manifest.layouts.len(),
        "layout names must be unique",
    ));

    for layout in &manifest.layouts {
        let tiles: HashSet<(i32, i32)> = layout.tubes.iter().map(|t| (t.x, t.y)).collect();
        results.push(result(
            &format!("manifest.{}.one_tube_per_tile", layout.name),
            tiles.len() == layout.tubes.len(),
            format!("{} tubes", layout.tubes.len()),
        ));
    }

    results
}

// ── 2. Tag API rules ────────────────────────────────────────────────────

fn validate_tag_rules() -> Vec<TestResult> {
    let mut holder = DisposalHolder::default();
    let mut results = Vec::new();

    results.push(result(
        "tags.accepts_restricted_charset",
        holder.add_tag("deck 3, recycle").is_ok(),
        "alphanumerics, commas and spaces",
    ));
    results.push(result(
        "tags.rejects_other_characters",
        holder.add_tag("bad;tag").is_err() && holder.add_tag("").is_err(),
        "semicolons and empty tags refused",
    ));
    let overlap = holder.tags_overlap(&["deck 3, recycle".to_owned()])
        && !holder.tags_overlap(&["mail".to_owned()]);
    results.push(result("tags.overlap", overlap, "filter match semantics"));

    results
}

// ── 3. Straight run ─────────────────────────────────────────────────────

fn validate_straight_run(manifest: &Manifest) -> Vec<TestResult> {
    let mut engine = DisposalEngine::new(NetworkConfig::default());
    let handles = engine.build(layout(manifest, "straight_line"));
    let entry_unit = handles.units[0];

    let cargo: Vec<hecs::Entity> = (0..3).map(|_| engine.spawn_cargo(0, 0)).collect();
    for &c in &cargo {
        engine.load_cargo(entry_unit, c);
    }
    if let Ok(mut unit) = engine.world.get::<&mut DisposalUnit>(entry_unit) {
        unit.air = GasMixture::with_gas(GasId::Oxygen, 2.0);
    }

    let mut results = Vec::new();
    let holder = match engine.flush(entry_unit) {
        Some(h) => h,
        None => {
            results.push(result("straight.launch", false, "flush refused"));
            return results;
        }
    };

    let ticks = run_until_gone(&mut engine, holder, 200);
    results.push(result(
        "straight.terminates",
        !engine.world.contains(holder),
        format!("exited after {} ticks", ticks),
    ));

    let events = engine.drain_events();
    results.push(result(
        "straight.no_turns",
        !events.iter().any(|e| matches!(e, NetworkEvent::Clang { .. })),
        "no clang on a straight run",
    ));
    results.push(result(
        "straight.ejects_all",
        events
            .iter()
            .any(|e| matches!(e, NetworkEvent::ContentsEjected { x: 3, y: 0, count: 3 })),
        "3 entities out at the far end",
    ));
    let undamaged = cargo.iter().all(|&c| {
        engine
            .world
            .get::<&Damageable>(c)
            .map(|d| d.total == 0.0)
            .unwrap_or(false)
    });
    results.push(result("straight.no_damage", undamaged, "no turns, no damage"));

    let drained: f32 = engine
        .world
        .query::<(&FloorTile, &Position)>()
        .iter()
        .filter(|(_, (_, pos))| pos.tile() == (3, 0))
        .map(|(_, (tile, _))| tile.air.total_moles())
        .sum();
    results.push(result(
        "straight.gas_drained",
        (drained - 2.0).abs() < 0.001,
        format!("{:.3} of 2.000 moles settled", drained),
    ));

    results
}

// ── 4. Turn damage ──────────────────────────────────────────────────────

fn validate_turn_damage(manifest: &Manifest) -> Vec<TestResult> {
    let config = NetworkConfig::default();
    let turn_damage = config.turn_damage.blunt;
    let mut engine = DisposalEngine::new(config);
    let handles = engine.build(layout(manifest, "elbow"));

    let cargo = engine.spawn_cargo(0, 0);
    engine.load_cargo(handles.units[0], cargo);

    let mut results = Vec::new();
    let holder = match engine.flush(handles.units[0]) {
        Some(h) => h,
        None => {
            results.push(result("turn.launch", false, "flush refused"));
            return results;
        }
    };
    run_until_gone(&mut engine, holder, 200);

    let total = engine
        .world
        .get::<&Damageable>(cargo)
        .map(|d| d.total)
        .unwrap_or(f32::NAN);
    results.push(result(
        "turn.fixed_damage_once",
        (total - turn_damage).abs() < 0.001,
        format!("{} damage from one 90-degree turn", total),
    ));

    let clangs = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, NetworkEvent::Clang { .. }))
        .count();
    results.push(result(
        "turn.single_clang",
        clangs == 1,
        format!("{} clang cue(s)", clangs),
    ));

    results
}

// ── 5. Tag-based sorting ────────────────────────────────────────────────

fn validate_sorting(manifest: &Manifest) -> Vec<TestResult> {
    let mut results = Vec::new();
    let eject_tile = |tagged: bool| -> Option<(i32, i32)> {
        let mut engine = DisposalEngine::new(NetworkConfig::default());
        let handles = engine.build(layout(manifest, "sorting_junction"));
        let cargo = engine.spawn_cargo(0, 0);
        engine.load_cargo(handles.units[0], cargo);
        let holder = engine.flush(handles.units[0])?;
        if tagged {
            engine
                .world
                .get::<&mut DisposalHolder>(holder)
                .ok()?
                .add_tag("recycle")
                .ok()?;
        }
        run_until_gone(&mut engine, holder, 200);
        engine.drain_events().iter().find_map(|e| match e {
            NetworkEvent::ContentsEjected { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
    };

    results.push(result(
        "sorting.tagged_diverted",
        eject_tile(true) == Some((1, -2)),
        "recycle-tagged holder takes the branch",
    ));
    results.push(result(
        "sorting.untagged_straight",
        eject_tile(false) == Some((3, 0)),
        "untagged holder passes straight through",
    ));

    results
}

// ── 6. Loop escape ──────────────────────────────────────────────────────

fn validate_loop_escape(manifest: &Manifest) -> Vec<TestResult> {
    let mut engine = DisposalEngine::new(NetworkConfig {
        seed: 42,
        ..Default::default()
    });
    let handles = engine.build(layout(manifest, "closed_loop"));

    let cargo = engine.spawn_cargo(1, 0);
    let mut results = Vec::new();
    let holder = match engine.spawn_holder(
        &[cargo],
        GasMixture::empty(),
        handles.tubes[1],
        Direction::East,
    ) {
        Some(h) => h,
        None => {
            results.push(result("loop.injection", false, "could not enter the loop"));
            return results;
        }
    };

    let ticks = run_until_gone(&mut engine, holder, 4000);
    let escaped = !engine.world.contains(holder);
    results.push(result(
        "loop.bounded_escape",
        escaped,
        format!("broke out after {} ticks", ticks),
    ));
    results.push(result(
        "loop.escape_event",
        engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, NetworkEvent::HolderEscaped { .. })),
        "escape surfaced as a feedback event",
    ));

    let total = engine
        .world
        .get::<&Damageable>(cargo)
        .map(|d| d.total)
        .unwrap_or(f32::NAN);
    let cap = engine.config.damage_cap + engine.config.turn_damage.blunt;
    results.push(result(
        "loop.damage_capped",
        total <= cap,
        format!("{} damage, cap overshoot bound {}", total, cap),
    ));

    results
}

// ── 7. Destroyed tube mid-transit ───────────────────────────────────────

fn validate_destroyed_tube(manifest: &Manifest) -> Vec<TestResult> {
    let mut engine = DisposalEngine::new(NetworkConfig::default());
    let handles = engine.build(layout(manifest, "straight_line"));

    let cargo = engine.spawn_cargo(0, 0);
    engine.load_cargo(handles.units[0], cargo);

    let mut results = Vec::new();
    let holder = match engine.flush(handles.units[0]) {
        Some(h) => h,
        None => {
            results.push(result("destroyed.launch", false, "flush refused"));
            return results;
        }
    };

    // Let the holder get clear of the entry (and its chamber), then delete
    // the tube it is heading for.
    for _ in 0..200 {
        engine.update(0.05);
        let past_entry = engine
            .world
            .get::<&DisposalHolder>(holder)
            .map(|h| h.current_tube_id == Some(1))
            .unwrap_or(false);
        if past_entry {
            break;
        }
    }
    let doomed = engine
        .world
        .get::<&DisposalHolder>(holder)
        .ok()
        .and_then(|h| h.next_tube);
    match doomed {
        Some(tube) => {
            engine.world.despawn(tube).ok();
        }
        None => {
            results.push(result("destroyed.setup", false, "holder had no next tube"));
            return results;
        }
    }
    engine.update(0.05);

    results.push(result(
        "destroyed.forces_exit",
        !engine.world.contains(holder),
        "missing tube resolves to an immediate exit",
    ));
    let events = engine.drain_events();
    let pried = events
        .iter()
        .filter(|e| matches!(e, NetworkEvent::TilePried { .. }))
        .count();
    results.push(result(
        "destroyed.pry_fallback",
        pried == 2,
        format!("{} tiles pried (under + ahead)", pried),
    ));

    results
}

// ── 8. Save/load round trip ─────────────────────────────────────────────

fn validate_save_load(manifest: &Manifest) -> Vec<TestResult> {
    let mut engine = DisposalEngine::new(NetworkConfig::default());
    let handles = engine.build(layout(manifest, "straight_line"));
    let cargo = engine.spawn_cargo(0, 0);
    engine.load_cargo(handles.units[0], cargo);

    let mut results = Vec::new();
    let holder = match engine.flush(handles.units[0]) {
        Some(h) => h,
        None => {
            results.push(result("persistence.launch", false, "flush refused"));
            return results;
        }
    };
    engine.update(0.05);

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(result("persistence.save", false, format!("{}", e)));
        return results;
    }
    results.push(result(
        "persistence.save",
        true,
        format!("{} bytes mid-transit", buffer.len()),
    ));

    let mut restored = DisposalEngine::default();
    if let Err(e) = restored.load(buffer.as_slice()) {
        results.push(result("persistence.load", false, format!("{}", e)));
        return results;
    }
    results.push(result(
        "persistence.load",
        restored.holder_count() == 1,
        "holder restored in transit",
    ));

    for _ in 0..200 {
        restored.update(0.05);
        if restored.holder_count() == 0 {
            break;
        }
    }
    results.push(result(
        "persistence.resumes",
        restored.holder_count() == 0
            && restored
                .drain_events()
                .iter()
                .any(|e| matches!(e, NetworkEvent::ContentsEjected { x: 3, y: 0, .. })),
        "restored run completes the transit",
    ));

    results
}
