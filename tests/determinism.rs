use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use spin_anneal::config::{EngineMode, GeneratorKind, RunConfig};
use spin_anneal::output::group_energies;
use spin_anneal::schedule::{build_schedule, ScheduleKind};
use spin_anneal::topology::Topology;

/// Frustrated 8-site lattice with sparse external ids, a field and mixed
/// coupling magnitudes (scalar-only features excluded when packed mode is
/// under test).
fn write_lattice(name: &str, with_field: bool) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = File::create(&path).unwrap();
    writeln!(f, "8 10 example lattice").unwrap();
    let edges = [
        (100u64, 200u64, 1i32),
        (200, 300, -2),
        (300, 400, 3),
        (400, 100, -1),
        (100, 300, 2),
        (500, 600, -1),
        (600, 700, 1),
        (700, 800, -3),
        (800, 500, 1),
        (200, 600, -2),
    ];
    for (a, b, c) in edges {
        writeln!(f, "{a} {b} {c}").unwrap();
    }
    if with_field {
        writeln!(f, "100 100 2").unwrap();
    }
    f.flush().unwrap();
    path
}

fn config(mode: EngineMode) -> RunConfig {
    RunConfig {
        n_reps: 4,
        rep0: 0,
        n_threads: None,
        mode,
        generator: GeneratorKind::Lincon,
    }
}

#[test]
fn full_run_is_reproducible_from_file() {
    let path = write_lattice("spin_anneal_it_repro.txt", false);
    let topo = Topology::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let schedule = build_schedule(&ScheduleKind::Linear, 80, 0.1, 3.0).unwrap();

    for mode in [EngineMode::Scalar, EngineMode::Packed] {
        let a = spin_anneal::run(&topo, &schedule, &config(mode), &|| {}).unwrap();
        let b = spin_anneal::run(&topo, &schedule, &config(mode), &|| {}).unwrap();
        assert_eq!(a.energies, b.energies, "mode {mode:?}");
    }
}

/// Exact ground-state energy by exhaustion; the test lattices stay small
/// enough for this.
fn brute_force_min(topo: &Topology) -> f64 {
    let n = topo.n_sites();
    assert!(n <= 20);
    let mut best = i64::MAX;
    for assignment in 0u32..(1 << n) {
        let spin = |i: usize| ((assignment >> i) & 1) as i64 * 2 - 1;
        let mut total = 0i64;
        for (i, site) in topo.sites().iter().enumerate() {
            total += site.field as i64 * spin(i);
            for l in 0..site.n_neighbors {
                let j = site.neighbors[l] as usize;
                if i > j {
                    continue;
                }
                total += site.couplings[l] as i64 * spin(i) * spin(j);
            }
        }
        best = best.min(total);
    }
    best as f64
}

#[test]
fn engines_find_the_exact_ground_state() {
    let path = write_lattice("spin_anneal_it_agree.txt", false);
    let topo = Topology::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let exact = brute_force_min(&topo);
    let schedule = build_schedule(&ScheduleKind::Linear, 300, 0.1, 4.0).unwrap();

    let mut scalar_cfg = config(EngineMode::Scalar);
    scalar_cfg.n_reps = 64;
    let scalar = spin_anneal::run(&topo, &schedule, &scalar_cfg, &|| {}).unwrap();

    let mut packed_cfg = config(EngineMode::Packed);
    packed_cfg.n_reps = 1;
    let packed = spin_anneal::run(&topo, &schedule, &packed_cfg, &|| {}).unwrap();

    let min = |v: &[f64]| v.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(min(&scalar.energies), exact);
    assert_eq!(min(&packed.energies), exact);

    for e in scalar.energies.iter().chain(&packed.energies) {
        assert_eq!(e.fract(), 0.0, "non-integer energy {e}");
    }
}

#[test]
fn packed_rejects_field_scalar_accepts() {
    let path = write_lattice("spin_anneal_it_field.txt", true);
    let topo = Topology::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let schedule = build_schedule(&ScheduleKind::Linear, 10, 0.1, 1.0).unwrap();

    assert!(spin_anneal::run(&topo, &schedule, &config(EngineMode::Packed), &|| {}).is_err());
    assert!(spin_anneal::run(&topo, &schedule, &config(EngineMode::Scalar), &|| {}).is_ok());
}

#[test]
fn histogram_covers_all_replicas() {
    let path = write_lattice("spin_anneal_it_hist.txt", false);
    let topo = Topology::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let schedule = build_schedule(&ScheduleKind::Exponential, 50, 0.1, 3.0).unwrap();
    let result = spin_anneal::run(&topo, &schedule, &config(EngineMode::Packed), &|| {}).unwrap();

    let groups = group_energies(&result.energies);
    let total: usize = groups.iter().map(|g| g.count).sum();
    assert_eq!(total, result.energies.len());
    let freq_sum: f64 = groups.iter().map(|g| g.frequency).sum();
    assert!((freq_sum - 1.0).abs() < 1e-12);
    for w in groups.windows(2) {
        assert!(w[0].energy < w[1].energy);
    }
}
