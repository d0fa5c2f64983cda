use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{EngineMode, GeneratorKind, RunConfig};
use crate::engine::{Annealer, PackedEngine, ScalarEngine};
use crate::error::Error;
use crate::rng::{LagFib, Lincon};
use crate::thresholds::ThresholdTable;
use crate::topology::Topology;

/// Run every repetition of an annealing job and gather final energies.
///
/// Workers are given contiguous repetition blocks (`rep0 + n_reps * m / n`
/// for worker `m` of `n`), each on a cloned engine, so block boundaries and
/// results are identical for any worker count. The returned vector holds
/// `n_reps * replicas_per_rep` energies ordered by repetition index.
///
/// `on_rep` fires once per finished repetition, from worker threads.
pub fn anneal_all<E: Annealer + Sync>(
    engine: &E,
    n_sweeps: usize,
    n_reps: usize,
    rep0: usize,
    on_rep: &(dyn Fn() + Sync),
) -> Vec<f64> {
    let per_rep = engine.replicas_per_rep();
    let n_workers = rayon::current_num_threads().min(n_reps).max(1);

    let blocks: Vec<(usize, usize)> = (0..n_workers)
        .map(|m| {
            let lo = n_reps * m / n_workers;
            let hi = n_reps * (m + 1) / n_workers;
            (lo, hi)
        })
        .collect();

    let mut energies = vec![0.0f64; n_reps * per_rep];
    let mut slices: Vec<&mut [f64]> = Vec::with_capacity(n_workers);
    let mut rest = energies.as_mut_slice();
    for &(lo, hi) in &blocks {
        let (head, tail) = rest.split_at_mut((hi - lo) * per_rep);
        slices.push(head);
        rest = tail;
    }

    blocks
        .par_iter()
        .zip(slices)
        .for_each(|(&(lo, hi), out)| {
            let mut engine = engine.clone();
            let mut offset = 0;
            for rep in lo..hi {
                engine.reset(rep0 + rep);
                for sweep in 0..n_sweeps {
                    engine.advance_sweep(sweep);
                }
                offset = engine.extract_energies(out, offset);
                on_rep();
            }
        });

    energies
}

/// Outcome of one full run: final replica energies plus a description of the
/// engine that produced them.
pub struct RunResult {
    pub energies: Vec<f64>,
    pub engine_info: String,
}

/// Compile the requested engine and drive all repetitions.
///
/// The threshold table is compiled once for the topology's worst-case tier
/// and shared read-only by every worker.
pub fn run(
    topology: &Topology,
    schedule: &[f64],
    config: &RunConfig,
    on_rep: &(dyn Fn() + Sync),
) -> Result<RunResult, Error> {
    let thresholds = Arc::new(ThresholdTable::compile(schedule, topology.max_tier().max(1)));
    let n_sweeps = schedule.len();

    fn drive<E: Annealer + Sync>(
        engine: E,
        n_sweeps: usize,
        config: &RunConfig,
        on_rep: &(dyn Fn() + Sync),
    ) -> RunResult {
        RunResult {
            energies: anneal_all(&engine, n_sweeps, config.n_reps, config.rep0, on_rep),
            engine_info: engine.info(),
        }
    }

    Ok(match (config.mode, config.generator) {
        (EngineMode::Scalar, GeneratorKind::Lincon) => drive(
            ScalarEngine::<Lincon>::new(topology, thresholds)?,
            n_sweeps,
            config,
            on_rep,
        ),
        (EngineMode::Scalar, GeneratorKind::LagFib) => drive(
            ScalarEngine::<LagFib>::new(topology, thresholds)?,
            n_sweeps,
            config,
            on_rep,
        ),
        (EngineMode::Packed, GeneratorKind::Lincon) => drive(
            PackedEngine::<Lincon>::new(topology, thresholds)?,
            n_sweeps,
            config,
            on_rep,
        ),
        (EngineMode::Packed, GeneratorKind::LagFib) => drive(
            PackedEngine::<LagFib>::new(topology, thresholds)?,
            n_sweeps,
            config,
            on_rep,
        ),
    })
}
