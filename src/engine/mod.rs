pub mod packed;
pub mod planes;
pub mod scalar;

pub use packed::PackedEngine;
pub use scalar::ScalarEngine;

/// One compiled simulated-annealing engine.
///
/// Per repetition the lifecycle is `reset(rep)`, then `advance_sweep(s)` for
/// every sweep of the schedule in order, then `extract_energies`. A reset
/// fully determines the trajectory: both generators are reseeded from the
/// repetition index alone, so calling `reset` twice with the same index
/// reproduces bit-identical spins and energies.
///
/// Engines are `Clone + Send` so the run driver can hand each worker thread
/// its own copy; nothing is shared mutably across workers.
pub trait Annealer: Clone + Send {
    /// Reseed the generators and redraw the initial spin configuration.
    fn reset(&mut self, rep: usize);

    /// Attempt one update of every site at the given schedule step.
    fn advance_sweep(&mut self, sweep: usize);

    /// Write one final energy per replica into `out` starting at `offset`;
    /// returns the offset just past the written values.
    fn extract_energies(&self, out: &mut [f64], offset: usize) -> usize;

    /// Number of replicas advanced per repetition (1 for scalar, the machine
    /// word width for the packed engine).
    fn replicas_per_rep(&self) -> usize;

    /// Human-readable description of the algorithm, for verbose output.
    fn info(&self) -> String;
}
