use crate::rng::RAND_DOMAIN;

/// Fixed-point acceptance thresholds, one row per sweep.
///
/// Row `s` holds `thr[k-1] = floor(RAND_DOMAIN * e^(-2 * beta_s * k))` for
/// `k = 1..=max_tier`, the Boltzmann acceptance probability of a flip that
/// raises the energy by `k` coupling units. A flip is accepted iff the
/// top-bits draw `r` satisfies `r < thr[k-1]`; flips with `k <= 0` bypass the
/// table entirely. At β = 0 every threshold equals `RAND_DOMAIN`, which no
/// draw can reach, so everything is accepted.
///
/// Compiled once from the full schedule and shared read-only by all workers,
/// repetitions and sites.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    rows: Vec<Vec<u32>>,
    max_tier: usize,
}

impl ThresholdTable {
    /// Compile the β schedule into per-sweep threshold rows.
    ///
    /// `max_tier` is the largest achievable weighted-mismatch magnitude over
    /// all structural classes in the topology (see
    /// [`Topology::max_tier`](crate::topology::Topology::max_tier)).
    pub fn compile(schedule: &[f64], max_tier: usize) -> Self {
        let rows = schedule
            .iter()
            .map(|&beta| {
                let p0 = (-2.0 * beta).exp();
                let mut p = 1.0f64;
                (0..max_tier)
                    .map(|_| {
                        p *= p0;
                        (RAND_DOMAIN as f64 * p) as u32
                    })
                    .collect()
            })
            .collect();

        Self { rows, max_tier }
    }

    /// Threshold row for one sweep, indexed by `k - 1`.
    #[inline]
    pub fn row(&self, sweep: usize) -> &[u32] {
        &self.rows[sweep]
    }

    pub fn n_sweeps(&self) -> usize {
        self.rows.len()
    }

    pub fn max_tier(&self) -> usize {
        self.max_tier
    }
}
