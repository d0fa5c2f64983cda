use std::sync::Arc;

use rand::Rng;

use super::Annealer;
use crate::error::Error;
use crate::rng::{acceptance_draw, seeding_rng, FastGen, Lincon};
use crate::thresholds::ThresholdTable;
use crate::topology::{Topology, MAX_NEIGHBORS};

/// One site in scalar representation: a signed spin plus a cached half
/// flip-energy `de`.
///
/// `de` equals half the energy change of flipping this site, so a flip is
/// favorable exactly when `de <= 0`; keeping it incremental makes the sweep
/// loop branch on a single integer compare.
#[derive(Debug, Clone, Copy)]
struct ScalarSite {
    spin: i32,
    de: i32,
    field: i32,
    neighbors: [u32; MAX_NEIGHBORS],
    couplings: [i32; MAX_NEIGHBORS],
    n_neighbors: usize,
}

/// Single-replica reference engine.
///
/// Supports everything the lattice format can express, including on-site
/// fields and arbitrary integer coupling magnitudes. One repetition advances
/// one replica; throughput comes from running repetitions in parallel, not
/// from lane packing.
#[derive(Debug, Clone)]
pub struct ScalarEngine<G: FastGen = Lincon> {
    sites: Vec<ScalarSite>,
    thresholds: Arc<ThresholdTable>,
    bgen: G,
}

impl<G: FastGen + Default> ScalarEngine<G> {
    pub fn new(topology: &Topology, thresholds: Arc<ThresholdTable>) -> Result<Self, Error> {
        if topology.max_tier() > thresholds.max_tier() {
            return Err(Error::Config(format!(
                "topology tier {} exceeds threshold table depth {}",
                topology.max_tier(),
                thresholds.max_tier()
            )));
        }

        let sites = topology
            .sites()
            .iter()
            .map(|site| ScalarSite {
                spin: 1,
                de: 0,
                field: site.field,
                neighbors: site.neighbors,
                couplings: site.couplings,
                n_neighbors: site.n_neighbors,
            })
            .collect();

        Ok(Self {
            sites,
            thresholds,
            bgen: G::default(),
        })
    }
}

impl<G: FastGen> ScalarEngine<G> {
    /// Rebuild every `de` cache from the current spins.
    fn recompute_flip_energies(&mut self) {
        for i in 0..self.sites.len() {
            let site = self.sites[i];
            let mut local = site.field;
            for l in 0..site.n_neighbors {
                local += site.couplings[l] * self.sites[site.neighbors[l] as usize].spin;
            }
            self.sites[i].de = -site.spin * local;
        }
    }

    fn flip(&mut self, i: usize) {
        let site = self.sites[i];
        let new_spin = -site.spin;
        self.sites[i].spin = new_spin;
        self.sites[i].de = -site.de;
        for l in 0..site.n_neighbors {
            let j = site.neighbors[l] as usize;
            self.sites[j].de -= 2 * self.sites[j].spin * site.couplings[l] * new_spin;
        }
    }

    #[cfg(test)]
    fn flip_energy_of(&self, i: usize) -> i32 {
        let site = &self.sites[i];
        let mut local = site.field;
        for l in 0..site.n_neighbors {
            local += site.couplings[l] * self.sites[site.neighbors[l] as usize].spin;
        }
        -site.spin * local
    }
}

impl<G: FastGen> Annealer for ScalarEngine<G> {
    fn reset(&mut self, rep: usize) {
        let mut rgen = seeding_rng(rep);
        self.bgen.seed(rep as u64 + 1);
        for site in &mut self.sites {
            site.spin = if rgen.gen::<f32>() < 0.5 { -1 } else { 1 };
        }
        self.recompute_flip_energies();
    }

    fn advance_sweep(&mut self, sweep: usize) {
        let thresholds = Arc::clone(&self.thresholds);
        let thr = thresholds.row(sweep);
        for i in 0..self.sites.len() {
            let r = acceptance_draw(&mut self.bgen);
            let de = self.sites[i].de;
            if de <= 0 || r < thr[(de - 1) as usize] {
                self.flip(i);
            }
        }
    }

    fn extract_energies(&self, out: &mut [f64], offset: usize) -> usize {
        let mut total = 0i64;
        for (i, site) in self.sites.iter().enumerate() {
            total += site.field as i64 * site.spin as i64;
            for l in 0..site.n_neighbors {
                let j = site.neighbors[l] as usize;
                if i > j {
                    continue;
                }
                total += site.couplings[l] as i64 * site.spin as i64 * self.sites[j].spin as i64;
            }
        }
        out[offset] = total as f64;
        offset + 1
    }

    fn replicas_per_rep(&self) -> usize {
        1
    }

    fn info(&self) -> String {
        format!("scalar engine: 1 replica, {} sites", self.sites.len())
    }
}
