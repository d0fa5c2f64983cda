use std::collections::HashMap;
use std::sync::Arc;

use rand::RngCore;

use super::planes::{add_bits, ge_mask, MAX_PLANES};
use super::Annealer;
use crate::error::Error;
use crate::rng::{acceptance_draw, seeding_rng, FastGen, Lincon};
use crate::thresholds::ThresholdTable;
use crate::topology::{Topology, MAX_NEIGHBORS};

/// Replica lanes advanced per repetition: one bit per replica in a spin word.
pub const WORD_REPLICAS: usize = 64;

/// Largest coupling magnitude expressible in the two weight planes.
pub const MAX_MAGNITUDE: u32 = 3;

/// One site in multi-spin representation.
///
/// `spin` carries 64 replica lanes. A coupling of magnitude 1..=3 is encoded
/// as up to two weight planes (`w1` for the weight-1 contribution, `w2` for
/// weight-2; magnitude 3 sets both) plus a sign mask that is all-ones for a
/// positive coupling. `couplings` retains the signed values for the energy
/// evaluator.
#[derive(Debug, Clone, Copy)]
struct PackedSite {
    spin: u64,
    sign: [u64; MAX_NEIGHBORS],
    neighbors: [u32; MAX_NEIGHBORS],
    couplings: [i32; MAX_NEIGHBORS],
    n_neighbors: u8,
    w1: u8,
    w2: u8,
    class: u16,
}

/// Acceptance tier of a structural class: lanes whose weighted mismatch count
/// is at least `count_ge` flip when an energy rise of `rise` coupling units
/// is accepted.
#[derive(Debug, Clone, Copy)]
struct Tier {
    rise: u32,
    count_ge: u32,
}

/// Update recipe shared by every site with the same structural signature
/// (neighbor count plus coupling-magnitude multiset).
#[derive(Debug, Clone)]
struct SiteClass {
    total_weight: u32,
    /// `ceil(total_weight / 2)`: at this mismatch count the flip no longer
    /// raises the energy and is accepted outright.
    always_flip: u32,
    /// Uphill tiers in order of decreasing energy rise.
    tiers: Vec<Tier>,
}

impl SiteClass {
    fn from_magnitudes(magnitudes: &[u8]) -> Self {
        let total_weight: u32 = magnitudes.iter().map(|&m| m as u32).sum();
        let always_flip = total_weight.div_ceil(2);

        // Achievable energy rises are total_weight - 2k for each mismatch
        // count k below always_flip; the largest rise (k = 0) comes first so
        // the acceptance scan can stop at the first threshold passed.
        let tiers = (0..always_flip)
            .map(|k| Tier {
                rise: total_weight - 2 * k,
                count_ge: k,
            })
            .collect();

        Self {
            total_weight,
            always_flip,
            tiers,
        }
    }
}

/// Multi-spin update engine: 64 replicas per machine word.
///
/// Every site update draws a single acceptance value shared by all 64 lanes.
/// The lanes therefore see correlated randomness within one update and are
/// only asymptotically independent through their distinct initial spins; this
/// is the standard throughput trade-off of multi-spin coding and is kept
/// intentionally.
#[derive(Debug, Clone)]
pub struct PackedEngine<G: FastGen = Lincon> {
    sites: Vec<PackedSite>,
    classes: Vec<SiteClass>,
    thresholds: Arc<ThresholdTable>,
    bgen: G,
}

impl<G: FastGen + Default> PackedEngine<G> {
    /// Compile a topology into multi-spin form.
    ///
    /// Fails at load time on any site the packed update cannot express: an
    /// on-site field, a coupling magnitude outside 1..=3, or a threshold
    /// table shallower than the site's total weight.
    pub fn new(topology: &Topology, thresholds: Arc<ThresholdTable>) -> Result<Self, Error> {
        let mut classes: Vec<SiteClass> = Vec::new();
        let mut class_ids: HashMap<(u8, [u8; MAX_NEIGHBORS]), u16> = HashMap::new();
        let mut sites = Vec::with_capacity(topology.n_sites());

        for (i, site) in topology.sites().iter().enumerate() {
            if site.field != 0 {
                return Err(Error::Config(format!(
                    "site {i}: on-site fields are not supported by the packed engine"
                )));
            }

            let mut sign = [0u64; MAX_NEIGHBORS];
            let mut magnitudes = [0u8; MAX_NEIGHBORS];
            let mut w1 = 0u8;
            let mut w2 = 0u8;

            for l in 0..site.n_neighbors {
                let coupling = site.couplings[l];
                let magnitude = coupling.unsigned_abs();
                if magnitude == 0 || magnitude > MAX_MAGNITUDE {
                    return Err(Error::Config(format!(
                        "site {i}: coupling magnitude {magnitude} is outside 1..={MAX_MAGNITUDE}"
                    )));
                }
                magnitudes[l] = magnitude as u8;
                sign[l] = if coupling > 0 { !0u64 } else { 0 };
                if magnitude & 1 == 1 {
                    w1 |= 1 << l;
                }
                if magnitude & 2 == 2 {
                    w2 |= 1 << l;
                }
            }

            // Structural signature: neighbor count + sorted magnitude multiset.
            let mut key_mags = magnitudes;
            key_mags[..site.n_neighbors].sort_unstable();
            let key = (site.n_neighbors as u8, key_mags);

            let class = match class_ids.get(&key) {
                Some(&id) => id,
                None => {
                    let class = SiteClass::from_magnitudes(&key_mags[..site.n_neighbors]);
                    if class.total_weight as usize > thresholds.max_tier() {
                        return Err(Error::Config(format!(
                            "site {i}: total weight {} exceeds threshold table depth {}",
                            class.total_weight,
                            thresholds.max_tier()
                        )));
                    }
                    let id = classes.len() as u16;
                    classes.push(class);
                    class_ids.insert(key, id);
                    id
                }
            };

            sites.push(PackedSite {
                spin: 0,
                sign,
                neighbors: site.neighbors,
                couplings: site.couplings,
                n_neighbors: site.n_neighbors as u8,
                w1,
                w2,
                class,
            });
        }

        Ok(Self {
            sites,
            classes,
            thresholds,
            bgen: G::default(),
        })
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

impl<G: FastGen> Annealer for PackedEngine<G> {
    fn reset(&mut self, rep: usize) {
        let mut rgen = seeding_rng(rep);
        self.bgen.seed(rep as u64 + 1);
        for site in &mut self.sites {
            site.spin = rgen.next_u64();
        }
    }

    fn advance_sweep(&mut self, sweep: usize) {
        let thr = self.thresholds.row(sweep);

        for i in 0..self.sites.len() {
            let r = acceptance_draw(&mut self.bgen);
            let site = self.sites[i];

            // Weighted mismatch counter per lane: a set bit marks a bond that
            // currently stores energy, i.e. one that flipping would relax.
            let mut planes = [0u64; MAX_PLANES];
            for l in 0..site.n_neighbors as usize {
                let neighbor_spin = self.sites[site.neighbors[l] as usize].spin;
                let mismatch = site.sign[l] ^ (site.spin ^ neighbor_spin);
                if (site.w1 >> l) & 1 == 1 {
                    add_bits(&mut planes, mismatch, 0);
                }
                if (site.w2 >> l) & 1 == 1 {
                    add_bits(&mut planes, mismatch, 1);
                }
            }

            let class = &self.classes[site.class as usize];
            let mut flip = ge_mask(&planes, class.always_flip);
            for tier in &class.tiers {
                // Thresholds decrease with the rise, so the first tier whose
                // threshold exceeds the draw subsumes all smaller rises.
                if r < thr[(tier.rise - 1) as usize] {
                    flip |= ge_mask(&planes, tier.count_ge);
                    break;
                }
            }

            self.sites[i].spin = site.spin ^ flip;
        }
    }

    fn extract_energies(&self, out: &mut [f64], offset: usize) -> usize {
        for lane in 0..WORD_REPLICAS {
            let mut total = 0i64;
            for (i, site) in self.sites.iter().enumerate() {
                let spin = ((site.spin >> lane) & 1) as i64 * 2 - 1;
                let mut local = 0i64;
                for l in 0..site.n_neighbors as usize {
                    let j = site.neighbors[l] as usize;
                    if i > j {
                        continue;
                    }
                    let neighbor_spin = ((self.sites[j].spin >> lane) & 1) as i64 * 2 - 1;
                    local += site.couplings[l] as i64 * neighbor_spin;
                }
                total += local * spin;
            }
            out[offset + lane] = total as f64;
        }
        offset + WORD_REPLICAS
    }

    fn replicas_per_rep(&self) -> usize {
        WORD_REPLICAS
    }

    fn info(&self) -> String {
        format!(
            "multi-spin engine: {} replicas per word, {} sites, {} structural classes",
            WORD_REPLICAS,
            self.sites.len(),
            self.classes.len()
        )
    }
}
