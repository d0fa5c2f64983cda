use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Error;

/// Hard capacity on the per-site neighbor count supported by the engines.
pub const MAX_NEIGHBORS: usize = 6;

/// One lattice site: on-site field plus an ordered neighbor list.
///
/// Immutable after [`Topology`] construction. Neighbor slots beyond
/// `n_neighbors` are zero-padded.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub field: i32,
    pub n_neighbors: usize,
    pub neighbors: [u32; MAX_NEIGHBORS],
    pub couplings: [i32; MAX_NEIGHBORS],
}

impl Site {
    fn empty() -> Self {
        Self {
            field: 0,
            n_neighbors: 0,
            neighbors: [0; MAX_NEIGHBORS],
            couplings: [0; MAX_NEIGHBORS],
        }
    }

    fn push_neighbor(&mut self, id: u32, coupling: i32) -> Result<(), ()> {
        if self.n_neighbors >= MAX_NEIGHBORS {
            return Err(());
        }
        self.neighbors[self.n_neighbors] = id;
        self.couplings[self.n_neighbors] = coupling;
        self.n_neighbors += 1;
        Ok(())
    }
}

/// Site graph built from a coupling list.
///
/// The lattice file format is one header line (ignored), then one
/// `site0 site1 value` row per coupling; a row with `site0 == site1` sets that
/// site's on-site field. External site ids may be sparse; they are remapped to
/// contiguous ids in order of first appearance. Couplings are sorted by
/// ascending magnitude before neighbor lists are built, so each site's
/// weight-class layout is deterministic regardless of row order.
#[derive(Debug, Clone)]
pub struct Topology {
    sites: Vec<Site>,
    source: String,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    s0: u32,
    s1: u32,
    value: i32,
}

impl Topology {
    /// Read and validate a lattice file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut rows = Vec::new();

        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| Error::io(path, e))?;
            if lineno == 0 {
                // header line
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let (s0, s1, value) = match (fields.next(), fields.next(), fields.next()) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => {
                    return Err(Error::lattice(
                        path,
                        format!("line {}: expected 'site0 site1 value'", lineno + 1),
                    ))
                }
            };

            let s0: i64 = s0.parse().map_err(|_| {
                Error::lattice(path, format!("line {}: unparseable site index", lineno + 1))
            })?;
            let s1: i64 = s1.parse().map_err(|_| {
                Error::lattice(path, format!("line {}: unparseable site index", lineno + 1))
            })?;
            let value: f64 = value.parse().map_err(|_| {
                Error::lattice(path, format!("line {}: unparseable coupling", lineno + 1))
            })?;

            if s0 < 0 || s1 < 0 {
                return Err(Error::lattice(
                    path,
                    format!("line {}: negative site index", lineno + 1),
                ));
            }
            if (value - value.round()).abs() > 1e-9 {
                return Err(Error::lattice(
                    path,
                    format!(
                        "line {}: coupling {} is not an integer",
                        lineno + 1,
                        value
                    ),
                ));
            }

            rows.push((s0 as u64, s1 as u64, value.round() as i32));
        }

        Self::build(rows, path.display().to_string())
            .map_err(|reason| Error::lattice(path, reason))
    }

    /// Build a topology directly from `(site0, site1, value)` rows.
    ///
    /// Same semantics as the file format minus the header line.
    pub fn from_rows(
        rows: impl IntoIterator<Item = (u64, u64, i32)>,
        source: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::build(rows.into_iter().collect(), source.into()).map_err(Error::Config)
    }

    fn build(rows: Vec<(u64, u64, i32)>, source: String) -> Result<Self, String> {
        // Remap sparse external ids to contiguous internal ids in order of
        // first appearance.
        let mut id_map = std::collections::HashMap::new();
        let mut n_sites = 0u32;
        let mut intern = |ext: u64, id_map: &mut std::collections::HashMap<u64, u32>| -> u32 {
            *id_map.entry(ext).or_insert_with(|| {
                let id = n_sites;
                n_sites += 1;
                id
            })
        };

        let mut links: Vec<Link> = rows
            .into_iter()
            .map(|(s0, s1, value)| Link {
                s0: intern(s0, &mut id_map),
                s1: intern(s1, &mut id_map),
                value,
            })
            .collect();

        // Ascending coupling magnitude; the packed engine's weight planes
        // rely on this ordering being stable across runs.
        links.sort_by_key(|l| l.value.abs());

        let mut sites = vec![Site::empty(); n_sites as usize];
        for link in &links {
            if link.s0 == link.s1 {
                sites[link.s0 as usize].field = link.value;
                continue;
            }

            sites[link.s0 as usize]
                .push_neighbor(link.s1, link.value)
                .map_err(|_| {
                    format!(
                        "site {} has more than {MAX_NEIGHBORS} neighbors",
                        link.s0
                    )
                })?;
            sites[link.s1 as usize]
                .push_neighbor(link.s0, link.value)
                .map_err(|_| {
                    format!(
                        "site {} has more than {MAX_NEIGHBORS} neighbors",
                        link.s1
                    )
                })?;
        }

        Ok(Self { sites, source })
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    /// Where the topology came from, for result annotation.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Largest achievable weighted-mismatch magnitude over all sites:
    /// the flip-energy change of a site never exceeds twice this value, so it
    /// bounds the threshold-table depth needed by either engine.
    pub fn max_tier(&self) -> usize {
        self.sites
            .iter()
            .map(|s| {
                s.field.unsigned_abs() as usize
                    + s.couplings[..s.n_neighbors]
                        .iter()
                        .map(|c| c.unsigned_abs() as usize)
                        .sum::<usize>()
            })
            .max()
            .unwrap_or(0)
    }
}
