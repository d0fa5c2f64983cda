use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::error::Error;

/// How the inverse-temperature sequence is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleKind {
    /// `n_sweeps` evenly spaced values from `beta0` to `beta1`.
    Linear,
    /// `n_sweeps` geometrically spaced values from `beta0` to `beta1`.
    Exponential,
    /// One β per line, read until EOF; `n_sweeps` is taken from the file.
    File(PathBuf),
}

impl From<&str> for ScheduleKind {
    fn from(s: &str) -> Self {
        match s {
            "linear" => Self::Linear,
            "exponential" => Self::Exponential,
            _ => Self::File(PathBuf::from(s)),
        }
    }
}

impl ScheduleKind {
    fn name(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::Exponential => "exponential".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Build the ordered β sequence driving the sweep loop, one entry per sweep.
pub fn build_schedule(
    kind: &ScheduleKind,
    n_sweeps: usize,
    beta0: f64,
    beta1: f64,
) -> Result<Vec<f64>, Error> {
    let err = |reason: &str| Error::Schedule {
        kind: kind.name(),
        reason: reason.to_string(),
    };

    match kind {
        ScheduleKind::Linear => {
            if n_sweeps < 1 {
                return Err(err("n_sweeps must be >= 1"));
            }
            let scale = if n_sweeps > 1 {
                (beta1 - beta0) / (n_sweeps - 1) as f64
            } else {
                0.0
            };
            Ok((0..n_sweeps).map(|i| beta0 + scale * i as f64).collect())
        }
        ScheduleKind::Exponential => {
            if n_sweeps < 1 {
                return Err(err("n_sweeps must be >= 1"));
            }
            if beta0 <= 0.0 {
                return Err(err("exponential schedule requires beta0 > 0"));
            }
            if n_sweeps == 1 {
                return Ok(vec![beta0]);
            }
            let ratio = (beta1 / beta0).powf(1.0 / (n_sweeps - 1) as f64);
            let mut sched = Vec::with_capacity(n_sweeps);
            let mut beta = beta0;
            for _ in 0..n_sweeps {
                sched.push(beta);
                beta *= ratio;
            }
            Ok(sched)
        }
        ScheduleKind::File(path) => {
            let file = File::open(path).map_err(|e| Error::io(path, e))?;
            let mut sched = Vec::new();
            for (lineno, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| Error::io(path, e))?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let beta: f64 = trimmed.parse().map_err(|_| Error::Schedule {
                    kind: kind.name(),
                    reason: format!("unparseable beta on line {}", lineno + 1),
                })?;
                sched.push(beta);
            }
            if sched.is_empty() {
                return Err(err("schedule file contains no beta values"));
            }
            Ok(sched)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_linear_schedule() {
        let sched = build_schedule(&ScheduleKind::Linear, 5, 0.1, 3.0).unwrap();
        assert_eq!(sched.len(), 5);
        assert_relative_eq!(sched[0], 0.1);
        assert_relative_eq!(sched[4], 3.0);
        let step = sched[1] - sched[0];
        for w in sched.windows(2) {
            assert_relative_eq!(w[1] - w[0], step, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_single_sweep() {
        let sched = build_schedule(&ScheduleKind::Linear, 1, 0.5, 3.0).unwrap();
        assert_eq!(sched, vec![0.5]);
    }

    #[test]
    fn test_exponential_schedule() {
        let sched = build_schedule(&ScheduleKind::Exponential, 4, 0.1, 0.8).unwrap();
        assert_eq!(sched.len(), 4);
        assert_relative_eq!(sched[0], 0.1);
        assert_relative_eq!(sched[3], 0.8, epsilon = 1e-10);
        // constant ratio
        assert_relative_eq!(sched[1] / sched[0], sched[2] / sched[1], epsilon = 1e-10);
    }

    #[test]
    fn test_exponential_requires_positive_beta0() {
        assert!(build_schedule(&ScheduleKind::Exponential, 4, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_schedule_from_file() {
        let path = std::env::temp_dir().join("spin_anneal_sched_test.txt");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "0.5\n1.0\n2.5").unwrap();
        }
        let kind = ScheduleKind::from(path.to_str().unwrap());
        // n_sweeps/beta bounds are ignored for file schedules
        let sched = build_schedule(&kind, 0, 0.0, 0.0).unwrap();
        assert_eq!(sched, vec![0.5, 1.0, 2.5]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_schedule_missing_file() {
        let kind = ScheduleKind::from("/nonexistent/sched.txt");
        assert!(build_schedule(&kind, 0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ScheduleKind::from("linear"), ScheduleKind::Linear);
        assert_eq!(ScheduleKind::from("exponential"), ScheduleKind::Exponential);
        assert!(matches!(ScheduleKind::from("sched.txt"), ScheduleKind::File(_)));
    }
}
