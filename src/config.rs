use validator::{Validate, ValidationError};

/// Which update engine to compile the topology into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineMode {
    Scalar,
    Packed,
}

impl TryFrom<&str> for EngineMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "packed" => Ok(Self::Packed),
            _ => Err(format!(
                "unknown engine mode '{s}', expected 'scalar' or 'packed'"
            )),
        }
    }
}

/// Which fast generator feeds the acceptance draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorKind {
    Lincon,
    LagFib,
}

impl TryFrom<&str> for GeneratorKind {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "lincon" => Ok(Self::Lincon),
            "lagfib" => Ok(Self::LagFib),
            _ => Err(format!(
                "unknown generator '{s}', expected 'lincon' or 'lagfib'"
            )),
        }
    }
}

fn validate_run_config(cfg: &RunConfig) -> Result<(), ValidationError> {
    if cfg.n_reps < 1 {
        return Err(ValidationError::new("n_reps must be >= 1"));
    }
    if let Some(t) = cfg.n_threads {
        if t < 1 {
            return Err(ValidationError::new("n_threads must be >= 1"));
        }
    }
    Ok(())
}

/// Repetition-level knobs of one annealing run.
///
/// `rep0` offsets the repetition indices (and thus every seed), which lets
/// independent invocations extend one experiment without replaying
/// trajectories. `n_threads` of `None` leaves the worker count to the thread
/// pool.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_run_config"))]
pub struct RunConfig {
    pub n_reps: usize,
    pub rep0: usize,
    pub n_threads: Option<usize>,
    pub mode: EngineMode,
    pub generator: GeneratorKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunConfig {
        RunConfig {
            n_reps: 10,
            rep0: 0,
            n_threads: None,
            mode: EngineMode::Packed,
            generator: GeneratorKind::Lincon,
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(EngineMode::try_from("scalar"), Ok(EngineMode::Scalar));
        assert_eq!(EngineMode::try_from("packed"), Ok(EngineMode::Packed));
        assert!(EngineMode::try_from("vectorized").is_err());
        assert_eq!(
            GeneratorKind::try_from("lagfib"),
            Ok(GeneratorKind::LagFib)
        );
        assert!(GeneratorKind::try_from("mt19937").is_err());
    }

    #[test]
    fn test_run_config_validation() {
        assert!(base().validate().is_ok());

        let mut cfg = base();
        cfg.n_reps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = base();
        cfg.n_threads = Some(0);
        assert!(cfg.validate().is_err());
    }
}
