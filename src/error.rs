use std::path::Path;

/// Errors surfaced while loading inputs or compiling an engine.
///
/// Everything here is fatal: the run driver reports the message once and
/// aborts. The update engines themselves cannot fail once construction
/// succeeds, so no error variant exists for the sweep loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lattice file {path}: {reason}")]
    Lattice { path: String, reason: String },

    #[error("schedule '{kind}': {reason}")]
    Schedule { kind: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn lattice(path: &Path, reason: impl Into<String>) -> Self {
        Self::Lattice {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
