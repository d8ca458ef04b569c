//! Per-test verdicts.
//!
//! A test that makes it through the pipeline ends in a [`Verdict`]; pipeline
//! errors (missing template file, daemon failure) stay on the `Result` error
//! path and the orchestrator decides whether to continue.

use std::path::PathBuf;

/// The outcome of one test execution.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// The build succeeded, the program ran, and its output was scored.
    Scored {
        /// Points awarded by the first matching rule, or 0.
        points: u32,

        /// The captured program output the points were awarded for.
        output: String,
    },

    /// The build step failed; the run step was skipped and no points were
    /// awarded.
    BuildFailed {
        /// Where the build log was persisted.
        log: PathBuf,
    },
}

impl Verdict {
    /// Points awarded by this verdict. A failed build awards none.
    pub fn points(&self) -> u32 {
        match self {
            Self::Scored { points, .. } => *points,
            Self::BuildFailed { .. } => 0,
        }
    }

    pub fn is_build_failure(&self) -> bool {
        matches!(self, Self::BuildFailed { .. })
    }
}
