//! Benchmark harness for code-generating models served by a local Ollama
//! daemon.
//!
//! For each configured model, the harness:
//! - builds a prompt from a test-case template, expanding `{file}`
//!   placeholders into fenced code blocks from the test's fixture directory;
//! - queries the daemon for a non-streaming completion;
//! - extracts fenced, language-tagged code blocks from the response;
//! - materializes the fixture plus the extracted code into a fresh per-run
//!   directory, persisting prompt/response logs along the way;
//! - builds and runs the result with an external toolchain;
//! - scores the captured output against the test's ordered rules;
//! - and aggregates per-test, per-category, and total statistics.
//!
//! Models and tests run strictly sequentially. Everything a run produces
//! lands under `generated/<run_id>/<model_slug>/<test_dir>/`; nothing else
//! is persisted across runs.

pub use crate::config::{MatchKind, ScoringRule, TestCase, TestsConfig};
pub use crate::extract::CodeBlock;
pub use crate::ollama::{GenerateResponse, OllamaClient};
pub use crate::outcome::Verdict;
pub use crate::report::{Report, RunStat, Severity};
pub use crate::runner::Harness;
pub use crate::toolchain::Toolchain;

pub mod config;
pub mod extract;
pub mod ollama;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod score;
pub mod stage;
pub mod template;
pub mod toolchain;
