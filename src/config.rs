//! Benchmark configuration loaded from `tests.json`.
//!
//! The configuration declares which models to evaluate, the test cases to run
//! against each of them, and optionally the toolchain used to build and run
//! the generated code.

use std::{fs::read_to_string, path::Path};

use bon::Builder;
use color_eyre::{
    Result,
    eyre::{Context, bail},
};
use itertools::Itertools;
use serde::Deserialize;

use crate::toolchain::Toolchain;

/// Top-level `tests.json` schema.
#[derive(Debug, Clone, Deserialize)]
pub struct TestsConfig {
    /// Models to evaluate, in evaluation order.
    pub models: Vec<String>,

    /// Test cases, in declaration order.
    pub tests: Vec<TestCase>,

    /// The build/run toolchain. Defaults to `dotnet`.
    #[serde(default)]
    pub toolchain: Toolchain,
}

impl TestsConfig {
    /// Load and validate a configuration file.
    ///
    /// Fails if the file is missing or malformed, or if either the model list
    /// or the test list is absent or empty.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            read_to_string(path).with_context(|| format!("read config file: {path:?}"))?;
        let config = serde_json::from_str::<Self>(&content)
            .with_context(|| format!("parse config file: {path:?}"))?;
        config.check(path)?;
        Ok(config)
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.models.is_empty() || self.tests.is_empty() {
            bail!("tests are not configured properly, check {path:?}: both `models` and `tests` must be non-empty");
        }
        Ok(())
    }

    /// Tests grouped by category, categories in first-appearance order.
    ///
    /// This is the evaluation order: it keeps each category's tests adjacent
    /// so that per-test report lines read grouped.
    pub fn tests_by_category(&self) -> Vec<&TestCase> {
        self.tests
            .iter()
            .map(|test| test.category.as_str())
            .unique()
            .flat_map(|category| self.tests.iter().filter(move |t| t.category == category))
            .collect()
    }
}

/// One evaluation unit: a prompt, the files the model is expected to produce,
/// and the rules used to score the program's output.
///
/// Immutable once loaded.
///
/// ## Block-to-file pairing
///
/// Extracted code blocks pair with `results` entries **positionally**, per
/// language: the i-th extracted block for a language is written to the i-th
/// declared file for that language. Prompt authors rely on this ordering when
/// a test expects multiple files of the same language.
#[derive(Debug, Clone, Deserialize, Builder)]
#[non_exhaustive]
pub struct TestCase {
    /// Fixture directory name under the tests directory; also the test's
    /// identifier in reports.
    #[builder(into)]
    pub dir: String,

    /// Grouping label for aggregated reporting. Orthogonal to scoring.
    #[builder(into)]
    pub category: String,

    /// Prompt template. `{name}` placeholders expand to fenced code blocks
    /// sourced from the staged fixture directory.
    #[builder(into)]
    pub prompt: String,

    /// Declared output files, in pairing order.
    #[builder(into)]
    pub results: Vec<ResultFile>,

    /// Scoring rules, in declaration order.
    #[builder(into)]
    pub scoring: Vec<ScoringRule>,
}

impl TestCase {
    /// The best score this test can award.
    pub fn max_score(&self) -> u32 {
        self.scoring.iter().map(|rule| rule.score).max().unwrap_or(0)
    }

    /// Scoring rules sorted descending by score, stable within equal scores.
    ///
    /// When an output satisfies multiple rules, the highest-scoring rule
    /// wins; the scorer itself evaluates in whatever order it is given.
    pub fn scoring_best_first(&self) -> Vec<&ScoringRule> {
        let mut rules: Vec<&ScoringRule> = self.scoring.iter().collect();
        rules.sort_by(|a, b| b.score.cmp(&a.score));
        rules
    }

    /// Requested language tags, deduplicated, in first-appearance order.
    pub fn langs(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|result| result.lang.as_str())
            .unique()
            .collect()
    }
}

/// A declared output file: which language's code block fills it.
#[derive(Debug, Clone, Deserialize, Builder)]
#[non_exhaustive]
pub struct ResultFile {
    /// Fenced-block language tag to extract.
    #[builder(into)]
    pub lang: String,

    /// Destination file name, relative to the materialized test directory.
    #[builder(into)]
    pub file: String,
}

/// A scoring rule: expected output, how to match it, and the points awarded.
#[derive(Debug, Clone, Deserialize, Builder)]
#[non_exhaustive]
pub struct ScoringRule {
    /// The expected output text.
    #[builder(into)]
    pub output: String,

    /// How `output` is matched against the captured program output.
    #[serde(rename = "type")]
    pub kind: MatchKind,

    /// Points awarded when the rule matches.
    pub score: u32,
}

/// How a scoring rule's expected output is matched.
///
/// `tests.json` accepts both the string names (`"exact"`, `"contains"`) and
/// the historical integer codes (`0`, `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "MatchKindRepr")]
pub enum MatchKind {
    /// Case-sensitive equality against the whole output.
    Exact,

    /// Case-insensitive substring containment.
    Contains,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MatchKindRepr {
    Code(u64),
    Name(String),
}

impl TryFrom<MatchKindRepr> for MatchKind {
    type Error = String;

    fn try_from(repr: MatchKindRepr) -> Result<Self, Self::Error> {
        match repr {
            MatchKindRepr::Code(0) => Ok(Self::Exact),
            MatchKindRepr::Code(1) => Ok(Self::Contains),
            MatchKindRepr::Code(code) => Err(format!("unknown match kind code: {code}")),
            MatchKindRepr::Name(name) => match name.to_lowercase().as_str() {
                "exact" => Ok(Self::Exact),
                "contains" => Ok(Self::Contains),
                _ => Err(format!("unknown match kind: {name:?}")),
            },
        }
    }
}
