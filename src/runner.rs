//! The per-test pipeline.
//!
//! One [`Harness`] drives one invocation: it owns the daemon client, the
//! toolchain, and the run-scoped output namespace. For each (model, test)
//! pair it interpolates the prompt, queries the model, extracts and
//! materializes code blocks, builds and runs the result, and scores the
//! captured output. The outer loop over models and tests lives in
//! `cmd::run`, which also decides how to react to failures.
//!
//! ## Lifecycle of one test
//!
//! 1. The fixture is staged into a fresh run directory.
//! 2. The prompt template is interpolated against the staged directory.
//! 3. The prompt and the raw daemon response are logged before parsing.
//! 4. Code blocks are extracted and written over the declared files.
//! 5. The toolchain builds; a failed build short-circuits to a
//!    build-failure verdict.
//! 6. The toolchain runs; the output is scored best-rule-first.

use std::path::PathBuf;

use bon::Builder;
use color_eyre::{
    Result,
    eyre::{Context, bail},
};

use crate::config::TestCase;
use crate::ollama::{GenerateResponse, OllamaClient};
use crate::outcome::Verdict;
use crate::stage::{self, RunContext};
use crate::toolchain::Toolchain;
use crate::{extract, score, template};

/// Everything needed to evaluate tests for the duration of one run.
#[derive(Debug, Clone, Builder)]
#[non_exhaustive]
pub struct Harness {
    /// Client for the inference daemon.
    pub client: OllamaClient,

    /// The build/run toolchain.
    pub toolchain: Toolchain,

    /// Directory holding the test fixture directories.
    #[builder(into)]
    pub tests_dir: PathBuf,

    /// Root of the generated output tree.
    #[builder(into)]
    pub output_root: PathBuf,

    /// This invocation's run identifier.
    #[builder(into)]
    pub run_id: String,
}

impl Harness {
    /// Make a model available and force it to load before timing begins.
    ///
    /// A failure here is fatal to this model's evaluation; no test runs.
    #[tracing::instrument(skip(self))]
    pub fn prepare_model(&self, model: &str) -> Result<()> {
        self.client.pull(model)?;
        self.client.warm_up(model)
    }

    /// Run one test against one model and return its verdict.
    ///
    /// Any error aborts this test; the caller chooses whether it aborts the
    /// whole run.
    #[tracing::instrument(skip(self, test), fields(test = %test.dir))]
    pub fn run_test(&self, model: &str, test: &TestCase) -> Result<Verdict> {
        let fixture = self.tests_dir.join(&test.dir);
        if !fixture.is_dir() {
            bail!("fixture directory not found: {fixture:?}");
        }

        let ctx = RunContext::new(&self.output_root, &self.run_id, model, &test.dir);
        stage::stage_fixture(&fixture, &ctx)?;

        let prompt = template::interpolate(&test.prompt, ctx.dir())?;
        stage::write_log(&ctx, "prompt.log", &prompt)?;

        let raw = self.client.generate(model, &prompt)?;
        stage::write_log(&ctx, "ollama.json", &raw)?;

        let response = GenerateResponse::parse(&raw)
            .with_context(|| format!("parse response for test {:?}", test.dir))?;

        let blocks = extract::code_blocks(&response.response, &test.langs())?;
        stage::write_blocks(&ctx, test, &blocks)?;

        let build = self.toolchain.build(ctx.dir())?;
        let log = stage::write_log(&ctx, "build.log", &build.log)?;
        if !build.success {
            return Ok(Verdict::BuildFailed { log });
        }

        let output = self.toolchain.run(ctx.dir())?;
        let points = score::evaluate(&output, test.scoring_best_first());

        Ok(Verdict::Scored { points, output })
    }
}
