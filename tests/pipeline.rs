//! End-to-end pipeline tests, daemon excluded.
//!
//! These compose the same stages `Harness::run_test` does — interpolate,
//! parse a response body, extract, materialize, build, run, score — against
//! a canned daemon response and a shell toolchain, so the whole
//! prompt-to-verdict path is exercised without a live Ollama instance.

use std::fs::{read_to_string, write};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use codebench::config::{MatchKind, ResultFile, ScoringRule, TestCase};
use codebench::ollama::GenerateResponse;
use codebench::stage::{self, RunContext};
use codebench::toolchain::Toolchain;
use codebench::{extract, score, template};

fn shell_toolchain(build: &str, run: &str) -> Toolchain {
    Toolchain::builder()
        .binary("sh")
        .build_args(vec!["-c".to_string(), build.to_string()])
        .run_args(vec!["-c".to_string(), run.to_string()])
        .build()
}

fn answer_test() -> TestCase {
    TestCase::builder()
        .dir("answer")
        .category("basics")
        .prompt("Given {seed.py}, print the answer in a bash block.")
        .results(vec![ResultFile::builder().lang("bash").file("answer.sh").build()])
        .scoring(vec![
            ScoringRule::builder().output("42").kind(MatchKind::Exact).score(10).build(),
            ScoringRule::builder().output("answer").kind(MatchKind::Contains).score(3).build(),
        ])
        .build()
}

#[test]
fn response_body_to_scored_verdict() {
    let fixtures = tempdir().unwrap();
    let fixture = fixtures.path().join("answer");
    std::fs::create_dir_all(&fixture).unwrap();
    write(fixture.join("seed.py"), "answer = 42").unwrap();

    let output_root = tempdir().unwrap();
    let test = answer_test();
    let ctx = RunContext::new(output_root.path(), "run_itest", "model:tag", &test.dir);

    // Stage and interpolate, logging the prompt like the harness does.
    stage::stage_fixture(&fixture, &ctx).unwrap();
    let prompt = template::interpolate(&test.prompt, ctx.dir()).unwrap();
    assert!(prompt.contains("```python seed.py\nanswer = 42\n```"));
    stage::write_log(&ctx, "prompt.log", &prompt).unwrap();

    // Canned daemon response body, logged raw before parsing.
    let body = serde_json::json!({
        "model": "model:tag",
        "response": "Sure!\n```bash\nprintf '42\\n'\n```\nDone.",
        "done": true
    })
    .to_string();
    stage::write_log(&ctx, "ollama.json", &body).unwrap();
    let response = GenerateResponse::parse(&body).unwrap();

    // Extract and materialize.
    let blocks = extract::code_blocks(&response.response, &test.langs()).unwrap();
    assert_eq!(blocks.len(), 1);
    let written = stage::write_blocks(&ctx, &test, &blocks).unwrap();
    assert_eq!(written, 1);

    // Build, run, score.
    let toolchain = shell_toolchain("true", "sh answer.sh");
    let build = toolchain.build(ctx.dir()).unwrap();
    assert!(build.success);
    let output = toolchain.run(ctx.dir()).unwrap();
    assert_eq!(output, "42");
    assert_eq!(score::evaluate(&output, test.scoring_best_first()), 10);

    // The run tree holds the staged fixture, the written file, and the logs.
    assert_eq!(
        read_to_string(ctx.dir().join("seed.py")).unwrap(),
        "answer = 42"
    );
    assert!(ctx.dir().join("answer.sh").is_file());
    assert!(ctx.logs_dir().join("prompt.log").is_file());
    assert!(ctx.logs_dir().join("ollama.json").is_file());
    assert_eq!(
        ctx.dir(),
        output_root
            .path()
            .join("run_itest")
            .join("model_tag")
            .join("answer")
    );
}

#[test]
fn empty_extraction_scores_zero_from_fixture_state() {
    let fixtures = tempdir().unwrap();
    let fixture = fixtures.path().join("answer");
    std::fs::create_dir_all(&fixture).unwrap();
    // Fixture ships a stub that prints nothing useful.
    write(fixture.join("answer.sh"), "printf 'stub\\n'").unwrap();

    let output_root = tempdir().unwrap();
    let test = answer_test();
    let ctx = RunContext::new(output_root.path(), "run_itest2", "m", &test.dir);
    stage::stage_fixture(&fixture, &ctx).unwrap();

    // The model answered in prose, with no fenced block.
    let blocks = extract::code_blocks("I would print 42.", &test.langs()).unwrap();
    assert!(blocks.is_empty());
    assert_eq!(stage::write_blocks(&ctx, &test, &blocks).unwrap(), 0);

    // The stub's output is what gets scored; no rule matches.
    let toolchain = shell_toolchain("true", "sh answer.sh");
    let output = toolchain.run(ctx.dir()).unwrap();
    assert_eq!(output, "stub");
    assert_eq!(score::evaluate(&output, test.scoring_best_first()), 0);
}

#[test]
fn build_failure_is_detectable_before_running() {
    let fixtures = tempdir().unwrap();
    let fixture = fixtures.path().join("answer");
    std::fs::create_dir_all(&fixture).unwrap();

    let output_root = tempdir().unwrap();
    let ctx = RunContext::new(output_root.path(), "run_itest3", "m", "answer");
    stage::stage_fixture(&fixture, &ctx).unwrap();

    let toolchain = shell_toolchain("echo nope >&2; exit 1", "true");
    let build = toolchain.build(ctx.dir()).unwrap();
    assert!(!build.success);

    let log = stage::write_log(&ctx, "build.log", &build.log).unwrap();
    assert!(read_to_string(log).unwrap().contains("nope"));
}
