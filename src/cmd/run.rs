//! Run the benchmark over the configured models and tests.

use std::{path::PathBuf, time::Instant};

use clap::Args;
use codebench::config::{TestCase, TestsConfig};
use codebench::ollama::{DEFAULT_BASE_URL, OllamaClient};
use codebench::outcome::Verdict;
use codebench::report::{self, Report, RunStat, SEPARATOR_WIDTH, Severity};
use codebench::runner::Harness;
use codebench::stage;
use color_eyre::{Result, eyre::eyre};
use owo_colors::OwoColorize;

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Path to the tests configuration file.
    #[arg(short, long, default_value = "tests.json")]
    config: PathBuf,

    /// Directory holding the test fixture directories.
    #[arg(long, default_value = "tests")]
    tests_dir: PathBuf,

    /// Root directory for the generated output tree.
    #[arg(long, default_value = "generated")]
    output: PathBuf,

    /// Base URL of the Ollama daemon.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Models to evaluate (subset of the configured models; repeatable).
    ///
    /// If not specified, all configured models are evaluated.
    #[arg(short, long = "model")]
    models: Vec<String>,

    /// Tests to run, by directory name (repeatable).
    ///
    /// If not specified, all configured tests are run.
    #[arg(short, long = "test")]
    tests: Vec<String>,

    /// Abort the whole run on the first test failure instead of recording a
    /// zero-point stat and continuing.
    #[arg(long)]
    fail_fast: bool,

    /// Show what would run without querying the daemon.
    #[arg(long)]
    dry_run: bool,
}

/// Fully resolved run configuration with filters applied.
struct ResolvedConfig {
    models: Vec<String>,
    tests: Vec<TestCase>,
    harness: Harness,
    fail_fast: bool,
}

pub fn main(config: Config) -> Result<()> {
    let dry_run = config.dry_run;
    let resolved = ResolvedConfig::try_from(config)?;

    if dry_run {
        main_dry_run(&resolved)
    } else {
        main_run(&resolved)
    }
}

fn main_dry_run(config: &ResolvedConfig) -> Result<()> {
    println!("{}", "Dry run: listing all combinations:".yellow().bold());

    let total = config.models.len() * config.tests.len();
    let mut number = 0;
    for model in &config.models {
        for test in &config.tests {
            number += 1;
            println!(
                "  [{}/{}] {} {} × {} {} ({})",
                number,
                total,
                "Model:".green().bold(),
                model.dimmed(),
                "Test:".green().bold(),
                test.dir.dimmed(),
                test.category.dimmed(),
            );
        }
    }

    Ok(())
}

fn main_run(config: &ResolvedConfig) -> Result<()> {
    for model in &config.models {
        println!("model '{}'", model.purple());

        if let Err(error) = config.harness.prepare_model(model) {
            println!("  {} model unavailable: {error:#}", "✗".red());
            continue;
        }

        let report = run_model(config, model)?;
        print_report(&report);
    }

    Ok(())
}

/// Evaluate every selected test against one model.
///
/// A failing test is recorded as a zero-point stat and the run continues,
/// unless `--fail-fast` was given, in which case the error propagates and
/// terminates the whole run.
fn run_model(config: &ResolvedConfig, model: &str) -> Result<Report> {
    let mut report = Report::new();

    for test in &config.tests {
        let started = Instant::now();
        let result = config.harness.run_test(model, test);
        let duration = started.elapsed();

        let points = match result {
            Ok(verdict) => {
                if let Verdict::BuildFailed { log } = &verdict {
                    println!("  {} build failed, log at {}", "✗".red(), log.display());
                }
                verdict.points()
            }
            Err(error) if config.fail_fast => return Err(error),
            Err(error) => {
                println!("  {} test {} failed: {error:#}", "✗".red(), test.dir);
                0
            }
        };

        let stat = RunStat::new(&test.category, points, test.max_score(), duration);
        print_stat(&stat.with_label(&test.dir));
        report.push(stat);
    }

    Ok(report)
}

fn print_report(report: &Report) {
    println!("{}", "=".repeat(SEPARATOR_WIDTH));

    for category in report.category_totals() {
        print_stat(&category);
    }
    print_stat(&report.total());
}

/// Print one report line, colored by severity tier.
fn print_stat(stat: &RunStat) {
    let percent = format!("{:>4.0}%", stat.percent());
    let percent = match stat.severity() {
        Severity::Low => percent.red().to_string(),
        Severity::Medium => percent.yellow().to_string(),
        Severity::High => percent.green().to_string(),
    };

    println!(
        "{} {:>2}/{:>2}, {} {}",
        format!("{:>20}", stat.label).cyan(),
        stat.points,
        stat.max,
        percent,
        report::format_duration(stat.duration)
    );
}

impl TryFrom<Config> for ResolvedConfig {
    type Error = color_eyre::eyre::Error;

    fn try_from(config: Config) -> Result<Self> {
        let tests_config = TestsConfig::load(&config.config)?;

        let models = if config.models.is_empty() {
            tests_config.models.clone()
        } else {
            for name in &config.models {
                if !tests_config.models.contains(name) {
                    return Err(eyre!("model not configured: {name}"));
                }
            }
            config.models
        };

        let ordered = tests_config.tests_by_category();
        let tests: Vec<TestCase> = if config.tests.is_empty() {
            ordered.into_iter().cloned().collect()
        } else {
            for name in &config.tests {
                if !ordered.iter().any(|t| t.dir == *name) {
                    return Err(eyre!("test not configured: {name}"));
                }
            }
            ordered
                .into_iter()
                .filter(|t| config.tests.contains(&t.dir))
                .cloned()
                .collect()
        };

        let harness = Harness::builder()
            .client(OllamaClient::new(config.base_url)?)
            .toolchain(tests_config.toolchain)
            .tests_dir(config.tests_dir)
            .output_root(config.output)
            .run_id(stage::new_run_id())
            .build();

        Ok(Self {
            models,
            tests,
            harness,
            fail_fast: config.fail_fast,
        })
    }
}
