//! List the configured models and tests.

use std::path::PathBuf;

use clap::Args;
use codebench::config::TestsConfig;
use color_eyre::Result;
use owo_colors::OwoColorize;

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Path to the tests configuration file.
    #[arg(short, long, default_value = "tests.json")]
    config: PathBuf,
}

pub fn main(config: Config) -> Result<()> {
    let tests_config = TestsConfig::load(&config.config)?;

    println!("{}", "Models:".bold().underline());
    for model in &tests_config.models {
        println!("  {}", model.purple());
    }
    println!();

    println!("{}", "Tests:".bold().underline());
    let mut current_category = "";
    for test in tests_config.tests_by_category() {
        if test.category != current_category {
            current_category = &test.category;
            println!("  {}", current_category.cyan());
        }
        println!(
            "    {} (max {} points, {} file{})",
            test.dir,
            test.max_score(),
            test.results.len(),
            if test.results.len() == 1 { "" } else { "s" },
        );
    }

    Ok(())
}
