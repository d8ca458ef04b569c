//! Materialization of per-test working directories.
//!
//! Every (model, test) pair gets a fresh directory under a run-scoped root:
//! `<output_root>/<run_id>/<model_slug>/<test_dir>`. The test's fixture is
//! copied in, prompt/response logs are persisted before any parsing so
//! downstream failures stay diagnosable, and extracted code blocks are
//! written over their declared destination files.
//!
//! Directories are never reused across tests or models; cleanup is left to
//! the operator.

use std::{
    fs::{copy, create_dir_all, write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::{Result, eyre::Context};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::TestCase;
use crate::extract::CodeBlock;

/// The isolated working directory for one (run, model, test) triple.
#[derive(Debug, Clone)]
pub struct RunContext {
    dir: PathBuf,
}

impl RunContext {
    pub fn new(output_root: &Path, run_id: &str, model: &str, test_dir: &str) -> Self {
        Self {
            dir: output_root
                .join(run_id)
                .join(model_slug(model))
                .join(test_dir),
        }
    }

    /// The materialized test directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The `logs` subdirectory.
    pub fn logs_dir(&self) -> PathBuf {
        self.dir.join("logs")
    }
}

/// A filesystem-safe rendering of a model identifier (`:` becomes `_`).
pub fn model_slug(model: &str) -> String {
    model.replace(':', "_")
}

/// A fresh run identifier: epoch-seconds timestamp plus a 4-character random
/// suffix, so repeated runs never collide.
pub fn new_run_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", secs, &suffix[..4])
}

/// Copy the test's fixture directory into the run context and create its
/// `logs` subdirectory.
///
/// The copy is recursive; intermediate directories are created and
/// same-named files are overwritten.
#[tracing::instrument]
pub fn stage_fixture(fixture: &Path, ctx: &RunContext) -> Result<()> {
    copy_dir(fixture, ctx.dir())?;
    create_dir_all(ctx.logs_dir())
        .with_context(|| format!("create logs directory in {:?}", ctx.dir()))?;
    Ok(())
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("walk fixture directory: {src:?}"))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("strip fixture prefix from {:?}", entry.path()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target).with_context(|| format!("create directory {target:?}"))?;
        } else {
            copy(entry.path(), &target)
                .with_context(|| format!("copy {:?} to {target:?}", entry.path()))?;
        }
    }

    Ok(())
}

/// Persist a log file under the context's `logs` directory.
#[tracing::instrument(skip(content))]
pub fn write_log(ctx: &RunContext, name: &str, content: &str) -> Result<PathBuf> {
    let path = ctx.logs_dir().join(name);
    write(&path, content).with_context(|| format!("write log {path:?}"))?;
    Ok(path)
}

/// Write extracted code blocks over the test's declared destination files.
///
/// Within each language, block *i* pairs with the *i*-th declared file for
/// that language. When fewer blocks were extracted than files declared, only
/// the available pairs are written and the surplus destinations keep their
/// staged fixture contents. Returns the number of files written.
#[tracing::instrument(skip(test, blocks), fields(test = %test.dir))]
pub fn write_blocks(ctx: &RunContext, test: &TestCase, blocks: &[CodeBlock]) -> Result<usize> {
    let mut written = 0;

    for lang in test.langs() {
        let contents = blocks.iter().filter(|block| block.lang == lang);
        let destinations = test.results.iter().filter(|result| result.lang == lang);

        for (block, result) in contents.zip(destinations) {
            let path = ctx.dir().join(&result.file);
            write(&path, &block.content)
                .with_context(|| format!("write extracted block to {path:?}"))?;
            written += 1;
        }
    }

    Ok(written)
}
