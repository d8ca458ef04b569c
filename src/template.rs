//! Prompt template interpolation.
//!
//! Templates reference fixture files with `{name}` placeholders. Each
//! placeholder expands to a fenced code block containing the named file's
//! contents, tagged with the language derived from the file's extension, so
//! the model sees the starting code it is asked to work with.

use std::{fs::read_to_string, path::Path, sync::LazyLock};

use color_eyre::{
    Result,
    eyre::{Context, bail},
};
use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern compiles"));

/// Expand every `{name}` placeholder in `template` into a fenced code block
/// sourced from `base_dir/name`.
///
/// Fails when a referenced file does not exist; the caller aborts the current
/// test. No side effects beyond file reads.
#[tracing::instrument(skip(template))]
pub fn interpolate(template: &str, base_dir: &Path) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;

    for placeholder in PLACEHOLDER.find_iter(template) {
        // Strip the surrounding braces.
        let file_name = &template[placeholder.start() + 1..placeholder.end() - 1];

        let path = base_dir.join(file_name);
        if !path.is_file() {
            bail!("file is not found: {path:?}");
        }
        let content =
            read_to_string(&path).with_context(|| format!("read template file: {path:?}"))?;

        result.push_str(&template[last_end..placeholder.start()]);
        result.push_str(&fenced_block(file_name, &content));
        last_end = placeholder.end();
    }

    result.push_str(&template[last_end..]);
    Ok(result)
}

/// Render a file as a fenced code block, tagged by language and file name.
fn fenced_block(file_name: &str, content: &str) -> String {
    format!(
        "\n```{} {}\n{}\n```\n",
        lang_for_file(file_name),
        file_name,
        content
    )
}

/// Markdown language tag for a file name, by extension. Unrecognized
/// extensions fall back to `"unknown"`.
pub fn lang_for_file(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "cs" => "csharp",
        "fs" => "fsharp",
        "js" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "java" => "java",
        "kt" => "kotlin",
        "cpp" | "h" | "hpp" => "cpp",
        "c" => "c",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "scala" => "scala",
        "lua" => "lua",
        "r" => "r",
        "pl" => "perl",
        "dart" => "dart",
        "hs" => "haskell",
        "jl" => "julia",
        "clj" => "clojure",
        "ex" => "elixir",
        "erl" => "erlang",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "vue" => "vue",
        "svelte" => "svelte",
        "json" => "json",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" => "ini",
        "md" => "markdown",
        "sql" => "sql",
        "sh" => "bash",
        "zsh" => "zsh",
        "fish" => "fish",
        "ps1" => "powershell",
        "bat" | "cmd" => "batch",
        "graphql" => "graphql",
        "dockerfile" => "dockerfile",
        "cmake" => "cmake",
        "nim" => "nim",
        "v" => "verilog",
        "sv" => "systemverilog",
        "vhd" | "vhdl" => "vhdl",
        _ => "unknown",
    }
}
