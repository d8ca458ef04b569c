//! Code block extraction from model responses.
//!
//! Models are asked to answer with fenced, language-tagged code blocks. The
//! extractor pulls out everything between an opening ```` ```lang ```` marker
//! and the next ```` ``` ````, scanning across newlines.

use color_eyre::{Result, eyre::Context};
use regex::Regex;

/// A fenced code block extracted from a response.
///
/// Ephemeral: produced here, consumed immediately by the materializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The language tag the block was extracted for.
    pub lang: String,

    /// The raw block contents, exactly as enclosed by the fence markers.
    pub content: String,
}

/// Extract all fenced code blocks for the requested language tags.
///
/// Each tag is searched independently; the result is grouped by tag in the
/// order the tags were given, and within a tag blocks keep their document
/// order. A tag with no matches contributes nothing — that is not an error.
///
/// The tag must end at a word boundary, so requesting `cs` does not swallow
/// `csharp` blocks.
#[tracing::instrument(skip(text))]
pub fn code_blocks(text: &str, langs: &[&str]) -> Result<Vec<CodeBlock>> {
    let mut blocks = Vec::new();

    for lang in langs {
        let pattern = fence_pattern(lang);
        let fence = Regex::new(&pattern)
            .with_context(|| format!("compile fence pattern for language {lang:?}"))?;

        for captures in fence.captures_iter(text) {
            blocks.push(CodeBlock {
                lang: (*lang).to_string(),
                content: captures[1].to_string(),
            });
        }
    }

    Ok(blocks)
}

fn fence_pattern(lang: &str) -> String {
    let tag = regex::escape(lang);
    // `\b` only works when the tag ends in a word character.
    if lang.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        format!(r"(?s)```{tag}\b(.*?)```")
    } else {
        format!(r"(?s)```{tag}(.*?)```")
    }
}
