//! User-memory file operations (§6 "Memory file format").
//!
//! The core's only write operation against this file is "append a fact":
//! normalize it, then insert it as the last line of a fixed section,
//! creating that section if it's missing. Everything else in the file is
//! preserved byte-for-byte.

use relay_types::ConfigError;
use std::path::Path;

/// Header of the section facts are appended under.
pub const MEMORY_SECTION_HEADER: &str = "## Gemini Added Memories";

/// Default memory file name under the configured directory.
pub const DEFAULT_MEMORY_FILE_NAME: &str = "GEMINI.md";

/// Load the memory file's contents, treating a missing file as empty.
pub async fn load(path: &Path) -> Result<String, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(ConfigError::Other(e.to_string())),
    }
}

/// Append one fact to the memory file at `path`, creating the file and its
/// parent directory if necessary.
pub async fn append_fact(path: &Path, fact: &str) -> Result<(), ConfigError> {
    let existing = load(path).await?;
    let updated = insert_fact(&existing, &normalize_fact(fact));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Other(e.to_string()))?;
    }
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| ConfigError::Other(e.to_string()))
}

/// Strip a leading bullet dash and surrounding whitespace from a raw fact.
fn normalize_fact(fact: &str) -> String {
    fact.trim().trim_start_matches('-').trim().to_string()
}

/// Pure insertion logic, split out from the I/O so it's trivially testable.
fn insert_fact(content: &str, fact: &str) -> String {
    let had_trailing_newline = content.is_empty() || content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    match lines.iter().position(|l| l == MEMORY_SECTION_HEADER) {
        Some(header_idx) => {
            let mut section_end = lines.len();
            for (i, line) in lines.iter().enumerate().skip(header_idx + 1) {
                if line.starts_with("## ") {
                    section_end = i;
                    break;
                }
            }
            let mut insert_at = section_end;
            while insert_at > header_idx + 1 && lines[insert_at - 1].trim().is_empty() {
                insert_at -= 1;
            }
            lines.insert(insert_at, format!("- {fact}"));
        }
        None => {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(MEMORY_SECTION_HEADER.to_string());
            lines.push(format!("- {fact}"));
        }
    }

    let mut out = lines.join("\n");
    if had_trailing_newline {
        out.push('\n');
    }
    out
}
