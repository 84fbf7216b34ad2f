//! Chapter discovery and published notebook naming.

use std::path::Path;

/// Marker of an executable Python chunk.
const PYTHON_CHUNK: &str = "```{python}";

/// Chapter entries listed in a `_quarto.yml` book configuration.
///
/// Every line whose trimmed form starts with `- Chapter` is an entry; the
/// entry is the text after the leading `- `.
pub fn chapters_from_config(config: &str) -> Vec<String> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("- Chapter"))
        .map(|line| line[2..].trim().to_string())
        .collect()
}

/// Whether `text` contains at least one Python code chunk.
pub fn has_python_chunks(text: &str) -> bool {
    text.contains(PYTHON_CHUNK)
}

/// Whether the chapter file at `path` contains Python chunks.
///
/// Unreadable files count as having none.
pub fn file_has_python_chunks(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(text) => has_python_chunks(&text),
        Err(e) => {
            log::debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Published file name for the chapter at 1-based `ordinal`.
///
/// `Chapter_Futures.qmd` at ordinal 3 becomes `03_Futures.ipynb`.
pub fn published_name(ordinal: usize, chapter: &str) -> String {
    let file_name = Path::new(chapter)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(chapter);
    let topic = file_name
        .split_once('_')
        .map_or(file_name, |(_, rest)| rest);
    let stem = Path::new(topic)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(topic);
    format!("{:02}_{}.ipynb", ordinal, stem)
}
