//! Loading a lecture document and its macro preamble.

use crate::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Name of the sibling file holding shared LaTeX macro definitions.
pub const MACROS_FILE: &str = "macros.qmd";

/// Regex matching a `\newcommand{name}{body}` definition.
static NEWCOMMAND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\newcommand\{[^}]+\}\{[^}]+\}").unwrap());

/// A source document: raw text plus the macro preamble used for rendering.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    preamble: String,
}

impl Document {
    /// Create a document from text with no preamble.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            preamble: String::new(),
        }
    }

    /// Attach a macro preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Load a document from disk, collecting macros from a sibling
    /// `macros.qmd` if one exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;

        let macros_path = path
            .parent()
            .map(|p| p.join(MACROS_FILE))
            .unwrap_or_else(|| PathBuf::from(MACROS_FILE));
        let preamble = if macros_path.exists() {
            let content = std::fs::read_to_string(&macros_path)?;
            extract_macros(&content)
        } else {
            log::debug!("No {} next to {}", MACROS_FILE, path.display());
            String::new()
        };

        Ok(Self {
            text,
            preamble,
        })
    }

    /// Raw document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Newline-joined `\newcommand` definitions.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }
}

/// Collect every `\newcommand{..}{..}` definition in `content`, one per line.
pub fn extract_macros(content: &str) -> String {
    NEWCOMMAND_REGEX
        .find_iter(content)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
