//! Domain types for extracted lecture-note structure and planned slides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A level-2 section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, trimmed.
    pub title: String,

    /// Byte offset of the heading line in the document.
    pub heading_offset: usize,

    /// Byte offset where the body starts (end of the heading line).
    pub offset: usize,

    /// Raw body text, untrimmed.
    pub body: String,

    /// Level-3 and level-4 subsections in document order.
    pub subsections: Vec<Subsection>,
}

impl Section {
    /// Byte offset one past the end of the body.
    pub fn end(&self) -> usize {
        self.offset + self.body.len()
    }

    /// Body text with surrounding whitespace removed.
    pub fn content(&self) -> &str {
        self.body.trim()
    }
}

/// A level-3 or level-4 heading unit inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Heading level, 3 or 4.
    pub level: u8,

    /// Heading text, trimmed.
    pub title: String,

    /// Byte offset where the body starts.
    pub offset: usize,

    /// Raw body text, untrimmed.
    pub body: String,
}

impl Subsection {
    /// Body text with surrounding whitespace removed.
    pub fn content(&self) -> &str {
        self.body.trim()
    }
}

/// Whether an equation was written inline or as a display block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationKind {
    /// `$...$`
    Inline,
    /// `$$...$$`
    Display,
}

impl EquationKind {
    /// Target font size in points used when rendering this kind.
    pub fn font_size(self) -> u32 {
        match self {
            Self::Inline => 18,
            Self::Display => 24,
        }
    }
}

/// A LaTeX math span found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub kind: EquationKind,

    /// LaTeX source with delimiters stripped and whitespace trimmed.
    pub latex: String,

    /// Byte offset of the opening delimiter.
    pub offset: usize,
}

/// A fenced `::: Tag` annotation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    /// Tag word following the opening colons (e.g. "Principle").
    pub kind: String,

    /// Trimmed content between the fences.
    pub content: String,
}

/// A labelled executable code block that produces a figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Execution engine named in the fence, e.g. "python".
    pub engine: String,

    /// Figure label, e.g. "fig-payoff".
    pub label: String,

    /// Caption directive text, empty if absent.
    pub caption: String,

    /// The complete fenced block, verbatim.
    pub code: String,
}

/// An embedded iframe reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// The iframe `src` URL.
    pub url: String,

    /// Nearby `{#fig-...}` label, empty if none was found.
    pub label: String,
}

/// One planned slide, consumed by the presentation writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideDescriptor {
    /// Opening slide carrying the document title.
    Title { text: String },

    /// Divider slide introducing a section.
    SectionHeader { text: String },

    /// Section content: bullets and rendered equation images.
    Content {
        title: String,
        bullets: Vec<String>,
        equations: Vec<PathBuf>,
    },
}

impl SlideDescriptor {
    /// The heading text shown on the slide.
    pub fn title(&self) -> &str {
        match self {
            Self::Title { text } | Self::SectionHeader { text } => text,
            Self::Content { title, .. } => title,
        }
    }
}
