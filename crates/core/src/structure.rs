//! Structural extraction: title, sections, subsections, callouts, figures
//! and embeds.
//!
//! Headings are found by a line tokenizer and assembled into the section
//! tree by a small recursive-descent pass, so boundaries come straight from
//! token offsets. Lines inside ``` fences are never headings.
//!
//! Nothing in here fails: malformed markup yields empty results.

use crate::types::{Callout, Embed, Figure, Section, Subsection};
use regex::Regex;
use std::sync::LazyLock;

/// Title used when the document has no level-1 heading.
pub const UNTITLED: &str = "Untitled";

/// Callout opening line, e.g. `::: Principle`.
static CALLOUT_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^::: (\w+)\s*$").unwrap());

/// Executable code block carrying a figure label directive.
static FIGURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```\{(\w+)\}[^`]*?#\| label: (fig-[^\n]+)[^`]*?```").unwrap()
});

/// Figure caption directive inside a code block.
static FIGURE_CAPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)#\| fig-cap: (.+?)$").unwrap());

static IFRAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<iframe[^>]*src="([^"]+)"[^>]*>.*?</iframe>"#).unwrap()
});

/// Cross-reference label attribute, e.g. `{#fig-surface}`.
static FIGURE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{#(fig-[^\}]+)\}").unwrap());

/// Bytes of context searched on each side of an iframe for its label.
const EMBED_LABEL_CONTEXT: usize = 200;

/// A heading line found by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Heading<'a> {
    /// Number of leading `#` characters.
    level: u8,
    /// Text after `#... `, untrimmed.
    text: &'a str,
    /// Offset of the first `#`.
    start: usize,
    /// Offset of the line end (before the newline).
    end: usize,
}

/// A line of the source with its byte range.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> Line<'a> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Split text into lines (without terminators) carrying their offsets.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        Line {
            text: raw.strip_suffix('\n').unwrap_or(raw),
            start,
        }
    })
}

/// Parse a heading line: one to six `#`, a space, then at least one char.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = line[hashes..].strip_prefix(' ')?;
    if rest.is_empty() {
        return None;
    }

    Some((hashes as u8, rest))
}

/// Tokenize heading lines, skipping fenced code blocks.
fn tokenize(text: &str) -> Vec<Heading<'_>> {
    let mut headings = Vec::new();
    let mut in_fence = false;

    for line in lines_with_offsets(text) {
        if line.text.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some((level, heading_text)) = parse_heading(line.text) {
            headings.push(Heading {
                level,
                text: heading_text,
                start: line.start,
                end: line.end(),
            });
        }
    }

    headings
}

/// Recursive-descent builder over the heading token stream.
struct TreeBuilder<'a, 'h> {
    text: &'a str,
    headings: &'h [Heading<'a>],
    position: usize,
}

impl<'a, 'h> TreeBuilder<'a, 'h> {
    fn new(text: &'a str, headings: &'h [Heading<'a>]) -> Self {
        Self {
            text,
            headings,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&'h Heading<'a>> {
        self.headings.get(self.position)
    }

    /// Start of the next heading token, or end of text.
    fn boundary(&self) -> usize {
        self.peek().map_or(self.text.len(), |h| h.start)
    }

    fn document(&mut self) -> Vec<Section> {
        let mut sections = Vec::new();

        while let Some(heading) = self.peek() {
            self.position += 1;
            if heading.level == 2 {
                sections.push(self.section(heading));
            }
        }

        sections
    }

    /// Body runs until the next heading of level 1 or 2.
    fn section(&mut self, heading: &Heading<'a>) -> Section {
        let mut subsections = Vec::new();

        while let Some(next) = self.peek() {
            if next.level <= 2 {
                break;
            }
            self.position += 1;
            if next.level == 3 || next.level == 4 {
                subsections.push(self.subsection(next));
            }
        }

        let end = self.boundary();
        Section {
            title: heading.text.trim().to_string(),
            heading_offset: heading.start,
            offset: heading.end,
            body: self.text[heading.end..end].to_string(),
            subsections,
        }
    }

    /// Body runs until the next heading of level 4 or higher priority.
    /// Deeper headings stay inside the body and are not split further.
    fn subsection(&mut self, heading: &Heading<'a>) -> Subsection {
        while let Some(next) = self.peek() {
            if next.level <= 4 {
                break;
            }
            self.position += 1;
        }

        let end = self.boundary();
        Subsection {
            level: heading.level,
            title: heading.text.trim().to_string(),
            offset: heading.end,
            body: self.text[heading.end..end].to_string(),
        }
    }
}

/// Extracts document structure from lecture-note markdown.
#[derive(Debug, Clone)]
pub struct StructureExtractor<'a> {
    text: &'a str,
    headings: Vec<Heading<'a>>,
}

impl<'a> StructureExtractor<'a> {
    /// Tokenize `text` for extraction.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            headings: tokenize(text),
        }
    }

    /// The first level-1 heading, without any trailing `{...}` attribute
    /// block, or [`UNTITLED`] when there is none.
    pub fn title(&self) -> String {
        self.headings
            .iter()
            .find(|h| h.level == 1)
            .map(|h| {
                // At least one character belongs to the title before a brace ends it
                let cut = h
                    .text
                    .char_indices()
                    .skip(1)
                    .find(|&(_, c)| c == '{')
                    .map_or(h.text.len(), |(i, _)| i);
                h.text[..cut].trim().to_string()
            })
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Level-2 sections in document order with their subsections.
    pub fn sections(&self) -> Vec<Section> {
        TreeBuilder::new(self.text, &self.headings).document()
    }

    /// Labelled executable code blocks, in document order.
    pub fn figures(&self) -> Vec<Figure> {
        FIGURE_REGEX
            .captures_iter(self.text)
            .map(|caps| {
                let code = caps[0].to_string();
                let caption = FIGURE_CAPTION_REGEX
                    .captures(&code)
                    .map(|c| c[1].trim().to_string())
                    .unwrap_or_default();
                Figure {
                    engine: caps[1].to_string(),
                    label: caps[2].trim().to_string(),
                    caption,
                    code,
                }
            })
            .collect()
    }

    /// Iframe embeds with the nearest figure label in surrounding context.
    pub fn embeds(&self) -> Vec<Embed> {
        IFRAME_REGEX
            .captures_iter(self.text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let from = floor_boundary(
                    self.text,
                    whole.start().saturating_sub(EMBED_LABEL_CONTEXT),
                );
                let to = ceil_boundary(self.text, whole.end() + EMBED_LABEL_CONTEXT);
                let label = FIGURE_LABEL_REGEX
                    .captures(&self.text[from..to])
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                Some(Embed {
                    url: caps[1].to_string(),
                    label,
                })
            })
            .collect()
    }

    /// Callouts anywhere in the document.
    pub fn callouts(&self) -> Vec<Callout> {
        extract_callouts(self.text)
    }
}

/// Extract `::: Tag` ... `:::` blocks from `body`, in order.
///
/// An opening line without a matching `:::` line is ignored.
pub fn extract_callouts(body: &str) -> Vec<Callout> {
    let mut callouts = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for line in lines_with_offsets(body) {
        match &open {
            None => {
                if let Some(caps) = CALLOUT_OPEN_REGEX.captures(line.text) {
                    open = Some((caps[1].to_string(), line.end()));
                }
            }
            Some((kind, content_start)) => {
                if line.text.trim_end() == ":::" {
                    callouts.push(Callout {
                        kind: kind.clone(),
                        content: body[*content_start..line.start].trim().to_string(),
                    });
                    open = None;
                }
            }
        }
    }

    callouts
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = "\
---
title: ignored front matter
---

# Chapter 1 {#ch1}

Intro text that is discarded.

## Arbitrage

- No free lunch
- Law of one price

### Definition

An arbitrage is $x$.

#### Detail

Deep detail.

## Put-Call Parity

```{python}
## not a heading
print(1)
```

1. First
2. Second
";

    #[test]
    fn test_title_strips_attributes() {
        assert_eq!(StructureExtractor::new(CHAPTER).title(), "Chapter 1");
        assert_eq!(
            StructureExtractor::new("# Chapter 1 {#ch1}").title(),
            "Chapter 1"
        );
        assert_eq!(
            StructureExtractor::new("text\n# Futures\nmore").title(),
            "Futures"
        );
    }

    #[test]
    fn test_title_placeholder() {
        assert_eq!(StructureExtractor::new("## Only a section").title(), UNTITLED);
        assert_eq!(StructureExtractor::new("").title(), UNTITLED);
        assert_eq!(StructureExtractor::new("#NoSpace").title(), UNTITLED);
    }

    #[test]
    fn test_sections_and_subsections() {
        let sections = StructureExtractor::new(CHAPTER).sections();
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].title, "Arbitrage");
        assert_eq!(sections[0].subsections.len(), 2);
        assert_eq!(sections[0].subsections[0].level, 3);
        assert_eq!(sections[0].subsections[0].title, "Definition");
        assert_eq!(sections[0].subsections[0].content(), "An arbitrage is $x$.");
        assert_eq!(sections[0].subsections[1].level, 4);
        assert_eq!(sections[0].subsections[1].content(), "Deep detail.");

        assert_eq!(sections[1].title, "Put-Call Parity");
        assert!(sections[1].subsections.is_empty());
        assert!(sections[1].body.contains("## not a heading"));
        assert!(sections[1].content().ends_with("2. Second"));
    }

    #[test]
    fn test_section_bodies_partition_text() {
        let text = "pre\n## A\na body\n### A1\nsub\n## B\nb body\n## C";
        let sections = StructureExtractor::new(text).sections();
        assert_eq!(sections.len(), 3);

        let first = sections[0].heading_offset;
        let mut rebuilt = String::new();
        let mut cursor = first;
        for section in &sections {
            assert_eq!(section.heading_offset, cursor);
            assert_eq!(&text[section.offset..section.end()], section.body);
            rebuilt.push_str(&text[section.heading_offset..section.offset]);
            rebuilt.push_str(&section.body);
            cursor = section.end();
        }
        assert_eq!(cursor, text.len());
        assert_eq!(rebuilt, &text[first..]);
        assert_eq!(sections[2].body, "");
    }

    #[test]
    fn test_level_one_heading_ends_section() {
        let text = "## A\nalpha\n# Part II\ngap\n## B\nbeta";
        let sections = StructureExtractor::new(text).sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "\nalpha\n");
        assert_eq!(sections[1].body, "\nbeta");
    }

    #[test]
    fn test_subsection_keeps_deeper_headings() {
        let text = "## A\n### A1\none\n##### tiny\nstill one\n#### A2\ntwo";
        let sections = StructureExtractor::new(text).sections();
        let subs = &sections[0].subsections;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].content(), "one\n##### tiny\nstill one");
        assert_eq!(subs[1].title, "A2");
        assert_eq!(subs[1].content(), "two");
    }

    #[test]
    fn test_no_sections() {
        let extractor = StructureExtractor::new("# Title\n\nJust prose.\n### Orphan\n");
        assert!(extractor.sections().is_empty());
    }

    #[test]
    fn test_callouts() {
        let body = "\
Before
::: Principle
Prices are expectations
under a martingale measure.
:::
Between
::: Rule
Never sell what you don't own.
:::
::: Unclosed
dangling";
        let callouts = extract_callouts(body);
        assert_eq!(callouts.len(), 2);
        assert_eq!(callouts[0].kind, "Principle");
        assert_eq!(
            callouts[0].content,
            "Prices are expectations\nunder a martingale measure."
        );
        assert_eq!(callouts[1].kind, "Rule");
        assert_eq!(callouts[1].content, "Never sell what you don't own.");
    }

    #[test]
    fn test_callouts_ignore_attribute_divs() {
        let body = "::: {.callout-note}\nA note\n:::\n";
        assert!(extract_callouts(body).is_empty());
    }

    #[test]
    fn test_figures() {
        let text = "\
## Plots

```{python}
#| label: fig-payoff
#| fig-cap: Call option payoff
import matplotlib
```

```{python}
#| label: fig-bare
x = 1
```

```{python}
print('no label')
```
";
        let figures = StructureExtractor::new(text).figures();
        assert_eq!(figures.len(), 2);
        assert_eq!(figures[0].engine, "python");
        assert_eq!(figures[0].label, "fig-payoff");
        assert_eq!(figures[0].caption, "Call option payoff");
        assert!(figures[0].code.starts_with("```{python}"));
        assert!(figures[0].code.ends_with("```"));
        assert_eq!(figures[1].label, "fig-bare");
        assert_eq!(figures[1].caption, "");
    }

    #[test]
    fn test_embeds() {
        let text = "\
::: {#fig-surface}
<iframe width=\"780\" src=\"https://example.org/surface.html\" frameborder=\"0\"></iframe>

Volatility surface.
:::

<iframe src=\"https://example.org/plain.html\">
</iframe>
";
        let embeds = StructureExtractor::new(text).embeds();
        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].url, "https://example.org/surface.html");
        assert_eq!(embeds[0].label, "fig-surface");
        assert_eq!(embeds[1].url, "https://example.org/plain.html");
        // The earlier label is still within the context window
        assert_eq!(embeds[1].label, "fig-surface");
    }

    #[test]
    fn test_parse_heading() {
        assert_eq!(parse_heading("## Title"), Some((2, "Title")));
        assert_eq!(parse_heading("####  Spaced "), Some((4, " Spaced ")));
        assert_eq!(parse_heading("##"), None);
        assert_eq!(parse_heading("## "), None);
        assert_eq!(parse_heading("##Title"), None);
        assert_eq!(parse_heading(" ## Indented"), None);
        assert_eq!(parse_heading("####### Seven"), None);
    }
}
