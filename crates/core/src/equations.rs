//! Inline and display math extraction.
//!
//! Two independent passes scan the raw text for `$$...$$` and `$...$`
//! spans. Backslash-escaped dollar signs are not special, so prose like
//! `costs \$5 and \$6` produces a false inline match.

use crate::types::{Equation, EquationKind};

/// Extract all equations from `text`, ordered by source offset.
///
/// Display and inline equations are interleaved by document position.
pub fn extract_equations(text: &str) -> Vec<Equation> {
    let mut equations = Vec::new();

    for (start, content) in scan_display(text) {
        equations.push(Equation {
            kind: EquationKind::Display,
            latex: content.trim().to_string(),
            offset: start,
        });
    }

    for (start, content) in scan_inline(text) {
        equations.push(Equation {
            kind: EquationKind::Inline,
            latex: content.trim().to_string(),
            offset: start,
        });
    }

    // Stable, so equal offsets (which cannot occur across kinds) keep pass order
    equations.sort_by_key(|eq| eq.offset);

    log::debug!("Extracted {} equations", equations.len());
    equations
}

/// Find `$$content$$` spans where content is one or more non-`$` bytes.
///
/// Returns (offset of opening delimiter, content).
fn scan_display(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'$' {
            let content_start = i + 2;
            let mut j = content_start;
            while j < bytes.len() && bytes[j] != b'$' {
                j += 1;
            }

            let closed = j > content_start && j + 1 < bytes.len() && bytes[j + 1] == b'$';
            if closed {
                spans.push((i, &text[content_start..j]));
                i = j + 2;
                continue;
            }
        }
        i += 1;
    }

    spans
}

/// Find `$content$` spans that are not part of a `$$` pair.
///
/// The opening `$` must be neither preceded nor followed by `$`; the content
/// is one or more bytes other than `$` and newline; the closing `$` must not
/// be followed by `$`.
fn scan_inline(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let opens = bytes[i] == b'$'
            && (i == 0 || bytes[i - 1] != b'$')
            && bytes.get(i + 1).is_some_and(|&b| b != b'$');

        if opens {
            let content_start = i + 1;
            let mut j = content_start;
            while j < bytes.len() && bytes[j] != b'$' && bytes[j] != b'\n' {
                j += 1;
            }

            let closed = j > content_start
                && bytes.get(j) == Some(&b'$')
                && bytes.get(j + 1) != Some(&b'$');
            if closed {
                spans.push((i, &text[content_start..j]));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    spans
}
