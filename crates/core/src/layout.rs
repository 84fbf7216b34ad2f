//! Slide layout policy.
//!
//! Maps the section tree onto a fixed slide grammar: one title slide, then
//! per section a divider slide and, when there is anything to show, one
//! content slide with the first few bullets and equations.

use crate::render::RenderReport;
use crate::types::{Equation, Section, SlideDescriptor};
use std::path::PathBuf;

/// Ordinal prefixes recognised as numbered bullets.
const ORDINAL_PREFIXES: &[&str] = &["1.", "2.", "3.", "4.", "5."];

/// Extract bullet lines from a section body, in order.
///
/// A line is a bullet when, trimmed, it starts with `-`, `*` or one of
/// `1.` to `5.`. The marker is removed and the rest trimmed; lines with
/// nothing left are dropped. Rules such as `---` or `* * *` are not bullets.
pub fn derive_bullets(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !is_rule(line))
        .filter_map(strip_bullet_marker)
        .map(|rest| rest.trim().to_string())
        .filter(|bullet| !bullet.is_empty())
        .collect()
}

/// A line made only of `-` and `*` marker characters.
fn is_rule(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '-' | '*' | ' ' | '\t'))
}

fn strip_bullet_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
        return Some(rest);
    }
    ORDINAL_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
}

/// Position in the shared equation list, consumed in document order.
///
/// Each section advances the cursor past every equation it inspects, so no
/// equation is ever offered to two sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquationCursor(usize);

impl EquationCursor {
    pub fn position(self) -> usize {
        self.0
    }
}

/// Fixed heuristics for filling content slides.
#[derive(Debug, Clone)]
pub struct SlideLayoutPlanner {
    /// Bullets shown per content slide.
    max_bullets: usize,
    /// Equations collected per section before moving on.
    max_collected_equations: usize,
    /// Equation images shown per content slide.
    max_equation_images: usize,
}

impl Default for SlideLayoutPlanner {
    fn default() -> Self {
        Self {
            max_bullets: 5,
            max_collected_equations: 3,
            max_equation_images: 2,
        }
    }
}

impl SlideLayoutPlanner {
    /// Create a planner with the default limits (5 bullets, 3 collected
    /// equations, 2 shown).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bullets(mut self, max: usize) -> Self {
        self.max_bullets = max;
        self
    }

    pub fn with_max_equation_images(mut self, max: usize) -> Self {
        self.max_equation_images = max;
        self
    }

    /// Plan the full slide sequence.
    pub fn plan(
        &self,
        title: &str,
        sections: &[Section],
        equations: &[Equation],
        rendered: &RenderReport,
    ) -> Vec<SlideDescriptor> {
        let mut slides = vec![SlideDescriptor::Title {
            text: title.to_string(),
        }];
        let mut cursor = EquationCursor::default();

        for section in sections {
            let (section_slides, next) = self.plan_section(section, equations, rendered, cursor);
            slides.extend(section_slides);
            cursor = next;
        }

        log::debug!(
            "Planned {} slides for {} sections",
            slides.len(),
            sections.len()
        );
        slides
    }

    /// Plan one section's slides starting from `cursor`, returning them with
    /// the advanced cursor.
    pub fn plan_section(
        &self,
        section: &Section,
        equations: &[Equation],
        rendered: &RenderReport,
        cursor: EquationCursor,
    ) -> (Vec<SlideDescriptor>, EquationCursor) {
        let mut slides = vec![SlideDescriptor::SectionHeader {
            text: section.title.clone(),
        }];

        let bullets = derive_bullets(&section.body);
        let (images, cursor) = self.collect_equations(section, equations, rendered, cursor);

        if !bullets.is_empty() || !images.is_empty() {
            slides.push(SlideDescriptor::Content {
                title: section.title.clone(),
                bullets: bullets.into_iter().take(self.max_bullets).collect(),
                equations: images.into_iter().take(self.max_equation_images).collect(),
            });
        } else {
            log::debug!("Section '{}' has no bullets or equations", section.title);
        }

        (slides, cursor)
    }

    /// Take rendered equations positioned after the section's body offset.
    ///
    /// Equations at or before the offset, and equations without an
    /// artifact, are passed over.
    fn collect_equations(
        &self,
        section: &Section,
        equations: &[Equation],
        rendered: &RenderReport,
        cursor: EquationCursor,
    ) -> (Vec<PathBuf>, EquationCursor) {
        let mut index = cursor.0;
        let mut images = Vec::new();

        while index < equations.len() && images.len() < self.max_collected_equations {
            let equation = &equations[index];
            index += 1;

            if equation.offset <= section.offset {
                continue;
            }
            if let Some(path) = rendered.path(index - 1) {
                images.push(path.to_path_buf());
            }
        }

        (images, EquationCursor(index))
    }
}
