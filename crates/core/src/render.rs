//! Equation rendering orchestration.
//!
//! Drives an [`EquationRenderer`] over every extracted equation in order,
//! recording one [`RenderOutcome`] per equation. A failing equation never
//! stops the batch.

use crate::types::Equation;
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default output resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Deterministic artifact file name for the equation at `index`.
pub fn equation_filename(index: usize) -> String {
    format!("equation_{:03}.png", index)
}

/// Everything a backend needs to produce one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest<'a> {
    /// Math-mode LaTeX, always wrapped as `$...$`.
    pub latex: String,

    /// Target font size in points.
    pub font_size: u32,

    /// Output resolution.
    pub dpi: u32,

    /// `\newcommand` definitions available to the expression.
    pub preamble: &'a str,

    /// Where the PNG must be written.
    pub output: PathBuf,
}

/// A backend that turns LaTeX into an image file.
pub trait EquationRenderer {
    /// Render `request` to `request.output`.
    fn render(&self, request: &RenderRequest<'_>) -> Result<()>;
}

/// Result of rendering a single equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The image was written to this path.
    Rendered(PathBuf),
    /// The renderer rejected the equation.
    Failed(String),
}

/// Outcomes for a whole batch, indexed like the input equations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    outcomes: Vec<RenderOutcome>,
}

impl RenderReport {
    /// Build a report from outcomes in equation order.
    pub fn from_outcomes(outcomes: Vec<RenderOutcome>) -> Self {
        Self { outcomes }
    }

    /// Per-equation outcomes.
    pub fn outcomes(&self) -> &[RenderOutcome] {
        &self.outcomes
    }

    /// Artifact path for equation `index`, if it rendered.
    pub fn path(&self, index: usize) -> Option<&Path> {
        match self.outcomes.get(index) {
            Some(RenderOutcome::Rendered(path)) => Some(path),
            _ => None,
        }
    }

    /// Partial mapping from equation index to artifact path.
    pub fn rendered(&self) -> BTreeMap<usize, PathBuf> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, outcome)| match outcome {
                RenderOutcome::Rendered(path) => Some((i, path.clone())),
                RenderOutcome::Failed(_) => None,
            })
            .collect()
    }

    /// Number of equations attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RenderOutcome::Rendered(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// Renders a batch of equations into a directory.
pub struct RenderOrchestrator<'r, R: EquationRenderer + ?Sized> {
    renderer: &'r R,
    output_dir: PathBuf,
    preamble: String,
    dpi: u32,
}

impl<'r, R: EquationRenderer + ?Sized> RenderOrchestrator<'r, R> {
    /// Create an orchestrator writing into `output_dir`.
    pub fn new(renderer: &'r R, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
            preamble: String::new(),
            dpi: DEFAULT_DPI,
        }
    }

    /// Set the macro preamble passed with every request.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Set the output resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Render every equation in input order.
    ///
    /// Fails only if the output directory cannot be created.
    pub fn render_all(&self, equations: &[Equation]) -> Result<RenderReport> {
        std::fs::create_dir_all(&self.output_dir)?;

        let outcomes = equations
            .iter()
            .enumerate()
            .map(|(index, equation)| self.render_one(index, equation))
            .collect();

        let report = RenderReport::from_outcomes(outcomes);
        if report.failed() > 0 {
            log::warn!(
                "{} of {} equations could not be rendered",
                report.failed(),
                report.total()
            );
        }
        log::info!("Rendered {}/{} equations", report.succeeded(), report.total());

        Ok(report)
    }

    fn render_one(&self, index: usize, equation: &Equation) -> RenderOutcome {
        let request = RenderRequest {
            latex: format!("${}$", equation.latex),
            font_size: equation.kind.font_size(),
            dpi: self.dpi,
            preamble: &self.preamble,
            output: self.output_dir.join(equation_filename(index)),
        };

        match self.renderer.render(&request) {
            Ok(()) => RenderOutcome::Rendered(request.output),
            Err(e) => {
                log::debug!("Equation {} ({}) failed: {}", index, equation.latex, e);
                RenderOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EquationKind;
    use crate::Error;
    use std::cell::RefCell;

    /// Records requests and fails on selected indices without touching disk.
    struct RecordingRenderer {
        fail_on: Vec<String>,
        requests: RefCell<Vec<(String, u32, u32, PathBuf)>>,
    }

    impl RecordingRenderer {
        fn failing_on(fail_on: &[&str]) -> Self {
            Self {
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl EquationRenderer for RecordingRenderer {
        fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
            self.requests.borrow_mut().push((
                request.latex.clone(),
                request.font_size,
                request.dpi,
                request.output.clone(),
            ));
            if self.fail_on.contains(&request.latex) {
                return Err(Error::RenderError(format!("bad latex {}", request.latex)));
            }
            Ok(())
        }
    }

    fn equation(kind: EquationKind, latex: &str, offset: usize) -> Equation {
        Equation {
            kind,
            latex: latex.to_string(),
            offset,
        }
    }

    fn five_equations() -> Vec<Equation> {
        (0..5)
            .map(|i| equation(EquationKind::Display, &format!("x_{}", i), i * 10))
            .collect()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lecture-core-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_equation_filename() {
        assert_eq!(equation_filename(0), "equation_000.png");
        assert_eq!(equation_filename(42), "equation_042.png");
        assert_eq!(equation_filename(1234), "equation_1234.png");
    }

    #[test]
    fn test_failure_is_skipped() {
        let renderer = RecordingRenderer::failing_on(&["$x_2$"]);
        let dir = scratch_dir("skip");
        let report = RenderOrchestrator::new(&renderer, &dir)
            .render_all(&five_equations())
            .unwrap();

        let rendered = report.rendered();
        assert_eq!(rendered.keys().copied().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
        assert_eq!(rendered[&3], dir.join("equation_003.png"));
        assert_eq!(report.total(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
        assert!(report.path(2).is_none());
        assert!(matches!(&report.outcomes()[2], RenderOutcome::Failed(msg) if msg.contains("x_2")));

        // Every equation was still attempted, in order
        let requests = renderer.requests.borrow();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[4].3, dir.join("equation_004.png"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_request_parameters() {
        let renderer = RecordingRenderer::failing_on(&[]);
        let dir = scratch_dir("params");
        let equations = vec![
            equation(EquationKind::Inline, "a+b", 0),
            equation(EquationKind::Display, "\\int f", 5),
        ];
        RenderOrchestrator::new(&renderer, &dir)
            .with_dpi(150)
            .with_preamble("\\newcommand{\\E}{E}")
            .render_all(&equations)
            .unwrap();

        let requests = renderer.requests.borrow();
        assert_eq!(requests[0].0, "$a+b$");
        assert_eq!(requests[0].1, 18);
        assert_eq!(requests[0].2, 150);
        assert_eq!(requests[1].0, "$\\int f$");
        assert_eq!(requests[1].1, 24);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_naming_is_deterministic() {
        let dir = scratch_dir("idempotent");
        let first = RenderOrchestrator::new(&RecordingRenderer::failing_on(&[]), &dir)
            .render_all(&five_equations())
            .unwrap();
        let second = RenderOrchestrator::new(&RecordingRenderer::failing_on(&[]), &dir)
            .render_all(&five_equations())
            .unwrap();
        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_batch() {
        let dir = scratch_dir("empty");
        let report = RenderOrchestrator::new(&RecordingRenderer::failing_on(&[]), &dir)
            .render_all(&[])
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.rendered().is_empty());
        assert!(dir.is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
