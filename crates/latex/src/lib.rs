//! Equation rendering backend driving the system `latex` and `dvipng`
//! programs.
//!
//! Each request is typeset as a one-page standalone document in a scratch
//! directory and converted to a tightly cropped, transparent PNG.

use lecture_core::{EquationRenderer, Error, RenderRequest, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Lines of compiler output kept in an error message.
const ERROR_CONTEXT_LINES: usize = 4;

/// One-argument commands whose definitions can be closed again after the
/// collected body was cut at their closing brace.
const UNARY_COMMANDS: &[&str] = &[
    "mathbb",
    "mathrm",
    "mathcal",
    "mathbf",
    "mathsf",
    "mathit",
    "mathfrak",
    "boldsymbol",
    "operatorname",
    "text",
];

/// Renders equations with `latex` + `dvipng`.
#[derive(Debug, Clone)]
pub struct LatexRenderer {
    latex: String,
    dvipng: String,
    work_dir: PathBuf,
}

impl Default for LatexRenderer {
    fn default() -> Self {
        Self {
            latex: "latex".to_string(),
            dvipng: "dvipng".to_string(),
            work_dir: std::env::temp_dir().join(format!("lecture-latex-{}", std::process::id())),
        }
    }
}

impl LatexRenderer {
    /// Create a renderer using `latex` and `dvipng` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use specific program names or paths.
    pub fn with_programs(mut self, latex: impl Into<String>, dvipng: impl Into<String>) -> Self {
        self.latex = latex.into();
        self.dvipng = dvipng.into();
        self
    }

    /// Set the scratch directory for intermediate files.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Check that both programs can be started.
    pub fn probe(&self) -> Result<()> {
        for program in [&self.latex, &self.dvipng] {
            let status = Command::new(program)
                .arg("--version")
                .output()
                .map_err(|e| Error::MissingCapability(format!("{}: {}", program, e)))?
                .status;
            if !status.success() {
                return Err(Error::MissingCapability(format!(
                    "{} --version exited with {}",
                    program, status
                )));
            }
        }
        log::debug!("Found {} and {}", self.latex, self.dvipng);
        Ok(())
    }

    /// Remove the scratch directory.
    pub fn cleanup(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
            log::debug!("Could not remove {}: {}", self.work_dir.display(), e);
        }
    }

    fn run(&self, command: &mut Command, what: &str) -> Result<()> {
        let output = command
            .output()
            .map_err(|e| Error::RenderError(format!("failed to start {}: {}", what, e)))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::RenderError(format!(
                "{} failed: {}",
                what,
                error_excerpt(&output)
            )))
        }
    }
}

/// Build the standalone TeX source for a request.
pub fn tex_document(request: &RenderRequest<'_>) -> String {
    let size = request.font_size;
    let skip = (size as f64 * 1.2).round() as u32;
    format!(
        "\\RequirePackage{{fix-cm}}\n\
         \\documentclass{{article}}\n\
         \\usepackage{{amsmath,amssymb}}\n\
         \\pagestyle{{empty}}\n\
         {preamble}\n\
         \\begin{{document}}\n\
         \\fontsize{{{size}}}{{{skip}}}\\selectfont\n\
         {latex}\n\
         \\end{{document}}\n",
        preamble = preamble_definitions(request.preamble),
        size = size,
        skip = skip,
        latex = request.latex,
    )
}

/// Rewrite collected `\newcommand` lines so the preamble always compiles.
///
/// Each definition becomes `\providecommand` followed by `\renewcommand`, so
/// names the document class already defines (`\d`, `\P`) are replaced
/// rather than rejected. A body cut short at its first closing brace is
/// completed when it is a single one-argument command like `\mathbb{E}`;
/// any other unbalanced definition is left out.
pub fn preamble_definitions(preamble: &str) -> String {
    preamble
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let definition = parse_definition(line);
            if definition.is_none() {
                log::debug!("Skipping macro definition: {}", line);
            }
            definition
        })
        .map(|(name, body)| {
            format!(
                "\\providecommand{{{name}}}{{}}\\renewcommand{{{name}}}{{{body}}}",
                name = name,
                body = body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `\newcommand{NAME}{BODY}` into name and balanced body.
fn parse_definition(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("\\newcommand{")?;
    let (name, rest) = rest.split_once('}')?;
    if name.len() < 2 || !name.starts_with('\\') {
        return None;
    }
    let rest = rest.strip_prefix('{')?;

    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return rest[i + 1..].trim().is_empty().then(|| (name, &rest[..i]));
                }
            }
            _ => {}
        }
    }

    (depth == 1 && is_unary_group(rest)).then_some((name, rest))
}

/// Whether `body` is exactly `\cmd{arg}` for a known one-argument command.
fn is_unary_group(body: &str) -> bool {
    body.strip_prefix('\\')
        .and_then(|b| b.split_once('{'))
        .and_then(|(command, arg)| Some((command, arg.strip_suffix('}')?)))
        .is_some_and(|(command, arg)| {
            UNARY_COMMANDS.contains(&command) && !arg.contains(['{', '}'])
        })
}

/// The last few non-empty lines of a failed program's output.
fn error_excerpt(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(ERROR_CONTEXT_LINES);
    lines[start..].join(" | ")
}

/// Scratch job name derived from the output file name.
fn job_name(output: &Path) -> String {
    output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("equation")
        .to_string()
}

impl EquationRenderer for LatexRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        let job = job_name(&request.output);
        let job_dir = self.work_dir.join(&job);
        std::fs::create_dir_all(&job_dir)?;

        let tex_path = job_dir.join(format!("{}.tex", job));
        std::fs::write(&tex_path, tex_document(request))?;

        self.run(
            Command::new(&self.latex)
                .arg("-interaction=nonstopmode")
                .arg("-halt-on-error")
                .arg(format!("-output-directory={}", job_dir.display()))
                .arg(&tex_path)
                .current_dir(&job_dir),
            &self.latex,
        )?;

        self.run(
            Command::new(&self.dvipng)
                .args(["-q", "-T", "tight", "-bg", "Transparent"])
                .arg("-D")
                .arg(request.dpi.to_string())
                .arg("-o")
                .arg(&request.output)
                .arg(job_dir.join(format!("{}.dvi", job)))
                .current_dir(&job_dir),
            &self.dvipng,
        )?;

        if let Err(e) = std::fs::remove_dir_all(&job_dir) {
            log::debug!("Could not remove {}: {}", job_dir.display(), e);
        }
        Ok(())
    }
}
