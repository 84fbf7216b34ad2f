//! Converting chapters with Quarto and writing the published notebooks.

use crate::chapters::{file_has_python_chunks, published_name};
use crate::strip::{strip_notebook, HeaderConfig};
use lecture_core::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Publishes code-only notebooks for book chapters.
#[derive(Debug, Clone)]
pub struct NotebookPublisher {
    output_dir: PathBuf,
    header: HeaderConfig,
    quarto: String,
}

impl NotebookPublisher {
    /// Create a publisher writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            header: HeaderConfig::default(),
            quarto: "quarto".to_string(),
        }
    }

    pub fn with_header(mut self, header: HeaderConfig) -> Self {
        self.header = header;
        self
    }

    /// Use a specific `quarto` executable.
    pub fn with_quarto(mut self, quarto: impl Into<String>) -> Self {
        self.quarto = quarto.into();
        self
    }

    /// Chapters (resolved against `book_dir`) that contain Python chunks,
    /// paired with their published names. Ordinals count only these.
    pub fn plan(&self, book_dir: &Path, chapters: &[String]) -> Vec<(PathBuf, String)> {
        chapters
            .iter()
            .map(|chapter| (book_dir.join(chapter), chapter))
            .filter(|(path, _)| file_has_python_chunks(path))
            .enumerate()
            .map(|(i, (path, chapter))| (path, published_name(i + 1, chapter)))
            .collect()
    }

    /// Convert one chapter and write the stripped notebook.
    pub fn publish(&self, chapter: &Path, name: &str) -> Result<PathBuf> {
        log::info!("Converting {}...", chapter.display());
        let output = Command::new(&self.quarto)
            .arg("convert")
            .arg(chapter)
            .output()
            .map_err(|e| Error::MissingCapability(format!("{}: {}", self.quarto, e)))?;
        if !output.status.success() {
            return Err(Error::NotebookError(format!(
                "quarto convert {} failed: {}",
                chapter.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let converted = chapter.with_extension("ipynb");
        let published = self.finish(&converted, name);
        if let Err(e) = std::fs::remove_file(&converted) {
            log::warn!("Could not remove {}: {}", converted.display(), e);
        }
        published
    }

    /// Strip an already converted notebook and write it as `name`.
    pub fn finish(&self, converted: &Path, name: &str) -> Result<PathBuf> {
        let text = std::fs::read_to_string(converted)?;
        let mut notebook: Value = serde_json::from_str(&text)
            .map_err(|e| Error::NotebookError(format!("{}: {}", converted.display(), e)))?;

        strip_notebook(&mut notebook, self.header.cell(name))?;

        std::fs::create_dir_all(&self.output_dir)?;
        let destination = self.output_dir.join(name);
        let json = serde_json::to_string_pretty(&notebook)
            .map_err(|e| Error::NotebookError(e.to_string()))?;
        std::fs::write(&destination, json)?;

        log::debug!("Wrote {}", destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lecture-notebook-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_plan_skips_chapters_without_code() {
        let dir = scratch("plan");
        std::fs::write(dir.join("Chapter_Intro.qmd"), "# Intro\nNo code.").unwrap();
        std::fs::write(dir.join("Chapter_Futures.qmd"), "```{python}\nx = 1\n```").unwrap();
        std::fs::write(dir.join("Chapter_Options.qmd"), "```{python}\ny = 2\n```").unwrap();

        let chapters: Vec<String> = [
            "Chapter_Intro.qmd",
            "Chapter_Futures.qmd",
            "Chapter_Missing.qmd",
            "Chapter_Options.qmd",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let plan = NotebookPublisher::new(dir.join("out")).plan(&dir, &chapters);

        assert_eq!(
            plan,
            vec![
                (dir.join("Chapter_Futures.qmd"), "01_Futures.ipynb".to_string()),
                (dir.join("Chapter_Options.qmd"), "02_Options.ipynb".to_string()),
            ]
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_finish_writes_stripped_notebook() {
        let dir = scratch("finish");
        let converted = dir.join("Chapter_Futures.ipynb");
        let notebook = json!({
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": ["prose"]},
                {"cell_type": "code", "metadata": {}, "source": ["#| echo: false\n", "x = 1"]}
            ],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        });
        std::fs::write(&converted, notebook.to_string()).unwrap();

        let out = dir.join("published");
        let path = NotebookPublisher::new(&out)
            .finish(&converted, "01_Futures.ipynb")
            .unwrap();
        assert_eq!(path, out.join("01_Futures.ipynb"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"cells\": ["));
        let value: Value = serde_json::from_str(&written).unwrap();
        let cells = value["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0]["cell_type"], json!("markdown"));
        assert_eq!(cells[1]["source"], json!(["x = 1"]));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_publish_removes_converted_notebook_on_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = scratch("badconvert");
        let chapter = dir.join("Chapter_X.qmd");
        std::fs::write(&chapter, "```{python}\n```").unwrap();

        // Stand-in for `quarto convert` that writes a notebook without cells
        let quarto = dir.join("fake-quarto");
        std::fs::write(
            &quarto,
            "#!/bin/sh\nprintf '{\"metadata\": {}}' > \"${2%.qmd}.ipynb\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&quarto, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = NotebookPublisher::new(dir.join("out"))
            .with_quarto(quarto.to_string_lossy())
            .publish(&chapter, "01_X.ipynb")
            .unwrap_err();
        assert!(matches!(err, Error::NotebookError(_)));
        assert!(!dir.join("Chapter_X.ipynb").exists());
        assert!(!dir.join("out").join("01_X.ipynb").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_publish_without_quarto() {
        let dir = scratch("noquarto");
        let chapter = dir.join("Chapter_X.qmd");
        std::fs::write(&chapter, "```{python}\n```").unwrap();

        let err = NotebookPublisher::new(&dir)
            .with_quarto("no-such-quarto-binary")
            .publish(&chapter, "01_X.ipynb")
            .unwrap_err();
        assert!(matches!(err, Error::MissingCapability(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
