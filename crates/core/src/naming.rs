//! Output artifact naming.
//!
//! `Chapter_Options.qmd` becomes `Slides_Options`, with the equation images
//! in `Slides_Options_equations/` and the deck in `Slides_Options.pptx`.

use std::path::{Path, PathBuf};

const SLIDES_PREFIX: &str = "Slides_";
const CHAPTER_PREFIX: &str = "Chapter_";

/// Locations of every artifact produced for one input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Shared base name, e.g. `Slides_Options`.
    pub base_name: String,

    /// Directory for `equation_NNN.png` files.
    pub equations_dir: PathBuf,

    /// Directory reserved for figure output.
    pub figures_dir: PathBuf,

    /// The presentation package.
    pub presentation: PathBuf,
}

impl OutputPaths {
    /// Derive output paths for `input`, placed in `output_dir` or next to
    /// the input when none is given.
    pub fn for_input(input: &Path, output_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let base_name = format!("{}{}", SLIDES_PREFIX, stem.replace(CHAPTER_PREFIX, ""));

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        Self {
            equations_dir: dir.join(format!("{}_equations", base_name)),
            figures_dir: dir.join(format!("{}_figures", base_name)),
            presentation: dir.join(format!("{}.pptx", base_name)),
            base_name,
        }
    }
}
