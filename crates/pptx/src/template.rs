//! Style base taken from an existing presentation.

use crate::parts::{DEFAULT_THEME, THEME_PATH};
use lecture_core::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Theme used for generated decks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    theme: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl Template {
    /// Load the theme of `path`, or fall back to the built-in theme when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "Template {} not found, using the default theme",
                path.display()
            );
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read the theme part from a PPTX archive.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open template: {}", e)))?;
        let theme = read_file_from_archive(&mut archive, THEME_PATH)?;
        log::debug!("Using template theme ({} bytes)", theme.len());
        Ok(Self { theme })
    }

    /// The theme part XML.
    pub fn theme(&self) -> &str {
        &self.theme
    }
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}
