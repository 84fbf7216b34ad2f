//! Reducing a converted notebook to its code cells.

use lecture_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Text of the markdown cell placed at the top of every published notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Title of the book the notebooks accompany.
    pub book_title: String,

    /// Link to the book.
    pub book_url: String,

    /// One line per author.
    pub authors: Vec<String>,

    /// Colab prefix the published notebook name is appended to.
    pub colab_base: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            book_title: "Pricing and Hedging Derivative Securities: Theory and Methods".to_string(),
            book_url: "https://book.derivative-securities.org/".to_string(),
            authors: vec![
                "Kerry Back, Rice University".to_string(),
                "Hong Liu, Washington University in St. Louis".to_string(),
                "Mark Loewenstein, University of Maryland".to_string(),
            ],
            colab_base:
                "https://colab.research.google.com/github/math-finance-book/book-code/blob/main"
                    .to_string(),
        }
    }
}

impl HeaderConfig {
    /// Load a header configuration from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::NotebookError(format!("Invalid header config: {}", e)))
    }

    /// The header markdown cell for the notebook published as `notebook_name`.
    pub fn cell(&self, notebook_name: &str) -> Value {
        let mut source = vec![
            "---\n".to_string(),
            "\n".to_string(),
            format!("Created for [{}]({})\n", self.book_title, self.book_url),
            "\n".to_string(),
            "Authored by\n".to_string(),
        ];
        source.extend(self.authors.iter().map(|a| format!("- {}\n", a)));
        source.extend([
            " \n".to_string(),
            "---\n".to_string(),
            "\n".to_string(),
            format!(
                "<a target=\"_blank\" href=\"{}/{}\">\n",
                self.colab_base.trim_end_matches('/'),
                notebook_name
            ),
            "  <img src=\"https://colab.research.google.com/assets/colab-badge.svg\" alt=\"Open In Colab\"/>\n"
                .to_string(),
            "</a>".to_string(),
        ]);

        json!({
            "cell_type": "markdown",
            "metadata": {},
            "source": source,
        })
    }
}

/// Drop markdown cells and `#|` option lines, then prepend `header`.
pub fn strip_notebook(notebook: &mut Value, header: Value) -> Result<()> {
    let cells = notebook
        .get_mut("cells")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::NotebookError("notebook has no cells array".to_string()))?;

    cells.retain(|cell| cell.get("cell_type").and_then(Value::as_str) != Some("markdown"));

    for cell in cells.iter_mut() {
        if let Some(source) = cell.get_mut("source") {
            strip_option_lines(source);
        }
    }

    cells.insert(0, header);
    Ok(())
}

fn is_option_line(line: &str) -> bool {
    line.trim().starts_with("#|")
}

/// Remove chunk option lines from a cell source (list or string form).
fn strip_option_lines(source: &mut Value) {
    match source {
        Value::Array(lines) => {
            lines.retain(|line| !line.as_str().is_some_and(is_option_line));
        }
        Value::String(text) => {
            let kept: String = text
                .split_inclusive('\n')
                .filter(|line| !is_option_line(line))
                .collect();
            *text = kept;
        }
        _ => {}
    }
}
