//! Code-only notebook publishing for lecture chapters.
//!
//! Chapters listed in the book configuration are converted with
//! `quarto convert`, reduced to their code cells, given a header cell and
//! written under ordinal names.

pub mod chapters;
pub mod publish;
pub mod strip;

pub use chapters::{chapters_from_config, has_python_chunks, published_name};
pub use publish::NotebookPublisher;
pub use strip::{strip_notebook, HeaderConfig};
