//! PPTX (Office Open XML) presentation writer for planned lecture slides.
//!
//! Produces a ZIP package with one master, one blank layout, a theme and
//! one slide part per descriptor; shapes are positioned explicitly.

pub mod parts;
pub mod slide;
pub mod template;
pub mod writer;
pub mod xml;

pub use template::Template;
pub use writer::PptxWriter;
