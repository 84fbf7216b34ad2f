//! Core domain types, structure extraction, equation rendering
//! orchestration and slide layout planning for lecture-note conversion.

pub mod document;
pub mod equations;
pub mod error;
pub mod layout;
pub mod naming;
pub mod render;
pub mod structure;
pub mod types;

pub use document::Document;
pub use equations::extract_equations;
pub use error::{Error, Result};
pub use layout::{derive_bullets, EquationCursor, SlideLayoutPlanner};
pub use naming::OutputPaths;
pub use render::{EquationRenderer, RenderOrchestrator, RenderOutcome, RenderReport, RenderRequest};
pub use structure::{extract_callouts, StructureExtractor};
pub use types::{
    Callout, Embed, Equation, EquationKind, Figure, Section, SlideDescriptor, Subsection,
};
