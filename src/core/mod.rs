//! Pure text transformations: grid projection and line reflow

pub mod projector;
pub mod reflow;

pub use projector::{derive_signature, project, select_headers, strip_text, strip_text_str};
pub use reflow::{reflow, LINE_WIDTH};
