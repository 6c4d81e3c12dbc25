//! Service layer for ocr2notion.
//!
//! Business logic separated from the CLI, which only wires collaborators and
//! renders events.

pub mod markers;
pub mod publish;

pub use markers::{ProcessedMarkers, MARKER_MAX_CHARS};
pub use publish::{BatchReport, CreatedPage, PublishError, PublishEvent, PublishSettings, Publisher};
