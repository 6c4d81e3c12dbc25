//! Utility modules.

pub mod mime;
pub mod text;

pub use mime::{classify_type, is_scan_eligible};
pub use text::{chunk_chars, derive_excerpt, truncate_chars};
